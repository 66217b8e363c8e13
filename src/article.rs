//! Detail page segmentation.
//!
//! A daily report page holds one `.newsArticle` container with a lead
//! (`.news-manchet`) and a `.rich-text` body. The body is a flat run of text,
//! `<br>` and `<h3>` nodes; every `<h3>` opens a new incident that lasts until
//! the next `<h3>` sibling, or the next sibling block that holds headings of
//! its own.
//!
//! Segmentation never mutates the parsed document. The children of each
//! heading's parent are indexed once, and each incident's body is a half-open
//! range into that index.

use crate::api::{HttpFetch, HttpRequest};
use crate::error::{Error, Result};
use crate::models::{ParsedArticle, SubArticle};
use crate::utils::{normalize_text, normalize_title};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::ops::Range;
use tracing::{debug, instrument};
use url::Url;

const CONTAINER: &str = ".newsArticle";
const LEAD: &str = ".news-manchet";
const BODY: &str = ".rich-text";
const HEADING_TAG: &str = "h3";

static CONTAINER_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(CONTAINER).unwrap());
static LEAD_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(LEAD).unwrap());
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(BODY).unwrap());
static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse(HEADING_TAG).unwrap());

/// What a single child node contributes to a body scan.
enum Fragment<'a> {
    Heading(ElementRef<'a>),
    /// A block with headings inside; those are segmented under their own parent.
    Section,
    LineBreak,
    Text(String),
}

/// The children of one parent element, classified, with the positions of
/// the fragments that end a span.
struct SiblingIndex<'a> {
    fragments: Vec<Fragment<'a>>,
    stops: Vec<usize>,
}

impl<'a> SiblingIndex<'a> {
    fn build(parent: ElementRef<'a>) -> Self {
        let mut fragments = Vec::new();
        let mut stops = Vec::new();

        for child in parent.children() {
            let fragment = if let Some(element) = ElementRef::wrap(child) {
                match element.value().name() {
                    HEADING_TAG => {
                        stops.push(fragments.len());
                        Fragment::Heading(element)
                    }
                    "br" => Fragment::LineBreak,
                    _ if element.select(&HEADING_SELECTOR).next().is_some() => {
                        stops.push(fragments.len());
                        Fragment::Section
                    }
                    _ => Fragment::Text(element.text().collect()),
                }
            } else if let Some(text) = child.value().as_text() {
                Fragment::Text(text.to_string())
            } else {
                // comments, processing instructions
                continue;
            };
            fragments.push(fragment);
        }

        Self { fragments, stops }
    }

    /// Position of `heading` among the fragments.
    fn position_of(&self, heading: ElementRef<'a>) -> Option<usize> {
        self.stops.iter().copied().find(|&pos| {
            matches!(&self.fragments[pos], Fragment::Heading(el) if el.id() == heading.id())
        })
    }

    /// Fragments belonging to the heading at `pos`: everything after it up to,
    /// not including, the next heading or section.
    fn span_after(&self, pos: usize) -> Range<usize> {
        let end = self
            .stops
            .iter()
            .copied()
            .find(|&h| h > pos)
            .unwrap_or(self.fragments.len());
        pos + 1..end
    }

    fn body_text(&self, span: Range<usize>) -> String {
        let mut text = String::new();
        for fragment in &self.fragments[span] {
            match fragment {
                Fragment::LineBreak => text.push(' '),
                Fragment::Text(t) => text.push_str(t),
                Fragment::Heading(_) | Fragment::Section => {
                    unreachable!("spans end before the next stop")
                }
            }
        }
        text
    }
}

/// Raw text of a heading: its leading child node.
fn heading_title(heading: ElementRef<'_>) -> String {
    let Some(first) = heading.first_child() else {
        return String::new();
    };
    if let Some(text) = first.value().as_text() {
        text.to_string()
    } else if let Some(element) = ElementRef::wrap(first) {
        element.text().collect()
    } else {
        String::new()
    }
}

fn select_first<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
    name: &'static str,
) -> Result<ElementRef<'a>> {
    scope
        .select(selector)
        .next()
        .ok_or(Error::MissingElement(name))
}

/// Split a detail page into its lead and heading-delimited sub-articles.
///
/// Text in the body before the first heading is not part of any sub-article
/// and is dropped. A body without headings gives an empty `articles` list.
///
/// # Errors
///
/// [`Error::MissingElement`] if the container, lead, or body is absent.
pub fn segment(html: &str) -> Result<ParsedArticle> {
    let document = Html::parse_document(html);

    let container = select_first(document.root_element(), &CONTAINER_SELECTOR, CONTAINER)?;
    let lead = select_first(container, &LEAD_SELECTOR, LEAD)?;
    let body = select_first(container, &BODY_SELECTOR, BODY)?;

    let mut indexes: HashMap<_, SiblingIndex> = HashMap::new();
    let mut articles = Vec::new();

    for heading in body.select(&HEADING_SELECTOR) {
        let Some(parent) = heading.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        let index = indexes
            .entry(parent.id())
            .or_insert_with(|| SiblingIndex::build(parent));
        let Some(pos) = index.position_of(heading) else {
            continue;
        };

        let description = index.body_text(index.span_after(pos));
        articles.push(SubArticle {
            title: normalize_title(&heading_title(heading)),
            description: normalize_text(&description),
        });
    }

    debug!(sub_articles = articles.len(), "Segmented detail page");
    Ok(ParsedArticle {
        header: normalize_text(&lead.text().collect::<String>()),
        articles,
    })
}

/// Resolve a listing link against the site URL.
pub fn resolve_link(site_url: &str, link: &str) -> Result<Url> {
    let invalid = |source| Error::InvalidUrl {
        url: link.to_string(),
        source,
    };
    let base = Url::parse(site_url).map_err(invalid)?;
    base.join(link).map_err(invalid)
}

/// Fetch a detail page and segment it.
///
/// # Errors
///
/// Transport and non-200 status failures, a body that is not UTF-8, and any
/// error from [`segment`].
#[instrument(level = "info", skip(http))]
pub async fn fetch_article<T: HttpFetch>(http: &T, url: &Url) -> Result<ParsedArticle> {
    let request = HttpRequest::get(url.as_str()).header("Accept", "text/html");
    let response = http.fetch(&request).await?;
    if response.status != reqwest::StatusCode::OK {
        return Err(Error::Status {
            url: request.url,
            status: response.status,
            message: None,
        });
    }
    let html = String::from_utf8(response.body)?;
    segment(&html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn page(rich_text: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html><head><title>Døgnrapport</title></head>
<body>
  <nav><h3>Menu</h3></nav>
  <div class="newsArticle">
    <h1>Døgnrapport fra Fyns Politi</h1>
    <p class="news-manchet">
        Uddrag af døgnrapporten
        for Fyns Politi</p>
    <div class="rich-text">{rich_text}</div>
  </div>
</body></html>"#
        )
    }

    #[test]
    fn test_three_headings() {
        let html = page(
            "<h3>A Heading:</h3>Første\n\tlinje<br>anden linje<br/>\
             <h3>B Heading</h3><p>En bil blev   stjålet.</p>\
             <h3>\n  C Heading  </h3>Slut",
        );
        let parsed = segment(&html).unwrap();

        assert_eq!(parsed.header, "Uddrag af døgnrapporten for Fyns Politi");
        let titles: Vec<_> = parsed.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["A Heading", "B Heading", "C Heading"]);
        assert_eq!(parsed.articles[0].description, "Førstelinje anden linje");
        assert_eq!(parsed.articles[1].description, "En bil blev stjålet.");
        assert_eq!(parsed.articles[2].description, "Slut");
    }

    #[test]
    fn test_no_headings_is_not_an_error() {
        let parsed = segment(&page("Ingen væsentlige hændelser.<br>")).unwrap();
        assert_eq!(parsed.header, "Uddrag af døgnrapporten for Fyns Politi");
        assert!(parsed.articles.is_empty());
    }

    #[test]
    fn test_text_before_first_heading_is_dropped() {
        let parsed = segment(&page("Indledning<br><h3>Tyveri</h3>Cykel stjålet")).unwrap();
        assert_eq!(parsed.articles.len(), 1);
        assert_eq!(parsed.articles[0].description, "Cykel stjålet");
        assert!(!parsed.articles[0].description.contains("Indledning"));
    }

    #[test]
    fn test_empty_sections_are_kept() {
        let parsed = segment(&page("<h3>Første:</h3><h3></h3><br><h3>Sidste</h3>")).unwrap();
        assert_eq!(parsed.articles.len(), 3);
        assert_eq!(parsed.articles[0].title, "Første");
        assert_eq!(parsed.articles[0].description, "");
        assert_eq!(parsed.articles[1].title, "");
        assert_eq!(parsed.articles[1].description, "");
        assert_eq!(parsed.articles[2].description, "");
    }

    #[test]
    fn test_title_uses_leading_node_only() {
        let parsed =
            segment(&page("<h3>Indbrud i Svendborg:<span> (opdateret)</span></h3>Tekst")).unwrap();
        assert_eq!(parsed.articles[0].title, "Indbrud i Svendborg");

        let parsed = segment(&page("<h3><strong>Færdsel</strong> mv.</h3>Tekst")).unwrap();
        assert_eq!(parsed.articles[0].title, "Færdsel");
        assert_eq!(parsed.articles[0].description, "Tekst");
    }

    #[test]
    fn test_nested_elements_contribute_text() {
        let parsed = segment(&page(
            "<h3>Razzia</h3>Politiet <strong>anholdt</strong> <a href=\"/x\">to</a> mænd.<!-- note -->",
        ))
        .unwrap();
        assert_eq!(parsed.articles[0].description, "Politiet anholdt to mænd.");
    }

    #[test]
    fn test_headings_in_separate_blocks() {
        let parsed = segment(&page(
            "<div><h3>Nord</h3>Rolig nat</div><div><h3>Syd</h3>Brand<h3>Vest</h3>Uheld</div>",
        ))
        .unwrap();
        let got: Vec<_> = parsed
            .articles
            .iter()
            .map(|a| (a.title.as_str(), a.description.as_str()))
            .collect();
        assert_eq!(got, [("Nord", "Rolig nat"), ("Syd", "Brand"), ("Vest", "Uheld")]);
    }

    #[test]
    fn test_block_with_headings_ends_the_span() {
        let parsed = segment(&page(
            "<h3>A</h3>intro<div><h3>B</h3>more</div><h3>C:</h3>slut<section><h3>D</h3>sidst</section>",
        ))
        .unwrap();
        let got: Vec<_> = parsed
            .articles
            .iter()
            .map(|a| (a.title.as_str(), a.description.as_str()))
            .collect();
        assert_eq!(
            got,
            [("A", "intro"), ("B", "more"), ("C", "slut"), ("D", "sidst")]
        );
        for sub in &parsed.articles {
            for other in &parsed.articles {
                assert!(!sub.description.contains(other.title.as_str()));
            }
        }
    }

    #[test]
    fn test_heading_outside_body_ignored() {
        let parsed = segment(&page("<h3>Kun denne</h3>")).unwrap();
        assert_eq!(parsed.articles.len(), 1);
        assert_eq!(parsed.articles[0].title, "Kun denne");
    }

    #[test]
    fn test_output_is_normalized() {
        let parsed = segment(&page(
            "<h3>  Røveri \n i  Odense:  </h3>\n\t  To   personer<br><br>  blev anholdt  \n",
        ))
        .unwrap();
        for sub in &parsed.articles {
            for s in [&sub.title, &sub.description] {
                assert!(!s.contains("  ") && !s.contains('\n') && !s.contains('\t'));
                assert_eq!(s.as_str(), s.trim());
            }
        }
        assert_eq!(parsed.articles[0].title, "Røveri i Odense");
        assert_eq!(parsed.articles[0].description, "To personer blev anholdt");
    }

    #[test]
    fn test_segment_is_deterministic() {
        let html = page("<h3>A</h3>x<br>y<h3>B</h3>z");
        assert_eq!(segment(&html).unwrap(), segment(&html).unwrap());
    }

    #[test]
    fn test_missing_elements() {
        let err = segment("<html><body><p>Not found</p></body></html>").unwrap_err();
        assert!(matches!(err, Error::MissingElement(".newsArticle")));
        assert_eq!(err.kind(), ErrorKind::Structure);

        let err = segment(r#"<div class="newsArticle"><div class="rich-text"></div></div>"#)
            .unwrap_err();
        assert!(matches!(err, Error::MissingElement(".news-manchet")));

        let err = segment(r#"<div class="newsArticle"><p class="news-manchet">x</p></div>"#)
            .unwrap_err();
        assert!(matches!(err, Error::MissingElement(".rich-text")));
    }

    #[test]
    fn test_resolve_link() {
        let url = resolve_link("https://politi.dk", "/fyns-politi/doegnrapport").unwrap();
        assert_eq!(url.as_str(), "https://politi.dk/fyns-politi/doegnrapport");

        let url = resolve_link("https://politi.dk", "https://example.com/a").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a");

        let err = resolve_link("not a url", "/x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_fetch_article_over_http() {
        use crate::api::ReqwestFetch;
        use httpmock::prelude::*;

        let server = MockServer::start_async().await;
        let body = page("<h3>Indbrud:</h3>Villa i Nyborg");
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/fyns-politi/doegnrapport");
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body(body);
            })
            .await;

        let http = ReqwestFetch::new(reqwest::Client::new());
        let url = resolve_link(&server.base_url(), "/fyns-politi/doegnrapport").unwrap();
        let parsed = fetch_article(&http, &url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(parsed.articles.len(), 1);
        assert_eq!(parsed.articles[0].title, "Indbrud");
        assert_eq!(parsed.articles[0].description, "Villa i Nyborg");
    }

    #[tokio::test]
    async fn test_fetch_article_status_error() {
        use crate::api::ReqwestFetch;
        use httpmock::prelude::*;

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone");
                then.status(404);
            })
            .await;

        let http = ReqwestFetch::new(reqwest::Client::new());
        let url = resolve_link(&server.base_url(), "/gone").unwrap();
        let err = fetch_article(&http, &url).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Status);
    }

    #[tokio::test]
    async fn test_fetch_article_rejects_invalid_utf8() {
        use crate::api::HttpResponse;

        struct Latin1;
        impl HttpFetch for Latin1 {
            async fn fetch(&self, _request: &HttpRequest) -> Result<HttpResponse> {
                Ok(HttpResponse {
                    status: reqwest::StatusCode::OK,
                    body: vec![b'<', b'p', b'>', 0xe6, b'<', b'/', b'p', b'>'],
                })
            }
        }

        let url = Url::parse("https://politi.dk/x").unwrap();
        let err = fetch_article(&Latin1, &url).await.unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
