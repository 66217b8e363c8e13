//! Data models for listing records and segmented report pages.
//!
//! - [`ListingItem`] / [`ListingPage`]: decoded from the listing endpoint's JSON
//! - [`ParsedArticle`] / [`SubArticle`]: produced by segmenting a detail page
//! - [`Report`]: one listing item paired with its segmented page, for output
//!
//! The listing types keep the server's PascalCase key names on the wire.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// One record from the listing endpoint.
///
/// The endpoint is loose about absent values: any of the text fields may be
/// `null` or missing, and those decode as empty strings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListingItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub district_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub article_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub publish_date: String,
    /// Detail page link, usually site-relative.
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub list_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headline: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub manchet: String,
    #[serde(default)]
    pub article: Option<String>,
    #[serde(rename = "Id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default)]
    pub tool_tip: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_description: Option<String>,
    #[serde(default)]
    pub photographer_text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub no_photo: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_description: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ListingItem {
    /// Best-effort parse of `PublishDate`. The endpoint returns both offset
    /// and naive timestamps; naive ones are taken as UTC.
    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.publish_date)
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// One decoded page of the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListingPage {
    #[serde(default)]
    pub news_list: Vec<ListingItem>,
    pub total_number_of_news: usize,
}

/// A detail page split into its lead and heading-delimited sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedArticle {
    pub header: String,
    pub articles: Vec<SubArticle>,
}

/// One heading-delimited section of a detail page. Both fields are plain,
/// whitespace-normalized text and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubArticle {
    pub title: String,
    pub description: String,
}

/// A listing item together with the outcome of segmenting its page.
#[derive(Debug, Serialize)]
pub struct Report {
    pub item: ListingItem,
    /// Absolute URL the page was fetched from.
    pub url: String,
    pub article: Option<ParsedArticle>,
    /// Set when the page could not be fetched or segmented.
    pub error: Option<String>,
}
