//! Markdown rendering of the report set.
//!
//! One `##` section per listing record with its lead, followed by a `###`
//! section per sub-article. Records whose page failed keep their heading and
//! show the error instead.

use crate::models::Report;
use std::error::Error;
use std::fmt::Write;
use tokio::fs;
use tracing::{info, instrument};

pub fn reports_to_markdown(title: &str, reports: &[Report]) -> String {
    let mut md = String::new();
    writeln!(md, "# {}\n", title).unwrap();

    for report in reports {
        let item = &report.item;
        writeln!(md, "## [{}]({})\n", item.headline, report.url).unwrap();
        let published = item
            .published_at()
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| item.publish_date.clone());
        writeln!(md, "*{} · {}*\n", item.district_name, published).unwrap();

        match (&report.article, &report.error) {
            (Some(article), _) => {
                if !article.header.is_empty() {
                    writeln!(md, "{}\n", article.header).unwrap();
                }
                for sub in &article.articles {
                    writeln!(md, "### {}\n", sub.title).unwrap();
                    if !sub.description.is_empty() {
                        writeln!(md, "{}\n", sub.description).unwrap();
                    }
                }
            }
            (None, Some(e)) => {
                writeln!(md, "> Could not read this report: {}\n", e).unwrap();
            }
            (None, None) => {}
        }
    }

    md
}

#[instrument(level = "info", skip_all, fields(%markdown_output_dir))]
pub async fn write_reports(
    title: &str,
    reports: &[Report],
    markdown_output_dir: &str,
    stem: &str,
) -> Result<String, Box<dyn Error>> {
    fs::create_dir_all(markdown_output_dir).await?;
    let path = format!("{}/{}.md", markdown_output_dir.trim_end_matches('/'), stem);
    fs::write(&path, reports_to_markdown(title, reports)).await?;
    info!(%path, "Wrote Markdown report file");
    Ok(path)
}
