//! JSON output of the full report set.
//!
//! The file holds an array of [`Report`] values in listing order: each
//! listing record, the absolute URL of its page, and either the segmented
//! page or the error that prevented it.

use crate::models::Report;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `reports` to `{json_output_dir}/{stem}.json`.
///
/// # Returns
///
/// The path written, or an error if directory creation, serialization,
/// or the file write fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_reports(
    reports: &[Report],
    json_output_dir: &str,
    stem: &str,
) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(reports)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(%json_output_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = format!("{}/{}.json", json_output_dir.trim_end_matches('/'), stem);
    info!(path = %output_json_filename, "Writing JSON");
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, count = reports.len(), "Wrote JSON report file");

    Ok(output_json_filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingItem, ParsedArticle, SubArticle};

    fn listing_item() -> ListingItem {
        serde_json::from_str(
            r#"{
                "DistrictName": "Fyns Politi",
                "ArticleType": "Døgnrapporter",
                "PublishDate": "2024-03-01T08:15:00+01:00",
                "Link": "/fyns-politi/doegnrapport",
                "ListDate": "2024-03-01T08:15:00",
                "Headline": "Døgnrapport",
                "Manchet": "",
                "Id": "1"
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_write_reports() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("json");
        let reports = vec![
            Report {
                item: listing_item(),
                url: "https://politi.dk/fyns-politi/doegnrapport".to_string(),
                article: Some(ParsedArticle {
                    header: "Lead".to_string(),
                    articles: vec![SubArticle {
                        title: "Indbrud".to_string(),
                        description: "Villa".to_string(),
                    }],
                }),
                error: None,
            },
            Report {
                item: listing_item(),
                url: "https://politi.dk/x".to_string(),
                article: None,
                error: Some("HTTP 404".to_string()),
            },
        ];

        let path = write_reports(&reports, out.to_str().unwrap(), "2024-01-01_2024-07-31")
            .await
            .unwrap();
        assert!(path.ends_with("json/2024-01-01_2024-07-31.json"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.as_array().unwrap().len(), 2);
        assert_eq!(written[0]["article"]["articles"][0]["title"], "Indbrud");
        assert_eq!(written[0]["item"]["DistrictName"], "Fyns Politi");
        assert_eq!(written[1]["error"], "HTTP 404");
    }
}
