//! # politi_news
//!
//! Fetches the daily police reports ("døgnrapporter") published on politi.dk
//! and splits each report page into its individual incidents.
//!
//! ## Usage
//!
//! ```sh
//! politi_news --from 2024-01-01 --to 2024-01-31 -d fyn -j ./json -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! 1. **Listing**: page through the listing endpoint until every record for
//!    the date range and districts is in hand
//! 2. **Segmenting**: fetch each record's page and split its body into
//!    heading-delimited sub-articles; a failing page is logged and skipped
//! 3. **Output**: console preview, plus optional JSON and Markdown reports

use chrono::{DateTime, Local, Months, NaiveDate, NaiveTime, TimeZone};
use clap::Parser;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod article;
mod cli;
mod config;
mod district;
mod error;
mod listing;
mod models;
mod outputs;
mod utils;

use api::{HttpFetch, ReqwestFetch, RetryFetch};
use article::{fetch_article, resolve_link};
use cli::Cli;
use config::AppConfig;
use district::District;
use listing::ListingClient;
use models::{ListingItem, Report};
use outputs::{console, json, markdown};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("politi_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match AppConfig::load(args.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    // Fail before any network traffic if an output dir is unusable
    for dir in [&args.json_output_dir, &args.markdown_output_dir]
        .into_iter()
        .flatten()
    {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable");
            return Err(e);
        }
    }

    let (from, to) = date_range(args.from, args.to, Local::now())?;
    let districts = if args.districts.is_empty() {
        District::ALL.to_vec()
    } else {
        args.districts.clone()
    };
    info!(%from, %to, districts = districts.len(), "Fetching listing");

    let http = RetryFetch::new(
        ReqwestFetch::from_config(&config.http)?,
        args.retries,
        StdDuration::from_millis(config.http.retry_base_delay_ms),
    );

    let listing = ListingClient::new(&http, config.listing.clone());
    let items = match listing.fetch_all(&from, &to, &districts).await {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, kind = ?e.kind(), "Listing fetch failed");
            return Err(e.into());
        }
    };

    let reports: Vec<Report> = if args.list_only {
        items
            .into_iter()
            .map(|item| Report {
                url: resolve_link(&config.listing.site_url, &item.link)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| item.link.clone()),
                item,
                article: None,
                error: None,
            })
            .collect()
    } else {
        let site_url = config.listing.site_url.as_str();
        stream::iter(items)
            .map(|item| build_report(&http, site_url, item))
            .buffered(usize::from(args.concurrency))
            .collect()
            .await
    };

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    info!(total = reports.len(), failed, "Processed reports");

    for report in &reports {
        console::print_report(report, args.preview_chars);
    }

    let stem = outputs::file_stem(from.date_naive(), to.date_naive());
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_reports(&reports, dir, &stem).await {
            error!(error = %e, "Failed to write JSON report");
        }
    }
    if let Some(dir) = &args.markdown_output_dir {
        let title = format!("Døgnrapporter {} – {}", from.date_naive(), to.date_naive());
        if let Err(e) = markdown::write_reports(&title, &reports, dir, &stem).await {
            error!(error = %e, "Failed to write Markdown report");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Fetch and segment one listing record's page. Failures are recorded on
/// the report rather than returned so one bad page does not stop the run.
#[instrument(level = "info", skip_all, fields(id = %item.id))]
async fn build_report<T: HttpFetch>(http: &T, site_url: &str, item: ListingItem) -> Report {
    let url = match resolve_link(site_url, &item.link) {
        Ok(url) => url,
        Err(e) => {
            warn!(link = %item.link, error = %e, "Unusable link; skipping page");
            return Report {
                url: item.link.clone(),
                item,
                article: None,
                error: Some(e.to_string()),
            };
        }
    };

    let (article, error) = match fetch_article(http, &url).await {
        Ok(article) => {
            debug!(%url, sub_articles = article.articles.len(), "Segmented page");
            (Some(article), None)
        }
        Err(e) => {
            warn!(%url, error = %e, kind = ?e.kind(), "Failed to read page; continuing");
            (None, Some(e.to_string()))
        }
    };

    Report {
        item,
        url: url.to_string(),
        article,
        error,
    }
}

/// Turn the optional CLI dates into concrete bounds: `from` at the start of
/// its day, `to` at the end of its day. Missing `to` means `now`; missing
/// `from` means seven months before `to`.
fn date_range<Tz: TimeZone>(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    now: DateTime<Tz>,
) -> Result<(DateTime<Tz>, DateTime<Tz>), Box<dyn Error>> {
    let tz = now.timezone();
    let at = |date: NaiveDate, time: NaiveTime| {
        tz.from_local_datetime(&date.and_time(time))
            .earliest()
            .ok_or_else(|| format!("{date} {time} does not exist in the local time zone"))
    };

    let to = match to {
        Some(date) => at(date, NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default())?,
        None => now,
    };
    let from_date = match from {
        Some(date) => date,
        None => to
            .date_naive()
            .checked_sub_months(Months::new(7))
            .ok_or("date out of range")?,
    };
    let from = at(from_date, NaiveTime::MIN)?;

    if from > to {
        return Err(format!("--from {} is after --to {}", from.date_naive(), to.date_naive()).into());
    }
    Ok((from, to))
}
