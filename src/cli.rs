//! Command-line interface definitions for politi_news.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Options that point at files or tune the transport can also come from
//! environment variables.

use crate::district::District;
use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Last seven months, every district, preview on stdout
/// politi_news
///
/// # One district, one month, write JSON and Markdown reports
/// politi_news --from 2024-01-01 --to 2024-01-31 -d fyn -j ./json -m ./markdown
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// First day to include (YYYY-MM-DD). Defaults to seven months ago.
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD). Defaults to now.
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// District to include; repeat for several. Defaults to all districts.
    #[arg(short, long = "district", value_enum)]
    pub districts: Vec<District>,

    /// Optional path to a config.yaml overriding endpoint and HTTP settings
    #[arg(short, long, env = "POLITI_NEWS_CONFIG")]
    pub config: Option<String>,

    /// Output directory for the JSON report
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Output directory for the Markdown report
    #[arg(short, long)]
    pub markdown_output_dir: Option<String>,

    /// Retries for transport errors and 5xx responses (0 = no retries)
    #[arg(long, env = "POLITI_NEWS_RETRIES", default_value_t = 0)]
    pub retries: usize,

    /// Detail pages fetched at the same time
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=32))]
    pub concurrency: u16,

    /// Only fetch the listing; skip detail pages
    #[arg(long)]
    pub list_only: bool,

    /// Characters kept from each end of long descriptions in the console preview
    #[arg(long, default_value_t = 50)]
    pub preview_chars: usize,
}
