//! Output generation for fetched and segmented reports.
//!
//! # Submodules
//!
//! - [`console`]: Prints a short preview of each report to stdout
//! - [`json`]: Writes the full report set to a JSON file
//! - [`markdown`]: Renders the report set as a Markdown document
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2024-01-01_2024-07-31.json
//!
//! markdown_output_dir/
//! └── 2024-01-01_2024-07-31.md
//! ```

pub mod console;
pub mod json;
pub mod markdown;

use chrono::NaiveDate;

/// File stem shared by the JSON and Markdown outputs for a date range.
pub fn file_stem(from: NaiveDate, to: NaiveDate) -> String {
    format!("{}_{}", from, to)
}
