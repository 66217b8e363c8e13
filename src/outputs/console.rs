//! Console preview: the link, the lead, and each sub-article with its
//! description shortened around an ellipsis.

use crate::models::Report;
use crate::utils::preview;
use std::fmt::Write;

pub fn render_report(report: &Report, edge: usize) -> String {
    let mut out = String::new();
    writeln!(out, "\n\n{}", report.url).unwrap();

    if let Some(article) = &report.article {
        writeln!(out, "{}", article.header).unwrap();
        for sub in &article.articles {
            writeln!(out, "\n{}", sub.title).unwrap();
            writeln!(out, "{}", preview(&sub.description, edge)).unwrap();
        }
    } else if let Some(e) = &report.error {
        writeln!(out, "error: {}", e).unwrap();
    }
    out
}

pub fn print_report(report: &Report, edge: usize) {
    print!("{}", render_report(report, edge));
}
