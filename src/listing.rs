//! Listing aggregator for the politi.dk news endpoint.
//!
//! The endpoint pages its results and reports the total number of matches
//! for the active filter on every page. [`ListingClient::fetch_all`] keeps
//! requesting pages until it holds that many records.

use crate::api::{HttpFetch, HttpRequest};
use crate::config::ListingConfig;
use crate::district::District;
use crate::error::{Error, Result};
use crate::models::{ListingItem, ListingPage};
use crate::utils::truncate_for_log;
use chrono::{DateTime, SecondsFormat, TimeZone};
use itertools::Itertools;
use serde::Deserialize;
use std::fmt::Display;
use tracing::{debug, info, instrument, warn};

/// Error body the endpoint sends with non-success statuses.
#[derive(Deserialize)]
struct QueryError {
    #[serde(rename = "Message")]
    message: String,
}

/// Client for the listing endpoint.
#[derive(Debug)]
pub struct ListingClient<T> {
    http: T,
    config: ListingConfig,
}

impl<T: HttpFetch> ListingClient<T> {
    pub fn new(http: T, config: ListingConfig) -> Self {
        Self { http, config }
    }

    fn page_request<Tz>(
        &self,
        page_size: usize,
        page_index: usize,
        from: &DateTime<Tz>,
        to: &DateTime<Tz>,
        districts: &[District],
    ) -> HttpRequest
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        HttpRequest::get(&self.config.api_url)
            .query(
                "districtQuery",
                districts.iter().map(|d| d.query_value()).join(","),
            )
            .query("itemId", &self.config.item_id)
            .query("newsType", &self.config.news_type)
            .query("isNewsList", "true")
            .query("fromDate", from.to_rfc3339_opts(SecondsFormat::Secs, true))
            .query("toDate", to.to_rfc3339_opts(SecondsFormat::Secs, true))
            .query("page", page_index.to_string())
            .query("pageSize", page_size.to_string())
            .header("Accept", "application/json")
    }

    /// Fetch a single page of listing results.
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if no response was received
    /// - [`Error::Status`] for any non-200 response, carrying the server's
    ///   `Message` when the body has one
    /// - [`Error::Json`] if the body does not decode as a listing page
    #[instrument(level = "debug", skip(self, from, to, districts))]
    pub async fn fetch_page<Tz>(
        &self,
        page_size: usize,
        page_index: usize,
        from: &DateTime<Tz>,
        to: &DateTime<Tz>,
        districts: &[District],
    ) -> Result<ListingPage>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let request = self.page_request(page_size, page_index, from, to, districts);
        let response = self.http.fetch(&request).await?;

        if response.status != reqwest::StatusCode::OK {
            let message = serde_json::from_slice::<QueryError>(&response.body)
                .ok()
                .map(|e| e.message);
            return Err(Error::Status {
                url: request.url,
                status: response.status,
                message,
            });
        }

        let page: ListingPage = match serde_json::from_slice(&response.body) {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    error = %e,
                    body_preview = %truncate_for_log(&String::from_utf8_lossy(&response.body), 300),
                    "Listing response did not decode"
                );
                return Err(e.into());
            }
        };
        debug!(
            items = page.news_list.len(),
            total = page.total_number_of_news,
            "Decoded listing page"
        );
        Ok(page)
    }

    /// Fetch every listing record between `from` and `to`.
    ///
    /// With an empty `districts` slice the server's default scope applies;
    /// pass [`District::ALL`] for every district.
    ///
    /// Pages are requested from index 0 until the accumulated count reaches
    /// the total reported by the most recent page. A page that comes back
    /// empty before that point ends the loop with what has been gathered.
    ///
    /// # Errors
    ///
    /// The first failing page aborts the whole fetch; nothing accumulated
    /// so far is returned.
    #[instrument(level = "info", skip(self, from, to), fields(from = %from, to = %to))]
    pub async fn fetch_all<Tz>(
        &self,
        from: &DateTime<Tz>,
        to: &DateTime<Tz>,
        districts: &[District],
    ) -> Result<Vec<ListingItem>>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let page_size = self.config.page_size.max(1);
        let mut items: Vec<ListingItem> = Vec::new();

        for page_index in 0.. {
            let page = self
                .fetch_page(page_size, page_index, from, to, districts)
                .await?;
            let total = page.total_number_of_news;
            let received = page.news_list.len();
            items.extend(page.news_list);

            if items.len() >= total {
                break;
            }
            if received == 0 {
                warn!(
                    page_index,
                    accumulated = items.len(),
                    total,
                    "Empty page before reported total was reached; stopping"
                );
                break;
            }
        }

        info!(count = items.len(), "Fetched listing");
        Ok(items)
    }
}
