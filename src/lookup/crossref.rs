//! CrossRef REST API client
//!
//! One operation: fetch a work record by DOI from
//! `https://api.crossref.org/works/{doi}` and map it to [`WorkMetadata`].
//! A `mailto` contact can be attached to join the CrossRef polite pool.

use super::{MetadataSource, WorkMetadata, WorkReference};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.crossref.org";

/// CrossRef lookup client
pub struct CrossrefClient {
    http: reqwest::Client,
    base_url: String,
    mailto: Option<String>,
}

impl Default for CrossrefClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossrefClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            mailto: None,
        }
    }

    /// Attach a contact email for the CrossRef polite pool.
    pub fn with_mailto(mut self, mailto: impl Into<String>) -> Self {
        self.mailto = Some(mailto.into());
        self
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl MetadataSource for CrossrefClient {
    async fn lookup(&self, doi: &str) -> Option<WorkMetadata> {
        let url = format!("{}/works/{}", self.base_url, doi);
        let mut request = self.http.get(&url);
        if let Some(mailto) = &self.mailto {
            request = request.query(&[("mailto", mailto.as_str())]);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(doi, error = %e, "crossref request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(doi, status = %response.status(), "crossref returned non-success");
            return None;
        }

        // Not-found responses carry a plain-text body; JSON parse failure
        // degrades to None like every other failure.
        let payload: WorksResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                debug!(doi, error = %e, "crossref payload parse failed");
                return None;
            }
        };

        Some(payload.message.into_metadata())
    }
}

#[derive(Debug, Deserialize)]
struct WorksResponse {
    message: Work,
}

#[derive(Debug, Default, Deserialize)]
struct Work {
    #[serde(default)]
    reference: Vec<Reference>,
    issued: Option<DateField>,
}

#[derive(Debug, Deserialize)]
struct Reference {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

/// CrossRef partial-date structure: `{"date-parts": [[year, month, day]]}`
/// with trailing parts optional.
#[derive(Debug, Default, Deserialize)]
struct DateField {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl Work {
    fn into_metadata(self) -> WorkMetadata {
        let issued_year = self
            .issued
            .as_ref()
            .and_then(|d| d.date_parts.first())
            .and_then(|parts| parts.first())
            .copied()
            .flatten();
        WorkMetadata {
            references: self
                .reference
                .into_iter()
                .map(|r| WorkReference { doi: r.doi })
                .collect(),
            issued_year,
        }
    }
}
