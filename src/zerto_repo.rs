// ZVM resource report API via reqwest. One GET per run, no retries, no timeouts.

use crate::models::RawSample;
use crate::version;
use chrono::{DateTime, TimeDelta, TimeZone};
use reqwest::header::ACCEPT;
use std::fmt::Display;
use tracing::{debug, instrument};

/// Port the ZVM REST API listens on.
pub const API_PORT: u16 = 9669;

/// Resource report endpoint, relative to the appliance base URL.
pub const SAMPLES_PATH: &str = "zvmservice/ResourcesReport/getSamples";

/// Page size requested from the appliance; only the first page is read.
pub const PAGE_COUNT: u32 = 100;

/// Lookback of the sample window.
pub const WINDOW_HOURS: i64 = 24;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:00";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("building HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("GET {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("GET {url}: decoding samples: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Trailing query window, already in the appliance's `fromTimeString`/`toTimeString` format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleWindow {
    pub from: String,
    pub to: String,
}

impl SampleWindow {
    /// The `WINDOW_HOURS` ending at `now`, seconds zeroed.
    pub fn ending_at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: Display,
    {
        let from = now.clone() - TimeDelta::hours(WINDOW_HOURS);
        Self {
            from: from.format(TIME_FORMAT).to_string(),
            to: now.format(TIME_FORMAT).to_string(),
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("fromTimeString", self.from.clone()),
            ("toTimeString", self.to.clone()),
            ("startIndex", "0".to_string()),
            ("count", PAGE_COUNT.to_string()),
        ]
    }
}

pub struct ZertoRepo {
    client: reqwest::Client,
    base_url: String,
}

impl ZertoRepo {
    /// Client for `https://<fqdn>:9669`. The appliance uses a self-signed certificate,
    /// so certificate verification is off.
    pub fn connect(fqdn: &str) -> Result<Self, FetchError> {
        Self::with_base_url(format!("https://{}:{}", fqdn, API_PORT))
    }

    /// Client for an explicit base URL (scheme, host and port, no trailing path).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .user_agent(version::user_agent())
            .build()
            .map_err(FetchError::Client)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn samples_url(&self) -> String {
        format!("{}/{}", self.base_url, SAMPLES_PATH)
    }

    #[instrument(skip(self), fields(repo = "zerto", operation = "get_samples"))]
    pub async fn get_samples(&self, window: &SampleWindow) -> Result<Vec<RawSample>, FetchError> {
        let url = self.samples_url();
        let resp = self
            .client
            .get(&url)
            .query(&window.query())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let samples: Vec<RawSample> = resp
            .json()
            .await
            .map_err(|source| FetchError::Decode { url, source })?;
        debug!(samples_count = samples.len(), "Samples fetched");
        Ok(samples)
    }
}
