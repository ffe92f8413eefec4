use std::time::Duration;

use serde::Deserialize;

use crate::constants::{FEED_OUTPUT_SIZE, TWELVE_DATA_BASE_URL};
use crate::series::RawQuote;

use super::{FetchError, FetchRequest, QuoteFeed};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    values: Vec<RawQuote>,
}

/// `time_series` endpoint of the Twelve Data REST API.
#[derive(Debug, Clone)]
pub struct TwelveDataFeed {
    http: reqwest::Client,
    base_url: String,
    output_size: usize,
}

impl TwelveDataFeed {
    pub fn new() -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("quote-overlay/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| FetchError::Network(err.to_string()))?;
        Ok(Self {
            http,
            base_url: TWELVE_DATA_BASE_URL.to_string(),
            output_size: FEED_OUTPUT_SIZE,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_output_size(mut self, output_size: usize) -> Self {
        self.output_size = output_size.max(1);
        self
    }
}

impl QuoteFeed for TwelveDataFeed {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawQuote>, FetchError> {
        let url = format!("{}/time_series", self.base_url.trim_end_matches('/'));
        let output_size = self.output_size.to_string();
        let response = self
            .http
            .get(url)
            .query(&[
                ("symbol", request.instrument.as_str()),
                ("interval", request.timeframe.as_str()),
                ("timezone", request.timezone.as_str()),
                ("outputsize", output_size.as_str()),
                ("apikey", request.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::Network(err.to_string()))?;
        parse_time_series(&body).map_err(|err| match err {
            FetchError::Api(message) if !status.is_success() => {
                FetchError::Api(format!("http {status}: {message}"))
            }
            other => other,
        })
    }
}

fn parse_time_series(body: &str) -> Result<Vec<RawQuote>, FetchError> {
    let parsed: TimeSeriesResponse = serde_json::from_str(body)
        .map_err(|err| FetchError::Api(format!("malformed response: {err}")))?;

    if parsed.status.as_deref() == Some("error") {
        return Err(FetchError::Api(
            parsed
                .message
                .unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    if parsed.values.is_empty() {
        return Err(FetchError::EmptyResult);
    }
    Ok(parsed.values)
}
