//! Quote feed collaborators.
//!
//! A feed turns a [`FetchRequest`] into raw samples, newest first. Normalizing
//! them into a chart series is the series buffer's job, not the feed's.

mod simulated;
mod twelve_data;

use std::future::Future;

use thiserror::Error;

use crate::model::Timeframe;
use crate::series::RawQuote;
use crate::session::SessionToken;

pub use simulated::RandomWalkFeed;
pub use twelve_data::TwelveDataFeed;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("quote api error: {0}")]
    Api(String),
    #[error("quote api returned no data")]
    EmptyResult,
    #[error("network error: {0}")]
    Network(String),
}

/// Everything a feed needs for one fetch, tagged with the session that asked.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub token: SessionToken,
    pub instrument: String,
    pub timeframe: Timeframe,
    pub timezone: String,
    pub api_key: String,
}

pub trait QuoteFeed {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<Vec<RawQuote>, FetchError>> + Send;
}
