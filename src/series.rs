use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{PricePoint, Series};

/// Sample as delivered by the quote feed, newest first, prices as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub datetime: String,
    pub close: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("quote feed returned no samples")]
    EmptySeries,
    #[error("invalid price {value:?} at {datetime}")]
    InvalidPrice { datetime: String, value: String },
}

/// Most recent successfully ingested series, kept as fallback for failed fetches.
#[derive(Debug, Default)]
pub struct SeriesBuffer {
    cached: Option<Series>,
}

impl SeriesBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a descending raw feed into a chronological series and cache it.
    pub fn ingest(&mut self, raw: &[RawQuote]) -> Result<Series, SeriesError> {
        let series = normalize(raw)?;
        self.cached = Some(series.clone());
        Ok(series)
    }

    /// A fresh series replaces the cache; `None` falls back to the cached one.
    pub fn latest_or_fallback(&mut self, fresh: Option<Series>) -> Option<&Series> {
        if let Some(series) = fresh {
            self.cached = Some(series);
        }
        self.cached.as_ref()
    }

    pub fn latest(&self) -> Option<&Series> {
        self.cached.as_ref()
    }
}

pub fn normalize(raw: &[RawQuote]) -> Result<Series, SeriesError> {
    if raw.is_empty() {
        return Err(SeriesError::EmptySeries);
    }

    let points = raw
        .iter()
        .rev()
        .map(|quote| {
            let price = quote
                .close
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|price| price.is_finite())
                .ok_or_else(|| SeriesError::InvalidPrice {
                    datetime: quote.datetime.clone(),
                    value: quote.close.clone(),
                })?;
            Ok(PricePoint {
                timestamp: quote.datetime.clone(),
                label: axis_label(&quote.datetime),
                price,
            })
        })
        .collect::<Result<Vec<_>, SeriesError>>()?;

    Series::new(points)
}

/// Time-of-day for intraday stamps, month and day for daily ones.
pub fn axis_label(datetime: &str) -> String {
    if let Ok(parsed) = NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S") {
        return parsed.format("%H:%M").to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(datetime, "%Y-%m-%d") {
        return parsed.format("%b %d").to_string();
    }
    datetime.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(datetime: &str, close: &str) -> RawQuote {
        RawQuote {
            datetime: datetime.to_string(),
            close: close.to_string(),
        }
    }

    fn descending_feed() -> Vec<RawQuote> {
        vec![
            raw("2024-05-01 10:10:00", "1.0731"),
            raw("2024-05-01 10:05:00", "1.0725"),
            raw("2024-05-01 10:00:00", "1.0720"),
        ]
    }

    #[test]
    fn ingest_reverses_into_chronological_order() {
        let mut buffer = SeriesBuffer::new();
        let feed = descending_feed();
        let series = buffer.ingest(&feed).expect("series");

        assert_eq!(series.len(), feed.len());
        let stamps: Vec<_> = series.points().iter().map(|p| p.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            vec![
                "2024-05-01 10:00:00",
                "2024-05-01 10:05:00",
                "2024-05-01 10:10:00"
            ]
        );
        assert_eq!(series.points()[0].label, "10:00");
        assert_eq!(series.last_price(), 1.0731);
    }

    #[test]
    fn ingest_rejects_empty_feed() {
        let mut buffer = SeriesBuffer::new();
        assert_eq!(buffer.ingest(&[]), Err(SeriesError::EmptySeries));
        assert!(buffer.latest().is_none());
    }

    #[test]
    fn ingest_rejects_non_numeric_price() {
        let mut buffer = SeriesBuffer::new();
        let err = buffer
            .ingest(&[raw("2024-05-01 10:00:00", "n/a")])
            .expect_err("invalid price");
        assert!(matches!(err, SeriesError::InvalidPrice { .. }));
    }

    #[test]
    fn fallback_returns_last_successful_series() {
        let mut buffer = SeriesBuffer::new();
        assert!(buffer.latest_or_fallback(None).is_none());

        let series = buffer.ingest(&descending_feed()).expect("series");
        let fallback = buffer.latest_or_fallback(None).expect("fallback");
        assert_eq!(fallback, &series);
    }

    #[test]
    fn daily_stamps_use_date_labels() {
        assert_eq!(axis_label("2024-05-01"), "May 01");
        assert_eq!(axis_label("garbage"), "garbage");
    }
}
