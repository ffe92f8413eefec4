use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::series::SeriesError;

/// Sampling interval requested from the quote feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1min")]
    OneMinute,
    #[default]
    #[serde(rename = "5min")]
    FiveMinutes,
    #[serde(rename = "15min")]
    FifteenMinutes,
    #[serde(rename = "30min")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1day")]
    OneDay,
}

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::FourHours,
        Timeframe::OneDay,
    ];

    /// Interval string understood by the quote API.
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1min",
            Timeframe::FiveMinutes => "5min",
            Timeframe::FifteenMinutes => "15min",
            Timeframe::ThirtyMinutes => "30min",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1day",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Timeframe::OneMinute => Duration::minutes(1),
            Timeframe::FiveMinutes => Duration::minutes(5),
            Timeframe::FifteenMinutes => Duration::minutes(15),
            Timeframe::ThirtyMinutes => Duration::minutes(30),
            Timeframe::OneHour => Duration::hours(1),
            Timeframe::FourHours => Duration::hours(4),
            Timeframe::OneDay => Duration::days(1),
        }
    }

    pub fn is_intraday(self) -> bool {
        !matches!(self, Timeframe::OneDay)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|timeframe| timeframe.as_str() == value)
            .ok_or_else(|| format!("unknown timeframe {value:?}"))
    }
}

/// One normalized sample of the quote feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: String,
    pub label: String,
    pub price: f64,
}

/// Chronologically ascending, never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    points: Vec<PricePoint>,
}

impl Series {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        if points.is_empty() {
            return Err(SeriesError::EmptySeries);
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_price(&self) -> f64 {
        self.points[0].price
    }

    pub fn last_price(&self) -> f64 {
        self.points[self.points.len() - 1].price
    }

    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|point| point.price)
    }

    /// Lowest and highest price in the series.
    pub fn bounds(&self) -> (f64, f64) {
        self.prices()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), price| {
                (lo.min(price), hi.max(price))
            })
    }

    /// Percentage move from the first to the last sample.
    pub fn percent_change(&self) -> f64 {
        let first = self.first_price();
        if first == 0.0 {
            return 0.0;
        }
        (self.last_price() - first) / first * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(price: f64) -> PricePoint {
        PricePoint {
            timestamp: "2024-05-01 10:00:00".to_string(),
            label: "10:00".to_string(),
            price,
        }
    }

    #[test]
    fn timeframe_round_trips_through_api_string() {
        for timeframe in Timeframe::ALL {
            assert_eq!(timeframe.as_str().parse::<Timeframe>(), Ok(timeframe));
        }
        assert!("2min".parse::<Timeframe>().is_err());
    }

    #[test]
    fn timeframe_serializes_as_api_string() {
        let json = serde_json::to_string(&Timeframe::OneHour).expect("serialize");
        assert_eq!(json, "\"1h\"");
        let parsed: Timeframe = serde_json::from_str("\"1day\"").expect("deserialize");
        assert_eq!(parsed, Timeframe::OneDay);
    }

    #[test]
    fn series_rejects_empty_points() {
        assert_eq!(Series::new(Vec::new()), Err(SeriesError::EmptySeries));
    }

    #[test]
    fn series_reports_bounds_and_change() {
        let series = Series::new(vec![point(100.0), point(90.0), point(110.0)]).expect("series");
        assert_eq!(series.bounds(), (90.0, 110.0));
        assert!((series.percent_change() - 10.0).abs() < 1e-9);
        assert_eq!(series.last_price(), 110.0);
    }
}
