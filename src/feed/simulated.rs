use std::collections::HashMap;
use std::future::{self, Future};
use std::sync::Mutex;

use chrono::{NaiveDateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::constants::FEED_OUTPUT_SIZE;
use crate::series::RawQuote;

use super::{FetchError, FetchRequest, QuoteFeed};

const STEP_VOLATILITY: f64 = 0.002;

struct WalkState {
    rng: StdRng,
    last_prices: HashMap<String, f64>,
}

/// Offline feed producing a geometric random walk per instrument.
///
/// Successive fetches continue the walk from the previous last price, so
/// alert crossings occur naturally in demo runs.
pub struct RandomWalkFeed {
    state: Mutex<WalkState>,
    output_size: usize,
    clock: fn() -> NaiveDateTime,
}

impl RandomWalkFeed {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: Mutex::new(WalkState {
                rng,
                last_prices: HashMap::new(),
            }),
            output_size: FEED_OUTPUT_SIZE,
            clock: || Utc::now().naive_utc(),
        }
    }

    pub fn with_output_size(mut self, output_size: usize) -> Self {
        self.output_size = output_size;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    fn generate(&self, request: &FetchRequest) -> Result<Vec<RawQuote>, FetchError> {
        if self.output_size == 0 {
            return Err(FetchError::EmptyResult);
        }

        let mut guard = self
            .state
            .lock()
            .map_err(|_| FetchError::Network("simulated feed state poisoned".to_string()))?;
        let WalkState { rng, last_prices } = &mut *guard;

        let mut price = match last_prices.get(&request.instrument) {
            Some(price) => *price,
            None => rng.gen_range(80.0..150.0),
        };
        let step = request.timeframe.duration();
        let newest = (self.clock)();
        let format = if request.timeframe.is_intraday() {
            "%Y-%m-%d %H:%M:%S"
        } else {
            "%Y-%m-%d"
        };

        let mut chronological = Vec::with_capacity(self.output_size);
        for offset in (0..self.output_size).rev() {
            let shock: f64 = rng.sample(StandardNormal);
            price = (price * (1.0 + shock * STEP_VOLATILITY)).max(0.01);
            let stamp = newest - step * offset as i32;
            chronological.push(RawQuote {
                datetime: stamp.format(format).to_string(),
                close: format!("{price:.5}"),
            });
        }
        last_prices.insert(request.instrument.clone(), price);

        chronological.reverse();
        Ok(chronological)
    }
}

impl Default for RandomWalkFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteFeed for RandomWalkFeed {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<Vec<RawQuote>, FetchError>> + Send {
        future::ready(self.generate(request))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::Timeframe;
    use crate::series::normalize;
    use crate::session::SessionToken;

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    fn request(timeframe: Timeframe) -> FetchRequest {
        FetchRequest {
            token: SessionToken::new("SIM", timeframe, 1),
            instrument: "SIM".to_string(),
            timeframe,
            timezone: "UTC".to_string(),
            api_key: String::new(),
        }
    }

    #[tokio::test]
    async fn produces_descending_quotes_at_timeframe_spacing() {
        let feed = RandomWalkFeed::with_seed(7)
            .with_output_size(4)
            .with_clock(fixed_clock);
        let quotes = feed
            .fetch(&request(Timeframe::FifteenMinutes))
            .await
            .expect("quotes");

        let stamps: Vec<_> = quotes.iter().map(|q| q.datetime.as_str()).collect();
        assert_eq!(
            stamps,
            vec![
                "2024-05-01 12:00:00",
                "2024-05-01 11:45:00",
                "2024-05-01 11:30:00",
                "2024-05-01 11:15:00"
            ]
        );
        let series = normalize(&quotes).expect("series");
        assert!(series.prices().all(|price| price > 0.0));
    }

    #[tokio::test]
    async fn continues_walk_between_fetches() {
        let feed = RandomWalkFeed::with_seed(7)
            .with_output_size(3)
            .with_clock(fixed_clock);
        let first = feed.fetch(&request(Timeframe::OneDay)).await.expect("first");
        let second = feed.fetch(&request(Timeframe::OneDay)).await.expect("second");

        assert_eq!(first[0].datetime, "2024-05-01");
        let last: f64 = first[0].close.parse().expect("price");
        let next: f64 = second[2].close.parse().expect("price");
        assert!((next / last - 1.0).abs() < 0.05);
    }

    #[tokio::test]
    async fn zero_output_size_is_an_empty_result() {
        let feed = RandomWalkFeed::with_seed(1).with_output_size(0);
        assert_eq!(
            feed.fetch(&request(Timeframe::OneMinute)).await,
            Err(FetchError::EmptyResult)
        );
    }
}
