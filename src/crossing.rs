use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    CrossedUp,
    CrossedDown,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::CrossedUp => f.write_str("crossed above"),
            Direction::CrossedDown => f.write_str("crossed below"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Crossing {
    pub direction: Direction,
    pub level: f64,
}

/// Edge-triggered detector comparing consecutive observed prices against alert levels.
#[derive(Debug, Default)]
pub struct CrossingDetector {
    last_observed: Option<f64>,
}

impl CrossingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_observed(&self) -> Option<f64> {
        self.last_observed
    }

    /// Record `price` and report every level it crossed since the previous observation.
    /// The first observation only primes the detector.
    pub fn observe(&mut self, price: f64, levels: &[f64]) -> Vec<Crossing> {
        let Some(last) = self.last_observed.replace(price) else {
            return Vec::new();
        };

        levels
            .iter()
            .filter_map(|&level| {
                if last < level && level <= price {
                    Some(Crossing {
                        direction: Direction::CrossedUp,
                        level,
                    })
                } else if last > level && level >= price {
                    Some(Crossing {
                        direction: Direction::CrossedDown,
                        level,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}
