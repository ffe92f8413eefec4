use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Alert price levels keyed by instrument, persisted as the settings `alerts` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertStore {
    levels: BTreeMap<String, Vec<f64>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels_for(&self, instrument: &str) -> &[f64] {
        self.levels
            .get(instrument)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Append a level. Duplicates are kept.
    pub fn add(&mut self, instrument: &str, price: f64) {
        self.levels
            .entry(instrument.to_string())
            .or_default()
            .push(price);
    }

    /// Remove by position; out-of-range indices are ignored.
    pub fn remove(&mut self, instrument: &str, index: usize) -> Option<f64> {
        let levels = self.levels.get_mut(instrument)?;
        if index >= levels.len() {
            return None;
        }
        Some(levels.remove(index))
    }

    /// Overwrite a level in place; out-of-range indices are ignored.
    pub fn reposition(&mut self, instrument: &str, index: usize, price: f64) -> bool {
        match self
            .levels
            .get_mut(instrument)
            .and_then(|levels| levels.get_mut(index))
        {
            Some(level) => {
                *level = price;
                true
            }
            None => false,
        }
    }

    /// Drop levels outside `[min - pad, max + pad]` with `pad = (max - min) * padding_fraction`.
    /// Returns whether anything was removed.
    pub fn prune_outside_range(
        &mut self,
        instrument: &str,
        min_price: f64,
        max_price: f64,
        padding_fraction: f64,
    ) -> bool {
        let Some(levels) = self.levels.get_mut(instrument) else {
            return false;
        };
        let pad = (max_price - min_price) * padding_fraction;
        let (low, high) = (min_price - pad, max_price + pad);
        let before = levels.len();
        levels.retain(|level| (low..=high).contains(level));
        levels.len() != before
    }

    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }
}
