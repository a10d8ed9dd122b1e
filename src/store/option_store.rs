//! Single-writer in-memory store of per-contract option state.

use crate::identifier::parse_occ_symbol;
use crate::models::{OptionState, QuoteEvent};
use crate::util::Symbol;
use std::collections::HashMap;

/// Holds the latest merged quote state for every contract seen so far.
///
/// Only the ingestion task is expected to call [`OptionStore::apply_quote`];
/// under that single-writer discipline no interior locking is needed.
#[derive(Debug, Default)]
pub struct OptionStore {
    states: HashMap<String, OptionState>,
}

impl OptionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// Merge a quote event into the store.
    ///
    /// Returns `None` (and leaves the store unchanged) if the identifier
    /// does not parse as a recognized OCC symbol, or if `bid`/`ask` are
    /// negative or crossed (`bid > ask`). On acceptance, returns the
    /// resulting [`OptionState`].
    pub fn apply_quote(&mut self, quote: QuoteEvent) -> Option<OptionState> {
        if quote.bid < 0.0 || quote.ask < 0.0 || quote.bid > quote.ask {
            return None;
        }
        let parsed = parse_occ_symbol(&quote.id)?;
        let state = OptionState::from_quote(&quote, &parsed);
        self.states.insert(state.id.clone(), state.clone());
        Some(state)
    }

    /// Look up a contract by its OCC identifier.
    pub fn get(&self, id: &str) -> Option<&OptionState> {
        self.states.get(id)
    }

    /// All known contract states, in arbitrary order.
    pub fn get_all(&self) -> Vec<&OptionState> {
        self.states.values().collect()
    }

    /// All contract states for a given underlying ticker.
    pub fn get_by_ticker(&self, ticker: &str) -> Vec<&OptionState> {
        self.states
            .values()
            .filter(|s| s.ticker.as_str() == ticker)
            .collect()
    }

    /// Contract states for a given ticker at an exact strike.
    pub fn get_by_strike(&self, ticker: &str, strike: f64) -> Vec<&OptionState> {
        self.states
            .values()
            .filter(|s| s.ticker.as_str() == ticker && (s.strike - strike).abs() < 1e-9)
            .collect()
    }

    /// Distinct strikes known for a ticker, ascending.
    pub fn get_strikes(&self, ticker: &str) -> Vec<f64> {
        let mut strikes: Vec<f64> = self
            .get_by_ticker(ticker)
            .iter()
            .map(|s| s.strike)
            .collect();
        strikes.sort_by(|a, b| a.partial_cmp(b).unwrap());
        strikes.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
        strikes
    }

    /// Number of contracts currently tracked.
    pub fn count(&self) -> usize {
        self.states.len()
    }

    /// Drop all tracked state.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub(crate) fn tickers(&self) -> Vec<Symbol> {
        let mut seen: Vec<Symbol> = Vec::new();
        for state in self.states.values() {
            if !seen.iter().any(|t| t == &state.ticker) {
                seen.push(state.ticker.clone());
            }
        }
        seen
    }
}
