//! Read-only prediction-market cache, refreshed out-of-band by [`super::fetch_events`].

use crate::models::{Direction, EventMetadata, MarketMetadata};
use crate::util::Symbol;
use std::collections::HashMap;

/// Holds the most recently fetched Polymarket events, grouped by ticker.
///
/// The cache is replaced wholesale on each refresh; readers never see a
/// partially updated set of events.
#[derive(Debug, Default)]
pub struct EventStore {
    by_ticker: HashMap<Symbol, Vec<EventMetadata>>,
}

impl EventStore {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            by_ticker: HashMap::new(),
        }
    }

    /// Replace the cache contents with a freshly fetched event list.
    pub fn replace(&mut self, events: Vec<EventMetadata>) {
        let mut by_ticker: HashMap<Symbol, Vec<EventMetadata>> = HashMap::new();
        for event in events {
            by_ticker.entry(event.ticker.clone()).or_default().push(event);
        }
        self.by_ticker = by_ticker;
    }

    /// Events cached for a given ticker.
    pub fn events_for_ticker(&self, ticker: &str) -> &[EventMetadata] {
        self.by_ticker
            .get(ticker)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of cached events across all tickers.
    pub fn len(&self) -> usize {
        self.by_ticker.values().map(|v| v.len()).sum()
    }

    /// Whether the cache currently holds no events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the prediction-market probability for `ticker` finishing on
    /// the given `direction` relative to `strike`, on the event ending at
    /// `end_date` (`YYYY-MM-DD`).
    ///
    /// Requires an exact strike match within the matching event; there is no
    /// nearest-strike fallback. When `direction` is `None`, the market's
    /// `no_price` is returned to match the convention used when the caller
    /// has no directional preference.
    pub fn get_polymarket_prob(
        &self,
        ticker: &str,
        strike: f64,
        end_date: &str,
        direction: Option<Direction>,
    ) -> Option<f64> {
        let event = self
            .events_for_ticker(ticker)
            .iter()
            .find(|e| e.end_date.split('T').next() == Some(end_date))?;

        let market = exact_market(&event.markets, strike)?;
        match direction {
            Some(Direction::Above) => market.yes_price,
            Some(Direction::Below) => market.no_price,
            None => market.no_price,
        }
    }
}

fn exact_market(markets: &[MarketMetadata], strike: f64) -> Option<&MarketMetadata> {
    markets.iter().find(|m| (m.strike - strike).abs() < 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::symbol;

    fn sample_event() -> EventMetadata {
        EventMetadata {
            ticker: symbol("NVDA"),
            end_date: "2026-01-17".to_string(),
            markets: vec![
                MarketMetadata {
                    strike: 140.0,
                    clob_token_ids: ["yes-tok".to_string(), "no-tok".to_string()],
                    yes_price: Some(0.6),
                    no_price: Some(0.4),
                    tick_size: Some("0.01".to_string()),
                    neg_risk: Some(false),
                },
                MarketMetadata {
                    strike: 150.0,
                    clob_token_ids: ["yes-tok-2".to_string(), "no-tok-2".to_string()],
                    yes_price: Some(0.3),
                    no_price: Some(0.7),
                    tick_size: Some("0.01".to_string()),
                    neg_risk: Some(false),
                },
            ],
        }
    }

    #[test]
    fn test_get_polymarket_prob_above() {
        let mut store = EventStore::new();
        store.replace(vec![sample_event()]);
        let prob = store
            .get_polymarket_prob("NVDA", 140.0, "2026-01-17", Some(Direction::Above))
            .unwrap();
        assert_eq!(prob, 0.6);
    }

    #[test]
    fn test_get_polymarket_prob_none_direction_uses_no_price() {
        let mut store = EventStore::new();
        store.replace(vec![sample_event()]);
        let prob = store
            .get_polymarket_prob("NVDA", 140.0, "2026-01-17", None)
            .unwrap();
        assert_eq!(prob, 0.4);
    }

    #[test]
    fn test_get_polymarket_prob_no_exact_strike_returns_none() {
        let mut store = EventStore::new();
        store.replace(vec![sample_event()]);
        assert!(store
            .get_polymarket_prob("NVDA", 144.0, "2026-01-17", Some(Direction::Above))
            .is_none());
    }

    #[test]
    fn test_get_polymarket_prob_missing_event() {
        let store = EventStore::new();
        assert!(store
            .get_polymarket_prob("NVDA", 140.0, "2026-01-17", Some(Direction::Above))
            .is_none());
    }

    #[test]
    fn test_replace_groups_by_ticker() {
        let mut store = EventStore::new();
        store.replace(vec![sample_event()]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.events_for_ticker("NVDA").len(), 1);
        assert!(store.events_for_ticker("MSFT").is_empty());
    }
}
