//! Option quote and surface value types.

use crate::identifier::{parse_occ_symbol, Side};
use crate::util::{Symbol, UnixMs};
use chrono::{DateTime, Utc};

/// A raw quote event as produced by the upstream quote transport.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteEvent {
    /// OCC contract identifier.
    pub id: String,
    /// Bid price.
    pub bid: f64,
    /// Ask price.
    pub ask: f64,
    /// Event timestamp.
    pub ts: UnixMs,
}

/// The latest merged state for one contract, owned exclusively by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionState {
    /// OCC contract identifier.
    pub id: String,
    /// Underlying ticker.
    pub ticker: Symbol,
    /// Strike price.
    pub strike: f64,
    /// Expiry instant (21:00:00 UTC on the encoded date).
    pub expiry: DateTime<Utc>,
    /// Call or put.
    pub side: Side,
    /// Bid price.
    pub bid: f64,
    /// Ask price.
    pub ask: f64,
    /// `(bid + ask) / 2`.
    pub mid: f64,
    /// `ask - bid`.
    pub spread: f64,
    /// When this state was last updated.
    pub last_updated: DateTime<Utc>,
}

impl OptionState {
    /// Build a new state from a validated quote and its parsed identifier.
    ///
    /// Caller must have already rejected `bid < 0`, `ask < 0`, `bid > ask`.
    pub(crate) fn from_quote(quote: &QuoteEvent, parsed: &crate::identifier::ParsedIdentifier) -> Self {
        let mid = (quote.bid + quote.ask) / 2.0;
        let spread = quote.ask - quote.bid;
        Self {
            id: quote.id.clone(),
            ticker: parsed.ticker.clone(),
            strike: parsed.strike,
            expiry: parsed.expiry,
            side: parsed.side,
            bid: quote.bid,
            ask: quote.ask,
            mid,
            spread,
            last_updated: quote.ts.as_datetime_or_epoch(),
        }
    }
}

/// One strike/side point within a [`Surface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionPoint {
    /// Strike price.
    pub strike: f64,
    /// Call or put.
    pub side: Side,
    /// Bid price.
    pub bid: f64,
    /// Ask price.
    pub ask: f64,
    /// `(bid + ask) / 2`.
    pub mid: f64,
    /// `ask - bid`.
    pub spread: f64,
}

impl From<&OptionState> for OptionPoint {
    fn from(state: &OptionState) -> Self {
        Self {
            strike: state.strike,
            side: state.side,
            bid: state.bid,
            ask: state.ask,
            mid: state.mid,
            spread: state.spread,
        }
    }
}

/// An immutable per-symbol/per-expiry option chain snapshot.
///
/// `calls` and `puts` are each sorted ascending by strike, with no duplicate
/// strikes within a side.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Underlying ticker.
    pub ticker: Symbol,
    /// Expiry instant.
    pub expiry: DateTime<Utc>,
    /// Call points, sorted ascending by strike.
    pub calls: Vec<OptionPoint>,
    /// Put points, sorted ascending by strike.
    pub puts: Vec<OptionPoint>,
}

impl Surface {
    /// Distinct call strikes, ascending.
    pub fn call_strikes(&self) -> Vec<f64> {
        self.calls.iter().map(|p| p.strike).collect()
    }

    /// Distinct put strikes, ascending.
    pub fn put_strikes(&self) -> Vec<f64> {
        self.puts.iter().map(|p| p.strike).collect()
    }

    /// Find the call at an exact strike, if present.
    pub fn get_call(&self, strike: f64) -> Option<&OptionPoint> {
        self.calls
            .iter()
            .find(|p| (p.strike - strike).abs() < 1e-9)
    }

    /// Find the put at an exact strike, if present.
    pub fn get_put(&self, strike: f64) -> Option<&OptionPoint> {
        self.puts.iter().find(|p| (p.strike - strike).abs() < 1e-9)
    }
}
