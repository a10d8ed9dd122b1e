//! Prediction-market (Polymarket Gamma API) value types.

use crate::util::Symbol;

/// One market within an [`EventMetadata`], corresponding to a single strike.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketMetadata {
    /// Strike price parsed from the market question.
    pub strike: f64,
    /// The two CLOB token ids, `[yes, no]`.
    pub clob_token_ids: [String; 2],
    /// `yes` outcome price, index 0 of `outcomePrices`.
    pub yes_price: Option<f64>,
    /// `no` outcome price, index 1 of `outcomePrices`.
    pub no_price: Option<f64>,
    /// Minimum order price tick size, one of `"0.1"`, `"0.01"`, `"0.001"`, `"0.0001"`.
    pub tick_size: Option<String>,
    /// Whether the market uses negative-risk settlement.
    pub neg_risk: Option<bool>,
}

/// A "finish week of ... above ..." weekly event, grouped by underlying ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMetadata {
    /// Underlying ticker.
    pub ticker: Symbol,
    /// Event end date (ISO `YYYY-MM-DD`).
    pub end_date: String,
    /// Strike-level markets within this event.
    pub markets: Vec<MarketMetadata>,
}

/// Direction of a prediction-market probability lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Probability the underlying finishes above the strike.
    Above,
    /// Probability the underlying finishes below the strike.
    Below,
}
