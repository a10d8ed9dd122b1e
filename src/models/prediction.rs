//! Per-query prediction and diagnostic value types.

use std::collections::HashMap;

/// The result of a put–call parity forward estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardEstimate {
    /// Weighted-mean forward price.
    pub forward: f64,
    /// Number of candidates used in the final (possibly trimmed) average.
    pub n_used: usize,
    /// Median of all candidates before trimming.
    pub median: f64,
    /// Minimum candidate used.
    pub min: f64,
    /// Maximum candidate used.
    pub max: f64,
}

/// The result of an implied-volatility bisection inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IvResult {
    /// Implied volatility.
    pub sigma: f64,
    /// Number of bisection iterations performed.
    pub iterations: u32,
    /// Model price at `sigma`, for residual inspection.
    pub price_fit: f64,
}

/// One model's prediction at a queried strike.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPrediction {
    /// Model name (`"ratio"`, `"slope"`, `"svi"`, `"spline"`).
    pub model_name: String,
    /// Probability the underlying finishes above the queried strike, if available.
    pub prob_above: Option<f64>,
    /// Forward estimate used by the model, if applicable.
    pub forward: Option<f64>,
    /// Free-form diagnostic fields (e.g. `"slope"`, `"sigma"`).
    pub extra: HashMap<String, f64>,
}

impl ModelPrediction {
    /// Build an "insufficient data" prediction carrying no probability.
    pub fn absent(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            prob_above: None,
            forward: None,
            extra: HashMap::new(),
        }
    }
}

/// A strike-level probability estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrikeProbability {
    /// Strike price.
    pub strike: f64,
    /// `P(S_T > strike)`.
    pub prob_above: f64,
}

impl StrikeProbability {
    /// `1 - prob_above`.
    pub fn prob_below(&self) -> f64 {
        1.0 - self.prob_above
    }
}

/// Confidence sub-scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfidenceDiagnostics {
    /// Agreement between the ratio and slope models.
    pub agreement: f64,
    /// Liquidity sub-score at the queried strike.
    pub liquidity: f64,
    /// Monotonicity of call mids near the queried strike.
    pub monotonicity: f64,
    /// Strike spacing sub-score near the queried strike.
    pub spacing: f64,
}

/// All model predictions, the confidence score, and the prediction-market
/// comparison for one expiry at one queried strike.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpiryPredictions {
    /// Expiry date (YYYY-MM-DD).
    pub expiry: chrono::NaiveDate,
    /// Queried strike.
    pub strike: f64,
    /// One [`ModelPrediction`] per model, in `ratio, slope, svi, spline` order.
    pub predictions: Vec<ModelPrediction>,
    /// Combined confidence score, if both ratio and slope ran.
    pub confidence: Option<f64>,
    /// Confidence sub-score breakdown.
    pub confidence_diagnostics: Option<ConfidenceDiagnostics>,
    /// Prediction-market probability for the same strike/expiry, if known.
    pub polymarket_prob: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strike_probability_complement() {
        let sp = StrikeProbability {
            strike: 100.0,
            prob_above: 0.75,
        };
        assert_eq!(sp.prob_below(), 0.25);
    }

    #[test]
    fn test_model_prediction_absent() {
        let pred = ModelPrediction::absent("svi");
        assert_eq!(pred.model_name, "svi");
        assert!(pred.prob_above.is_none());
    }
}
