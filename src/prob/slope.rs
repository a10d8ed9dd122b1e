//! Slope probability model: finite difference on call mids around the nearest strike.

use super::ProbabilityModel;
use crate::models::Surface;

/// Estimates `P(S_T > K)` from the local slope of call mids, `-slope / D`.
#[derive(Debug, Clone, Copy)]
pub struct SlopeModel {
    /// Number of strikes on either side of the nearest strike to use.
    pub window: usize,
    /// Discount factor.
    pub discount: f64,
    /// Optional filter: reject if any call in the window exceeds this spread.
    pub max_spread: Option<f64>,
}

impl Default for SlopeModel {
    fn default() -> Self {
        Self {
            window: 1,
            discount: 1.0,
            max_spread: None,
        }
    }
}

impl ProbabilityModel for SlopeModel {
    fn name(&self) -> &'static str {
        "slope"
    }

    fn prob_above(&self, surface: &Surface, strike: f64) -> Option<f64> {
        let calls = &surface.calls;
        if calls.is_empty() {
            return None;
        }

        let i = calls
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (a.strike - strike)
                    .abs()
                    .partial_cmp(&(b.strike - strike).abs())
                    .unwrap()
            })
            .map(|(idx, _)| idx)?;

        let lo = i.checked_sub(self.window)?;
        let hi = i + self.window;
        if hi >= calls.len() {
            return None;
        }

        if let Some(max_spread) = self.max_spread {
            if calls[lo..=hi].iter().any(|p| p.spread > max_spread) {
                return None;
            }
        }

        let denom = calls[hi].strike - calls[lo].strike;
        if denom == 0.0 {
            return None;
        }
        let slope = (calls[hi].mid - calls[lo].mid) / denom;
        Some((-slope / self.discount).clamp(0.0, 1.0))
    }
}
