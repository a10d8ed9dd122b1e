//! Ratio ("simple") probability model: `c.mid / (c.mid + p.mid)` at strike K.

use super::ProbabilityModel;
use crate::models::Surface;

/// `P(S_T > K) ≈ c.mid / (c.mid + p.mid)`, the simplest risk-neutral proxy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatioModel {
    /// Optional filter: reject if either leg's spread exceeds this.
    pub max_spread: Option<f64>,
}

impl ProbabilityModel for RatioModel {
    fn name(&self) -> &'static str {
        "ratio"
    }

    fn prob_above(&self, surface: &Surface, strike: f64) -> Option<f64> {
        let call = surface.get_call(strike)?;
        let put = surface.get_put(strike)?;
        if call.mid <= 0.0 || put.mid <= 0.0 {
            return None;
        }
        if let Some(max_spread) = self.max_spread {
            if call.spread > max_spread || put.spread > max_spread {
                return None;
            }
        }
        Some((call.mid / (call.mid + put.mid)).clamp(0.0, 1.0))
    }
}
