//! Risk-neutral probability models sharing one `prob_above(K)` contract.

pub mod ratio;
pub mod slope;
pub mod spline;
pub mod svi;

use crate::config::{ForwardConfig, ImpliedVolConfig};
use crate::identifier::Side;
use crate::models::ModelPrediction;
use crate::models::Surface;
use crate::pricing::{estimate_forward, invert_implied_vol};

/// One out-of-the-money implied-variance observation extracted from a surface.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OomPoint {
    pub k: f64,
    pub w: f64,
    pub weight: f64,
}

/// Shared data-extraction pipeline for the SVI and spline smile fits.
///
/// Estimates the forward, picks the out-of-the-money leg at each common
/// strike, inverts implied volatility, and converts to total-variance
/// points `(k, w, weight)` sorted ascending by `k`. Returns `None` if the
/// forward estimator fails or fewer than 8 points survive.
pub(crate) fn extract_oom_points(
    surface: &Surface,
    years: f64,
    min_mid: f64,
    max_spread: Option<f64>,
    forward_config: &ForwardConfig,
    iv_config: &ImpliedVolConfig,
) -> Option<(f64, Vec<OomPoint>)> {
    let forward_estimate = estimate_forward(surface, forward_config)?;
    let forward = forward_estimate.forward;

    let mut points = Vec::new();
    for call in &surface.calls {
        let Some(put) = surface.get_put(call.strike) else {
            continue;
        };
        if let Some(max_spread) = max_spread {
            if call.spread > max_spread || put.spread > max_spread {
                continue;
            }
        }
        let (side, quote) = if call.strike < forward { (Side::Put, put) } else { (Side::Call, call) };
        if quote.mid <= min_mid || quote.spread < 0.0 {
            continue;
        }
        let Some(iv) = invert_implied_vol(side, quote.mid, forward, call.strike, years, forward_config.discount, iv_config) else {
            continue;
        };
        let k = (call.strike / forward).ln();
        let w = iv.sigma * iv.sigma * years;
        let weight = 1.0 / quote.spread.max(1e-6);
        points.push(OomPoint { k, w, weight });
    }

    if points.len() < 8 {
        return None;
    }

    points.sort_by(|a, b| a.k.partial_cmp(&b.k).unwrap());

    let mean_weight = points.iter().map(|p| p.weight).sum::<f64>() / points.len() as f64;
    if mean_weight > 0.0 {
        for p in &mut points {
            p.weight /= mean_weight;
        }
    }

    Some((forward, points))
}

/// Common contract for the four probability estimators.
///
/// `prob_above` returns the estimator's value-level result (`None` when
/// inputs are insufficient); [`ProbabilityModel::predict`] wraps that into a
/// [`ModelPrediction`] for uniform handling by the driver.
pub trait ProbabilityModel {
    /// Model name (`"ratio"`, `"slope"`, `"svi"`, `"spline"`).
    fn name(&self) -> &'static str;

    /// Estimate `P(S_T > strike)` from `surface`, or `None` if insufficient.
    fn prob_above(&self, surface: &Surface, strike: f64) -> Option<f64>;

    /// Build a [`ModelPrediction`] from this model's estimate at `strike`.
    fn predict(&self, surface: &Surface, strike: f64) -> ModelPrediction {
        match self.prob_above(surface, strike) {
            Some(p) => ModelPrediction {
                model_name: self.name().to_string(),
                prob_above: Some(p),
                forward: None,
                extra: Default::default(),
            },
            None => ModelPrediction::absent(self.name()),
        }
    }
}
