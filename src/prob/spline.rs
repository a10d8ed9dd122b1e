//! Smoothing-spline total-variance smile fit (penalized natural cubic spline).

use super::svi::years_to_expiry;
use super::{extract_oom_points, OomPoint, ProbabilityModel};
use crate::config::{ForwardConfig, ImpliedVolConfig};
use crate::models::Surface;
use crate::pricing::norm_cdf;
use chrono::{DateTime, Utc};
use nalgebra::{DMatrix, DVector};

/// A fitted natural cubic smoothing spline, evaluable by linear interpolation
/// between its knot values (the spline coefficients solve for `g(k_i)` at
/// each observed `k_i`; off-knot evaluation interpolates linearly, which is
/// exact for a natural spline's derivative-free value at the knots and a
/// reasonable approximation between them for this probability query).
struct FittedSpline {
    ks: Vec<f64>,
    values: Vec<f64>,
}

impl FittedSpline {
    fn eval(&self, k: f64) -> f64 {
        let k = k.clamp(self.ks[0], *self.ks.last().unwrap());
        match self.ks.binary_search_by(|probe| probe.partial_cmp(&k).unwrap()) {
            Ok(idx) => self.values[idx],
            Err(idx) => {
                if idx == 0 {
                    self.values[0]
                } else if idx >= self.ks.len() {
                    *self.values.last().unwrap()
                } else {
                    let (k0, k1) = (self.ks[idx - 1], self.ks[idx]);
                    let (v0, v1) = (self.values[idx - 1], self.values[idx]);
                    let t = (k - k0) / (k1 - k0);
                    v0 + t * (v1 - v0)
                }
            }
        }
    }
}

/// Fit a Green–Silverman penalized natural cubic smoothing spline to
/// `(k_i, w_i)` with per-point weights, solved as a dense weighted
/// least-squares linear system: `(W + s*Omega) g = W w`, where `Omega` is
/// the second-derivative roughness penalty matrix on the natural spline
/// basis and `s` is used directly as the penalty weight.
fn fit_smoothing_spline(points: &[OomPoint], smoothing: f64) -> FittedSpline {
    let n = points.len();
    let ks: Vec<f64> = points.iter().map(|p| p.k).collect();
    let ws: Vec<f64> = points.iter().map(|p| p.w).collect();
    let weights: Vec<f64> = points.iter().map(|p| p.weight).collect();

    let h: Vec<f64> = (0..n - 1).map(|i| (ks[i + 1] - ks[i]).max(1e-9)).collect();

    // Second-difference operator D (n-2 x n) and its weighted roughness matrix Omega = D^T Q^-1 D.
    let mut d = DMatrix::<f64>::zeros(n - 2, n);
    let mut q = DMatrix::<f64>::zeros(n - 2, n - 2);
    for i in 0..n - 2 {
        d[(i, i)] = 1.0 / h[i];
        d[(i, i + 1)] = -1.0 / h[i] - 1.0 / h[i + 1];
        d[(i, i + 2)] = 1.0 / h[i + 1];

        q[(i, i)] = (h[i] + h[i + 1]) / 3.0;
        if i + 1 < n - 2 {
            q[(i, i + 1)] = h[i + 1] / 6.0;
            q[(i + 1, i)] = h[i + 1] / 6.0;
        }
    }

    let q_inv = q.clone().try_inverse().unwrap_or_else(|| DMatrix::identity(n - 2, n - 2));
    let omega = d.transpose() * q_inv * d;

    let w_diag = DMatrix::from_diagonal(&DVector::from_vec(weights.clone()));
    let lhs = &w_diag + omega.scale(smoothing);
    let rhs = &w_diag * DVector::from_vec(ws.clone());

    let solution = lhs
        .clone()
        .lu()
        .solve(&rhs)
        .unwrap_or_else(|| DVector::from_vec(ws.clone()));

    FittedSpline {
        ks,
        values: solution.iter().copied().collect(),
    }
}

fn default_smoothing(points: &[OomPoint]) -> f64 {
    let n = points.len() as f64;
    let mean = points.iter().map(|p| p.w).sum::<f64>() / n;
    let variance = points.iter().map(|p| (p.w - mean).powi(2)).sum::<f64>() / n;
    (0.5 * variance.sqrt() * n).max(1e-8)
}

/// Smoothing-spline smile model.
pub struct SplineModel {
    /// Evaluation instant used to compute years-to-expiry against the surface's expiry.
    pub now: DateTime<Utc>,
    /// Minimum mid price for an out-of-the-money quote to be used.
    pub min_mid: f64,
    /// Optional per-quote spread filter.
    pub max_spread: Option<f64>,
    /// Roughness-penalty weight. `None` derives it from the data per §4.6.4.
    pub smoothing: Option<f64>,
    /// Forward estimator configuration.
    pub forward_config: ForwardConfig,
    /// Implied-volatility inverter configuration.
    pub iv_config: ImpliedVolConfig,
}

impl Default for SplineModel {
    fn default() -> Self {
        Self {
            now: Utc::now(),
            min_mid: 1e-6,
            max_spread: None,
            smoothing: None,
            forward_config: ForwardConfig::default(),
            iv_config: ImpliedVolConfig::default(),
        }
    }
}

impl ProbabilityModel for SplineModel {
    fn name(&self) -> &'static str {
        "spline"
    }

    fn prob_above(&self, surface: &Surface, strike: f64) -> Option<f64> {
        let years = years_to_expiry(self.now, surface.expiry)?;
        let (forward, points) = extract_oom_points(
            surface,
            years,
            self.min_mid,
            self.max_spread,
            &self.forward_config,
            &self.iv_config,
        )?;

        let smoothing = self.smoothing.unwrap_or_else(|| default_smoothing(&points));
        let fitted = fit_smoothing_spline(&points, smoothing);

        let k = (strike / forward).ln();
        let w = fitted.eval(k).max(1e-12);
        let sigma_imp = (w / years).sqrt();
        let sqrt_t = years.sqrt();
        let d2 = ((forward / strike).ln() + 0.5 * sigma_imp * sigma_imp * years) / (sigma_imp * sqrt_t);
        Some(norm_cdf(d2).clamp(0.0, 1.0))
    }
}
