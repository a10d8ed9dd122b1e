//! SVI (stochastic volatility inspired) total-variance smile fit.

use super::{extract_oom_points, OomPoint, ProbabilityModel};
use crate::config::{ForwardConfig, ImpliedVolConfig};
use crate::models::Surface;
use crate::pricing::norm_cdf;
use argmin::core::{CostFunction, Error, Executor};
use argmin::solver::neldermead::NelderMead;
use chrono::{DateTime, Utc};

const RHO_BOUND: f64 = 0.999;
const B_FLOOR: f64 = 1e-10;
const SIGMA_FLOOR: f64 = 1e-10;

/// Raw SVI parameters, `w(k) = a + b*(rho*(k-m) + sqrt((k-m)^2 + sigma^2))`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SviParams {
    a: f64,
    b: f64,
    rho: f64,
    m: f64,
    sigma: f64,
}

impl SviParams {
    fn total_variance(&self, k: f64) -> f64 {
        let d = k - self.m;
        self.a + self.b * (self.rho * d + (d * d + self.sigma * self.sigma).sqrt())
    }

    fn from_unconstrained(x: &[f64]) -> Self {
        Self {
            a: softplus(x[0]),
            b: softplus(x[1]) + B_FLOOR,
            rho: RHO_BOUND * x[2].tanh(),
            m: x[3],
            sigma: softplus(x[4]) + SIGMA_FLOOR,
        }
    }
}

fn softplus(x: f64) -> f64 {
    if x > 30.0 {
        x
    } else {
        (1.0 + x.exp()).ln()
    }
}

fn inv_softplus(y: f64) -> f64 {
    let y = y.max(1e-9);
    (y.exp() - 1.0).max(1e-12).ln()
}

struct SviCost<'a> {
    points: &'a [OomPoint],
}

impl CostFunction for SviCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Vec<f64>) -> Result<f64, Error> {
        let params = SviParams::from_unconstrained(param);
        let mut fit_error = 0.0;
        let mut negativity_penalty = 0.0;
        for p in self.points {
            let predicted = params.total_variance(p.k);
            fit_error += p.weight * (predicted - p.w).powi(2);
            negativity_penalty += predicted.min(0.0).powi(2);
        }
        let regularization = 1e-3 * (params.m.powi(2) + params.sigma.powi(2));
        Ok(fit_error + 1e6 * negativity_penalty + regularization)
    }
}

fn fit_svi(points: &[OomPoint]) -> Option<SviParams> {
    let ws: Vec<f64> = points.iter().map(|p| p.w).collect();
    let ks: Vec<f64> = points.iter().map(|p| p.k).collect();

    let min_w = ws.iter().cloned().fold(f64::INFINITY, f64::min);
    let stdev = |xs: &[f64]| -> f64 {
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        (xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / xs.len() as f64).sqrt()
    };
    let median = |xs: &[f64]| -> f64 {
        let mut sorted = xs.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let n = sorted.len();
        if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        }
    };

    let init = [
        inv_softplus(0.5 * min_w.max(1e-9)),
        inv_softplus(stdev(&ws) + 1e-3),
        0.0,
        median(&ks),
        inv_softplus(stdev(&ks) + 1e-3),
    ];

    let mut simplex = vec![init.to_vec()];
    for i in 0..init.len() {
        let mut vertex = init.to_vec();
        vertex[i] += if vertex[i].abs() > 1e-6 { vertex[i] * 0.1 } else { 0.1 };
        simplex.push(vertex);
    }

    let cost = SviCost { points };
    let solver = NelderMead::new(simplex);
    let result = Executor::new(cost, solver)
        .configure(|state| state.max_iters(500))
        .run()
        .ok()?;

    let best = result.state().best_param.clone()?;
    Some(SviParams::from_unconstrained(&best))
}

/// SVI smile model.
pub struct SviModel {
    /// Evaluation instant used to compute years-to-expiry against the surface's expiry.
    pub now: DateTime<Utc>,
    /// Minimum mid price for an out-of-the-money quote to be used.
    pub min_mid: f64,
    /// Optional per-quote spread filter.
    pub max_spread: Option<f64>,
    /// Forward estimator configuration.
    pub forward_config: ForwardConfig,
    /// Implied-volatility inverter configuration.
    pub iv_config: ImpliedVolConfig,
}

impl Default for SviModel {
    fn default() -> Self {
        Self {
            now: Utc::now(),
            min_mid: 1e-6,
            max_spread: None,
            forward_config: ForwardConfig::default(),
            iv_config: ImpliedVolConfig::default(),
        }
    }
}

impl ProbabilityModel for SviModel {
    fn name(&self) -> &'static str {
        "svi"
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

        let params = fit_svi(&points)?;

        let k = (strike / forward).ln();
        let w = params.total_variance(k).max(1e-12);
        let sigma_imp = (w / years).sqrt();
        let sqrt_t = years.sqrt();
        let d2 = ((forward / strike).ln() + 0.5 * sigma_imp * sigma_imp * years) / (sigma_imp * sqrt_t);
        Some(norm_cdf(d2).clamp(0.0, 1.0))
    }
}

pub(crate) fn years_to_expiry(now: DateTime<Utc>, expiry: DateTime<Utc>) -> Option<f64> {
    let seconds = (expiry - now).num_seconds() as f64;
    let years = seconds / (365.25 * 86_400.0);
    if years > 0.0 {
        Some(years)
    } else {
        None
    }
}
