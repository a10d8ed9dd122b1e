//! Forward-price estimation via put–call parity.

use crate::config::ForwardConfig;
use crate::models::{ForwardEstimate, Surface};

/// Estimate the forward price of the underlying from a `Surface`, by
/// aggregating put–call parity candidates across common strikes.
///
/// Returns `None` if fewer than three candidates survive filtering.
pub fn estimate_forward(surface: &Surface, config: &ForwardConfig) -> Option<ForwardEstimate> {
    let mut candidates: Vec<(f64, f64)> = Vec::new(); // (forward, weight)

    for call in &surface.calls {
        let Some(put) = surface.get_put(call.strike) else {
            continue;
        };

        if call.mid <= config.min_mid || put.mid <= config.min_mid {
            continue;
        }
        if call.bid < 0.0 || put.bid < 0.0 {
            continue;
        }
        if call.bid > call.ask || put.bid > put.ask {
            continue;
        }
        if let Some(max_spread) = config.max_spread {
            if call.spread > max_spread || put.spread > max_spread {
                continue;
            }
        }

        let forward = call.strike + (call.mid - put.mid) / config.discount;
        if !forward.is_finite() || forward <= 0.0 {
            continue;
        }

        let weight = 1.0 / (call.spread + put.spread).max(1e-9);
        candidates.push((forward, weight));
    }

    if candidates.len() < 3 {
        return None;
    }

    let mut forwards: Vec<f64> = candidates.iter().map(|(f, _)| *f).collect();
    forwards.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = median_of_sorted(&forwards);

    let lo = median * (1.0 - config.trim_pct);
    let hi = median * (1.0 + config.trim_pct);
    let trimmed: Vec<(f64, f64)> = candidates
        .iter()
        .copied()
        .filter(|(f, _)| *f >= lo && *f <= hi)
        .collect();

    let used = if trimmed.len() >= 3 { &trimmed } else { &candidates };

    let total_weight: f64 = used.iter().map(|(_, w)| w).sum();
    let forward = used.iter().map(|(f, w)| f * w).sum::<f64>() / total_weight;
    let min = used.iter().map(|(f, _)| *f).fold(f64::INFINITY, f64::min);
    let max = used.iter().map(|(f, _)| *f).fold(f64::NEG_INFINITY, f64::max);

    Some(ForwardEstimate {
        forward,
        n_used: used.len(),
        median,
        min,
        max,
    })
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
