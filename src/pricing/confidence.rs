//! Confidence scorer combining estimator agreement, liquidity, monotonicity, and spacing.

use crate::config::ConfidenceConfig;
use crate::models::{ConfidenceDiagnostics, Surface};

/// Score confidence in a strike-level prediction, given the `Surface` it was
/// drawn from and the ratio/slope model probabilities (either may be absent).
///
/// Always returns a score in `[0, 1]` with its sub-score breakdown, even
/// when both model probabilities are absent (in which case `agreement` is 0).
pub fn score_confidence(
    surface: &Surface,
    strike: f64,
    prob_ratio: Option<f64>,
    prob_slope: Option<f64>,
    config: &ConfidenceConfig,
) -> (f64, ConfidenceDiagnostics) {
    let agreement = match (prob_ratio, prob_slope) {
        (Some(a), Some(b)) => (-5.0 * (a - b).abs()).exp(),
        _ => 0.0,
    };

    let liquidity = liquidity_score(surface, strike, config.max_relative_spread);
    let (monotonicity, spacing) = monotonicity_and_spacing(surface, strike);

    let raw = config.weight_agreement * agreement
        + config.weight_liquidity * liquidity
        + config.weight_monotonicity * monotonicity
        + config.weight_spacing * spacing;
    let confidence = raw.clamp(0.0, 1.0);

    (
        confidence,
        ConfidenceDiagnostics {
            agreement,
            liquidity,
            monotonicity,
            spacing,
        },
    )
}

fn liquidity_score(surface: &Surface, strike: f64, max_relative_spread: f64) -> f64 {
    let (Some(call), Some(put)) = (surface.get_call(strike), surface.get_put(strike)) else {
        return 0.0;
    };
    let r = (call.spread / call.mid.max(1e-6)).max(put.spread / put.mid.max(1e-6));
    if r >= max_relative_spread {
        0.0
    } else {
        1.0 - r / max_relative_spread
    }
}

fn monotonicity_and_spacing(surface: &Surface, strike: f64) -> (f64, f64) {
    if surface.calls.is_empty() {
        return (0.0, 0.0);
    }

    let i = nearest_index(&surface.calls.iter().map(|p| p.strike).collect::<Vec<_>>(), strike);

    let monotonicity = {
        let window: Vec<f64> = [i.checked_sub(1), Some(i), Some(i + 1)]
            .into_iter()
            .flatten()
            .filter_map(|idx| surface.calls.get(idx).map(|p| p.mid))
            .collect();
        if window.windows(2).all(|pair| pair[0] >= pair[1]) {
            1.0
        } else {
            0.0
        }
    };

    let spacing = if i == 0 || i + 1 >= surface.calls.len() {
        0.0
    } else {
        let left_gap = surface.calls[i].strike - surface.calls[i - 1].strike;
        let right_gap = surface.calls[i + 1].strike - surface.calls[i].strike;
        (-0.1 * left_gap.max(right_gap)).exp()
    };

    (monotonicity, spacing)
}

fn nearest_index(strikes: &[f64], target: f64) -> usize {
    strikes
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).abs().partial_cmp(&(*b - target).abs()).unwrap())
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Side;
    use crate::models::OptionPoint;
    use crate::util::symbol;
    use chrono::{TimeZone, Utc};

    fn point(strike: f64, side: Side, mid: f64, spread: f64) -> OptionPoint {
        let half = spread / 2.0;
        OptionPoint {
            strike,
            side,
            bid: mid - half,
            ask: mid + half,
            mid,
            spread,
        }
    }

    fn sample_surface() -> Surface {
        Surface {
            ticker: symbol("NVDA"),
            expiry: Utc.with_ymd_and_hms(2026, 1, 17, 21, 0, 0).unwrap(),
            calls: vec![
                point(90.0, Side::Call, 12.0, 0.2),
                point(100.0, Side::Call, 5.0, 0.2),
                point(110.0, Side::Call, 1.0, 0.2),
            ],
            puts: vec![
                point(90.0, Side::Put, 1.0, 0.2),
                point(100.0, Side::Put, 4.0, 0.2),
                point(110.0, Side::Put, 10.0, 0.2),
            ],
        }
    }

    #[test]
    fn test_score_confidence_matches_worked_example() {
        let surface = sample_surface();
        let (confidence, diagnostics) =
            score_confidence(&surface, 100.0, Some(0.5), Some(0.5), &ConfidenceConfig::default());
        assert_eq!(diagnostics.agreement, 1.0);
        assert_eq!(diagnostics.monotonicity, 1.0);
        assert!(diagnostics.spacing > 0.0 && diagnostics.spacing < 1.0);
        assert!(confidence > 0.7);
    }

    #[test]
    fn test_score_confidence_absent_models_zero_agreement() {
        let surface = sample_surface();
        let (_, diagnostics) = score_confidence(&surface, 100.0, None, None, &ConfidenceConfig::default());
        assert_eq!(diagnostics.agreement, 0.0);
    }

    #[test]
    fn test_liquidity_zero_when_quote_missing() {
        let surface = sample_surface();
        let (_, diagnostics) =
            score_confidence(&surface, 95.0, Some(0.5), Some(0.5), &ConfidenceConfig::default());
        assert_eq!(diagnostics.liquidity, 0.0);
    }
}
