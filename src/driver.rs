//! Per-expiry prediction driver and human-readable report rendering.
//!
//! Ties the store, the pricing core, and the four probability models
//! together: for a chosen ticker and days-ahead window, it evaluates every
//! expiry present in the store, every queried strike (one if given,
//! otherwise every strike quoted on that expiry's surface), and compares
//! each model's estimate against the cached prediction-market probability.

use crate::config::{ConfidenceConfig, ForwardConfig, ImpliedVolConfig};
use crate::models::{Direction, ExpiryPredictions, ModelPrediction, Surface};
use crate::pricing::score_confidence;
use crate::prob::ratio::RatioModel;
use crate::prob::slope::SlopeModel;
use crate::prob::spline::SplineModel;
use crate::prob::svi::SviModel;
use crate::prob::ProbabilityModel;
use crate::store::{build_surface_snapshot, EventStore, OptionStore};
use crate::util::format_date;
use chrono::{DateTime, Utc};

/// Configuration knobs shared by every model invoked on a driver run.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Forward estimator configuration.
    pub forward: ForwardConfig,
    /// Implied-volatility inverter configuration.
    pub iv: ImpliedVolConfig,
    /// Confidence scorer configuration.
    pub confidence: ConfidenceConfig,
    /// Slope model window (strikes on either side of the queried strike).
    pub slope_window: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            forward: ForwardConfig::default(),
            iv: ImpliedVolConfig::default(),
            confidence: ConfidenceConfig::default(),
            slope_window: 1,
        }
    }
}

/// Run predictions for `ticker` across every expiry in the store that falls
/// within `days` of `now`. If `strike` is given, only that strike is
/// evaluated per expiry; otherwise every strike quoted on that expiry's
/// surface is evaluated.
pub fn run_predictions(
    store: &OptionStore,
    events: &EventStore,
    ticker: &str,
    strike: Option<f64>,
    days: i64,
    now: DateTime<Utc>,
    config: &DriverConfig,
) -> Vec<ExpiryPredictions> {
    let horizon = now + chrono::Duration::days(days);
    let mut expiries: Vec<DateTime<Utc>> = store
        .get_by_ticker(ticker)
        .iter()
        .map(|s| s.expiry)
        .filter(|e| *e >= now && *e <= horizon)
        .collect();
    expiries.sort();
    expiries.dedup();

    let mut out = Vec::new();
    for expiry in expiries {
        let surface = build_surface_snapshot(store, ticker, expiry);

        let strikes: Vec<f64> = match strike {
            Some(k) => vec![k],
            None => union_strikes(&surface),
        };

        for k in strikes {
            out.push(predict_one(&surface, k, ticker, events, now, config));
        }
    }
    out
}

fn union_strikes(surface: &Surface) -> Vec<f64> {
    let mut strikes: Vec<f64> = surface
        .call_strikes()
        .into_iter()
        .chain(surface.put_strikes())
        .collect();
    strikes.sort_by(|a, b| a.partial_cmp(b).unwrap());
    strikes.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    strikes
}

fn predict_one(
    surface: &Surface,
    strike: f64,
    ticker: &str,
    events: &EventStore,
    now: DateTime<Utc>,
    config: &DriverConfig,
) -> ExpiryPredictions {
    let ratio = RatioModel::default().predict(surface, strike);
    let slope = SlopeModel {
        window: config.slope_window,
        discount: config.forward.discount,
        max_spread: config.forward.max_spread,
    }
    .predict(surface, strike);
    let svi = SviModel {
        now,
        min_mid: config.forward.min_mid,
        max_spread: config.forward.max_spread,
        forward_config: config.forward,
        iv_config: config.iv,
    }
    .predict(surface, strike);
    let spline = SplineModel {
        now,
        min_mid: config.forward.min_mid,
        max_spread: config.forward.max_spread,
        smoothing: None,
        forward_config: config.forward,
        iv_config: config.iv,
    }
    .predict(surface, strike);

    let (confidence, diagnostics) = score_confidence(
        surface,
        strike,
        ratio.prob_above,
        slope.prob_above,
        &config.confidence,
    );
    let confidence = if ratio.prob_above.is_some() || slope.prob_above.is_some() {
        Some(confidence)
    } else {
        None
    };

    let end_date = format_date(surface.expiry.date_naive());
    let polymarket_prob = events.get_polymarket_prob(ticker, strike, &end_date, Some(Direction::Above));

    ExpiryPredictions {
        expiry: surface.expiry.date_naive(),
        strike,
        predictions: vec![ratio, slope, svi, spline],
        confidence,
        confidence_diagnostics: Some(diagnostics),
        polymarket_prob,
    }
}

/// Render a human-readable report for a batch of predictions.
pub fn render_report(ticker: &str, predictions: &[ExpiryPredictions]) -> String {
    let mut lines = vec![format!("Predictions for {ticker}")];
    if predictions.is_empty() {
        lines.push("  (no expiries in the requested window)".to_string());
        return lines.join("\n");
    }

    for p in predictions {
        lines.push(format!("\n{} @ strike {:.2}", p.expiry, p.strike));
        for model in &p.predictions {
            lines.push(format!("  {:<8} {}", model.model_name, render_prediction(model)));
        }
        match p.confidence {
            Some(c) => lines.push(format!("  confidence  {c:.3}")),
            None => lines.push("  confidence  insufficient data".to_string()),
        }
        match p.polymarket_prob {
            Some(prob) => lines.push(format!("  polymarket  {prob:.3}")),
            None => lines.push("  polymarket  n/a".to_string()),
        }
    }
    lines.join("\n")
}

fn render_prediction(prediction: &ModelPrediction) -> String {
    match prediction.prob_above {
        Some(p) => format!("{p:.3}"),
        None => "insufficient data".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OptionPoint, QuoteEvent};
    use crate::identifier::Side;
    use crate::util::UnixMs;
    use chrono::TimeZone;

    fn populated_store() -> OptionStore {
        let mut store = OptionStore::new();
        let quotes = [
            ("O:NVDA260117C00090000", 12.0, 12.4),
            ("O:NVDA260117P00090000", 1.0, 1.2),
            ("O:NVDA260117C00100000", 5.0, 5.2),
            ("O:NVDA260117P00100000", 4.0, 4.2),
            ("O:NVDA260117C00110000", 1.0, 1.2),
            ("O:NVDA260117P00110000", 10.0, 10.4),
        ];
        for (id, bid, ask) in quotes {
            store.apply_quote(QuoteEvent {
                id: id.to_string(),
                bid,
                ask,
                ts: UnixMs::from_millis(1_700_000_000_000),
            });
        }
        store
    }

    #[test]
    fn test_run_predictions_single_strike() {
        let store = populated_store();
        let events = EventStore::new();
        let now = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
        let predictions = run_predictions(
            &store,
            &events,
            "NVDA",
            Some(100.0),
            90,
            now,
            &DriverConfig::default(),
        );
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].strike, 100.0);
        assert!(predictions[0].predictions[0].prob_above.is_some());
    }

    #[test]
    fn test_run_predictions_out_of_window_returns_empty() {
        let store = populated_store();
        let events = EventStore::new();
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let predictions = run_predictions(
            &store,
            &events,
            "NVDA",
            Some(100.0),
            30,
            now,
            &DriverConfig::default(),
        );
        assert!(predictions.is_empty());
    }

    #[test]
    fn test_render_report_includes_model_lines() {
        let surface = Surface {
            ticker: crate::util::symbol("NVDA"),
            expiry: Utc.with_ymd_and_hms(2026, 1, 17, 21, 0, 0).unwrap(),
            calls: vec![OptionPoint {
                strike: 100.0,
                side: Side::Call,
                bid: 5.0,
                ask: 5.2,
                mid: 5.1,
                spread: 0.2,
            }],
            puts: vec![OptionPoint {
                strike: 100.0,
                side: Side::Put,
                bid: 4.0,
                ask: 4.2,
                mid: 4.1,
                spread: 0.2,
            }],
        };
        let now = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
        let events = EventStore::new();
        let prediction = predict_one(&surface, 100.0, "NVDA", &events, now, &DriverConfig::default());
        let report = render_report("NVDA", &[prediction]);
        assert!(report.contains("ratio"));
        assert!(report.contains("slope"));
        assert!(report.contains("svi"));
        assert!(report.contains("spline"));
    }
}
