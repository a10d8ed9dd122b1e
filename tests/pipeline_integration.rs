//! End-to-end pipeline: quote ingestion, surface snapshot, forward
//! estimation, probability models, confidence, and prediction-market
//! comparison, exercised together as the driver wires them up.

use chrono::{TimeZone, Utc};
use massive_optprob::config::{ConfidenceConfig, ForwardConfig};
use massive_optprob::driver::{render_report, run_predictions, DriverConfig};
use massive_optprob::models::{Direction, EventMetadata, MarketMetadata, QuoteEvent};
use massive_optprob::pricing::{estimate_forward, score_confidence};
use massive_optprob::prob::ratio::RatioModel;
use massive_optprob::prob::slope::SlopeModel;
use massive_optprob::prob::ProbabilityModel;
use massive_optprob::store::{build_surface_snapshot, EventStore, OptionStore};
use massive_optprob::util::{symbol, UnixMs};

fn nvda_chain() -> OptionStore {
    let mut store = OptionStore::new();
    let quotes = [
        ("O:NVDA260117C00090000", 22.0, 22.4),
        ("O:NVDA260117P00090000", 1.0, 1.2),
        ("O:NVDA260117C00100000", 14.0, 14.4),
        ("O:NVDA260117P00100000", 4.0, 4.2),
        ("O:NVDA260117C00110000", 8.0, 8.3),
        ("O:NVDA260117P00110000", 8.8, 9.2),
        ("O:NVDA260117C00120000", 4.0, 4.3),
        ("O:NVDA260117P00120000", 14.8, 15.2),
        ("O:NVDA260117C00130000", 1.8, 2.1),
        ("O:NVDA260117P00130000", 22.6, 23.0),
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
fn test_store_to_surface_to_forward_pipeline() {
    let store = nvda_chain();
    let expiry = Utc.with_ymd_and_hms(2026, 1, 17, 21, 0, 0).unwrap();
    let surface = build_surface_snapshot(&store, "NVDA", expiry);

    assert_eq!(surface.calls.len(), 5);
    assert_eq!(surface.puts.len(), 5);
    assert!(surface.calls.windows(2).all(|w| w[0].strike < w[1].strike));

    let forward = estimate_forward(&surface, &ForwardConfig::default()).expect("forward estimate");
    // Put-call parity crosses near strike 110, so the forward should land close by.
    assert!((forward.forward - 110.0).abs() < 5.0);
}

#[test]
fn test_ratio_and_slope_agree_reasonably_and_score_confidence() {
    let store = nvda_chain();
    let expiry = Utc.with_ymd_and_hms(2026, 1, 17, 21, 0, 0).unwrap();
    let surface = build_surface_snapshot(&store, "NVDA", expiry);

    let ratio = RatioModel::default().prob_above(&surface, 110.0).unwrap();
    let slope = SlopeModel::default().prob_above(&surface, 110.0).unwrap();
    assert!((ratio - slope).abs() < 0.25);

    let (confidence, diagnostics) =
        score_confidence(&surface, 110.0, Some(ratio), Some(slope), &ConfidenceConfig::default());
    assert!(confidence > 0.0);
    assert!(diagnostics.agreement > 0.0);
}

#[test]
fn test_driver_run_predictions_includes_all_four_models() {
    let store = nvda_chain();
    let events = EventStore::new();
    let now = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();

    let predictions = run_predictions(&store, &events, "NVDA", Some(110.0), 90, now, &DriverConfig::default());
    assert_eq!(predictions.len(), 1);
    let prediction = &predictions[0];
    assert_eq!(prediction.predictions.len(), 4);
    let names: Vec<&str> = prediction.predictions.iter().map(|p| p.model_name.as_str()).collect();
    assert_eq!(names, vec!["ratio", "slope", "svi", "spline"]);

    let report = render_report("NVDA", &predictions);
    assert!(report.contains("NVDA"));
    assert!(report.contains("110.00"));
}

#[test]
fn test_driver_compares_against_cached_polymarket_event() {
    let store = nvda_chain();
    let mut events = EventStore::new();
    events.replace(vec![EventMetadata {
        ticker: symbol("NVDA"),
        end_date: "2026-01-17T23:59:59Z".to_string(),
        markets: vec![MarketMetadata {
            strike: 110.0,
            clob_token_ids: ["yes".to_string(), "no".to_string()],
            yes_price: Some(0.55),
            no_price: Some(0.45),
            tick_size: Some("0.01".to_string()),
            neg_risk: Some(false),
        }],
    }]);

    let now = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
    let predictions = run_predictions(&store, &events, "NVDA", Some(110.0), 90, now, &DriverConfig::default());
    assert_eq!(predictions[0].polymarket_prob, Some(0.55));

    let prob = events
        .get_polymarket_prob("NVDA", 110.0, "2026-01-17", Some(Direction::Above))
        .unwrap();
    assert_eq!(prob, 0.55);
}

#[test]
fn test_driver_reports_insufficient_data_for_unknown_ticker() {
    let store = nvda_chain();
    let events = EventStore::new();
    let now = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();

    let predictions = run_predictions(&store, &events, "MSFT", Some(110.0), 90, now, &DriverConfig::default());
    assert!(predictions.is_empty());
    assert!(render_report("MSFT", &predictions).contains("no expiries"));
}
