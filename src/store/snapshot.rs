//! Immutable [`Surface`] construction from live [`OptionStore`] state.

use super::OptionStore;
use crate::identifier::Side;
use crate::models::{OptionPoint, Surface};

/// Build an immutable [`Surface`] snapshot for one ticker/expiry pair.
///
/// Always returns a `Surface`, with empty `calls`/`puts` if the store holds
/// no contracts for that ticker at that expiry; callers decide what "nothing
/// to show" means for them. `calls` and `puts` are sorted ascending by
/// strike with duplicate strikes (same side, same strike) resolved to the
/// last-seen point.
pub fn build_surface_snapshot(
    store: &OptionStore,
    ticker: &str,
    expiry: chrono::DateTime<chrono::Utc>,
) -> Surface {
    build_surface_snapshot_filtered(store, ticker, expiry, None)
}

/// Same as [`build_surface_snapshot`], additionally dropping any contract
/// whose `ask - bid` spread exceeds `max_spread`, if given.
pub fn build_surface_snapshot_filtered(
    store: &OptionStore,
    ticker: &str,
    expiry: chrono::DateTime<chrono::Utc>,
    max_spread: Option<f64>,
) -> Surface {
    let states = store.get_by_ticker(ticker);
    let matching: Vec<_> = states
        .into_iter()
        .filter(|s| s.expiry == expiry)
        .filter(|s| max_spread.map_or(true, |max| s.spread <= max))
        .collect();

    let mut calls: Vec<OptionPoint> = Vec::new();
    let mut puts: Vec<OptionPoint> = Vec::new();
    for state in &matching {
        let point = OptionPoint::from(*state);
        match state.side {
            Side::Call => push_or_replace(&mut calls, point),
            Side::Put => push_or_replace(&mut puts, point),
        }
    }

    calls.sort_by(|a, b| a.strike.partial_cmp(&b.strike).unwrap());
    puts.sort_by(|a, b| a.strike.partial_cmp(&b.strike).unwrap());

    Surface {
        ticker: crate::util::symbol(ticker),
        expiry,
        calls,
        puts,
    }
}

fn push_or_replace(points: &mut Vec<OptionPoint>, point: OptionPoint) {
    if let Some(existing) = points
        .iter_mut()
        .find(|p| (p.strike - point.strike).abs() < 1e-9)
    {
        *existing = point;
    } else {
        points.push(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuoteEvent;
    use crate::util::UnixMs;
    use chrono::TimeZone;

    #[test]
    fn test_build_surface_snapshot_sorts_ascending() {
        let mut store = OptionStore::new();
        store.apply_quote(QuoteEvent {
            id: "O:NVDA260117C00150000".to_string(),
            bid: 2.0,
            ask: 2.5,
            ts: UnixMs::from_millis(1_700_000_000_000),
        });
        store.apply_quote(QuoteEvent {
            id: "O:NVDA260117C00140000".to_string(),
            bid: 6.0,
            ask: 6.5,
            ts: UnixMs::from_millis(1_700_000_000_000),
        });

        let expiry = chrono::Utc.with_ymd_and_hms(2026, 1, 17, 21, 0, 0).unwrap();
        let surface = build_surface_snapshot(&store, "NVDA", expiry);
        assert_eq!(surface.call_strikes(), vec![140.0, 150.0]);
        assert!(surface.puts.is_empty());
    }

    #[test]
    fn test_build_surface_snapshot_absent_is_empty() {
        let store = OptionStore::new();
        let expiry = chrono::Utc.with_ymd_and_hms(2026, 1, 17, 21, 0, 0).unwrap();
        let surface = build_surface_snapshot(&store, "NVDA", expiry);
        assert!(surface.calls.is_empty());
        assert!(surface.puts.is_empty());
        assert_eq!(surface.ticker.as_str(), "NVDA");
    }
}
