//! OCC-style option contract identifier codec.
//!
//! Parses and encodes identifiers of the form `O:<TICKER><YY><MM><DD><C|P><STRIKE8>`,
//! e.g. `O:NVDA260117C00140000` (NVDA, 2026-01-17 expiry, call, strike 140.0).

use crate::util::{is_recognized_ticker, symbol, Symbol};
use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Which side of the contract this identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Call option.
    Call,
    /// Put option.
    Put,
}

impl Side {
    /// The single-letter OCC code for this side.
    pub fn code(self) -> char {
        match self {
            Side::Call => 'C',
            Side::Put => 'P',
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Call => write!(f, "call"),
            Side::Put => write!(f, "put"),
        }
    }
}

/// A parsed OCC option identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIdentifier {
    /// Underlying ticker symbol.
    pub ticker: Symbol,
    /// Expiry instant, always 21:00:00 UTC on the encoded date.
    pub expiry: DateTime<Utc>,
    /// Call or put.
    pub side: Side,
    /// Strike price (digits / 1000).
    pub strike: f64,
}

fn occ_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^O:(?P<ticker>[A-Z]+)(?P<yy>\d{2})(?P<mm>\d{2})(?P<dd>\d{2})(?P<side>[CP])(?P<strike>\d{8})$")
            .expect("OCC pattern is a valid regex")
    })
}

/// Parse an OCC option identifier string.
///
/// Returns `None` if the string does not match the OCC pattern or names a
/// ticker outside the recognized set.
pub fn parse_occ_symbol(id: &str) -> Option<ParsedIdentifier> {
    let caps = occ_pattern().captures(id)?;

    let ticker = &caps["ticker"];
    if !is_recognized_ticker(ticker) {
        return None;
    }

    let yy: i32 = caps["yy"].parse().ok()?;
    let mm: u32 = caps["mm"].parse().ok()?;
    let dd: u32 = caps["dd"].parse().ok()?;
    let year = 2000 + yy;

    let expiry = Utc
        .with_ymd_and_hms(year, mm, dd, 21, 0, 0)
        .single()?;

    let side = match &caps["side"] {
        "C" => Side::Call,
        "P" => Side::Put,
        _ => return None,
    };

    let strike_digits: i64 = caps["strike"].parse().ok()?;
    let strike = strike_digits as f64 / 1000.0;

    Some(ParsedIdentifier {
        ticker: symbol(ticker),
        expiry,
        side,
        strike,
    })
}

/// Encode `(ticker, expiry_date, side, strike)` back into the canonical
/// identifier string. Inverse of [`parse_occ_symbol`] for the date/side/strike
/// components carried in a `ParsedIdentifier`.
pub fn encode_occ_symbol(
    ticker: &str,
    expiry_date: chrono::NaiveDate,
    side: Side,
    strike: f64,
) -> String {
    let yy = expiry_date.format("%y");
    let mm = expiry_date.format("%m");
    let dd = expiry_date.format("%d");
    let strike_digits = (strike * 1000.0).round() as i64;
    format!("O:{ticker}{yy}{mm}{dd}{}{strike_digits:08}", side.code())
}

impl ParsedIdentifier {
    /// Re-encode this identifier, for round-trip testing.
    pub fn to_occ_symbol(&self) -> String {
        encode_occ_symbol(
            &self.ticker,
            self.expiry.date_naive(),
            self.side,
            self.strike,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call() {
        let parsed = parse_occ_symbol("O:NVDA260117C00140000").unwrap();
        assert_eq!(parsed.ticker.as_str(), "NVDA");
        assert_eq!(parsed.side, Side::Call);
        assert_eq!(parsed.strike, 140.0);
        assert_eq!(
            parsed.expiry,
            Utc.with_ymd_and_hms(2026, 1, 17, 21, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_fractional_strike() {
        let parsed = parse_occ_symbol("O:NVDA250117C00450500").unwrap();
        assert_eq!(parsed.strike, 450.5);
    }

    #[test]
    fn test_parse_missing_prefix_rejected() {
        assert!(parse_occ_symbol("NVDA260117C00140000").is_none());
    }

    #[test]
    fn test_parse_unrecognized_ticker_rejected() {
        assert!(parse_occ_symbol("O:IBM260117C00140000").is_none());
    }

    #[test]
    fn test_parse_put() {
        let parsed = parse_occ_symbol("O:AAPL260117P00150000").unwrap();
        assert_eq!(parsed.side, Side::Put);
        assert_eq!(parsed.side.to_string(), "put");
    }

    #[test]
    fn test_parse_invalid_date_rejected() {
        assert!(parse_occ_symbol("O:NVDA261301C00140000").is_none());
    }

    #[test]
    fn test_round_trip() {
        let id = "O:NVDA260117C00140000";
        let parsed = parse_occ_symbol(id).unwrap();
        assert_eq!(parsed.to_occ_symbol(), id);
    }

    #[test]
    fn test_round_trip_fractional() {
        let id = "O:NVDA250117C00450500";
        let parsed = parse_occ_symbol(id).unwrap();
        assert_eq!(parsed.to_occ_symbol(), id);
    }

    proptest::proptest! {
        #[test]
        fn prop_round_trip(
            ticker_idx in 0usize..10,
            yy in 0i32..99,
            mm in 1u32..=12,
            dd in 1u32..=28,
            is_call in proptest::bool::ANY,
            strike_thousandths in 0i64..100_000_000,
        ) {
            let tickers = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "PLTR", "OPEN"];
            let ticker = tickers[ticker_idx];
            let side = if is_call { Side::Call } else { Side::Put };
            let strike = strike_thousandths as f64 / 1000.0;
            let date = chrono::NaiveDate::from_ymd_opt(2000 + yy, mm, dd).unwrap();
            let id = encode_occ_symbol(ticker, date, side, strike);
            let parsed = parse_occ_symbol(&id).expect("generated id should parse");
            proptest::prop_assert_eq!(parsed.to_occ_symbol(), id);
        }
    }
}
