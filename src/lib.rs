//! Risk-neutral probability estimation for equity options.
//!
//! This crate estimates, from live options market data, the probability that
//! an equity finishes above a given strike at a given expiry, and compares
//! that estimate against an external prediction-market quote.
//!
//! The core is a small pipeline:
//!
//! 1. [`identifier`] parses OCC-style contract identifiers.
//! 2. [`store`] merges live quote events into per-contract state and builds
//!    immutable per-expiry [`models::Surface`] snapshots.
//! 3. [`pricing`] estimates a forward price via put–call parity and inverts
//!    implied volatility from a European Black–Scholes-on-forward pricer.
//! 4. [`prob`] exposes four probability models (ratio, slope, SVI, spline)
//!    behind one `prob_above(K)` contract.
//!
//! The quote listener, the prediction-market fetcher, the Discord notifier,
//! and the command-line driver are external-collaborator adapters around
//! that core; see [`listener`], [`store::fetch_events`], [`notifier`], and
//! [`driver`].
//!
//! # Quick Start
//!
//! ```
//! use massive_optprob::identifier::parse_occ_symbol;
//! use massive_optprob::store::OptionStore;
//! use massive_optprob::models::QuoteEvent;
//! use massive_optprob::util::UnixMs;
//!
//! let parsed = parse_occ_symbol("O:NVDA260117C00140000").unwrap();
//! assert_eq!(parsed.strike, 140.0);
//!
//! let mut store = OptionStore::new();
//! store.apply_quote(QuoteEvent {
//!     id: "O:NVDA260117C00140000".to_string(),
//!     bid: 5.0,
//!     ask: 5.5,
//!     ts: UnixMs::now(),
//! });
//! assert_eq!(store.count(), 1);
//! ```
//!
//! # Feature Flags
//!
//! - `default`: Includes `rustls`, `gzip`, and `ws` features
//! - `rustls`: Use rustls for TLS (recommended)
//! - `native-tls`: Use native TLS instead of rustls
//! - `gzip`: Enable gzip compression for HTTP requests
//! - `ws`: Enable the WebSocket quote listener

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod driver;
pub mod error;
pub mod identifier;
pub mod metrics;
pub mod models;
pub mod notifier;
pub mod pricing;
pub mod prob;
pub mod store;
pub mod util;

#[cfg(feature = "ws")]
#[cfg_attr(docsrs, doc(cfg(feature = "ws")))]
pub mod listener;

#[cfg(feature = "ws")]
#[cfg_attr(docsrs, doc(cfg(feature = "ws")))]
pub mod ws;

pub use auth::{ApiKey, AuthMode};
pub use error::{EngineError, Result};
pub use identifier::{encode_occ_symbol, parse_occ_symbol, ParsedIdentifier, Side};
pub use metrics::{ClientStats, StatsSnapshot};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User agent string used in HTTP requests.
pub fn user_agent() -> String {
    format!("massive-optprob/{}", VERSION)
}
