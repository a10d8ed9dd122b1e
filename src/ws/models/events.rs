//! WebSocket event types.
//!
//! This module defines the event shapes received from the quote
//! transport: a connection/auth status message and an option-quote
//! NBBO update.

use crate::util::Symbol;
use serde::Deserialize;

/// Unified WebSocket event enum.
///
/// Events are parsed into this enum based on the `ev` field in the JSON
/// message. Event types outside these two are forwarded as [`WsEvent::Unknown`]
/// rather than failing the parse, so a new topic on the feed never breaks the
/// listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "ev")]
pub enum WsEvent {
    /// Connection/authentication status message.
    #[serde(rename = "status")]
    Status(WsStatusEvent),

    /// Option-quote event (NBBO).
    #[serde(rename = "Q")]
    Quote(WsQuoteEvent),

    /// Unknown event type (forward compatibility).
    #[serde(other)]
    Unknown,
}

/// Status/control message.
///
/// Sent for connection status updates and authentication results.
#[derive(Debug, Clone, Deserialize)]
pub struct WsStatusEvent {
    /// Status string (e.g., "connected", "auth_success", "auth_failed")
    pub status: String,

    /// Optional message with details
    pub message: Option<String>,
}

impl WsStatusEvent {
    /// Check if this is an authentication success message.
    pub fn is_auth_success(&self) -> bool {
        self.status == "auth_success"
    }

    /// Check if this is an authentication failure message.
    pub fn is_auth_failed(&self) -> bool {
        self.status == "auth_failed"
    }

    /// Check if this is a connection status message.
    pub fn is_connected(&self) -> bool {
        self.status == "connected"
    }
}

/// Option-quote event (NBBO).
///
/// `sym` carries the OCC option identifier, not the underlying ticker.
#[derive(Debug, Clone, Deserialize)]
pub struct WsQuoteEvent {
    /// OCC option identifier.
    pub sym: Symbol,

    /// Bid price.
    pub bp: f64,

    /// Bid size (lots).
    pub bs: u64,

    /// Ask price.
    pub ap: f64,

    /// Ask size (lots).
    /// Note: renamed from "as" which is a Rust keyword.
    #[serde(rename = "as")]
    pub ask_size: u64,

    /// SIP timestamp (Unix milliseconds).
    pub t: i64,
}

impl WsQuoteEvent {
    /// Calculate the bid-ask spread.
    pub fn spread(&self) -> f64 {
        self.ap - self.bp
    }

    /// Calculate the mid price.
    pub fn mid(&self) -> f64 {
        (self.bp + self.ap) / 2.0
    }
}

/// Parse a WebSocket message (handles both single events and arrays).
///
/// The feed can send either a single event object or an array of events
/// in one message. This function handles both cases.
pub fn parse_ws_message(text: &str) -> Result<Vec<WsEvent>, serde_json::Error> {
    let trimmed = text.trim();

    if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)
    } else {
        let event: WsEvent = serde_json::from_str(trimmed)?;
        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_event() {
        let json = r#"{"ev":"status","status":"auth_success","message":"authenticated"}"#;
        let events = parse_ws_message(json).unwrap();

        assert_eq!(events.len(), 1);
        match &events[0] {
            WsEvent::Status(status) => {
                assert!(status.is_auth_success());
                assert_eq!(status.message, Some("authenticated".to_string()));
            }
            _ => panic!("Expected Status event"),
        }
    }

    #[test]
    fn test_parse_quote_event() {
        let json = r#"{"ev":"Q","sym":"O:NVDA251219C00150000","bp":5.00,"bs":10,"ap":5.20,"as":12,"t":1703001234567}"#;
        let events = parse_ws_message(json).unwrap();

        assert_eq!(events.len(), 1);
        match &events[0] {
            WsEvent::Quote(quote) => {
                assert_eq!(quote.sym.as_str(), "O:NVDA251219C00150000");
                assert_eq!(quote.bp, 5.00);
                assert_eq!(quote.ap, 5.20);
                assert!((quote.spread() - 0.20).abs() < 0.001);
                assert!((quote.mid() - 5.10).abs() < 0.001);
            }
            _ => panic!("Expected Quote event"),
        }
    }

    #[test]
    fn test_parse_array_of_events() {
        let json = r#"[{"ev":"status","status":"connected"},{"ev":"Q","sym":"O:NVDA251219C00150000","bp":5.00,"bs":10,"ap":5.20,"as":12,"t":1703001234567}]"#;
        let events = parse_ws_message(json).unwrap();

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], WsEvent::Status(_)));
        assert!(matches!(&events[1], WsEvent::Quote(_)));
    }

    #[test]
    fn test_parse_unknown_event() {
        let json = r#"{"ev":"UNKNOWN_TYPE","foo":"bar"}"#;
        let events = parse_ws_message(json).unwrap();

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], WsEvent::Unknown));
    }
}
