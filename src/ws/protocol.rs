//! WebSocket protocol messages and subscription types.
//!
//! This module defines the message formats used to talk to the quote
//! transport: authentication, subscribe/unsubscribe, and the per-ticker
//! option-quote topic naming scheme.

use serde::Serialize;
use smol_str::SmolStr;

/// Subscription topic for the quote feed.
///
/// Subscriptions follow a `{type}.{symbol}` format.
///
/// # Example
///
/// ```
/// use massive_optprob::ws::Subscription;
///
/// let quote_sub = Subscription::quote("NVDA");
/// assert_eq!(quote_sub.as_str(), "Q.NVDA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription(SmolStr);

impl Subscription {
    /// Option-quote subscription for an underlying ticker: `Q.{symbol}`.
    pub fn quote(symbol: &str) -> Self {
        Self(SmolStr::new(format!("Q.{}", symbol)))
    }

    /// Subscribe to all option quotes: `Q.*`.
    pub fn all_quotes() -> Self {
        Self(SmolStr::new_static("Q.*"))
    }

    /// Create from a raw subscription string.
    pub fn raw(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Get the subscription string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Subscription {
    fn from(s: &str) -> Self {
        Self::raw(s)
    }
}

impl From<String> for Subscription {
    fn from(s: String) -> Self {
        Self::raw(s)
    }
}

/// Authentication message sent to the WebSocket server.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct WsAuthMessage {
    /// Action type (always "auth")
    pub action: String,
    /// API key
    pub params: String,
}

impl WsAuthMessage {
    /// Create a new authentication message.
    pub fn new(api_key: &str) -> Self {
        Self {
            action: "auth".to_string(),
            params: api_key.to_string(),
        }
    }
}

/// Subscribe/unsubscribe message sent to the WebSocket server.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct WsSubscribeMessage {
    /// Action type ("subscribe" or "unsubscribe")
    pub action: String,
    /// Comma-separated list of subscriptions
    pub params: String,
}

impl WsSubscribeMessage {
    /// Create a subscribe message.
    pub fn subscribe(topics: &[Subscription]) -> Self {
        Self {
            action: "subscribe".to_string(),
            params: topics
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Create an unsubscribe message.
    pub fn unsubscribe(topics: &[Subscription]) -> Self {
        Self {
            action: "unsubscribe".to_string(),
            params: topics
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_quote() {
        let sub = Subscription::quote("NVDA");
        assert_eq!(sub.as_str(), "Q.NVDA");
        assert_eq!(format!("{}", sub), "Q.NVDA");
    }

    #[test]
    fn test_subscription_wildcard() {
        assert_eq!(Subscription::all_quotes().as_str(), "Q.*");
    }

    #[test]
    fn test_subscription_raw() {
        let sub = Subscription::raw("status");
        assert_eq!(sub.as_str(), "status");
    }

    #[test]
    fn test_subscription_from_str() {
        let sub: Subscription = "Q.NVDA".into();
        assert_eq!(sub.as_str(), "Q.NVDA");
    }

    #[test]
    fn test_subscription_equality() {
        let a = Subscription::quote("NVDA");
        let b = Subscription::quote("NVDA");
        let c = Subscription::quote("MSFT");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_auth_message_serialize() {
        let msg = WsAuthMessage::new("my-api-key");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"action\":\"auth\""));
        assert!(json.contains("\"params\":\"my-api-key\""));
    }

    #[test]
    fn test_subscribe_message() {
        let subs = vec![Subscription::quote("NVDA"), Subscription::quote("MSFT")];
        let msg = WsSubscribeMessage::subscribe(&subs);
        assert_eq!(msg.action, "subscribe");
        assert_eq!(msg.params, "Q.NVDA,Q.MSFT");
    }

    #[test]
    fn test_unsubscribe_message() {
        let subs = vec![Subscription::quote("NVDA")];
        let msg = WsSubscribeMessage::unsubscribe(&subs);
        assert_eq!(msg.action, "unsubscribe");
        assert_eq!(msg.params, "Q.NVDA");
    }
}
