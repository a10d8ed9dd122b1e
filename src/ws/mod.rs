//! WebSocket quote transport.
//!
//! This module provides streaming access to live option quotes via
//! WebSocket, with automatic reconnection and resubscribe-on-reconnect.

mod client;
pub mod models;
mod protocol;

pub use client::{ConnectionState, WsClient, WsHandle, WsMessageBatch, WsState, WsStats};
pub use models::events::WsEvent;
pub use protocol::Subscription;
