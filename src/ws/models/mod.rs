//! WebSocket event models.
//!
//! This module contains types for parsing WebSocket events,
//! including trades, quotes, and aggregate bars.

pub mod events;
