//! Cancellable quote-ingestion task.
//!
//! Subscribes to the option-quote topic for a set of tickers, parses
//! incoming frames into [`QuoteEvent`]s, and forwards each one to the
//! store's single writer. Parse errors and individual transport hiccups
//! are logged and swallowed; the loop keeps running until cancelled or
//! the listener gives up reconnecting.

use crate::config::ListenerConfig;
use crate::error::EngineError;
use crate::metrics::ClientStats;
use crate::models::QuoteEvent;
use crate::util::UnixMs;
use crate::ws::{Subscription, WsClient, WsEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Runs the quote listener until `cancel` fires or the connection gives up
/// reconnecting, forwarding accepted [`QuoteEvent`]s on `quote_tx`.
///
/// This function owns the WebSocket connection; it does not touch the
/// store directly so the caller can run the single store writer on
/// whatever task/thread it prefers.
pub async fn run_listener(
    config: ListenerConfig,
    tickers: &[String],
    quote_tx: mpsc::Sender<QuoteEvent>,
    stats: Arc<ClientStats>,
    cancel: CancellationToken,
) -> Result<(), EngineError> {
    let client = WsClient::new(config)?;
    let (handle, mut stream) = client.connect().await?;

    let subs: Vec<Subscription> = tickers.iter().map(|t| Subscription::quote(t)).collect();
    handle.subscribe(&subs).await?;
    info!(tickers = ?tickers, "subscribed to quote topics");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("listener cancelled, closing connection");
                let _ = handle.close().await;
                return Ok(());
            }
            batch = futures::StreamExt::next(&mut stream) => {
                match batch {
                    Some(Ok(batch)) => {
                        for event in batch.events {
                            match event {
                                WsEvent::Quote(quote) => {
                                    stats.inc_quotes_received(1);
                                    let event = QuoteEvent {
                                        id: quote.sym.to_string(),
                                        bid: quote.bp,
                                        ask: quote.ap,
                                        ts: UnixMs::from_millis(quote.t),
                                    };
                                    if quote_tx.send(event).await.is_err() {
                                        warn!("store writer channel closed, stopping listener");
                                        return Ok(());
                                    }
                                }
                                WsEvent::Status(status) => {
                                    debug!(status = %status.status, "status event");
                                }
                                WsEvent::Unknown => {
                                    stats.inc_parse_errors();
                                }
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "listener transport error");
                        return Err(e);
                    }
                    None => {
                        info!("listener stream ended");
                        return Ok(());
                    }
                }
            }
        }
    }
}
