//! Command-line entrypoint: listen for live quotes, then print a prediction report.

use clap::Parser;
use massive_optprob::config::{DEFAULT_GAMMA_URL, FetchConfig, NotifierConfig};
use massive_optprob::driver::{render_report, run_predictions, DriverConfig};
use massive_optprob::notifier::Notifier;
use massive_optprob::store::fetch_events::fetch_events;
use massive_optprob::store::{EventStore, OptionStore};
use massive_optprob::util::is_recognized_ticker;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "predict")]
#[command(about = "Estimate risk-neutral probabilities from live option quotes")]
struct Cli {
    /// Underlying ticker to query.
    #[arg(long, default_value = "NVDA")]
    ticker: String,

    /// Strike to query. Evaluates every quoted strike per expiry when omitted.
    #[arg(long)]
    strike: Option<f64>,

    /// Only consider expiries within this many days.
    #[arg(long, default_value_t = 30)]
    days: i64,

    /// Seconds to listen for live quotes before evaluating the book.
    #[arg(long, default_value_t = 10)]
    listen_seconds: u64,

    /// Skip the WebSocket listener and evaluate whatever Gamma data is cached (none, if so).
    #[arg(long)]
    no_listen: bool,

    /// Skip the Discord notification even if a webhook is configured.
    #[arg(long)]
    no_notify: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if !is_recognized_ticker(&cli.ticker) {
        eprintln!("unrecognized ticker: {}", cli.ticker);
        return ExitCode::FAILURE;
    }

    let mut store = OptionStore::new();
    let mut events = EventStore::new();

    if let Err(e) = refresh_events(&mut events).await {
        tracing::warn!(error = %e, "failed to refresh prediction-market events, continuing without them");
    }

    #[cfg(feature = "ws")]
    if !cli.no_listen {
        if let Err(e) = listen_for_quotes(&cli, &mut store).await {
            tracing::warn!(error = %e, "quote listener failed, evaluating whatever was collected");
        }
    }
    #[cfg(not(feature = "ws"))]
    let _ = &cli.no_listen;

    let now = chrono::Utc::now();
    let predictions = run_predictions(
        &store,
        &events,
        &cli.ticker,
        cli.strike,
        cli.days,
        now,
        &DriverConfig::default(),
    );

    println!("{}", render_report(&cli.ticker, &predictions));

    if !cli.no_notify {
        let notifier = Notifier::new(NotifierConfig::default());
        notifier.notify(&cli.ticker, &predictions).await;
    }

    ExitCode::SUCCESS
}

async fn refresh_events(events: &mut EventStore) -> Result<(), massive_optprob::EngineError> {
    let client = reqwest::Client::builder()
        .user_agent(massive_optprob::user_agent())
        .build()?;
    let config = FetchConfig::default();
    let year = chrono::Utc::now().format("%Y").to_string().parse().unwrap_or(2026);
    let fetched = fetch_events(&client, &config, year).await?;
    events.replace(fetched);
    tracing::info!(base_url = DEFAULT_GAMMA_URL, count = events.len(), "refreshed prediction-market events");
    Ok(())
}

#[cfg(feature = "ws")]
async fn listen_for_quotes(
    cli: &Cli,
    store: &mut OptionStore,
) -> Result<(), massive_optprob::EngineError> {
    use massive_optprob::auth::ApiKey;
    use massive_optprob::config::ListenerConfig;
    use massive_optprob::listener::run_listener;
    use massive_optprob::metrics::ClientStats;
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    let api_key = ApiKey::from_env().ok_or_else(|| massive_optprob::EngineError::Configuration {
        message: "MASSIVE_API_KEY is not set".to_string(),
    })?;
    if api_key.is_empty() {
        return Err(massive_optprob::EngineError::Configuration {
            message: "MASSIVE_API_KEY is empty".to_string(),
        });
    }

    let config = ListenerConfig {
        api_key,
        ..ListenerConfig::default()
    };
    let (quote_tx, mut quote_rx) = mpsc::channel(1024);
    let stats = Arc::new(ClientStats::new());
    let cancel = CancellationToken::new();
    let tickers = Arc::new(vec![cli.ticker.clone()]);

    let listen_cancel = cancel.clone();
    let listen_stats = stats.clone();
    let listen_tickers = tickers.clone();
    let listener_handle = tokio::spawn(async move {
        run_listener(config, &listen_tickers, quote_tx, listen_stats, listen_cancel).await
    });

    let deadline = tokio::time::sleep(std::time::Duration::from_secs(cli.listen_seconds));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            quote = quote_rx.recv() => {
                match quote {
                    Some(quote) => {
                        if store.apply_quote(quote).is_none() {
                            stats.inc_quotes_rejected(1);
                        }
                    }
                    None => break,
                }
            }
        }
    }

    cancel.cancel();
    let _ = listener_handle.await;
    let snapshot = stats.snapshot();
    tracing::info!(
        quotes_received = snapshot.quotes_received,
        quotes_rejected = snapshot.quotes_rejected,
        parse_errors = snapshot.parse_errors,
        "listener session complete"
    );
    Ok(())
}
