//! Configuration types for the estimation pipeline and its external collaborators.
//!
//! Each subsystem gets its own small config struct with a `Default` and a
//! builder-style `with_*` API, following the same shape the HTTP and
//! WebSocket clients in this crate use.

use std::time::Duration;
use url::Url;

/// Default Polymarket Gamma API base URL.
pub const DEFAULT_GAMMA_URL: &str = "https://gamma-api.polymarket.com";

/// Default HTTP request timeout for the prediction-market fetcher.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default Discord webhook delivery timeout.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Forward-price estimator configuration.
///
/// # Example
///
/// ```
/// use massive_optprob::config::ForwardConfig;
///
/// let config = ForwardConfig::default().with_trim_pct(0.05);
/// assert_eq!(config.trim_pct, 0.05);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardConfig {
    /// Discount factor applied to the put–call parity relation.
    pub discount: f64,

    /// Maximum bid/ask spread a strike's call and put may carry to be used
    /// as a forward candidate. `None` disables the filter.
    pub max_spread: Option<f64>,

    /// Fractional band around the median, within which candidate forwards
    /// survive trimming.
    pub trim_pct: f64,

    /// Minimum mid price (on either leg) for a strike to be used as a
    /// forward candidate.
    pub min_mid: f64,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            discount: 1.0,
            max_spread: None,
            trim_pct: 0.02,
            min_mid: 1e-6,
        }
    }
}

impl ForwardConfig {
    /// Set the discount factor.
    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    /// Set the maximum per-leg spread filter.
    pub fn with_max_spread(mut self, max_spread: f64) -> Self {
        self.max_spread = Some(max_spread);
        self
    }

    /// Set the minimum mid price for a usable candidate.
    pub fn with_min_mid(mut self, min_mid: f64) -> Self {
        self.min_mid = min_mid;
        self
    }

    /// Set the trim percentage.
    pub fn with_trim_pct(mut self, trim_pct: f64) -> Self {
        self.trim_pct = trim_pct;
        self
    }
}

/// Implied-volatility bisection inverter configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpliedVolConfig {
    /// Absolute price tolerance at which bisection stops.
    pub price_tolerance: f64,

    /// Maximum bisection iterations.
    pub max_iterations: u32,

    /// Initial volatility bracket, `(low, high)`.
    pub initial_bracket: (f64, f64),

    /// Maximum bracket expansions if the root is not initially bracketed.
    pub max_bracket_expansions: u32,
}

impl Default for ImpliedVolConfig {
    fn default() -> Self {
        Self {
            price_tolerance: 1e-8,
            max_iterations: 100,
            initial_bracket: (1e-6, 5.0),
            max_bracket_expansions: 10,
        }
    }
}

impl ImpliedVolConfig {
    /// Set the price tolerance.
    pub fn with_price_tolerance(mut self, tolerance: f64) -> Self {
        self.price_tolerance = tolerance;
        self
    }

    /// Set the maximum iteration count.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Confidence scorer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceConfig {
    /// Weight on agreement between the ratio and slope models.
    pub weight_agreement: f64,
    /// Weight on liquidity at the queried strike.
    pub weight_liquidity: f64,
    /// Weight on monotonicity of call mids near the queried strike.
    pub weight_monotonicity: f64,
    /// Weight on strike spacing near the queried strike.
    pub weight_spacing: f64,
    /// Relative spread above which the liquidity sub-score floors to zero.
    pub max_relative_spread: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            weight_agreement: 0.40,
            weight_liquidity: 0.30,
            weight_monotonicity: 0.20,
            weight_spacing: 0.10,
            max_relative_spread: 0.5,
        }
    }
}

impl ConfidenceConfig {
    /// Set the four sub-score weights. Callers are responsible for ensuring
    /// they sum to `1.0`; the scorer does not renormalize.
    pub fn with_weights(mut self, agreement: f64, liquidity: f64, monotonicity: f64, spacing: f64) -> Self {
        self.weight_agreement = agreement;
        self.weight_liquidity = liquidity;
        self.weight_monotonicity = monotonicity;
        self.weight_spacing = spacing;
        self
    }

    /// Set the maximum relative spread used by the liquidity sub-score.
    pub fn with_max_relative_spread(mut self, max_relative_spread: f64) -> Self {
        self.max_relative_spread = max_relative_spread;
        self
    }
}

/// Prediction-market fetcher configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Gamma API base URL.
    pub base_url: Url,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Page size for `limit`/`offset` pagination.
    pub page_size: u32,
    /// Interval between background refreshes of the event cache.
    pub refresh_interval: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_GAMMA_URL).expect("default URL is valid"),
            request_timeout: DEFAULT_FETCH_TIMEOUT,
            page_size: 500,
            refresh_interval: Duration::from_secs(300),
        }
    }
}

impl FetchConfig {
    /// Set the Gamma API base URL.
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = url;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

/// Discord webhook notifier configuration.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Webhook URL, if configured.
    pub webhook_url: Option<String>,
    /// Delivery timeout.
    pub timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: crate::auth::load_optional_secret("DISCORD_WEBHOOK_URL"),
            timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }
}

impl NotifierConfig {
    /// Set the webhook URL explicitly, overriding the credential lookup.
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Set the delivery timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Quote listener configuration (real-time WebSocket transport).
#[derive(Debug, Clone)]
#[cfg(feature = "ws")]
pub struct ListenerConfig {
    /// WebSocket URL.
    pub url: Url,
    /// API key for authentication.
    pub api_key: crate::auth::ApiKey,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Idle timeout before a ping is sent.
    pub idle_timeout: Duration,
    /// Reconnection configuration.
    pub reconnect: ReconnectConfig,
}

#[cfg(feature = "ws")]
impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("wss://socket.massive.com/options").expect("default URL is valid"),
            api_key: crate::auth::ApiKey::from_env().unwrap_or_default(),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
        }
    }
}

#[cfg(feature = "ws")]
impl ListenerConfig {
    /// Create a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: crate::auth::ApiKey::new(api_key),
            ..Default::default()
        }
    }

    /// Set the WebSocket URL.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }
}

/// Reconnection configuration for the quote listener's WebSocket transport.
#[derive(Debug, Clone)]
#[cfg(feature = "ws")]
pub struct ReconnectConfig {
    /// Enable automatic reconnection.
    pub enabled: bool,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum retry attempts (`None` = unlimited).
    pub max_retries: Option<u32>,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
}

#[cfg(feature = "ws")]
impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_retries: None,
            backoff_multiplier: 2.0,
        }
    }
}

#[cfg(feature = "ws")]
impl ReconnectConfig {
    /// Create a configuration that disables reconnection.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Calculate delay for given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_delay.as_millis() as f64
            * self
                .backoff_multiplier
                .powi(attempt.saturating_sub(1) as i32);

        Duration::from_millis(delay_ms.min(self.max_delay.as_millis() as f64) as u64)
    }

    /// Check if should retry.
    pub fn should_retry(&self, attempt: u32) -> bool {
        self.enabled && self.max_retries.map_or(true, |max| attempt < max)
    }
}
