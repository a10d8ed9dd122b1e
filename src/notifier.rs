//! Discord webhook notifier.
//!
//! Posts a short formatted message when the driver finishes a prediction
//! run. Entirely best-effort: transport errors are logged and swallowed,
//! never propagated, and the notifier no-ops when no webhook is configured.

use crate::config::NotifierConfig;
use crate::models::ExpiryPredictions;
use tracing::{debug, warn};

/// Posts prediction summaries to a Discord webhook, if one is configured.
pub struct Notifier {
    config: NotifierConfig,
    client: reqwest::Client,
}

impl Notifier {
    /// Build a notifier from configuration.
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Whether a webhook URL is configured.
    pub fn is_enabled(&self) -> bool {
        self.config.webhook_url.is_some()
    }

    /// Send a formatted summary of `predictions` for `ticker`.
    ///
    /// No-ops if no webhook URL is configured. Any transport failure is
    /// logged and discarded; callers never see a notification error.
    pub async fn notify(&self, ticker: &str, predictions: &[ExpiryPredictions]) {
        let Some(url) = self.config.webhook_url.as_deref() else {
            debug!("no webhook configured, skipping notification");
            return;
        };

        let content = format_summary(ticker, predictions);
        let body = serde_json::json!({ "content": content });

        let result = self
            .client
            .post(url)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(ticker, "posted notification");
            }
            Ok(response) => {
                warn!(ticker, status = %response.status(), "webhook rejected notification");
            }
            Err(e) => {
                warn!(ticker, error = %e, "failed to deliver webhook notification");
            }
        }
    }
}

fn format_summary(ticker: &str, predictions: &[ExpiryPredictions]) -> String {
    let mut lines = vec![format!("**{ticker}** risk-neutral probability update")];
    for prediction in predictions {
        let confidence = prediction
            .confidence
            .map(|c| format!("{:.2}", c))
            .unwrap_or_else(|| "n/a".to_string());
        lines.push(format!(
            "- {} @ {:.2}: confidence {}",
            prediction.expiry, prediction.strike, confidence
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelPrediction;

    fn sample_prediction() -> ExpiryPredictions {
        ExpiryPredictions {
            expiry: chrono::NaiveDate::from_ymd_opt(2026, 1, 17).unwrap(),
            strike: 140.0,
            predictions: vec![ModelPrediction::absent("ratio")],
            confidence: Some(0.82),
            confidence_diagnostics: None,
            polymarket_prob: None,
        }
    }

    #[test]
    fn test_format_summary_includes_ticker_and_confidence() {
        let summary = format_summary("NVDA", &[sample_prediction()]);
        assert!(summary.contains("NVDA"));
        assert!(summary.contains("0.82"));
    }

    #[test]
    fn test_is_enabled_false_without_webhook() {
        let notifier = Notifier::new(NotifierConfig {
            webhook_url: None,
            timeout: std::time::Duration::from_secs(5),
        });
        assert!(!notifier.is_enabled());
    }

    #[tokio::test]
    async fn test_notify_noops_without_webhook() {
        let notifier = Notifier::new(NotifierConfig {
            webhook_url: None,
            timeout: std::time::Duration::from_secs(5),
        });
        notifier.notify("NVDA", &[sample_prediction()]).await;
    }
}
