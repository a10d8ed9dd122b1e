//! Paginated fetcher for the Polymarket Gamma events API.

use crate::config::FetchConfig;
use crate::error::EngineError;
use crate::models::{EventMetadata, MarketMetadata};
use crate::util::{is_recognized_ticker, symbol};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, trace, warn};

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Will .+ \((?P<ticker>[A-Z]+)\) finish week of .+ above___\?$")
            .expect("ticker pattern is valid")
    })
}

fn strike_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^Will .+ \([A-Z]+\) finish week of .+ above \$?(?P<strike>[\d.]+)\?$")
            .expect("strike pattern is valid")
    })
}

#[derive(Debug, Deserialize)]
struct GammaPage {
    #[serde(default)]
    events: Vec<GammaEvent>,
}

#[derive(Debug, Deserialize)]
struct GammaEvent {
    title: String,
    #[serde(rename = "endDate")]
    end_date: String,
    #[serde(default)]
    markets: Vec<GammaMarket>,
}

#[derive(Debug, Deserialize)]
struct GammaMarket {
    question: String,
    #[serde(rename = "clobTokenIds")]
    clob_token_ids: Option<String>,
    #[serde(rename = "outcomePrices")]
    outcome_prices: Option<String>,
    #[serde(rename = "negRisk")]
    neg_risk: Option<bool>,
    #[serde(rename = "orderPriceMinTickSize")]
    tick_size: Option<String>,
}

/// Fetch every open Polymarket event whose end date falls on or before
/// December 31 of `year`, paginating through the Gamma API, and parse out
/// the events whose title names one of the recognized underlying tickers.
pub async fn fetch_events(
    client: &reqwest::Client,
    config: &FetchConfig,
    year: i32,
) -> Result<Vec<EventMetadata>, EngineError> {
    let end_date_max = format!("{year}-12-31T23:59:59Z");
    let mut offset: u32 = 0;
    let mut events = Vec::new();

    loop {
        let mut url = config.base_url.join("events").map_err(EngineError::Url)?;
        url.query_pairs_mut()
            .append_pair("closed", "false")
            .append_pair("end_date_max", &end_date_max)
            .append_pair("limit", &config.page_size.to_string())
            .append_pair("offset", &offset.to_string());

        trace!(%url, offset, "fetching Gamma events page");
        let response = client
            .get(url)
            .timeout(config.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Gamma events page returned non-success status");
            return Err(EngineError::HttpStatus { status, body });
        }

        let body = response.text().await?;
        let page: Vec<GammaEvent> = parse_page(&body)?;
        let page_len = page.len();

        for raw in page {
            if let Some(parsed) = parse_event(raw) {
                events.push(parsed);
            }
        }

        if page_len < config.page_size as usize {
            break;
        }
        offset += config.page_size;
    }

    debug!(count = events.len(), "parsed recognized-ticker events");
    Ok(events)
}

fn parse_page(body: &str) -> Result<Vec<GammaEvent>, EngineError> {
    if let Ok(events) = serde_json::from_str::<Vec<GammaEvent>>(body) {
        return Ok(events);
    }
    serde_json::from_str::<GammaPage>(body)
        .map(|page| page.events)
        .map_err(|source| EngineError::Deserialize {
            source,
            body_snippet: body.chars().take(200).collect(),
        })
}

fn parse_event(raw: GammaEvent) -> Option<EventMetadata> {
    let ticker_match = ticker_pattern().captures(&raw.title)?;
    let ticker_str = ticker_match.name("ticker")?.as_str();
    if !is_recognized_ticker(ticker_str) {
        return None;
    }

    let markets: Vec<MarketMetadata> = raw
        .markets
        .into_iter()
        .filter_map(parse_market)
        .collect();
    if markets.is_empty() {
        return None;
    }

    Some(EventMetadata {
        ticker: symbol(ticker_str),
        end_date: raw.end_date,
        markets,
    })
}

fn parse_market(raw: GammaMarket) -> Option<MarketMetadata> {
    let strike_match = strike_pattern().captures(&raw.question)?;
    let strike: f64 = strike_match
        .name("strike")?
        .as_str()
        .replace(',', "")
        .parse()
        .ok()?;

    let clob_token_ids = raw
        .clob_token_ids
        .as_deref()
        .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .unwrap_or_default();
    let [yes_tok, no_tok] = match clob_token_ids.as_slice() {
        [a, b] => [a.clone(), b.clone()],
        _ => [String::new(), String::new()],
    };

    let outcome_prices = raw
        .outcome_prices
        .as_deref()
        .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .unwrap_or_default();
    let yes_price = outcome_prices.first().and_then(|s| s.parse().ok());
    let no_price = outcome_prices.get(1).and_then(|s| s.parse().ok());

    Some(MarketMetadata {
        strike,
        clob_token_ids: [yes_tok, no_tok],
        yes_price,
        no_price,
        tick_size: raw.tick_size,
        neg_risk: raw.neg_risk,
    })
}
