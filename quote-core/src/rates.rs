use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::instruction::CurrencyCode;

/// One fetched snapshot of base-relative exchange rates.
///
/// Keys in `quotes` are `<BASE><CODE>` (e.g. `USDEUR`). A table with
/// `success == false` carries no quotes and must not be looked up.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub success: bool,
    /// Provider-reported epoch seconds.
    pub timestamp: i64,
    pub base: CurrencyCode,
    pub quotes: HashMap<String, f64>,
}

impl RateTable {
    pub fn new(base: CurrencyCode, timestamp: i64, quotes: HashMap<String, f64>) -> Self {
        Self {
            success: true,
            timestamp,
            base,
            quotes,
        }
    }

    /// Table returned when the provider could not be reached or decoded.
    pub fn unavailable(base: CurrencyCode) -> Self {
        Self {
            success: false,
            timestamp: 0,
            base,
            quotes: HashMap::new(),
        }
    }

    /// Base-relative rate for `code`; absent and zero entries are unknown.
    pub fn rate(&self, code: &CurrencyCode) -> Option<f64> {
        let key = format!("{}{}", self.base, code);
        self.quotes.get(&key).copied().filter(|r| *r != 0.0)
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.timestamp, 0).single()
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("pricing request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("pricing response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("pricing provider reported failure (code {code}): {info}")]
    Provider { code: i64, info: String },
}

/// Anything that can produce a fresh [`RateTable`].
///
/// Implementations never fail: errors are logged and reported as an
/// unavailable table.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> RateTable;
}

/// Client for the currencylayer `live` endpoint.
pub struct CurrencyLayer {
    client: reqwest::Client,
    url: String,
    access_key: String,
    base: CurrencyCode,
}

impl CurrencyLayer {
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        access_key: impl Into<String>,
        base: CurrencyCode,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            access_key: access_key.into(),
            base,
        }
    }

    pub async fn try_fetch(&self) -> Result<RateTable, FetchError> {
        let body = self
            .client
            .get(&self.url)
            .query(&[
                ("access_key", self.access_key.as_str()),
                ("source", self.base.as_str()),
                ("format", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_live(&body, &self.base)
    }
}

#[async_trait]
impl RateSource for CurrencyLayer {
    async fn fetch(&self) -> RateTable {
        match self.try_fetch().await {
            Ok(table) => {
                debug!(
                    base = %table.base,
                    quotes = table.quotes.len(),
                    observed_at = ?table.observed_at(),
                    "rate table fetched"
                );
                table
            }
            Err(e) => {
                warn!(error = %e, "rate table unavailable");
                RateTable::unavailable(self.base.clone())
            }
        }
    }
}

fn parse_live(data: &str, requested: &CurrencyCode) -> Result<RateTable, FetchError> {
    #[derive(Deserialize)]
    struct ProviderError {
        #[serde(default)]
        code: i64,
        #[serde(default)]
        info: String,
    }
    #[derive(Deserialize)]
    struct Resp {
        #[serde(default)]
        success: bool,
        #[serde(default)]
        timestamp: i64,
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        quotes: HashMap<String, f64>,
        #[serde(default)]
        error: Option<ProviderError>,
    }
    let resp: Resp = serde_json::from_str(data)?;
    if !resp.success {
        let (code, info) = resp
            .error
            .map(|e| (e.code, e.info))
            .unwrap_or((0, String::from("success flag not set")));
        return Err(FetchError::Provider { code, info });
    }
    let base = resp
        .source
        .filter(|s| !s.is_empty())
        .map(|s| CurrencyCode::new(&s))
        .unwrap_or_else(|| requested.clone());
    Ok(RateTable::new(base, resp.timestamp, resp.quotes))
}

/// Serves the last successful table from `inner` for up to `ttl`.
pub struct CachedRates<S> {
    inner: S,
    ttl: Duration,
    slot: Mutex<Option<(Instant, RateTable)>>,
}

impl<S: RateSource> CachedRates<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            slot: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<S: RateSource> RateSource for CachedRates<S> {
    async fn fetch(&self) -> RateTable {
        // The slot is never held across the upstream call.
        let fresh = {
            let slot = self.slot.lock().await;
            slot.as_ref()
                .filter(|(at, _)| at.elapsed() < self.ttl)
                .map(|(_, table)| table.clone())
        };
        if let Some(table) = fresh {
            return table;
        }
        let table = self.inner.fetch().await;
        if table.success {
            *self.slot.lock().await = Some((Instant::now(), table.clone()));
        }
        table
    }
}
