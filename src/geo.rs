//! Demographic (geolocation) lookup for report enrichment.
//!
//! Lookups go to an ip-api.com compatible JSON endpoint
//! (`GET {base}{address}`). Every failure - timeout, HTTP error, malformed
//! body, `"status": "fail"` - degrades to [`Lookup::Unavailable`]; nothing
//! here aborts a run.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Endpoint used when no lookup URL is configured.
pub const DEFAULT_GEO_URL: &str = "http://ip-api.com/json/";

/// Location data for one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demographic {
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Demographic),
    Unavailable,
}

impl Lookup {
    pub fn demographic(&self) -> Option<&Demographic> {
        match self {
            Self::Found(d) => Some(d),
            Self::Unavailable => None,
        }
    }
}

/// Anything that can answer a demographic query synchronously.
pub trait DemographicLookup {
    fn lookup(&self, address: &str) -> Lookup;
}

/// Pre-resolved lookups. Addresses that were never resolved are unavailable.
#[derive(Debug, Clone, Default)]
pub struct DemographicTable {
    entries: HashMap<String, Lookup>,
}

impl DemographicTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: impl Into<String>, lookup: Lookup) {
        self.entries.insert(address.into(), lookup);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of addresses whose lookup failed.
    pub fn unavailable_count(&self) -> usize {
        self.entries
            .values()
            .filter(|l| matches!(l, Lookup::Unavailable))
            .count()
    }
}

impl DemographicLookup for DemographicTable {
    fn lookup(&self, address: &str) -> Lookup {
        self.entries
            .get(address)
            .cloned()
            .unwrap_or(Lookup::Unavailable)
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    country: Option<String>,
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Decode an ip-api style response body.
pub fn parse_response(body: &str) -> Result<Demographic> {
    let response: GeoResponse =
        serde_json::from_str(body).context("Failed to parse geolocation response")?;

    if let Some(status) = response.status.as_deref() {
        if status != "success" {
            return Err(anyhow!(
                "Geolocation lookup failed: {}",
                response.message.as_deref().unwrap_or(status)
            ));
        }
    }

    let country = response
        .country
        .ok_or_else(|| anyhow!("Geolocation response has no country"))?;

    Ok(Demographic {
        country,
        city: response.city.unwrap_or_default(),
        latitude: response.lat.unwrap_or_default(),
        longitude: response.lon.unwrap_or_default(),
    })
}

/// HTTP client for the geolocation endpoint.
#[derive(Debug, Clone)]
pub struct GeoClient {
    base_url: String,
    client: Client,
    concurrency: usize,
}

impl GeoClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, concurrency: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            base_url,
            client,
            concurrency: concurrency.max(1),
        })
    }

    /// Build from CLI options; without a URL the default endpoint is used.
    ///
    /// `LOGSIFT_GEO_URL` is resolved by the CLI layer, not here.
    pub fn from_options(geo_url: Option<&str>, timeout_ms: u64, concurrency: usize) -> Result<Self> {
        let base_url = geo_url.unwrap_or(DEFAULT_GEO_URL);

        Self::new(base_url, Duration::from_millis(timeout_ms), concurrency)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, address: &str) -> Result<Demographic> {
        let url = format!("{}{}", self.base_url, address);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send geolocation request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read geolocation response body")?;

        if !status.is_success() {
            return Err(anyhow!("Geolocation request failed with status {}", status));
        }

        parse_response(&body)
    }

    /// Look up one address; failures become [`Lookup::Unavailable`].
    pub async fn lookup(&self, address: &str) -> Lookup {
        match self.fetch(address).await {
            Ok(demographic) => Lookup::Found(demographic),
            Err(e) => {
                debug!(address, error = %e, "Demographic lookup unavailable");
                Lookup::Unavailable
            }
        }
    }

    /// Resolve many addresses with bounded concurrency.
    pub async fn resolve_all<I>(&self, addresses: I) -> DemographicTable
    where
        I: IntoIterator<Item = String>,
    {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for address in addresses {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let client = self.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let lookup = client.lookup(&address).await;
                (address, lookup)
            });
        }

        let mut table = DemographicTable::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((address, lookup)) => table.insert(address, lookup),
                Err(e) => warn!(error = %e, "Demographic lookup task failed"),
            }
        }

        info!(
            resolved = table.len() - table.unavailable_count(),
            unavailable = table.unavailable_count(),
            "Demographic lookups complete"
        );
        table
    }
}
