//! OpenRouteService HTTP client.
//!
//! Provides async directions requests and keeps track of the remaining
//! request quota reported in response headers.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::domain::{Location, Profile, RouteLeg};

use super::error::RoutingError;
use super::provider::RoutingProvider;
use super::types::{DirectionsRequest, DirectionsResponse};

/// Default base URL for the OpenRouteService API.
const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Response header carrying the remaining quota.
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Response header carrying when the quota window resets.
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Reset values at or above this are Unix timestamps, smaller ones are
/// seconds from now.
const RESET_EPOCH_THRESHOLD: i64 = 1_000_000_000;

/// Default lifetime of an observed quota without a reset header.
const DEFAULT_QUOTA_TTL_SECS: u64 = 60;

/// A quota value reported by the API and how long it holds.
#[derive(Debug, Clone, Copy, PartialEq)]
struct QuotaObservation {
    remaining: u32,
    valid_until: DateTime<Utc>,
}

/// Configuration for the OpenRouteService client.
#[derive(Debug, Clone)]
pub struct OrsConfig {
    /// API key, sent in the `Authorization` header
    pub api_key: String,
    /// Base URL for the API (defaults to the public ORS endpoint)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Seconds an observed quota is trusted when the API does not say when
    /// it resets
    pub quota_ttl_secs: u64,
}

impl OrsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            quota_ttl_secs: DEFAULT_QUOTA_TTL_SECS,
        }
    }

    /// Set a custom base URL (for self-hosted instances or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set how long an observed quota is trusted without a reset header.
    pub fn with_quota_ttl(mut self, secs: u64) -> Self {
        self.quota_ttl_secs = secs;
        self
    }
}

/// OpenRouteService directions client.
///
/// Uses a semaphore to limit concurrent requests so that a wide pair search
/// does not trip the provider's per-second rate limiter. Clones share the
/// semaphore and the observed quota.
#[derive(Debug, Clone)]
pub struct OrsClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
    quota: Arc<Mutex<Option<QuotaObservation>>>,
    quota_ttl: TimeDelta,
}

impl OrsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: OrsConfig) -> Result<Self, RoutingError> {
        if config.api_key.trim().is_empty() {
            return Err(RoutingError::NotConfigured(
                "OpenRouteService API key is empty".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| RoutingError::Api {
                status: 0,
                message: "Invalid API key format".to_string(),
            })?;
        headers.insert(AUTHORIZATION, api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            quota: Arc::new(Mutex::new(None)),
            quota_ttl: i64::try_from(config.quota_ttl_secs)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .unwrap_or(TimeDelta::MAX),
        })
    }

    /// Request a two-point route.
    pub async fn directions(
        &self,
        from: Location,
        to: Location,
        profile: Profile,
    ) -> Result<RouteLeg, RoutingError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RoutingError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/v2/directions/{}/geojson", self.base_url, profile.as_ors());

        let response = self
            .http
            .post(&url)
            .json(&DirectionsRequest::between(from, to))
            .send()
            .await?;

        let status = response.status();
        let now = Utc::now();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let until = self.record_quota_at(response.headers(), Some(0), now);
            warn!(%until, "OpenRouteService quota exhausted");
            return Err(RoutingError::QuotaExhausted);
        }
        self.record_quota_at(response.headers(), parse_remaining(response.headers()), now);

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(RoutingError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RoutingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let directions: DirectionsResponse =
            serde_json::from_str(&body).map_err(|e| RoutingError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        directions
            .into_leg()
            .ok_or(RoutingError::NoRoute { from, to })
    }

    /// The last quota value reported by the API, until its window resets.
    ///
    /// An expired value reads as unknown.
    pub fn observed_quota(&self) -> Option<u32> {
        self.observed_quota_at(Utc::now())
    }

    fn observed_quota_at(&self, now: DateTime<Utc>) -> Option<u32> {
        let quota = self.quota.lock().unwrap_or_else(PoisonError::into_inner);
        quota
            .filter(|observed| now < observed.valid_until)
            .map(|observed| observed.remaining)
    }

    /// Store `remaining`, valid until the reset the API announced or for
    /// the configured TTL. `None` leaves the last observation in place.
    fn record_quota_at(
        &self,
        headers: &HeaderMap,
        remaining: Option<u32>,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let valid_until = parse_reset(headers, now).unwrap_or_else(|| {
            now.checked_add_signed(self.quota_ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });

        if let Some(remaining) = remaining {
            debug!(remaining, %valid_until, "OpenRouteService quota");
            let mut quota = self.quota.lock().unwrap_or_else(PoisonError::into_inner);
            *quota = Some(QuotaObservation {
                remaining,
                valid_until,
            });
        }
        valid_until
    }
}

impl RoutingProvider for OrsClient {
    async fn route(
        &self,
        from: Location,
        to: Location,
        profile: Profile,
    ) -> Result<RouteLeg, RoutingError> {
        self.directions(from, to, profile).await
    }

    async fn remaining_quota(&self) -> Option<u32> {
        self.observed_quota()
    }
}

/// Parse the quota reset header, either a Unix timestamp or seconds from
/// `now`. Malformed values are ignored.
fn parse_reset(headers: &HeaderMap, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let value: i64 = headers
        .get(RATE_LIMIT_RESET)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;

    if value >= RESET_EPOCH_THRESHOLD {
        DateTime::from_timestamp(value, 0)
    } else {
        now.checked_add_signed(TimeDelta::try_seconds(value.max(0))?)
    }
}

/// Parse the remaining-quota header, ignoring malformed values.
fn parse_remaining(headers: &HeaderMap) -> Option<u32> {
    headers
        .get(RATE_LIMIT_REMAINING)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = OrsConfig::new("test-key")
            .with_base_url("http://localhost:8080/ors")
            .with_max_concurrent(10)
            .with_timeout(60);

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080/ors");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn config_defaults() {
        let config = OrsConfig::new("test-key");

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.quota_ttl_secs, 60);
    }

    #[test]
    fn client_creation() {
        let client = OrsClient::new(OrsConfig::new("test-key")).unwrap();
        assert_eq!(client.observed_quota(), None);
    }

    #[test]
    fn empty_key_is_rejected() {
        let result = OrsClient::new(OrsConfig::new("  "));
        assert!(matches!(result, Err(RoutingError::NotConfigured(_))));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client =
            OrsClient::new(OrsConfig::new("k").with_base_url("http://localhost:8080/")).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn parse_remaining_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_remaining(&headers), None);

        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from_static("1987"));
        assert_eq!(parse_remaining(&headers), Some(1987));

        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from_static("lots"));
        assert_eq!(parse_remaining(&headers), None);
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000 + secs, 0).unwrap()
    }

    fn remaining(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn records_observed_quota() {
        let client = OrsClient::new(OrsConfig::new("test-key")).unwrap();

        let headers = remaining("42");
        client.record_quota_at(&headers, parse_remaining(&headers), at(0));
        assert_eq!(client.observed_quota_at(at(1)), Some(42));

        // Responses without the header leave the last value in place.
        client.record_quota_at(&HeaderMap::new(), None, at(2));
        assert_eq!(client.observed_quota_at(at(3)), Some(42));

        // Clones observe the same quota.
        let clone = client.clone();
        let headers = remaining("0");
        clone.record_quota_at(&headers, parse_remaining(&headers), at(4));
        assert_eq!(client.observed_quota_at(at(5)), Some(0));
    }

    #[test]
    fn zero_quota_expires_after_ttl() {
        let client = OrsClient::new(OrsConfig::new("test-key").with_quota_ttl(60)).unwrap();

        // A rejected request without a reset header.
        client.record_quota_at(&HeaderMap::new(), Some(0), at(0));

        assert_eq!(client.observed_quota_at(at(30)), Some(0));
        assert_eq!(client.observed_quota_at(at(60)), None);
        assert_eq!(client.observed_quota_at(at(3600)), None);
    }

    #[test]
    fn quota_holds_until_announced_reset() {
        let client = OrsClient::new(OrsConfig::new("test-key").with_quota_ttl(60)).unwrap();

        let mut headers = remaining("0");
        let reset = at(600).timestamp().to_string();
        headers.insert(RATE_LIMIT_RESET, HeaderValue::from_str(&reset).unwrap());
        client.record_quota_at(&headers, parse_remaining(&headers), at(0));

        assert_eq!(client.observed_quota_at(at(300)), Some(0));
        assert_eq!(client.observed_quota_at(at(601)), None);
    }

    #[test]
    fn parse_reset_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_reset(&headers, at(0)), None);

        headers.insert(RATE_LIMIT_RESET, HeaderValue::from_static("45"));
        assert_eq!(parse_reset(&headers, at(0)), Some(at(45)));

        headers.insert(RATE_LIMIT_RESET, HeaderValue::from_static("1750000900"));
        assert_eq!(parse_reset(&headers, at(0)), Some(at(900)));

        headers.insert(RATE_LIMIT_RESET, HeaderValue::from_static("tomorrow"));
        assert_eq!(parse_reset(&headers, at(0)), None);
    }
}
