//! HTTP client for the Google Places web service.
//!
//! Wraps `reqwest` with the API key, a configurable base URL, retry on
//! transient failures, and typed response deserialization.

use std::fmt;
use std::time::Duration;

use barhop_core::Coordinate;
use reqwest::{Client, Url};

use crate::error::PlacesError;
use crate::normalize::{nearby_place, NearbyPlace};
use crate::retry::retry_with_backoff;
use crate::types::{DetailsResponse, NearbySearchResponse, PlaceDetails, PlaceResult};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";
const NEARBY_SEARCH_PATH: &str = "maps/api/place/nearbysearch/json";
const DETAILS_PATH: &str = "maps/api/place/details/json";
const PHOTO_PATH: &str = "maps/api/place/photo";
const DETAILS_FIELDS: &str = "place_id,name,formatted_address,formatted_phone_number,website,\
geometry,opening_hours,rating,user_ratings_total,photos,price_level,types,business_status";

/// One nearby-search query shape, e.g. `type=bar` or `keyword=pub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStrategy {
    pub param: &'static str,
    pub value: &'static str,
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.param, self.value)
    }
}

/// Strategies tried in order until one returns results.
pub const SEARCH_STRATEGIES: [SearchStrategy; 5] = [
    SearchStrategy {
        param: "type",
        value: "bar",
    },
    SearchStrategy {
        param: "type",
        value: "night_club",
    },
    SearchStrategy {
        param: "keyword",
        value: "bar",
    },
    SearchStrategy {
        param: "keyword",
        value: "pub",
    },
    SearchStrategy {
        param: "keyword",
        value: "restaurant",
    },
];

/// Client for the Google Places API.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl PlacesClient {
    /// Creates a client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("barhop/0.1")
            .build()?;

        // A single trailing slash makes `Url::join` append paths instead of
        // replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
            max_retries: 0,
            retry_backoff_ms: 0,
        })
    }

    /// Retries transient failures up to `max_retries` extra times.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, retry_backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff_ms = retry_backoff_ms;
        self
    }

    /// Finds bars around `origin`, trying each of [`SEARCH_STRATEGIES`] in
    /// order. The first strategy answering `OK` with at least one result
    /// wins and is truncated to `max_results`.
    ///
    /// Failures of individual strategies are logged and skipped; when none
    /// succeeds the result is empty.
    pub async fn nearby_search(
        &self,
        origin: &Coordinate,
        radius_m: u32,
        max_results: usize,
    ) -> Vec<NearbyPlace> {
        tracing::info!(
            latitude = origin.latitude,
            longitude = origin.longitude,
            radius_m,
            "searching for bars nearby"
        );

        for strategy in SEARCH_STRATEGIES {
            match self.search_with(strategy, origin, radius_m).await {
                Ok(results) if !results.is_empty() => {
                    tracing::info!(
                        strategy = %strategy,
                        count = results.len(),
                        "places found"
                    );
                    return results
                        .iter()
                        .filter_map(|r| {
                            nearby_place(r, |reference, width| self.photo_url(reference, width))
                        })
                        .take(max_results)
                        .collect();
                }
                Ok(_) => {
                    tracing::debug!(
                        strategy = %strategy,
                        "no places for strategy"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        strategy = %strategy,
                        error = %e,
                        "places search strategy failed"
                    );
                }
            }
        }

        tracing::info!("no places found with any search strategy");
        Vec::new()
    }

    /// Runs a single nearby search. `ZERO_RESULTS` is an empty success.
    async fn search_with(
        &self,
        strategy: SearchStrategy,
        origin: &Coordinate,
        radius_m: u32,
    ) -> Result<Vec<PlaceResult>, PlacesError> {
        let location = format!("{},{}", origin.latitude, origin.longitude);
        let radius = radius_m.to_string();
        let url = self.build_url(
            NEARBY_SEARCH_PATH,
            &[
                ("location", &location),
                ("radius", &radius),
                (strategy.param, strategy.value),
            ],
        );

        let body = retry_with_backoff(self.max_retries, self.retry_backoff_ms, || {
            self.request_checked(&url)
        })
        .await?;

        let response: NearbySearchResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("nearbysearch({strategy})"),
                source: e,
            })?;

        match response.status.as_str() {
            "OK" => Ok(response.results),
            "ZERO_RESULTS" => Ok(Vec::new()),
            other => {
                if let Some(message) = &response.error_message {
                    tracing::debug!(status = other, message = %message, "places search rejected");
                }
                Err(PlacesError::ApiStatus(other.to_owned()))
            }
        }
    }

    /// Looks up full details for one place.
    ///
    /// Returns `Ok(None)` unless the API answers `OK` with a result.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, PlacesError> {
        let url = self.build_url(
            DETAILS_PATH,
            &[("place_id", place_id), ("fields", DETAILS_FIELDS)],
        );

        let body = retry_with_backoff(self.max_retries, self.retry_backoff_ms, || {
            self.request_json(&url)
        })
        .await?;

        let response: DetailsResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("details(place_id={place_id})"),
                source: e,
            })?;

        if response.status != "OK" {
            tracing::info!(place_id, status = %response.status, "place details unavailable");
            return Ok(None);
        }
        Ok(response.result)
    }

    /// URL of a place photo scaled to `max_width` pixels.
    #[must_use]
    pub fn photo_url(&self, photo_reference: &str, max_width: u32) -> String {
        let width = max_width.to_string();
        self.build_url(
            PHOTO_PATH,
            &[("maxwidth", &width), ("photoreference", photo_reference)],
        )
        .into()
    }

    /// Joins `path` onto the base URL and appends percent-encoded query
    /// parameters followed by the API key.
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{path}", self.base_url.path()));
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    /// Like [`Self::request_json`], but surfaces the transient
    /// `UNKNOWN_ERROR` status as an error so it is retried.
    async fn request_checked(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        let body = self.request_json(url).await?;
        if body.get("status").and_then(serde_json::Value::as_str) == Some("UNKNOWN_ERROR") {
            return Err(PlacesError::ApiStatus("UNKNOWN_ERROR".to_owned()));
        }
        Ok(body)
    }

    /// Sends a GET request, asserts a 2xx status, and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] on network failure or a non-2xx status.
    /// Returns [`PlacesError::Deserialize`] if the body is not valid JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
