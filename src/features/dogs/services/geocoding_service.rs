use serde::Deserialize;
use std::time::Duration;

use crate::core::config::GeocodingConfig;
use crate::core::error::{AppError, Result};
use crate::shared::constants::{LOCATION_UNKNOWN, MAX_LOCATION_LENGTH};

/// Nominatim reverse lookup response
#[derive(Debug, Deserialize)]
pub struct NominatimReverseResponse {
    pub display_name: Option<String>,
    pub address: Option<NominatimAddress>,
    /// Set instead of a place when Nominatim cannot resolve the coordinates
    pub error: Option<String>,
}

/// Nominatim address components
#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl NominatimAddress {
    /// Get city, falling back to town or village
    pub fn get_city(&self) -> Option<String> {
        self.city
            .clone()
            .or_else(|| self.town.clone())
            .or_else(|| self.village.clone())
    }

    /// Short place name such as "Denpasar, Bali, Indonesia"
    pub fn place_name(&self) -> Option<String> {
        let parts: Vec<String> = [
            self.get_city().or_else(|| self.suburb.clone()),
            self.state.clone(),
            self.country.clone(),
        ]
        .into_iter()
        .flatten()
        .filter(|p| !p.trim().is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

impl NominatimReverseResponse {
    fn place_name(self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        self.address
            .as_ref()
            .and_then(NominatimAddress::place_name)
            .or(self.display_name)
            .map(|name| truncate_chars(&name, MAX_LOCATION_LENGTH as usize))
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Reverse geocoding of report coordinates using Nominatim
pub struct GeocodingService {
    client: reqwest::Client,
    base_url: String,
    enabled: bool,
    timeout: Duration,
}

impl GeocodingService {
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            enabled: config.enabled,
            timeout: config.timeout,
        })
    }

    /// Decide the location stored with a report.
    ///
    /// A non-blank supplied location wins. Otherwise the coordinates are
    /// reverse geocoded; any failure or timeout yields [`LOCATION_UNKNOWN`].
    /// Returns `None` only when nothing was supplied and geocoding is disabled.
    pub async fn resolve_location(
        &self,
        supplied: Option<String>,
        latitude: f64,
        longitude: f64,
    ) -> Option<String> {
        if let Some(location) = supplied
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
        {
            return Some(location);
        }

        if !self.enabled {
            return None;
        }

        let place = match tokio::time::timeout(self.timeout, self.reverse(latitude, longitude)).await
        {
            Ok(Ok(Some(place))) => place,
            Ok(Ok(None)) => {
                tracing::warn!(
                    "Reverse geocoding found no place for ({}, {})",
                    latitude,
                    longitude
                );
                LOCATION_UNKNOWN.to_string()
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    "Reverse geocoding failed for ({}, {}): {}",
                    latitude,
                    longitude,
                    e
                );
                LOCATION_UNKNOWN.to_string()
            }
            Err(_) => {
                tracing::warn!(
                    "Reverse geocoding timed out after {:?} for ({}, {})",
                    self.timeout,
                    latitude,
                    longitude
                );
                LOCATION_UNKNOWN.to_string()
            }
        };

        Some(place)
    }

    /// Look up a place name for the given coordinates
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1",
            self.base_url, latitude, longitude
        );

        tracing::debug!("Reverse geocoding ({}, {}) -> {}", latitude, longitude, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Nominatim request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let result: NominatimReverseResponse = response.json().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse Nominatim response: {}", e))
        })?;

        Ok(result.place_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_nominatim(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn service(base_url: &str, enabled: bool, timeout_ms: u64) -> GeocodingService {
        GeocodingService::new(&GeocodingConfig {
            enabled,
            base_url: base_url.to_string(),
            timeout: Duration::from_millis(timeout_ms),
            user_agent: "strayline-tests".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_place_name_prefers_city_then_town() {
        let addr = NominatimAddress {
            city: Some("Denpasar".to_string()),
            state: Some("Bali".to_string()),
            country: Some("Indonesia".to_string()),
            ..Default::default()
        };
        assert_eq!(addr.place_name().as_deref(), Some("Denpasar, Bali, Indonesia"));

        let addr = NominatimAddress {
            town: Some("Ubud".to_string()),
            country: Some("Indonesia".to_string()),
            ..Default::default()
        };
        assert_eq!(addr.get_city().as_deref(), Some("Ubud"));
        assert_eq!(addr.place_name().as_deref(), Some("Ubud, Indonesia"));

        assert_eq!(NominatimAddress::default().place_name(), None);
    }

    #[test]
    fn test_long_display_name_is_truncated() {
        let response = NominatimReverseResponse {
            display_name: Some("x".repeat(400)),
            address: None,
            error: None,
        };
        assert_eq!(
            response.place_name().map(|n| n.chars().count()),
            Some(MAX_LOCATION_LENGTH as usize)
        );
    }

    #[tokio::test]
    async fn test_reverse_lookup_resolves_place() {
        let router = Router::new().route(
            "/reverse",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("lat").map(String::as_str), Some("-8.65"));
                assert_eq!(params.get("lon").map(String::as_str), Some("115.22"));
                Json(json!({
                    "display_name": "Jalan Gajah Mada, Denpasar, Bali, Indonesia",
                    "address": {"city": "Denpasar", "state": "Bali", "country": "Indonesia"}
                }))
            }),
        );
        let base_url = spawn_nominatim(router).await;

        let location = service(&base_url, true, 3000)
            .resolve_location(None, -8.65, 115.22)
            .await;
        assert_eq!(location.as_deref(), Some("Denpasar, Bali, Indonesia"));
    }

    #[tokio::test]
    async fn test_upstream_error_falls_back_to_unknown() {
        let router = Router::new().route(
            "/reverse",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base_url = spawn_nominatim(router).await;

        let location = service(&base_url, true, 3000)
            .resolve_location(Some("   ".to_string()), 1.0, 2.0)
            .await;
        assert_eq!(location.as_deref(), Some(LOCATION_UNKNOWN));
    }

    #[tokio::test]
    async fn test_unresolvable_coordinates_fall_back_to_unknown() {
        let router = Router::new().route(
            "/reverse",
            get(|| async { Json(json!({"error": "Unable to geocode"})) }),
        );
        let base_url = spawn_nominatim(router).await;

        let location = service(&base_url, true, 3000)
            .resolve_location(None, 0.0, -160.0)
            .await;
        assert_eq!(location.as_deref(), Some(LOCATION_UNKNOWN));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out_to_unknown() {
        let router = Router::new().route(
            "/reverse",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"address": {"city": "Too late"}}))
            }),
        );
        let base_url = spawn_nominatim(router).await;

        let started = std::time::Instant::now();
        let location = service(&base_url, true, 100)
            .resolve_location(None, 1.0, 2.0)
            .await;
        assert_eq!(location.as_deref(), Some(LOCATION_UNKNOWN));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_supplied_location_skips_lookup() {
        // Nothing listens here; a lookup would fail
        let location = service("http://127.0.0.1:9", true, 3000)
            .resolve_location(Some(" Kuta Beach ".to_string()), 1.0, 2.0)
            .await;
        assert_eq!(location.as_deref(), Some("Kuta Beach"));
    }

    #[tokio::test]
    async fn test_disabled_geocoding_leaves_location_empty() {
        let location = service("http://127.0.0.1:9", false, 3000)
            .resolve_location(None, 1.0, 2.0)
            .await;
        assert_eq!(location, None);
    }
}
