use std::collections::HashMap;
use std::sync::Arc;

use reqwest::{header, StatusCode};
use reqwest_middleware::ClientBuilder;
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::fs::{cached, LocalDisk};

static NOMINATIM_URL: &'static str = "https://nominatim.openstreetmap.org";

pub(crate) static DATABASE: &'static str = "cache/nominatim";

fn to_io_err(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, error)
}

fn headers() -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        "User-Agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/118.0"
            .parse()
            .unwrap(),
    );
    headers.insert("Accept", "application/json".parse().unwrap());
    headers.insert("Accept-Language", "en-US,en;q=0.5".parse().unwrap());
    headers
}

fn client(timeout: std::time::Duration) -> reqwest_middleware::ClientWithMiddleware {
    // Retry up to 5 times with increasing intervals between attempts.
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(5);
    let client = reqwest::Client::builder().timeout(timeout).build().unwrap();
    ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

async fn fetch(
    url: String,
    query: &[(&str, String)],
    timeout_s: u64,
) -> Result<Vec<u8>, std::io::Error> {
    let response = client(std::time::Duration::from_secs(timeout_s))
        .get(url)
        .headers(headers())
        .query(query)
        .send()
        .await
        .map_err(to_io_err)?;
    if response.status() == StatusCode::OK {
        Ok(response.bytes().await.map_err(to_io_err)?.to_vec())
    } else {
        Err(to_io_err(response.text().await.map_err(to_io_err)?))
    }
}

#[derive(Debug, serde::Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

fn sanitize(query: &str) -> String {
    query
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Returns the (latitude, longitude) of a free-text address.
/// Errors when the address resolves to nothing.
/// # Implementation
/// Nominatim resolves the address; with a `provider`, the raw response is
/// cached so each address hits the network at most once across runs.
pub async fn geocode(
    address: &str,
    provider: Option<&LocalDisk>,
) -> Result<(f64, f64), std::io::Error> {
    log::info!("geocode({address})");
    let query = [
        ("q", address.to_string()),
        ("format", "json".to_string()),
        ("limit", "1".to_string()),
    ];
    let request = fetch(format!("{NOMINATIM_URL}/search"), &query, 5);
    let blob_name = format!("{DATABASE}/search/{}.json", sanitize(address));
    let data = match provider {
        Some(provider) => cached(&blob_name, request, provider).await?,
        None => request.await?,
    };

    let results = serde_json::from_slice::<Vec<SearchResult>>(&data)?;
    let Some(result) = results.first() else {
        return Err(to_io_err(format!("address not found: {address}")));
    };
    Ok((
        result.lat.parse().map_err(to_io_err)?,
        result.lon.parse().map_err(to_io_err)?,
    ))
}

/// A reverse-geocoded place at city-level zoom.
#[derive(Debug, Clone)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    /// The address components returned by Nominatim (e.g. "city" -> "Kassel")
    pub address: HashMap<String, String>,
}

impl Place {
    /// The most specific settlement name available, if any.
    pub fn display_name(&self) -> Option<Arc<str>> {
        ["city", "town", "village", "county"]
            .iter()
            .find_map(|key| self.address.get(*key))
            .map(|name| name.as_str().into())
    }
}

pub(crate) fn address_components(value: &serde_json::Value) -> HashMap<String, String> {
    value
        .get("address")
        .and_then(|address| address.as_object())
        .map(|object| {
            object
                .iter()
                .filter_map(|(key, value)| {
                    value.as_str().map(|value| (key.clone(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Reverse-geocodes a point into its address components at city zoom
/// (Nominatim zoom 10).
/// # Implementation
/// The cache key rounds coordinates to 4 decimal places (~10 m), so nearby
/// sample points of repeated trips share cache entries.
pub async fn reverse_geocode(
    latitude: f64,
    longitude: f64,
    provider: Option<&LocalDisk>,
) -> Result<Place, std::io::Error> {
    log::info!("reverse_geocode({latitude}, {longitude})");
    let query = [
        ("lat", latitude.to_string()),
        ("lon", longitude.to_string()),
        ("format", "json".to_string()),
        ("zoom", "10".to_string()),
    ];
    let request = fetch(format!("{NOMINATIM_URL}/reverse"), &query, 3);
    let blob_name = format!("{DATABASE}/reverse/{latitude:.4}_{longitude:.4}.json");
    let data = match provider {
        Some(provider) => cached(&blob_name, request, provider).await?,
        None => request.await?,
    };

    let value = serde_json::from_slice::<serde_json::Value>(&data)?;
    Ok(Place {
        latitude,
        longitude,
        address: address_components(&value),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_name_prefers_the_most_specific() {
        let mut address = HashMap::new();
        address.insert("county".to_string(), "Kreis Segeberg".to_string());
        address.insert("town".to_string(), "Bad Bramstedt".to_string());
        let place = Place {
            latitude: 53.92,
            longitude: 9.88,
            address,
        };
        assert_eq!(place.display_name().as_deref(), Some("Bad Bramstedt"));
    }

    #[test]
    fn display_name_of_nowhere_is_none() {
        let place = Place {
            latitude: 0.0,
            longitude: 0.0,
            address: HashMap::new(),
        };
        assert_eq!(place.display_name(), None);
    }

    #[test]
    fn address_components_keeps_only_strings() {
        let value = serde_json::json!({
            "place_id": 1,
            "address": {"city": "Hamburg", "house_number": 5}
        });
        let components = address_components(&value);
        assert_eq!(components.get("city").map(|s| s.as_str()), Some("Hamburg"));
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn addresses_become_file_names() {
        assert_eq!(sanitize("Berlin, Germany"), "berlin__germany");
    }
}
