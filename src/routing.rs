use reqwest::StatusCode;
use reqwest_middleware::ClientBuilder;
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{Deserialize, Serialize};

static OSRM_URL: &'static str = "http://router.project-osrm.org";

fn to_io_err(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, error)
}

/// A routed path between two points.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Route {
    /// Total length in km
    pub distance_km: f64,
    /// Estimated driving time in seconds
    pub duration_s: f64,
    /// The full path as [longitude, latitude] pairs
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    /// meters
    distance: f64,
    /// seconds
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

async fn osrm_route(from: (f64, f64), to: (f64, f64)) -> Result<Route, std::io::Error> {
    log::info!("route({from:?} -> {to:?})");
    // OSRM takes longitude,latitude pairs in the path
    let url = format!(
        "{OSRM_URL}/route/v1/driving/{},{};{},{}",
        from.1, from.0, to.1, to.0
    );

    // Retry up to 5 times with increasing intervals between attempts.
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(5);
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap();
    let client = ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

    let response = client
        .get(url)
        .query(&[("overview", "full"), ("geometries", "geojson")])
        .send()
        .await
        .map_err(to_io_err)?;
    if response.status() != StatusCode::OK {
        return Err(to_io_err(response.text().await.map_err(to_io_err)?));
    }

    let data = response.bytes().await.map_err(to_io_err)?;
    let parsed = serde_json::from_slice::<OsrmResponse>(&data)?;
    if parsed.code != "Ok" {
        return Err(to_io_err(format!("no route found ({})", parsed.code)));
    }
    let Some(route) = parsed.routes.into_iter().next() else {
        return Err(to_io_err("no route found (empty result)"));
    };

    Ok(Route {
        distance_km: route.distance / 1000.0,
        duration_s: route.duration,
        coordinates: route.geometry.coordinates,
    })
}

/// The straight-line estimate: two points, the haversine distance between
/// them, and one minute of driving per km.
fn great_circle(from: (f64, f64), to: (f64, f64)) -> Route {
    let distance_km = crate::distance(from, to);
    Route {
        distance_km,
        duration_s: distance_km * 60.0,
        coordinates: vec![[from.1, from.0], [to.1, to.0]],
    }
}

/// Returns the road route between `from` and `to`, both (latitude, longitude).
/// When the routing service fails, falls back to the great-circle estimate,
/// so a trip can always be computed.
pub async fn route(from: (f64, f64), to: (f64, f64)) -> Route {
    match osrm_route(from, to).await {
        Ok(route) => route,
        Err(e) => {
            log::warn!("routing failed ({e}); falling back to the great-circle estimate");
            great_circle(from, to)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn great_circle_is_a_two_point_route() {
        let berlin = (52.52, 13.405);
        let munich = (48.1351, 11.582);
        let route = great_circle(berlin, munich);

        assert_eq!(route.coordinates.len(), 2);
        assert_eq!(route.coordinates[0], [13.405, 52.52]);
        // Berlin -> Munich is about 500 km as the crow flies
        assert!((route.distance_km - 500.0).abs() < 10.0);
        assert_eq!(route.duration_s, route.distance_km * 60.0);
    }

    #[test]
    fn osrm_response_parses() {
        let data = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 12345.6,
                "duration": 789.0,
                "geometry": {"coordinates": [[13.4, 52.5], [13.5, 52.4]], "type": "LineString"}
            }]
        }"#;
        let parsed = serde_json::from_str::<OsrmResponse>(data).unwrap();
        assert_eq!(parsed.code, "Ok");
        assert_eq!(parsed.routes[0].geometry.coordinates.len(), 2);
    }
}
