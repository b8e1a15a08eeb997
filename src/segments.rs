use std::sync::Arc;

use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::classify::{classify_road, classify_terrain};
use crate::fs::LocalDisk;
use crate::geocode::reverse_geocode;
use crate::model::{RoadType, TerrainType};
use crate::routing::Route;

/// At most this many points are sampled along a polyline for reverse geocoding.
pub(crate) static MAX_SAMPLE_POINTS: usize = 10;

/// One leg of a trip, covering a contiguous share of the routed polyline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Segment {
    /// Display name, usually the city or region the leg crosses
    pub name: Arc<str>,
    /// Latitude of the sampled point the leg was named after
    pub latitude: f64,
    /// Longitude of the sampled point the leg was named after
    pub longitude: f64,
    /// Length of the leg in km
    pub distance_km: f64,
    /// None means the trip-level terrain applies
    pub terrain: Option<TerrainType>,
    /// None means the trip-level road type applies
    pub road_type: Option<RoadType>,
}

/// Indices of evenly spaced polyline points.
/// Mirrors the stride sampling of the route resolver: when the polyline is
/// longer than `max_points`, every `len / max_points`-th point is taken.
fn sample_indices(len: usize, max_points: usize) -> Vec<usize> {
    if len <= max_points {
        return (0..len).collect();
    }
    let step = len / max_points;
    (0..len).step_by(step).collect()
}

/// Sum of the haversine distances between consecutive coordinates
/// in `[start, end]`. Coordinates are `[longitude, latitude]` pairs.
fn range_distance(coordinates: &[[f64; 2]], start: usize, end: usize) -> f64 {
    let end = end.min(coordinates.len().saturating_sub(1));
    if start >= end {
        return 0.0;
    }
    coordinates[start..=end]
        .windows(2)
        .map(|w| crate::distance((w[0][1], w[0][0]), (w[1][1], w[1][0])))
        .sum()
}

/// Splits a routed polyline into named, classified segments.
///
/// Each sampled point yields one segment covering a contiguous range of the
/// polyline; the ranges tile the polyline, so segment distances add up to the
/// full path length. Sampled points are reverse-geocoded with at most 5
/// requests in flight; a failed lookup keeps the segment with a positional
/// name and no classification (the trip-level defaults apply downstream).
/// The result is never empty: without samples, a single segment covering the
/// whole route is returned.
pub async fn resolve_segments(route: &Route, provider: Option<&LocalDisk>) -> Vec<Segment> {
    let coordinates = &route.coordinates;
    let samples = sample_indices(coordinates.len(), MAX_SAMPLE_POINTS);
    let len = samples.len();

    let tasks = samples.iter().enumerate().map(|(i, &index)| async move {
        let [longitude, latitude] = coordinates[index];
        let start = (i * coordinates.len()) / len;
        let end = ((i + 1) * coordinates.len()) / len;
        let distance_km = range_distance(coordinates, start, end);

        match reverse_geocode(latitude, longitude, provider).await {
            Ok(place) => Segment {
                name: place
                    .display_name()
                    .unwrap_or_else(|| format!("Location {}", i + 1).into()),
                latitude,
                longitude,
                distance_km,
                terrain: Some(classify_terrain(&place.address)),
                road_type: Some(classify_road(&place.address)),
            },
            Err(e) => {
                log::warn!("reverse geocoding of ({latitude}, {longitude}) failed: {e}");
                Segment {
                    name: format!("Route segment {}", i + 1).into(),
                    latitude,
                    longitude,
                    distance_km,
                    terrain: None,
                    road_type: None,
                }
            }
        }
    });

    let mut segments = futures::stream::iter(tasks)
        // limit concurrent requests; `buffered` preserves segment order
        .buffered(5)
        .collect::<Vec<_>>()
        .await;

    if segments.is_empty() {
        let midpoint = coordinates
            .get(coordinates.len() / 2)
            .copied()
            .unwrap_or([0.0, 0.0]);
        segments.push(Segment {
            name: "Route".into(),
            latitude: midpoint[1],
            longitude: midpoint[0],
            distance_km: route.distance_km,
            terrain: None,
            road_type: None,
        });
    }
    segments
}
