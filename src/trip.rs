use std::error::Error;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::emissions::{aggregate, compare_fuels, segment_emission};
use crate::fs::LocalDisk;
use crate::geocode::geocode;
use crate::model::{
    EmissionBreakdown, FuelComparison, FuelType, RoadType, TerrainType, VehicleType,
};
use crate::routing::route;
use crate::segments::resolve_segments;

/// Liters of fuel burnt per km, for the rough consumption estimate.
static FUEL_CONSUMPTION_L_PER_KM: f64 = 0.08;

/// One end of a trip: a free-text address, optionally with known coordinates
/// (latitude, longitude), which skip geocoding.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Location {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub coordinates: Option<(f64, f64)>,
}

/// The parameters of a trip emission estimate.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TripRequest {
    pub start: Location,
    pub end: Location,
    pub vehicle_type: VehicleType,
    pub fuel_type: FuelType,
    /// Load weight in kg
    pub load_weight_kg: f64,
    /// Trip-level terrain, used by segments without their own classification
    pub terrain: TerrainType,
    /// Trip-level road type, used by segments without their own classification
    pub road_type: RoadType,
}

/// One row of the per-segment emission report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SegmentEmission {
    /// The city or region the segment crosses
    pub city: Arc<str>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    /// The terrain the segment was computed with
    pub terrain: TerrainType,
    /// The road type the segment was computed with
    pub road_type: RoadType,
    /// Well-to-wheel emissions of the segment in kg of CO2
    pub co2_emission_kg: f64,
    /// kg of CO2 per km; 0 for zero-length segments
    pub emission_intensity: f64,
}

/// The full result of a trip computation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TripSummary {
    pub trip_id: String,
    /// When the computation happened
    #[serde(with = "time::serde::rfc3339")]
    pub computed_at: time::OffsetDateTime,
    pub total_distance_km: f64,
    /// Rough fuel consumption estimate in liters
    pub total_fuel_consumption_l: f64,
    pub total_co2_emission: EmissionBreakdown,
    pub segment_emissions: Vec<SegmentEmission>,
    pub fuel_comparisons: Vec<FuelComparison>,
    /// The routed path as [longitude, latitude] pairs
    pub route_coordinates: Vec<[f64; 2]>,
    pub calculation_time_ms: usize,
}

fn trip_id(now: time::OffsetDateTime) -> String {
    let suffix = std::iter::repeat(())
        .map(|_| rand::thread_rng().sample(rand::distributions::Alphanumeric))
        .take(6)
        .map(|x| x as char)
        .collect::<String>();
    format!("trip_{}_{suffix}", now.unix_timestamp())
}

/// Computes the full emission estimate of a trip: resolves the route into
/// city-level segments, runs the emission engine per segment, and derives the
/// trip totals and the fuel comparison from the per-segment results.
///
/// Network access is limited to geocoding and routing; the emission arithmetic
/// itself is pure, so a failure here is always a resolver failure or an
/// invalid request (negative distance or load).
pub async fn compute_trip(
    request: &TripRequest,
    provider: Option<&LocalDisk>,
) -> Result<TripSummary, Box<dyn Error>> {
    let started = std::time::Instant::now();
    let now = time::OffsetDateTime::now_utc();

    let start = match request.start.coordinates {
        Some(coordinates) => coordinates,
        None => geocode(&request.start.address, provider).await?,
    };
    let end = match request.end.coordinates {
        Some(coordinates) => coordinates,
        None => geocode(&request.end.address, provider).await?,
    };

    let route = route(start, end).await;
    let segments = resolve_segments(&route, provider).await;
    log::info!(
        "resolved {} segments over {:.1} km",
        segments.len(),
        route.distance_km
    );

    let mut segment_emissions = Vec::with_capacity(segments.len());
    let mut breakdowns = Vec::with_capacity(segments.len());
    for segment in &segments {
        let breakdown = segment_emission(
            segment,
            request.vehicle_type,
            request.fuel_type,
            request.terrain,
            request.road_type,
            request.load_weight_kg,
        )?;
        segment_emissions.push(SegmentEmission {
            city: segment.name.clone(),
            latitude: segment.latitude,
            longitude: segment.longitude,
            distance_km: segment.distance_km,
            terrain: segment.terrain.unwrap_or(request.terrain),
            road_type: segment.road_type.unwrap_or(request.road_type),
            co2_emission_kg: breakdown.wtw_kg,
            emission_intensity: if segment.distance_km > 0.0 {
                breakdown.wtw_kg / segment.distance_km
            } else {
                0.0
            },
        });
        breakdowns.push(breakdown);
    }
    let total_co2_emission = aggregate(breakdowns);

    let fuel_comparisons = compare_fuels(
        &segments,
        request.vehicle_type,
        request.fuel_type,
        request.terrain,
        request.road_type,
        request.load_weight_kg,
    )?;

    Ok(TripSummary {
        trip_id: trip_id(now),
        computed_at: now,
        total_distance_km: route.distance_km,
        total_fuel_consumption_l: route.distance_km * FUEL_CONSUMPTION_L_PER_KM,
        total_co2_emission,
        segment_emissions,
        fuel_comparisons,
        route_coordinates: route.coordinates,
        calculation_time_ms: started.elapsed().as_millis() as usize,
    })
}
