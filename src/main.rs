use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use itertools::Itertools;
use num_format::{Locale, ToFormattedString};
use simple_logger::SimpleLogger;
use tinytemplate::TinyTemplate;

use greenroute::*;

static TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/report.md"));
static TEMPLATE_NAME: &'static str = "report";

const ABOUT: &'static str = r#"Estimates the road-freight CO2 emissions of a trip between two addresses.

The route is resolved into city-level segments; each segment's emissions are
computed from the vehicle and fuel emission factors, modified by terrain, road
type and load weight; the totals are compared across all fuel types. With a
Gemini API key (--gemini-key or GEMINI_API_KEY), the report also contains a
generated explanation of the figures."#;

#[derive(Parser, Debug)]
#[command(author, version, about = ABOUT)]
struct Cli {
    /// The start address
    #[arg(long)]
    from: String,
    /// The end address
    #[arg(long)]
    to: String,
    /// Optional "latitude,longitude" of the start, skipping geocoding
    #[arg(long, value_parser = parse_coordinates)]
    from_coordinates: Option<(f64, f64)>,
    /// Optional "latitude,longitude" of the end, skipping geocoding
    #[arg(long, value_parser = parse_coordinates)]
    to_coordinates: Option<(f64, f64)>,
    /// The vehicle type (truck, van, pickup or heavy_truck)
    #[arg(long, default_value = "truck")]
    vehicle: VehicleType,
    /// The fuel type (petrol, diesel_b7, electric or hybrid)
    #[arg(long, default_value = "diesel_b7")]
    fuel: FuelType,
    /// The load weight in kg
    #[arg(long, default_value_t = 0.0)]
    load: f64,
    /// Terrain of segments without their own classification
    #[arg(long, default_value = "flat")]
    terrain: TerrainType,
    /// Road type of segments without their own classification
    #[arg(long, default_value = "highway")]
    road: RoadType,
    /// Optional path to write the per-segment table to, as CSV
    #[arg(long)]
    csv: Option<String>,
    /// Gemini API key for the explanation; falls back to GEMINI_API_KEY
    #[arg(long)]
    gemini_key: Option<String>,
    /// Do not cache geocoding responses on disk
    #[arg(long, default_value_t = false)]
    no_cache: bool,
}

fn parse_coordinates(arg: &str) -> Result<(f64, f64), String> {
    let Some((latitude, longitude)) = arg.split_once(',') else {
        return Err("expected \"latitude,longitude\"".to_string());
    };
    Ok((
        latitude
            .trim()
            .parse()
            .map_err(|e| format!("invalid latitude: {e}"))?,
        longitude
            .trim()
            .parse()
            .map_err(|e| format!("invalid longitude: {e}"))?,
    ))
}

#[derive(serde::Serialize)]
struct ReportSegment {
    city: Arc<str>,
    distance_km: String,
    terrain: TerrainType,
    road_type: RoadType,
    co2_emission_kg: String,
    emission_intensity: String,
}

#[derive(serde::Serialize)]
struct ReportComparison {
    fuel_type: FuelType,
    emission_kg: String,
    percentage_difference: String,
}

#[derive(serde::Serialize)]
struct Context {
    trip_id: String,
    from: String,
    to: String,
    vehicle_type: VehicleType,
    fuel_type: FuelType,
    load_weight_kg: String,
    total_distance_km: String,
    total_segments: usize,
    total_fuel_consumption_l: String,
    ttw_kg: String,
    wtt_kg: String,
    wtw_kg: String,
    segments: Vec<ReportSegment>,
    fuel_comparisons: Vec<ReportComparison>,
    calculation_time_ms: usize,
    reasoning: Option<String>,
}

fn render_report(
    request: &TripRequest,
    summary: &TripSummary,
    reasoning: Option<String>,
) -> Result<String, Box<dyn Error>> {
    let context = Context {
        trip_id: summary.trip_id.clone(),
        from: request.start.address.clone(),
        to: request.end.address.clone(),
        vehicle_type: request.vehicle_type,
        fuel_type: request.fuel_type,
        load_weight_kg: (request.load_weight_kg.round() as u64).to_formatted_string(&Locale::en),
        total_distance_km: format!("{:.1}", summary.total_distance_km),
        total_segments: summary.segment_emissions.len(),
        total_fuel_consumption_l: format!("{:.1}", summary.total_fuel_consumption_l),
        ttw_kg: format!("{:.2}", summary.total_co2_emission.ttw_kg),
        wtt_kg: format!("{:.2}", summary.total_co2_emission.wtt_kg),
        wtw_kg: format!("{:.2}", summary.total_co2_emission.wtw_kg),
        segments: summary
            .segment_emissions
            .iter()
            .map(|segment| ReportSegment {
                city: segment.city.clone(),
                distance_km: format!("{:.1}", segment.distance_km),
                terrain: segment.terrain,
                road_type: segment.road_type,
                co2_emission_kg: format!("{:.2}", segment.co2_emission_kg),
                emission_intensity: format!("{:.3}", segment.emission_intensity),
            })
            .collect(),
        fuel_comparisons: summary
            .fuel_comparisons
            .iter()
            .map(|comparison| ReportComparison {
                fuel_type: comparison.fuel_type,
                emission_kg: format!("{:.2}", comparison.emission_kg),
                percentage_difference: format!("{:+.1}", comparison.percentage_difference),
            })
            .collect(),
        calculation_time_ms: summary.calculation_time_ms,
        reasoning,
    };

    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template(TEMPLATE_NAME, TEMPLATE)?;
    Ok(tt.render(TEMPLATE_NAME, &context)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    let cli = Cli::parse();

    let request = TripRequest {
        start: Location {
            address: cli.from,
            coordinates: cli.from_coordinates,
        },
        end: Location {
            address: cli.to,
            coordinates: cli.to_coordinates,
        },
        vehicle_type: cli.vehicle,
        fuel_type: cli.fuel,
        load_weight_kg: cli.load,
        terrain: cli.terrain,
        road_type: cli.road,
    };

    let provider = (!cli.no_cache).then_some(&LocalDisk);
    let summary = compute_trip(&request, provider).await?;

    log::info!(
        "{}: {}",
        summary.trip_id,
        summary
            .segment_emissions
            .iter()
            .map(|segment| segment.city.as_ref())
            .join(" -> ")
    );

    if let Some(path) = &cli.csv {
        let data = greenroute::csv::serialize(summary.segment_emissions.iter())?;
        std::fs::write(path, data)?;
        log::info!("segment table written to {path}");
    }

    let api_key = cli
        .gemini_key
        .or_else(|| std::env::var("GEMINI_API_KEY").ok());
    let reasoning = match api_key {
        Some(api_key) => Some(explain(&request, &summary, &api_key).await?),
        None => {
            log::warn!("no Gemini API key configured; skipping the explanation");
            None
        }
    };

    let report = render_report(&request, &summary, reasoning)?;
    println!("{report}");

    Ok(())
}
