use std::error::Error;
use std::sync::Arc;

use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::model::{FuelType, RoadType, TerrainType, VehicleType};
use crate::trip::{TripRequest, TripSummary};

static GEMINI_URL: &'static str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

static TEMPLATE_NAME: &'static str = "prompt";

static PROMPT_TEMPLATE: &'static str = r#"Generate a detailed CO2 emission calculation reasoning based on the following data:

1. **Route Information**:
    - **Total Distance**: { distance_km } km
    - **Total Number of City/Region Segments**: { total_segments }
    - **Vehicle Type**: { vehicle_type }
    - **Fuel Type**: { fuel_type }
    - **Load Weight**: { load_weight_kg } kg
    - **Road Type**: { road_type }
    - **Terrain**: { terrain }

2. **Methodology**:
    - Base emissions are calculated using the ISO 14083 methodology.
    - The **Tank-to-Wheel (TTW)** emissions are for direct combustion.
    - The **Well-to-Tank (WTT)** emissions are from upstream fuel production.
    - The **Well-to-Wheel (WTW)** emissions are the sum of TTW and WTT emissions.

3. **Modifiers**:
    - Terrain modifiers: flat (0%), hilly (+15%), mountainous (+35%).
    - Road type modifiers: highway (baseline), rural (+10%), urban (+25%).
    - Load weight impact: additional CO2 per kg of load and km driven.

4. **Fuel Type Comparison** (computed, well-to-wheel):
{{ for comparison in fuel_comparisons }}    - **{ comparison.fuel_type }**: { comparison.emission_kg } kg ({ comparison.percentage_difference }% vs the selected fuel)
{{ endfor }}
5. **City-wise Breakdown** (computed):
{{ for segment in segments }}    - { segment.city }: { segment.distance_km } km ({ segment.terrain } terrain, { segment.road_type } roads), { segment.co2_emission_kg } kg CO2
{{ endfor }}
Output the reasoning in a structured, easy-to-read format with the following sections:
- **Route Analysis**
- **Base Emissions** (with TTW, WTT, and WTW)
- **Segment-Specific Calculations** (city-wise breakdown, modifiers)
- **Load Weight Impact**
- **Fuel Type Comparison**

Return HTML only, suitable for embedding directly into a webpage: <h2> for
section titles, <ul> and <li> for lists of items, <p> for paragraphs, and
numbers with appropriate decimal places. Do not return plain text."#;

#[derive(Serialize)]
struct PromptSegment {
    city: Arc<str>,
    distance_km: String,
    terrain: TerrainType,
    road_type: RoadType,
    co2_emission_kg: String,
}

#[derive(Serialize)]
struct PromptComparison {
    fuel_type: FuelType,
    emission_kg: String,
    percentage_difference: String,
}

#[derive(Serialize)]
struct PromptContext {
    distance_km: String,
    total_segments: usize,
    vehicle_type: VehicleType,
    fuel_type: FuelType,
    load_weight_kg: String,
    terrain: TerrainType,
    road_type: RoadType,
    fuel_comparisons: Vec<PromptComparison>,
    segments: Vec<PromptSegment>,
}

/// Renders the explanation prompt from a computed trip.
pub fn build_prompt(request: &TripRequest, summary: &TripSummary) -> Result<String, Box<dyn Error>> {
    let context = PromptContext {
        distance_km: format!("{:.1}", summary.total_distance_km),
        total_segments: summary.segment_emissions.len(),
        vehicle_type: request.vehicle_type,
        fuel_type: request.fuel_type,
        load_weight_kg: format!("{:.0}", request.load_weight_kg),
        terrain: request.terrain,
        road_type: request.road_type,
        fuel_comparisons: summary
            .fuel_comparisons
            .iter()
            .map(|comparison| PromptComparison {
                fuel_type: comparison.fuel_type,
                emission_kg: format!("{:.2}", comparison.emission_kg),
                percentage_difference: format!("{:+.1}", comparison.percentage_difference),
            })
            .collect(),
        segments: summary
            .segment_emissions
            .iter()
            .map(|segment| PromptSegment {
                city: segment.city.clone(),
                distance_km: format!("{:.1}", segment.distance_km),
                terrain: segment.terrain,
                road_type: segment.road_type,
                co2_emission_kg: format!("{:.2}", segment.co2_emission_kg),
            })
            .collect(),
    };

    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template(TEMPLATE_NAME, PROMPT_TEMPLATE)?;
    Ok(tt.render(TEMPLATE_NAME, &context)?)
}

/// Asks the Gemini API for a prose/HTML explanation of a computed trip.
/// The engine's structured results are in the prompt; the model only
/// verbalizes them, it computes nothing.
pub async fn explain(
    request: &TripRequest,
    summary: &TripSummary,
    api_key: &str,
) -> Result<String, Box<dyn Error>> {
    let prompt = build_prompt(request, summary)?;

    log::info!("explain({})", summary.trip_id);
    let body = serde_json::json!({
        "contents": [{"parts": [{"text": prompt}]}]
    });

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap();
    let response = client
        .post(format!("{GEMINI_URL}?key={api_key}"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&body)?)
        .send()
        .await?;
    if response.status() != reqwest::StatusCode::OK {
        return Err(response.text().await?.into());
    }

    let value = serde_json::from_slice::<serde_json::Value>(&response.bytes().await?)?;
    let Some(text) = value["candidates"][0]["content"]["parts"][0]["text"].as_str() else {
        return Err("malformed response from the language model".into());
    };
    Ok(text.to_string())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{EmissionBreakdown, FuelComparison};
    use crate::trip::{Location, SegmentEmission};

    fn request() -> TripRequest {
        TripRequest {
            start: Location {
                address: "Hamburg".to_string(),
                coordinates: None,
            },
            end: Location {
                address: "Munich".to_string(),
                coordinates: None,
            },
            vehicle_type: VehicleType::Truck,
            fuel_type: FuelType::DieselB7,
            load_weight_kg: 2000.0,
            terrain: TerrainType::Flat,
            road_type: RoadType::Highway,
        }
    }

    fn summary() -> TripSummary {
        TripSummary {
            trip_id: "trip_1700000000_abc123".to_string(),
            computed_at: time::OffsetDateTime::from_unix_timestamp(1700000000).unwrap(),
            total_distance_km: 775.3,
            total_fuel_consumption_l: 62.024,
            total_co2_emission: EmissionBreakdown {
                ttw_kg: 736.535,
                wtt_kg: 170.566,
                wtw_kg: 907.101,
            },
            segment_emissions: vec![SegmentEmission {
                city: "Hamburg".into(),
                latitude: 53.55,
                longitude: 9.99,
                distance_km: 775.3,
                terrain: TerrainType::Flat,
                road_type: RoadType::Highway,
                co2_emission_kg: 907.101,
                emission_intensity: 1.17,
            }],
            fuel_comparisons: vec![
                FuelComparison {
                    fuel_type: FuelType::Petrol,
                    emission_kg: 985.0,
                    percentage_difference: 8.6,
                },
                FuelComparison {
                    fuel_type: FuelType::DieselB7,
                    emission_kg: 907.101,
                    percentage_difference: 0.0,
                },
            ],
            route_coordinates: vec![[9.99, 53.55], [11.58, 48.14]],
            calculation_time_ms: 1234,
        }
    }

    #[test]
    fn prompt_contains_the_computed_figures() {
        let prompt = build_prompt(&request(), &summary()).unwrap();

        assert!(prompt.contains("**Total Distance**: 775.3 km"));
        assert!(prompt.contains("**Vehicle Type**: truck"));
        assert!(prompt.contains("**Fuel Type**: diesel_b7"));
        assert!(prompt.contains("- Hamburg: 775.3 km (flat terrain, highway roads), 907.10 kg CO2"));
        assert!(prompt.contains("**petrol**: 985.00 kg (+8.6% vs the selected fuel)"));
        assert!(prompt.contains("**diesel_b7**: 907.10 kg (+0.0% vs the selected fuel)"));
    }
}
