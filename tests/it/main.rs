use greenroute::*;

fn segment(
    name: &str,
    distance_km: f64,
    terrain: Option<TerrainType>,
    road_type: Option<RoadType>,
) -> Segment {
    Segment {
        name: name.into(),
        latitude: 0.0,
        longitude: 0.0,
        distance_km,
        terrain,
        road_type,
    }
}

/// Verifies the emission model against the hand-computed reference scenarios
/// of the ISO 14083 / GLEC derived factor table:
/// * a diesel truck over 100 km of flat highway emits 85 + 22 = 107 kg;
/// * the same trip over mountainous urban roads is multiplied by 1.6875;
/// * a petrol van over 50 km with 1 t of load gains 2.5 kg of tank-to-wheel.
#[test]
fn acceptance_emission_model() {
    let base = base_emission(VehicleType::Truck, FuelType::DieselB7, 100.0).unwrap();
    assert_eq!(
        base,
        EmissionBreakdown {
            ttw_kg: 85.0,
            wtt_kg: 22.0,
            wtw_kg: 107.0,
        }
    );
    assert_eq!(
        apply_modifiers(&base, TerrainType::Flat, RoadType::Highway, 0.0, 100.0).unwrap(),
        base
    );
    assert_eq!(
        apply_modifiers(&base, TerrainType::Mountainous, RoadType::Urban, 0.0, 100.0).unwrap(),
        EmissionBreakdown {
            ttw_kg: 143.4375,
            wtt_kg: 37.125,
            wtw_kg: 180.5625,
        }
    );

    let base = base_emission(VehicleType::Van, FuelType::Petrol, 50.0).unwrap();
    assert_eq!(
        apply_modifiers(&base, TerrainType::Flat, RoadType::Highway, 1000.0, 50.0).unwrap(),
        EmissionBreakdown {
            ttw_kg: 38.5,
            wtt_kg: 9.5,
            wtw_kg: 48.0,
        }
    );
}

/// Compares all fuels over a route of 100 km of flat highway plus 50 km of
/// mountainous urban roads, unloaded truck. All totals are hand-computed.
#[test]
fn acceptance_fuel_comparison() {
    let segments = [
        segment(
            "Lowlands",
            100.0,
            Some(TerrainType::Flat),
            Some(RoadType::Highway),
        ),
        segment(
            "Highlands",
            50.0,
            Some(TerrainType::Mountainous),
            Some(RoadType::Urban),
        ),
    ];

    let comparisons = compare_fuels(
        &segments,
        VehicleType::Truck,
        FuelType::DieselB7,
        TerrainType::Flat,
        RoadType::Highway,
        0.0,
    )
    .unwrap();

    let totals = comparisons
        .iter()
        .map(|c| (c.fuel_type, c.emission_kg))
        .collect::<Vec<_>>();
    assert_eq!(
        totals,
        vec![
            (FuelType::Petrol, 215.71875),
            (FuelType::DieselB7, 197.28125),
            (FuelType::Electric, 33.1875),
            (FuelType::Hybrid, 118.0),
        ]
    );

    let diesel = &comparisons[1];
    assert_eq!(diesel.percentage_difference, 0.0);
    let petrol = &comparisons[0];
    assert_eq!(
        petrol.percentage_difference,
        (215.71875_f64 - 197.28125) / 197.28125 * 100.0
    );
    let electric = &comparisons[2];
    assert!(electric.percentage_difference < -80.0);
}

/// Segments without their own classification inherit the trip-level defaults,
/// so classifying a segment explicitly with the defaults changes nothing.
#[test]
fn trip_level_defaults_apply() {
    let implicit = [segment("a", 60.0, None, None)];
    let explicit = [segment(
        "a",
        60.0,
        Some(TerrainType::Hilly),
        Some(RoadType::Rural),
    )];

    for fuel in FuelType::ALL {
        let a = compare_fuels(
            &implicit,
            VehicleType::Pickup,
            fuel,
            TerrainType::Hilly,
            RoadType::Rural,
            800.0,
        )
        .unwrap();
        let b = compare_fuels(
            &explicit,
            VehicleType::Pickup,
            fuel,
            TerrainType::Hilly,
            RoadType::Rural,
            800.0,
        )
        .unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn segment_table_round_trips_through_csv() {
    let rows = vec![
        SegmentEmission {
            city: "Hamburg".into(),
            latitude: 53.5511,
            longitude: 9.9937,
            distance_km: 93.5,
            terrain: TerrainType::Flat,
            road_type: RoadType::Urban,
            co2_emission_kg: 125.0625,
            emission_intensity: 1.3375,
        },
        SegmentEmission {
            city: "Harz".into(),
            latitude: 51.75,
            longitude: 10.63,
            distance_km: 40.0,
            terrain: TerrainType::Mountainous,
            road_type: RoadType::Rural,
            co2_emission_kg: 63.558,
            emission_intensity: 1.58895,
        },
    ];

    let data = greenroute::csv::serialize(rows.iter()).unwrap();
    assert_eq!(
        greenroute::csv::deserialize::<SegmentEmission>(&data).unwrap(),
        rows
    );
}

/// A route with no polyline (nothing to sample) still resolves to a single
/// segment covering the whole distance, without touching the network.
#[tokio::test]
async fn an_empty_polyline_still_yields_one_segment() {
    let route = Route {
        distance_km: 12.0,
        duration_s: 720.0,
        coordinates: vec![],
    };

    let segments = resolve_segments(&route, None).await;

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].distance_km, 12.0);
    assert_eq!(segments[0].terrain, None);
    assert_eq!(segments[0].road_type, None);
}
