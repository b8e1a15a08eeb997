use crate::factors::{emission_factor, LOAD_WEIGHT_FACTOR};
use crate::model::{EmissionBreakdown, FuelComparison, FuelType, RoadType, TerrainType, VehicleType};
use crate::segments::Segment;

/// An invalid input to the emission engine. The engine rejects instead of
/// clamping, so that defects in segment construction surface at the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// A negative distance in km
    NegativeDistance(f64),
    /// A negative load weight in kg
    NegativeLoadWeight(f64),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeDistance(km) => write!(f, "negative distance: {km} km"),
            Self::NegativeLoadWeight(kg) => write!(f, "negative load weight: {kg} kg"),
        }
    }
}

/// Returns the unmodified emissions of driving `distance_km` with the given
/// vehicle and fuel, in kg of CO2. Emissions scale linearly with distance.
pub fn base_emission(
    vehicle: VehicleType,
    fuel: FuelType,
    distance_km: f64,
) -> Result<EmissionBreakdown, Error> {
    if distance_km < 0.0 {
        return Err(Error::NegativeDistance(distance_km));
    }
    let factor = emission_factor(vehicle, fuel);

    let ttw_g = factor.ttw * distance_km;
    let wtt_g = factor.wtt * distance_km;

    Ok(EmissionBreakdown {
        ttw_kg: ttw_g / 1000.0,
        wtt_kg: wtt_g / 1000.0,
        wtw_kg: (ttw_g + wtt_g) / 1000.0,
    })
}

/// Applies terrain, road type and load weight modifiers to a per-segment base
/// emission. `distance_km` must be the distance that produced `base`.
///
/// Terrain and road compound multiplicatively. The load term is additive and
/// applies to tank-to-wheel only: carrying more weight burns more fuel in the
/// vehicle but does not change the upstream footprint of producing that fuel.
pub fn apply_modifiers(
    base: &EmissionBreakdown,
    terrain: TerrainType,
    road_type: RoadType,
    load_weight_kg: f64,
    distance_km: f64,
) -> Result<EmissionBreakdown, Error> {
    if distance_km < 0.0 {
        return Err(Error::NegativeDistance(distance_km));
    }
    if load_weight_kg < 0.0 {
        return Err(Error::NegativeLoadWeight(load_weight_kg));
    }
    let multiplier = terrain.multiplier() * road_type.multiplier();
    let load_addition_kg = load_weight_kg * LOAD_WEIGHT_FACTOR * distance_km / 1000.0;

    Ok(EmissionBreakdown {
        ttw_kg: base.ttw_kg * multiplier + load_addition_kg,
        wtt_kg: base.wtt_kg * multiplier,
        wtw_kg: (base.ttw_kg + base.wtt_kg) * multiplier + load_addition_kg,
    })
}

/// Sums breakdowns field-wise, in iteration order.
/// An empty iterator yields the zero breakdown.
pub fn aggregate(breakdowns: impl IntoIterator<Item = EmissionBreakdown>) -> EmissionBreakdown {
    breakdowns
        .into_iter()
        .fold(EmissionBreakdown::zero(), |acc, b| acc + b)
}

/// Returns the modified emissions of one segment. Segments without their own
/// terrain or road classification fall back to the trip-level defaults.
pub fn segment_emission(
    segment: &Segment,
    vehicle: VehicleType,
    fuel: FuelType,
    default_terrain: TerrainType,
    default_road: RoadType,
    load_weight_kg: f64,
) -> Result<EmissionBreakdown, Error> {
    let terrain = segment.terrain.unwrap_or(default_terrain);
    let road_type = segment.road_type.unwrap_or(default_road);
    let base = base_emission(vehicle, fuel, segment.distance_km)?;
    apply_modifiers(&base, terrain, road_type, load_weight_kg, segment.distance_km)
}

fn trip_total(
    segments: &[Segment],
    vehicle: VehicleType,
    fuel: FuelType,
    default_terrain: TerrainType,
    default_road: RoadType,
    load_weight_kg: f64,
) -> Result<f64, Error> {
    let breakdowns = segments
        .iter()
        .map(|segment| {
            segment_emission(
                segment,
                vehicle,
                fuel,
                default_terrain,
                default_road,
                load_weight_kg,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(aggregate(breakdowns).wtw_kg)
}

/// Recomputes the whole trip once per fuel type and relates each total to the
/// trip's actual fuel. One entry per fuel type, in [`FuelType::ALL`] order.
///
/// The baseline entry's percentage difference is the literal 0, never the
/// generic formula. A zero baseline only happens on a zero-distance trip, in
/// which case every alternate total is also zero and all entries report 0%.
pub fn compare_fuels(
    segments: &[Segment],
    vehicle: VehicleType,
    actual_fuel: FuelType,
    default_terrain: TerrainType,
    default_road: RoadType,
    load_weight_kg: f64,
) -> Result<Vec<FuelComparison>, Error> {
    let baseline = trip_total(
        segments,
        vehicle,
        actual_fuel,
        default_terrain,
        default_road,
        load_weight_kg,
    )?;

    FuelType::ALL
        .into_iter()
        .map(|fuel| {
            if fuel == actual_fuel {
                return Ok(FuelComparison {
                    fuel_type: fuel,
                    emission_kg: baseline,
                    percentage_difference: 0.0,
                });
            }
            let total = trip_total(
                segments,
                vehicle,
                fuel,
                default_terrain,
                default_road,
                load_weight_kg,
            )?;
            let percentage_difference = if baseline == 0.0 {
                0.0
            } else {
                (total - baseline) / baseline * 100.0
            };
            Ok(FuelComparison {
                fuel_type: fuel,
                emission_kg: total,
                percentage_difference,
            })
        })
        .collect()
}
