use crate::model::{FuelType, RoadType, TerrainType, VehicleType};

/// Additional grams of CO2 per km per kg of load.
pub static LOAD_WEIGHT_FACTOR: f64 = 0.05;

/// Per-km emission factors of one (vehicle, fuel) pair, in grams of CO2 per km.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionFactor {
    /// Tank-to-wheel: direct combustion
    pub ttw: f64,
    /// Well-to-tank: upstream fuel production and delivery
    pub wtt: f64,
}

/// Returns the emission factor of a (vehicle, fuel) pair.
/// Exact values taken from the ISO 14083 / GLEC framework derived tables.
/// The match is exhaustive over both closed sets, so every pair has an entry
/// and electric has no tank-to-wheel emissions for any vehicle.
pub fn emission_factor(vehicle: VehicleType, fuel: FuelType) -> EmissionFactor {
    use FuelType::*;
    use VehicleType::*;
    let (ttw, wtt) = match (vehicle, fuel) {
        (Truck, DieselB7) => (850.0, 220.0),
        (Truck, Petrol) => (920.0, 250.0),
        (Truck, Electric) => (0.0, 180.0),
        (Truck, Hybrid) => (450.0, 190.0),
        (Van, DieselB7) => (650.0, 170.0),
        (Van, Petrol) => (720.0, 190.0),
        (Van, Electric) => (0.0, 140.0),
        (Van, Hybrid) => (350.0, 150.0),
        (Pickup, DieselB7) => (450.0, 120.0),
        (Pickup, Petrol) => (520.0, 140.0),
        (Pickup, Electric) => (0.0, 100.0),
        (Pickup, Hybrid) => (250.0, 110.0),
        (HeavyTruck, DieselB7) => (1200.0, 310.0),
        (HeavyTruck, Petrol) => (1350.0, 360.0),
        (HeavyTruck, Electric) => (0.0, 250.0),
        (HeavyTruck, Hybrid) => (650.0, 280.0),
    };
    EmissionFactor { ttw, wtt }
}

impl TerrainType {
    /// Multiplicative factor applied to per-segment emissions.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Flat => 1.0,
            Self::Hilly => 1.15,
            Self::Mountainous => 1.35,
        }
    }
}

impl RoadType {
    /// Multiplicative factor applied to per-segment emissions.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Highway => 1.0,
            Self::Urban => 1.25,
            Self::Rural => 1.1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const VEHICLES: [VehicleType; 4] = [
        VehicleType::Truck,
        VehicleType::Van,
        VehicleType::Pickup,
        VehicleType::HeavyTruck,
    ];

    #[test]
    fn factors_are_non_negative() {
        for vehicle in VEHICLES {
            for fuel in FuelType::ALL {
                let factor = emission_factor(vehicle, fuel);
                assert!(factor.ttw >= 0.0);
                assert!(factor.wtt > 0.0);
            }
        }
    }

    #[test]
    fn electric_has_no_direct_combustion() {
        for vehicle in VEHICLES {
            assert_eq!(emission_factor(vehicle, FuelType::Electric).ttw, 0.0);
        }
    }

    #[test]
    fn multipliers() {
        assert_eq!(TerrainType::Flat.multiplier(), 1.0);
        assert_eq!(TerrainType::Hilly.multiplier(), 1.15);
        assert_eq!(TerrainType::Mountainous.multiplier(), 1.35);
        assert_eq!(RoadType::Highway.multiplier(), 1.0);
        assert_eq!(RoadType::Urban.multiplier(), 1.25);
        assert_eq!(RoadType::Rural.multiplier(), 1.1);
    }
}
