use serde::{Deserialize, Serialize};

/// The set of vehicle types with an entry in the emission factor table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Truck,
    Van,
    Pickup,
    HeavyTruck,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Truck => "truck",
            Self::Van => "van",
            Self::Pickup => "pickup",
            Self::HeavyTruck => "heavy_truck",
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "truck" => Ok(Self::Truck),
            "van" => Ok(Self::Van),
            "pickup" => Ok(Self::Pickup),
            "heavy_truck" => Ok(Self::HeavyTruck),
            _ => Err(format!("unknown vehicle type \"{s}\"")),
        }
    }
}

/// The set of fuel types with an entry in the emission factor table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Petrol,
    DieselB7,
    Electric,
    Hybrid,
}

impl FuelType {
    /// All fuel types, in canonical order. Fuel comparisons are emitted in this order.
    pub const ALL: [FuelType; 4] = [Self::Petrol, Self::DieselB7, Self::Electric, Self::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Petrol => "petrol",
            Self::DieselB7 => "diesel_b7",
            Self::Electric => "electric",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FuelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "petrol" => Ok(Self::Petrol),
            "diesel_b7" => Ok(Self::DieselB7),
            "electric" => Ok(Self::Electric),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(format!("unknown fuel type \"{s}\"")),
        }
    }
}

/// Terrain classification of a route segment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    Flat,
    Hilly,
    Mountainous,
}

impl TerrainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Hilly => "hilly",
            Self::Mountainous => "mountainous",
        }
    }
}

impl std::fmt::Display for TerrainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TerrainType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(Self::Flat),
            "hilly" => Ok(Self::Hilly),
            "mountainous" => Ok(Self::Mountainous),
            _ => Err(format!("unknown terrain type \"{s}\"")),
        }
    }
}

/// Road classification of a route segment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoadType {
    Highway,
    Urban,
    Rural,
}

impl RoadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Highway => "highway",
            Self::Urban => "urban",
            Self::Rural => "rural",
        }
    }
}

impl std::fmt::Display for RoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoadType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highway" => Ok(Self::Highway),
            "urban" => Ok(Self::Urban),
            "rural" => Ok(Self::Rural),
            _ => Err(format!("unknown road type \"{s}\"")),
        }
    }
}

/// Emissions of one segment or one whole trip, split by fuel pathway stage.
/// `wtw_kg` is always the sum of the other two fields.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EmissionBreakdown {
    /// Tank-to-wheel: direct combustion, in kg of CO2
    pub ttw_kg: f64,
    /// Well-to-tank: upstream fuel production and delivery, in kg of CO2
    pub wtt_kg: f64,
    /// Well-to-wheel: total lifecycle, in kg of CO2
    pub wtw_kg: f64,
}

impl EmissionBreakdown {
    pub fn zero() -> Self {
        Self {
            ttw_kg: 0.0,
            wtt_kg: 0.0,
            wtw_kg: 0.0,
        }
    }
}

impl std::ops::Add for EmissionBreakdown {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            ttw_kg: self.ttw_kg + other.ttw_kg,
            wtt_kg: self.wtt_kg + other.wtt_kg,
            wtw_kg: self.wtw_kg + other.wtw_kg,
        }
    }
}

/// The trip total of one fuel type, relative to the trip's actual fuel.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FuelComparison {
    pub fuel_type: FuelType,
    /// Well-to-wheel total of the whole trip with this fuel, in kg of CO2
    pub emission_kg: f64,
    /// Relative difference to the baseline fuel, in percent. Exactly 0 for the baseline itself.
    pub percentage_difference: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn enums_round_trip_through_strings() {
        for vehicle in [
            VehicleType::Truck,
            VehicleType::Van,
            VehicleType::Pickup,
            VehicleType::HeavyTruck,
        ] {
            assert_eq!(vehicle.to_string().parse::<VehicleType>(), Ok(vehicle));
        }
        for fuel in FuelType::ALL {
            assert_eq!(fuel.to_string().parse::<FuelType>(), Ok(fuel));
        }
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&FuelType::DieselB7).unwrap(),
            "\"diesel_b7\""
        );
        assert_eq!(
            serde_json::to_string(&VehicleType::HeavyTruck).unwrap(),
            "\"heavy_truck\""
        );
        assert_eq!(
            serde_json::from_str::<TerrainType>("\"mountainous\"").unwrap(),
            TerrainType::Mountainous
        );
    }

    #[test]
    fn unknown_variants_are_rejected() {
        assert!("kerosene".parse::<FuelType>().is_err());
        assert!("motorbike".parse::<VehicleType>().is_err());
    }

    #[test]
    fn breakdown_addition_is_field_wise() {
        let a = EmissionBreakdown {
            ttw_kg: 1.0,
            wtt_kg: 2.0,
            wtw_kg: 3.0,
        };
        let b = EmissionBreakdown {
            ttw_kg: 10.0,
            wtt_kg: 20.0,
            wtw_kg: 30.0,
        };
        assert_eq!(
            a + b,
            EmissionBreakdown {
                ttw_kg: 11.0,
                wtt_kg: 22.0,
                wtw_kg: 33.0,
            }
        );
        assert_eq!(a + EmissionBreakdown::zero(), a);
    }
}
