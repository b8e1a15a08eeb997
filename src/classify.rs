use std::collections::HashMap;

use crate::model::{RoadType, TerrainType};

/// Address components hinting at elevation. "hill" is in the mountain list,
/// so a bare "hill" component classifies as mountainous.
static MOUNTAIN_HINTS: [&str; 5] = ["mountain", "hill", "peak", "ridge", "alpine"];
static HILL_HINTS: [&str; 3] = ["hill", "elevated", "plateau"];
static RURAL_HINTS: [&str; 4] = ["village", "rural", "county", "countryside"];

fn haystack(address: &HashMap<String, String>) -> String {
    address
        .iter()
        .map(|(key, value)| format!("{key}={value} "))
        .collect::<String>()
        .to_lowercase()
}

/// Guesses the terrain of a place from its reverse-geocoded address
/// components. Pure string matching; anything unrecognized is flat.
pub fn classify_terrain(address: &HashMap<String, String>) -> TerrainType {
    let haystack = haystack(address);
    if MOUNTAIN_HINTS.iter().any(|hint| haystack.contains(hint)) {
        TerrainType::Mountainous
    } else if HILL_HINTS.iter().any(|hint| haystack.contains(hint)) {
        TerrainType::Hilly
    } else {
        TerrainType::Flat
    }
}

/// Guesses the dominant road type of a place from its reverse-geocoded
/// address components: settlements mean urban roads, countryside hints mean
/// rural roads, anything else is highway driving.
pub fn classify_road(address: &HashMap<String, String>) -> RoadType {
    if address.contains_key("city") || address.contains_key("town") {
        return RoadType::Urban;
    }
    let haystack = haystack(address);
    if RURAL_HINTS.iter().any(|hint| haystack.contains(hint)) {
        RoadType::Rural
    } else {
        RoadType::Highway
    }
}
