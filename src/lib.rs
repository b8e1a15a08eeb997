#[forbid(unsafe_code)]
mod classify;
pub mod csv;
mod emissions;
mod factors;
pub(crate) mod fs;
mod geocode;
mod model;
mod reasoning;
mod routing;
mod segments;
mod trip;

pub use classify::*;
pub use emissions::*;
pub use factors::*;
pub use fs::{cached, BlobStorageProvider, LocalDisk};
pub use geocode::*;
pub use model::*;
pub use reasoning::*;
pub use routing::*;
pub use segments::*;
pub use trip::*;

/// Returns the distance between two geo-points in km
pub(crate) fn distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    let from = geoutils::Location::new(from.0, from.1);
    let to = geoutils::Location::new(to.0, to.1);
    from.haversine_distance_to(&to).meters() / 1000.0
}
