//! Pure geographic computations feeding the clustering index.
//!
//! - Viewport math: region to bounding box, zoom fitting, Mercator projection
//! - Item to feature conversion
//! - Coordinate validation
//! - GeoJSON export (with the `geojson` feature)

pub mod feature;
pub mod geo;
#[cfg(feature = "geojson")]
pub mod geojson;
pub mod validation;
