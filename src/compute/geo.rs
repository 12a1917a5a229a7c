//! Viewport math: regions to bounding boxes, slippy-map zoom fitting, and the
//! Web Mercator projection used by the clustering index.
//!
//! All functions here are pure and never fail for finite input.

use clustermap_types::{BoundingBox, Dimensions, Region};
use std::f64::consts::PI;

/// Tile edge length in pixels used for viewport zoom fitting.
pub const TILE_SIZE: f64 = 256.0;

/// Lowest zoom returned by [`viewport_zoom`].
pub const VIEWPORT_MIN_ZOOM: u8 = 0;

/// Highest zoom returned by [`viewport_zoom`].
pub const VIEWPORT_MAX_ZOOM: u8 = 20;

/// Converts a viewport region into a `[west, south, east, north]` box.
///
/// Edges are the center plus or minus half of each span. A negative longitude
/// span is normalized into `[0, 360)` first, and a span of 360° or more covers
/// every longitude.
///
/// Antimeridian policy: each edge is clamped independently to
/// `[-180, 180]` / `[-90, 90]`. A region whose span reaches past the 180°
/// meridian therefore stops at it instead of wrapping, which keeps
/// `west <= east` and `south <= north` for every finite region.
///
/// # Examples
///
/// ```
/// use clustermap::{Region, compute::geo::region_to_bounding_box};
///
/// let bbox = region_to_bounding_box(&Region::new(10.0, 20.0, 4.0, 6.0));
/// assert_eq!(bbox.to_array(), [17.0, 8.0, 23.0, 12.0]);
///
/// // Crossing the antimeridian clamps at 180
/// let bbox = region_to_bounding_box(&Region::new(0.0, 175.0, 10.0, 20.0));
/// assert_eq!(bbox.east, 180.0);
/// assert!(bbox.west <= bbox.east);
/// ```
pub fn region_to_bounding_box(region: &Region) -> BoundingBox {
    let lng_delta = normalize_longitude_delta(region.longitude_delta);
    let half_lat = region.latitude_delta.abs() / 2.0;

    let (west, east) = if lng_delta >= 360.0 {
        (-180.0, 180.0)
    } else {
        let half_lng = lng_delta / 2.0;
        (
            clamp_longitude(region.longitude - half_lng),
            clamp_longitude(region.longitude + half_lng),
        )
    };

    BoundingBox::new(
        west,
        clamp_latitude(region.latitude - half_lat),
        east,
        clamp_latitude(region.latitude + half_lat),
    )
}

/// Map a negative longitude span into `[0, 360)`. Positive spans pass through.
pub fn normalize_longitude_delta(delta: f64) -> f64 {
    if delta < 0.0 {
        delta.rem_euclid(360.0)
    } else {
        delta
    }
}

fn clamp_longitude(lng: f64) -> f64 {
    lng.clamp(-180.0, 180.0)
}

fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-90.0, 90.0)
}

/// Highest integer zoom at which `bbox` fits inside a surface of `dimensions`
/// pixels, using 256px tiles and clamped to `[0, 20]`.
///
/// A zero-area box fits at every zoom and returns the maximum. Non-finite
/// input returns the minimum.
///
/// # Examples
///
/// ```
/// use clustermap::{BoundingBox, Dimensions, compute::geo::viewport_zoom};
///
/// // The whole world fits a 256px square at zoom 0
/// let world = BoundingBox::new(-180.0, -85.0511, 180.0, 85.0511);
/// assert_eq!(viewport_zoom(&world, Dimensions::new(256.0, 256.0)), 0);
///
/// // A 1024px wide surface shows it two levels deeper
/// assert_eq!(viewport_zoom(&world, Dimensions::new(1024.0, 1024.0)), 2);
/// ```
pub fn viewport_zoom(bbox: &BoundingBox, dimensions: Dimensions) -> u8 {
    if !bbox.is_finite() {
        log::warn!("Rejecting viewport zoom for non-finite bounding box");
        return VIEWPORT_MIN_ZOOM;
    }

    let base = f64::from(VIEWPORT_MAX_ZOOM);
    let world_px = TILE_SIZE * 2f64.powf(base);

    let mut width = (lng_x(bbox.east) - lng_x(bbox.west)) * world_px;
    if bbox.crosses_antimeridian() {
        width += world_px;
    }
    let height = (lat_y(bbox.south) - lat_y(bbox.north)) * world_px;

    let zoom_x = base - (width / dimensions.width).log2();
    let zoom_y = base - (height / dimensions.height).log2();
    let fitted = zoom_x.min(zoom_y).floor();

    if fitted.is_nan() {
        return VIEWPORT_MIN_ZOOM;
    }

    fitted.clamp(f64::from(VIEWPORT_MIN_ZOOM), base) as u8
}

/// Longitude to Web Mercator x in `[0, 1]`.
pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Latitude to Web Mercator y in `[0, 1]`, north at 0. Latitudes beyond the
/// Mercator limit are clamped to the square.
pub fn lat_y(lat: f64) -> f64 {
    let sin = (lat * PI / 180.0).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

/// Web Mercator x back to longitude.
pub fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

/// Web Mercator y back to latitude.
pub fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * y2.exp().atan() / PI - 90.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_ordered(bbox: &BoundingBox) {
        assert!(bbox.west <= bbox.east, "west > east in {:?}", bbox);
        assert!(bbox.south <= bbox.north, "south > north in {:?}", bbox);
    }

    #[test]
    fn test_half_deltas_around_center() {
        let bbox = region_to_bounding_box(&Region::new(37.78825, -122.4324, 0.0922, 0.0421));
        assert!((bbox.west - (-122.4324 - 0.02105)).abs() < 1e-9);
        assert!((bbox.east - (-122.4324 + 0.02105)).abs() < 1e-9);
        assert!((bbox.south - (37.78825 - 0.0461)).abs() < 1e-9);
        assert!((bbox.north - (37.78825 + 0.0461)).abs() < 1e-9);
    }

    #[test]
    fn test_antimeridian_is_clamped_not_wrapped() {
        let east_side = region_to_bounding_box(&Region::new(0.0, 170.0, 10.0, 40.0));
        assert_eq!(east_side.west, 150.0);
        assert_eq!(east_side.east, 180.0);
        assert!(!east_side.crosses_antimeridian());

        let west_side = region_to_bounding_box(&Region::new(0.0, -170.0, 10.0, 40.0));
        assert_eq!(west_side.west, -180.0);
        assert_eq!(west_side.east, -150.0);
    }

    #[test]
    fn test_poles_are_clamped() {
        let bbox = region_to_bounding_box(&Region::new(85.0, 0.0, 20.0, 10.0));
        assert_eq!(bbox.north, 90.0);
        assert_eq!(bbox.south, 75.0);
    }

    #[test]
    fn test_negative_longitude_delta_is_normalized() {
        let bbox = region_to_bounding_box(&Region::new(0.0, 0.0, 10.0, -340.0));
        // -340 + 360 = 20
        assert_eq!(bbox.west, -10.0);
        assert_eq!(bbox.east, 10.0);
    }

    #[test]
    fn test_full_world_span() {
        let bbox = region_to_bounding_box(&Region::new(0.0, 45.0, 180.0, 400.0));
        assert_eq!(bbox.to_array(), [-180.0, -90.0, 180.0, 90.0]);
    }

    #[test]
    fn test_bounding_box_always_ordered() {
        for lat in [-89.0, -45.0, 0.0, 45.0, 89.0] {
            for lng in [-179.9, -90.0, 0.0, 90.0, 179.9] {
                for lat_delta in [0.0, 0.5, 30.0, 180.0] {
                    for lng_delta in [-200.0, 0.0, 1.0, 90.0, 359.0, 720.0] {
                        let region = Region::new(lat, lng, lat_delta, lng_delta);
                        assert_ordered(&region_to_bounding_box(&region));
                    }
                }
            }
        }
    }

    #[test]
    fn test_viewport_zoom_narrow_box_is_deep() {
        let bbox = BoundingBox::new(-122.44, 37.77, -122.42, 37.79);
        let zoom = viewport_zoom(&bbox, Dimensions::new(400.0, 800.0));
        assert!(zoom >= 13, "zoom was {}", zoom);
        assert!(zoom <= VIEWPORT_MAX_ZOOM);
    }

    #[test]
    fn test_viewport_zoom_monotonic_in_box_size() {
        let dims = Dimensions::new(512.0, 512.0);
        let mut last = VIEWPORT_MAX_ZOOM;
        for half in [0.01, 0.1, 1.0, 10.0, 60.0] {
            let bbox = BoundingBox::new(-half, -half, half, half);
            let zoom = viewport_zoom(&bbox, dims);
            assert!(zoom <= last);
            last = zoom;
        }
    }

    #[test]
    fn test_viewport_zoom_degenerate_inputs() {
        let point = BoundingBox::new(10.0, 10.0, 10.0, 10.0);
        assert_eq!(
            viewport_zoom(&point, Dimensions::new(100.0, 100.0)),
            VIEWPORT_MAX_ZOOM
        );

        let broken = BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0);
        assert_eq!(
            viewport_zoom(&broken, Dimensions::new(100.0, 100.0)),
            VIEWPORT_MIN_ZOOM
        );
    }

    #[test]
    fn test_mercator_round_trip() {
        for lng in [-180.0, -73.5, 0.0, 120.25, 180.0] {
            assert!((x_lng(lng_x(lng)) - lng).abs() < 1e-9);
        }
        for lat in [-80.0, -12.5, 0.0, 33.3, 80.0] {
            assert!((y_lat(lat_y(lat)) - lat).abs() < 1e-9);
        }
        assert_eq!(lat_y(90.0), 0.0);
        assert_eq!(lat_y(-90.0), 1.0);
    }
}
