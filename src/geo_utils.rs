//! # Geographic Utilities
//!
//! Coordinate helpers shared by the resolver, the heatmap grid and the
//! overlay extractor.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`squared_planar_distance`] | Squared Euclidean distance in degree space |
//! | [`round_to`] | Round a value to a fixed number of decimals |
//! | [`quantize`] | Snap a point to an integer grid cell |
//! | [`cell_center`] | Recover the coordinates of a grid cell |
//! | [`is_geotagged`] | Reject the (0, 0) "no location" sentinel |
//! | [`parse_lat_lng`] | Parse the textual `latLng` form used by timeline exports |
//!
//! ## Algorithm Notes
//!
//! Country attribution compares squared distances directly in
//! latitude/longitude degrees. No projection or geodesic correction is
//! applied; at bounding-box granularity the ranking is what matters, not the
//! metric distance.

use crate::GpsPoint;

/// Squared Euclidean distance between two points, treating degrees as a plane.
///
/// # Example
///
/// ```rust
/// use timeline_digest::{GpsPoint, geo_utils};
///
/// let a = GpsPoint::new(0.0, 0.0);
/// let b = GpsPoint::new(3.0, 4.0);
/// assert_eq!(geo_utils::squared_planar_distance(&a, &b), 25.0);
/// ```
#[inline]
pub fn squared_planar_distance(a: &GpsPoint, b: &GpsPoint) -> f64 {
    let dlat = a.latitude - b.latitude;
    let dlng = a.longitude - b.longitude;
    dlat * dlat + dlng * dlng
}

/// Round `value` to `decimals` decimal places.
#[inline]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Snap a point to a grid of `10^-decimals` degree cells.
///
/// Coordinates are rounded, not floored, so `(47.36, 8.54)` at one decimal
/// lands in cell `(474, 85)`.
#[inline]
pub fn quantize(point: &GpsPoint, decimals: u32) -> (i32, i32) {
    let factor = 10f64.powi(decimals as i32);
    (
        (point.latitude * factor).round() as i32,
        (point.longitude * factor).round() as i32,
    )
}

/// Coordinates of a cell produced by [`quantize`].
#[inline]
pub fn cell_center(cell: (i32, i32), decimals: u32) -> (f64, f64) {
    let factor = 10f64.powi(decimals as i32);
    (cell.0 as f64 / factor, cell.1 as f64 / factor)
}

/// True unless the point is the (0, 0) sentinel exports use for "no location".
#[inline]
pub fn is_geotagged(point: &GpsPoint) -> bool {
    !(point.latitude == 0.0 && point.longitude == 0.0)
}

/// Parse the textual coordinate forms found in timeline exports.
///
/// Accepts `"47.3769°, 8.5417°"`, `"47.3769, 8.5417"` and
/// `"geo:47.3769,8.5417"`. Returns `None` for anything else or for
/// out-of-range values.
pub fn parse_lat_lng(raw: &str) -> Option<GpsPoint> {
    let body = raw.trim();
    let body = body.strip_prefix("geo:").unwrap_or(body);
    let (lat, lng) = body.split_once(',')?;

    let parse = |s: &str| s.trim().trim_end_matches('°').trim().parse::<f64>().ok();
    let point = GpsPoint::new(parse(lat)?, parse(lng)?);

    point.is_valid().then_some(point)
}
