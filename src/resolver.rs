//! Approximate offline reverse geocoding to country codes.
//!
//! Resolution is best-effort: bounding boxes are coarse and overlaps are
//! settled by a planar nearest-centroid rule, with one hand-tuned exception
//! for the US/Canada border. Results near borders can be wrong and must not
//! be presented as precise.
//!
//! ## Algorithm
//!
//! 1. Collect every region whose box contains the point (edges inclusive)
//! 2. No candidates: `None`
//! 3. One candidate: its code
//! 4. Exactly `{US, CA}`: compare latitude against [`us_ca_border_latitude`]
//! 5. Anything else: smallest squared planar distance to centroid, earlier
//!    table entry on exact ties
//!
//! Step 4 always runs before step 5. Downstream country counts depend on
//! that order.

use rstar::{RTree, RTreeObject, AABB};
use std::sync::OnceLock;

use crate::geo_utils::squared_planar_distance;
use crate::regions::{CountryRegion, REGIONS};
use crate::GpsPoint;

static GLOBAL: OnceLock<GeoResolver> = OnceLock::new();

/// Piecewise-linear US/Canada border as (longitude, latitude) knots, west to
/// east. Outside the knot range the nearest end value applies.
const US_CA_BORDER: [(f64, f64); 9] = [
    (-95.15, 49.0),
    (-89.5, 48.0),
    (-84.5, 46.5),
    (-82.5, 42.5),
    (-79.0, 43.3),
    (-76.0, 44.5),
    (-71.5, 45.0),
    (-69.0, 47.3),
    (-67.0, 45.2),
];

/// Latitude of the modeled US/Canada border at `lng`.
///
/// 49°N across the west, dipping to ~42.5°N around Lake Erie, then climbing
/// through the St. Lawrence valley and northern Maine.
pub fn us_ca_border_latitude(lng: f64) -> f64 {
    let (first_lng, first_lat) = US_CA_BORDER[0];
    if lng <= first_lng {
        return first_lat;
    }

    for pair in US_CA_BORDER.windows(2) {
        let (lng0, lat0) = pair[0];
        let (lng1, lat1) = pair[1];
        if lng <= lng1 {
            let t = (lng - lng0) / (lng1 - lng0);
            return lat0 + t * (lat1 - lat0);
        }
    }

    US_CA_BORDER[US_CA_BORDER.len() - 1].1
}

/// Region reference stored in the R-tree.
#[derive(Debug, Clone)]
struct RegionEnvelope {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for RegionEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Country resolver over an immutable region table.
pub struct GeoResolver {
    regions: &'static [CountryRegion],
    index: RTree<RegionEnvelope>,
}

impl GeoResolver {
    /// Build a resolver over an arbitrary table.
    pub fn new(regions: &'static [CountryRegion]) -> Self {
        let entries = regions
            .iter()
            .enumerate()
            .map(|(index, r)| RegionEnvelope {
                index,
                envelope: AABB::from_corners(
                    [r.bounds.min_lng, r.bounds.min_lat],
                    [r.bounds.max_lng, r.bounds.max_lat],
                ),
            })
            .collect();

        Self {
            regions,
            index: RTree::bulk_load(entries),
        }
    }

    /// Process-wide resolver over [`REGIONS`], built on first use.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(|| Self::new(REGIONS))
    }

    /// Regions whose box contains `point`, in table order.
    pub fn candidates(&self, point: &GpsPoint) -> Vec<&'static CountryRegion> {
        let probe = AABB::from_point([point.longitude, point.latitude]);
        let mut hits: Vec<usize> = self
            .index
            .locate_in_envelope_intersecting(&probe)
            .map(|entry| entry.index)
            .filter(|&i| self.regions[i].bounds.contains(point))
            .collect();
        hits.sort_unstable();

        let regions = self.regions;
        hits.into_iter().map(|i| &regions[i]).collect()
    }

    /// Approximate ISO 3166-1 alpha-2 code for `point`.
    pub fn resolve(&self, point: &GpsPoint) -> Option<&'static str> {
        if !point.is_valid() {
            return None;
        }

        let candidates = self.candidates(point);
        match candidates.as_slice() {
            [] => None,
            [only] => Some(only.code),
            [a, b] if is_us_ca_pair(a.code, b.code) => {
                if point.latitude >= us_ca_border_latitude(point.longitude) {
                    Some("CA")
                } else {
                    Some("US")
                }
            }
            many => nearest_centroid(many, point).map(|r| r.code),
        }
    }
}

fn is_us_ca_pair(a: &str, b: &str) -> bool {
    matches!((a, b), ("US", "CA") | ("CA", "US"))
}

/// First region with the smallest squared centroid distance.
fn nearest_centroid(
    candidates: &[&'static CountryRegion],
    point: &GpsPoint,
) -> Option<&'static CountryRegion> {
    let mut best: Option<(&'static CountryRegion, f64)> = None;
    for &region in candidates {
        let d = squared_planar_distance(point, &region.centroid);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((region, d));
        }
    }
    best.map(|(r, _)| r)
}

/// Resolve `(lat, lng)` against the built-in region table.
///
/// # Example
/// ```
/// use timeline_digest::resolve_country;
///
/// assert_eq!(resolve_country(47.3769, 8.5417), Some("CH"));
/// assert_eq!(resolve_country(43.6532, -79.3832), Some("CA")); // Toronto
/// assert_eq!(resolve_country(0.0, -160.0), None); // open Pacific
/// ```
pub fn resolve_country(lat: f64, lng: f64) -> Option<&'static str> {
    GeoResolver::global().resolve(&GpsPoint::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bounds;

    #[test]
    fn test_single_box_resolves_to_its_code() {
        // Tokyo: only Japan's box
        assert_eq!(resolve_country(35.6762, 139.6503), Some("JP"));
        // Sydney
        assert_eq!(resolve_country(-33.8688, 151.2093), Some("AU"));
        // Anchorage: west of Canada's box
        assert_eq!(resolve_country(61.2181, -149.9003), Some("US"));
    }

    #[test]
    fn test_no_match_is_none() {
        assert_eq!(resolve_country(0.0, -160.0), None);
        assert_eq!(resolve_country(-60.0, 0.0), None);
    }

    #[test]
    fn test_invalid_coordinates_are_none() {
        assert_eq!(resolve_country(f64::NAN, 8.5), None);
        assert_eq!(resolve_country(95.0, 8.5), None);
    }

    #[test]
    fn test_nearest_centroid_for_overlaps() {
        // Zurich sits in the CH, FR and DE boxes
        let resolver = GeoResolver::global();
        let zurich = GpsPoint::new(47.3769, 8.5417);
        let codes: Vec<_> = resolver.candidates(&zurich).iter().map(|r| r.code).collect();
        assert_eq!(codes, vec!["FR", "DE", "CH"]);
        assert_eq!(resolver.resolve(&zurich), Some("CH"));

        // Hong Kong inside China's box
        assert_eq!(resolve_country(22.3193, 114.1694), Some("HK"));
        // Singapore inside Malaysia's and Indonesia's boxes
        assert_eq!(resolve_country(1.3521, 103.8198), Some("SG"));
    }

    #[test]
    fn test_us_ca_border_rule_beats_centroid() {
        let resolver = GeoResolver::global();
        let toronto = GpsPoint::new(43.6532, -79.3832);

        let candidates = resolver.candidates(&toronto);
        let codes: Vec<_> = candidates.iter().map(|r| r.code).collect();
        assert_eq!(codes, vec!["US", "CA"]);

        // The generic rule would pick the US here
        assert_eq!(nearest_centroid(&candidates, &toronto).map(|r| r.code), Some("US"));
        assert_eq!(resolver.resolve(&toronto), Some("CA"));
    }

    #[test]
    fn test_us_ca_border_cities() {
        assert_eq!(resolve_country(49.2827, -123.1207), Some("CA")); // Vancouver
        assert_eq!(resolve_country(47.6062, -122.3321), Some("US")); // Seattle
        assert_eq!(resolve_country(45.5017, -73.5673), Some("CA")); // Montreal
        assert_eq!(resolve_country(42.8864, -78.8784), Some("US")); // Buffalo
        assert_eq!(resolve_country(41.8781, -87.6298), Some("US")); // Chicago
        assert_eq!(resolve_country(40.7128, -74.0060), Some("US")); // New York
    }

    #[test]
    fn test_border_latitude_profile() {
        assert_eq!(us_ca_border_latitude(-120.0), 49.0);
        assert_eq!(us_ca_border_latitude(-95.15), 49.0);
        assert_eq!(us_ca_border_latitude(-82.5), 42.5);
        assert_eq!(us_ca_border_latitude(-60.0), 45.2);
        let mid = us_ca_border_latitude(-83.5);
        assert!((mid - 44.5).abs() < 1e-9);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let points = [
            GpsPoint::new(47.3769, 8.5417),
            GpsPoint::new(43.6532, -79.3832),
            GpsPoint::new(35.6762, 139.6503),
            GpsPoint::new(10.0, 10.0),
        ];
        for p in &points {
            assert_eq!(GeoResolver::global().resolve(p), GeoResolver::global().resolve(p));
        }
    }

    #[test]
    fn test_exact_tie_keeps_table_order() {
        static TIED: [CountryRegion; 2] = [
            CountryRegion {
                code: "AA",
                bounds: Bounds { min_lat: 0.0, max_lat: 10.0, min_lng: 0.0, max_lng: 10.0 },
                centroid: GpsPoint { latitude: 4.0, longitude: 5.0 },
            },
            CountryRegion {
                code: "BB",
                bounds: Bounds { min_lat: 0.0, max_lat: 10.0, min_lng: 0.0, max_lng: 10.0 },
                centroid: GpsPoint { latitude: 6.0, longitude: 5.0 },
            },
        ];
        let resolver = GeoResolver::new(&TIED);
        assert_eq!(resolver.resolve(&GpsPoint::new(5.0, 5.0)), Some("AA"));
        assert_eq!(resolver.resolve(&GpsPoint::new(5.5, 5.0)), Some("BB"));
    }

    #[test]
    fn test_box_edges_are_inclusive() {
        static EDGE: [CountryRegion; 1] = [CountryRegion {
            code: "ZZ",
            bounds: Bounds { min_lat: 0.0, max_lat: 1.0, min_lng: 0.0, max_lng: 1.0 },
            centroid: GpsPoint { latitude: 0.5, longitude: 0.5 },
        }];
        let resolver = GeoResolver::new(&EDGE);
        assert_eq!(resolver.resolve(&GpsPoint::new(1.0, 1.0)), Some("ZZ"));
        assert_eq!(resolver.resolve(&GpsPoint::new(1.0001, 1.0)), None);
    }
}
