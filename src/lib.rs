//! # Timeline Digest
//!
//! Offline travel statistics from a Google Timeline location-history export.
//!
//! This library provides:
//! - Streaming ingest and normalization of `semanticSegments` exports
//! - Single-pass aggregation into yearly, monthly and per-mode distance stats
//! - Approximate country attribution from a built-in bounding-box table
//! - Visit heatmap, top-photo and review overlays for map display
//!
//! ## Features
//!
//! - **`parallel`** - Shard the aggregation and heatmap folds with rayon (default)
//!
//! ## Quick Start
//!
//! ```rust
//! use timeline_digest::{build_report, read_timeline, DigestConfig};
//!
//! let export = read_timeline(r#"{"semanticSegments": [{
//!     "startTime": "2024-05-01T08:00:00.000+02:00",
//!     "endTime": "2024-05-01T09:00:00.000+02:00",
//!     "activity": { "distanceMeters": 12000.0, "topCandidate": { "type": "CYCLING" } }
//! }]}"#.as_bytes()).unwrap();
//!
//! let report = build_report(&export, None, None, &DigestConfig::default());
//! assert_eq!(report.distance.total_km, 12.0);
//! assert_eq!(report.counts.total_activities, 1);
//! ```

use geo::{Coord, Intersects, Rect};
use log::{debug, info};
use serde::Serialize;
use std::time::Instant;

mod error;
pub use error::{Error, Result};

pub mod geo_utils;

// Record normalization and classification
pub mod mode;
pub mod segment;
pub use mode::{classify, CanonicalMode};
pub use segment::{normalize, RawSegment, Segment, SemanticType};

// Country attribution
pub mod regions;
pub mod resolver;
pub use regions::{CountryRegion, REGIONS};
pub use resolver::{resolve_country, GeoResolver};

// Aggregation
pub mod aggregate;
pub mod records;
pub use aggregate::{aggregate, Aggregates, Aggregator};
pub use records::RecordStats;

// Map layers
pub mod heatmap;
pub mod overlay;
pub use heatmap::{generate_heatmap, HeatPoint, HeatmapConfig, HeatmapGrid, HeatmapResult};
pub use overlay::{PhotoPoint, PhotoSidecar, ReviewFeature, ReviewPoint};

// Inputs and outputs
pub mod ingest;
pub mod insights;
pub mod report;
pub mod thumbs;
pub use ingest::{load_photos, load_reviews, load_timeline, read_timeline, TimelineExport};
pub use insights::{CommandInsights, InsightSource};
pub use report::{Overlay, Report};
pub use thumbs::write_thumbnails;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use timeline_digest::GpsPoint;
/// let point = GpsPoint::new(47.3769, 8.5417); // Zurich
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// As a planar `geo` coordinate (x = longitude, y = latitude).
    pub fn to_coord(&self) -> Coord {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

/// Axis-aligned latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Whether `point` lies inside the box. Edges count as inside.
    pub fn contains(&self, point: &GpsPoint) -> bool {
        let rect = Rect::new(
            Coord { x: self.min_lng, y: self.min_lat },
            Coord { x: self.max_lng, y: self.max_lat },
        );
        rect.intersects(&point.to_coord())
    }
}

/// Tuning knobs for a digest run.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Decimal places of heatmap cells.
    /// Default: 1 (~11 km cells)
    pub heatmap_precision: u32,

    /// Photos kept in the overlay, most viewed first.
    /// Default: 500
    pub top_photos: usize,

    /// Maximum characters of review text carried into the overlay.
    /// Default: 200
    pub snippet_chars: usize,

    /// Decimal places of photo coordinates.
    /// Default: 4 (~11 m)
    pub photo_coord_decimals: u32,

    /// Longest edge of generated thumbnails in pixels.
    /// Default: 256
    pub thumbnail_size: u32,

    /// Segments per rayon task in the parallel folds.
    /// Default: 4096
    pub parallel_chunk: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            heatmap_precision: 1,
            top_photos: 500,
            snippet_chars: 200,
            photo_coord_decimals: 4,
            thumbnail_size: 256,
            parallel_chunk: 4096,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Aggregate an export into the base report.
///
/// Review and photo sections are `None` when the matching input is absent.
pub fn build_report(
    export: &TimelineExport,
    reviews: Option<&[ReviewFeature]>,
    photos: Option<&[PhotoSidecar]>,
    config: &DigestConfig,
) -> Report {
    let start = Instant::now();

    if export.dropped() > 0 {
        debug!(
            "[Aggregate] {} of {} records dropped during normalization",
            export.dropped(),
            export.raw_records
        );
    }

    #[cfg(feature = "parallel")]
    {
        debug!("[Aggregate] Using parallel fold (rayon), chunk {}", config.parallel_chunk);
    }
    #[cfg(not(feature = "parallel"))]
    {
        debug!("[Aggregate] Using sequential fold");
    }

    let aggregates = aggregate(&export.segments, config.parallel_chunk).finish(export.raw_records);
    info!(
        "[Aggregate] {} segments -> {} years, {} months, {:.0} km in {:?}",
        export.segments.len(),
        aggregates.yearly.len(),
        aggregates.monthly.len(),
        aggregates.distance.total_km,
        start.elapsed()
    );

    Report::assemble(
        aggregates,
        reviews.map(overlay::summarize_reviews),
        photos.map(overlay::summarize_photos),
    )
}

/// Build the map layers: visit heatmap, top photos and reviews.
pub fn build_overlay(
    export: &TimelineExport,
    reviews: Option<&[ReviewFeature]>,
    photos: Option<&[PhotoSidecar]>,
    config: &DigestConfig,
) -> Overlay {
    let start = Instant::now();
    let heatmap = generate_heatmap(
        &export.segments,
        &HeatmapConfig {
            precision: config.heatmap_precision,
        },
        config.parallel_chunk,
    );
    let overlay = Overlay::assemble(heatmap, photos, reviews, config);

    info!(
        "[Overlay] {} heat cells, {} photos, {} reviews in {:?}",
        overlay.heat_points.len(),
        overlay.top_photos.len(),
        overlay.reviews.len(),
        start.elapsed()
    );
    overlay
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn export(segments: serde_json::Value) -> TimelineExport {
        read_timeline(segments.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_gps_point_validation() {
        assert!(GpsPoint::new(51.5074, -0.1278).is_valid());
        assert!(!GpsPoint::new(91.0, 0.0).is_valid());
        assert!(!GpsPoint::new(0.0, 181.0).is_valid());
        assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_bounds_contains_edges() {
        let bounds = Bounds { min_lat: 45.0, max_lat: 48.0, min_lng: 5.0, max_lng: 11.0 };
        assert!(bounds.contains(&GpsPoint::new(47.0, 8.0)));
        assert!(bounds.contains(&GpsPoint::new(45.0, 5.0)));
        assert!(bounds.contains(&GpsPoint::new(48.0, 11.0)));
        assert!(!bounds.contains(&GpsPoint::new(48.0001, 8.0)));
        assert!(!bounds.contains(&GpsPoint::new(47.0, 4.9999)));
    }

    #[test]
    fn test_build_report_and_overlay() {
        let export = export(json!([
            {
                "startTime": "2023-07-01T10:00:00.000+02:00",
                "endTime": "2023-07-01T11:00:00.000+02:00",
                "visit": { "topCandidate": {
                    "placeId": "cafe",
                    "semanticType": "UNKNOWN",
                    "placeLocation": { "latLng": "47.3769°, 8.5417°" }
                }}
            },
            {
                "startTime": "2023-07-02T08:00:00.000+02:00",
                "endTime": "2023-07-02T09:00:00.000+02:00",
                "visit": { "topCandidate": {
                    "placeId": "home",
                    "semanticType": "HOME",
                    "placeLocation": { "latLng": "47.3900°, 8.5100°" }
                }}
            },
            { "broken": true }
        ]));
        let config = DigestConfig::default();

        let report = build_report(&export, None, Some(&[][..]), &config);
        assert_eq!(report.counts.total_visits, 2);
        assert_eq!(report.counts.total_raw_records, 3);
        assert_eq!(report.yearly_stats[0].countries, vec!["CH"]);
        assert!(report.reviews.is_none());
        assert_eq!(report.photos.as_ref().map(|p| p.total), Some(0));

        let overlay = build_overlay(&export, None, None, &config);
        assert_eq!(overlay.heat_points, vec![HeatPoint { lat: 47.4, lng: 8.5, weight: 1 }]);
        assert_eq!(overlay.stats.heat_visits, 1);
    }
}
