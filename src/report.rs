//! Output artifacts.
//!
//! [`Report`] and [`Overlay`] only rearrange what the aggregation and
//! overlay passes computed. Both serialize to camelCase JSON.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregate::{Aggregates, Counts, DataRange, DistanceSummary, MonthlyStat, YearlyStat};
use crate::heatmap::{HeatPoint, HeatmapResult};
use crate::mode::CanonicalMode;
use crate::overlay::{
    photo_coverage, rank_photos, review_coverage, review_points, OverlayCoverage, PhotoPoint,
    PhotoSidecar, PhotoSummary, ReviewFeature, ReviewPoint, ReviewSummary,
};
use crate::records::RecordStats;
use crate::DigestConfig;

/// The base report, written as `report.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub data_range: Option<DataRange>,
    pub distance: DistanceSummary,
    pub counts: Counts,
    pub yearly_stats: Vec<YearlyStat>,
    pub monthly_stats: Vec<MonthlyStat>,
    /// Integer share of total distance per mode; modes without distance are omitted
    pub activity_distribution: BTreeMap<CanonicalMode, u32>,
    pub records: RecordStats,
    /// `null` when no reviews were supplied
    pub reviews: Option<ReviewSummary>,
    /// `null` when no photos were supplied
    pub photos: Option<PhotoSummary>,
}

impl Report {
    pub fn assemble(
        aggregates: Aggregates,
        reviews: Option<ReviewSummary>,
        photos: Option<PhotoSummary>,
    ) -> Self {
        Self {
            data_range: aggregates.data_range,
            distance: aggregates.distance,
            counts: aggregates.counts,
            yearly_stats: aggregates.yearly,
            monthly_stats: aggregates.monthly,
            activity_distribution: aggregates.activity_distribution,
            records: aggregates.records,
            reviews,
            photos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStats {
    pub heat_cells: usize,
    /// Eligible visits behind the heat points
    pub heat_visits: u64,
    pub max_weight: u32,
    pub photos: Option<OverlayCoverage>,
    pub reviews: Option<OverlayCoverage>,
}

/// Map layers, written as `overlay.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub heat_points: Vec<HeatPoint>,
    pub top_photos: Vec<PhotoPoint>,
    pub reviews: Vec<ReviewPoint>,
    pub stats: OverlayStats,
}

impl Overlay {
    pub fn assemble(
        heatmap: HeatmapResult,
        photos: Option<&[PhotoSidecar]>,
        reviews: Option<&[ReviewFeature]>,
        config: &DigestConfig,
    ) -> Self {
        let top_photos = photos
            .map(|p| rank_photos(p, config.top_photos, config.photo_coord_decimals))
            .unwrap_or_default();
        let review_layer = reviews
            .map(|r| review_points(r, config.snippet_chars))
            .unwrap_or_default();

        Self {
            stats: OverlayStats {
                heat_cells: heatmap.points.len(),
                heat_visits: heatmap.total_weight,
                max_weight: heatmap.max_weight,
                photos: photos.map(photo_coverage),
                reviews: reviews.map(review_coverage),
            },
            heat_points: heatmap.points,
            top_photos,
            reviews: review_layer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_sequential;
    use crate::heatmap::{generate_heatmap, HeatmapConfig};

    #[test]
    fn test_missing_sections_serialize_as_null() {
        let report = Report::assemble(aggregate_sequential(&[]).finish(0), None, None);
        let json = serde_json::to_value(&report).unwrap();

        assert!(json["reviews"].is_null());
        assert!(json["photos"].is_null());
        assert!(json["dataRange"].is_null());
        assert_eq!(json["distance"]["totalKm"], 0.0);
        assert_eq!(json["counts"]["totalRawRecords"], 0);
        assert!(json["yearlyStats"].as_array().unwrap().is_empty());
        assert!(json["activityDistribution"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_empty_overlay() {
        let heatmap = generate_heatmap(&[], &HeatmapConfig::default(), 2);
        let overlay = Overlay::assemble(heatmap, None, Some(&[][..]), &DigestConfig::default());
        let json = serde_json::to_value(&overlay).unwrap();

        assert_eq!(json["heatPoints"], serde_json::json!([]));
        assert_eq!(json["topPhotos"], serde_json::json!([]));
        assert!(json["stats"]["photos"].is_null());
        assert_eq!(json["stats"]["reviews"]["total"], 0);
    }
}
