//! Photo and review overlays.
//!
//! Two auxiliary collections ride along with the timeline export: Google
//! Photos sidecar files and the Maps reviews GeoJSON. Both are optional.
//! Each yields a summary for the report and a point list for the map.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::DataRange;
use crate::geo_utils::{is_geotagged, round_to};
use crate::ingest::LenientSeq;
use crate::resolver::GeoResolver;
use crate::GpsPoint;

// ============================================================================
// Wire shapes
// ============================================================================

/// Numbers that exports sometimes write as strings (`"imageViews": "57"`).
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrString {
    fn as_i64(&self) -> Option<i64> {
        match self {
            NumberOrString::Int(v) => Some(*v),
            NumberOrString::Float(v) if v.is_finite() => Some(*v as i64),
            NumberOrString::Float(_) => None,
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(NumberOrString::as_i64))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoData {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoTime {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub timestamp: Option<i64>,
}

/// One Google Photos sidecar (`IMG_0001.jpg.json`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSidecar {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub image_views: Option<i64>,
    pub photo_taken_time: Option<PhotoTime>,
    pub geo_data: Option<GeoData>,
    pub geo_data_exif: Option<GeoData>,
}

impl PhotoSidecar {
    /// First non-(0, 0) geotag, preferring `geoData` over `geoDataExif`.
    pub fn location(&self) -> Option<GpsPoint> {
        [&self.geo_data, &self.geo_data_exif]
            .into_iter()
            .flatten()
            .map(|g| GpsPoint::new(g.latitude, g.longitude))
            .find(|p| is_geotagged(p) && p.is_valid())
    }

    /// UTC capture date.
    pub fn taken_date(&self) -> Option<NaiveDate> {
        let secs = self.photo_taken_time.as_ref()?.timestamp?;
        DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
    }

    pub fn views(&self) -> u64 {
        self.image_views.unwrap_or(0).max(0) as u64
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewCollection {
    #[serde(default)]
    pub features: LenientSeq<ReviewFeature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewGeometry {
    /// GeoJSON order: `[lng, lat]`
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewLocation {
    pub name: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewProperties {
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub five_star_rating_published: Option<i64>,
    pub review_text_published: Option<String>,
    pub location: Option<ReviewLocation>,
}

/// One review feature of the Maps reviews GeoJSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewFeature {
    pub geometry: Option<ReviewGeometry>,
    #[serde(default)]
    pub properties: ReviewProperties,
}

impl ReviewFeature {
    /// Non-(0, 0) coordinates, if any.
    pub fn location(&self) -> Option<GpsPoint> {
        match self.geometry.as_ref()?.coordinates.as_slice() {
            [lng, lat, ..] => Some(GpsPoint::new(*lat, *lng)).filter(|p| is_geotagged(p) && p.is_valid()),
            _ => None,
        }
    }

    /// Star rating; 0 means unpublished.
    pub fn rating(&self) -> u8 {
        self.properties
            .five_star_rating_published
            .unwrap_or(0)
            .clamp(0, u8::MAX as i64) as u8
    }

    pub fn date(&self) -> Option<NaiveDate> {
        parse_date(self.properties.date.as_deref()?)
    }

    /// Country from the review itself, else from its coordinates.
    pub fn country_code(&self) -> Option<String> {
        self.properties
            .location
            .as_ref()
            .and_then(|l| l.country_code.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_ascii_uppercase)
            .or_else(|| {
                let point = self.location()?;
                GeoResolver::global().resolve(&point).map(str::to_string)
            })
    }
}

/// RFC 3339 timestamp or bare `YYYY-MM-DD`.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
}

fn snippet(text: &str, limit: usize) -> String {
    text.trim().chars().take(limit).collect()
}

fn date_range(dates: impl IntoIterator<Item = NaiveDate>) -> Option<DataRange> {
    dates.into_iter().fold(None, |range, d| match range {
        None => Some(DataRange { start: d, end: d }),
        Some(r) => Some(DataRange {
            start: r.start.min(d),
            end: r.end.max(d),
        }),
    })
}

// ============================================================================
// Output types
// ============================================================================

/// Totals shared by both overlays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayCoverage {
    pub total: usize,
    pub geotagged: usize,
    pub date_range: Option<DataRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPoint {
    pub lat: f64,
    pub lng: f64,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub views: u64,
    /// Display path of the resized copy, when one was written
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSummary {
    pub total: usize,
    pub geotagged: usize,
    pub date_range: Option<DataRange>,
    pub by_year: BTreeMap<i32, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPoint {
    pub lat: f64,
    pub lng: f64,
    pub rating: u8,
    pub date: Option<NaiveDate>,
    pub country_code: Option<String>,
    pub name: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub total: usize,
    pub countries: usize,
    /// Mean of published ratings; unpublished (0) ratings are left out
    pub avg_rating: Option<f64>,
    pub by_country: BTreeMap<String, u64>,
    pub by_year: BTreeMap<i32, u64>,
    pub rating_distribution: BTreeMap<u8, u64>,
}

// ============================================================================
// Extraction
// ============================================================================

/// Geotagged photos ranked by view count, capped at `limit`.
///
/// The sort is stable, so photos with equal views keep their input order.
pub fn rank_photos(photos: &[PhotoSidecar], limit: usize, decimals: u32) -> Vec<PhotoPoint> {
    let mut ranked: Vec<PhotoPoint> = photos
        .iter()
        .filter_map(|photo| {
            let point = photo.location()?;
            Some(PhotoPoint {
                lat: round_to(point.latitude, decimals),
                lng: round_to(point.longitude, decimals),
                title: photo.title.clone().unwrap_or_default(),
                description: photo.description.clone().unwrap_or_default(),
                date: photo.taken_date(),
                views: photo.views(),
                thumbnail: None,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.views.cmp(&a.views));
    ranked.truncate(limit);
    ranked
}

pub fn photo_coverage(photos: &[PhotoSidecar]) -> OverlayCoverage {
    let geotagged: Vec<&PhotoSidecar> = photos.iter().filter(|p| p.location().is_some()).collect();
    OverlayCoverage {
        total: photos.len(),
        geotagged: geotagged.len(),
        date_range: date_range(geotagged.iter().filter_map(|p| p.taken_date())),
    }
}

pub fn summarize_photos(photos: &[PhotoSidecar]) -> PhotoSummary {
    let coverage = photo_coverage(photos);
    let mut by_year = BTreeMap::new();
    for date in photos.iter().filter_map(PhotoSidecar::taken_date) {
        *by_year.entry(date.year()).or_insert(0) += 1;
    }
    PhotoSummary {
        total: coverage.total,
        geotagged: coverage.geotagged,
        date_range: coverage.date_range,
        by_year,
    }
}

/// Every geotagged review, in input order.
pub fn review_points(reviews: &[ReviewFeature], snippet_chars: usize) -> Vec<ReviewPoint> {
    reviews
        .iter()
        .filter_map(|review| {
            let point = review.location()?;
            Some(ReviewPoint {
                lat: point.latitude,
                lng: point.longitude,
                rating: review.rating(),
                date: review.date(),
                country_code: review.country_code(),
                name: review.properties.location.as_ref().and_then(|l| l.name.clone()),
                text: snippet(
                    review.properties.review_text_published.as_deref().unwrap_or(""),
                    snippet_chars,
                ),
            })
        })
        .collect()
}

pub fn review_coverage(reviews: &[ReviewFeature]) -> OverlayCoverage {
    let geotagged: Vec<&ReviewFeature> = reviews.iter().filter(|r| r.location().is_some()).collect();
    OverlayCoverage {
        total: reviews.len(),
        geotagged: geotagged.len(),
        date_range: date_range(geotagged.iter().filter_map(|r| r.date())),
    }
}

pub fn summarize_reviews(reviews: &[ReviewFeature]) -> ReviewSummary {
    let mut by_country: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();
    let mut rating_distribution: BTreeMap<u8, u64> = (0..=5).map(|r| (r, 0)).collect();
    let mut countries = BTreeSet::new();
    let (mut rated, mut rating_sum) = (0u64, 0u64);

    for review in reviews {
        let rating = review.rating();
        *rating_distribution.entry(rating).or_insert(0) += 1;
        if rating > 0 {
            rated += 1;
            rating_sum += rating as u64;
        }
        if let Some(code) = review.country_code() {
            *by_country.entry(code.clone()).or_insert(0) += 1;
            countries.insert(code);
        }
        if let Some(date) = review.date() {
            *by_year.entry(date.year()).or_insert(0) += 1;
        }
    }

    ReviewSummary {
        total: reviews.len(),
        countries: countries.len(),
        avg_rating: (rated > 0).then(|| round_to(rating_sum as f64 / rated as f64, 2)),
        by_country,
        by_year,
        rating_distribution,
    }
}
