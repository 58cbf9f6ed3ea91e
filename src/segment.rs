//! Timeline segments and the record normalizer.
//!
//! Exports describe every segment as one object whose *kind* is implied by
//! which sub-object is present (`visit`, `activity`, `timelineMemory.trip`).
//! [`RawSegment`] mirrors that loose wire shape; [`normalize`] turns it into
//! the tagged [`Segment`] enum or drops it.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;

use crate::geo_utils::parse_lat_lng;
use crate::mode::{classify, CanonicalMode};
use crate::GpsPoint;

/// An instant with the UTC offset it was recorded in.
pub type Timestamp = DateTime<FixedOffset>;

/// Local calendar date of a timestamp.
#[inline]
pub fn local_date(ts: &Timestamp) -> NaiveDate {
    ts.date_naive()
}

// ============================================================================
// Wire shape
// ============================================================================

/// One `semanticSegments` entry as it appears in the export.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSegment {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub start_time_timezone_utc_offset_minutes: Option<i32>,
    pub visit: Option<RawVisit>,
    pub activity: Option<RawActivity>,
    pub timeline_memory: Option<RawTimelineMemory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVisit {
    pub top_candidate: Option<RawPlaceCandidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlaceCandidate {
    pub place_id: Option<String>,
    pub semantic_type: Option<String>,
    pub place_location: Option<RawPlaceLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlaceLocation {
    pub lat_lng: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawActivity {
    pub distance_meters: Option<f64>,
    pub top_candidate: Option<RawActivityCandidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawActivityCandidate {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTimelineMemory {
    pub trip: Option<RawTrip>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrip {
    pub distance_from_origin_kms: Option<f64>,
}

// ============================================================================
// Normalized records
// ============================================================================

/// Routine-location classification of a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Home,
    Work,
    Other,
}

impl SemanticType {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("HOME") | Some("INFERRED_HOME") => SemanticType::Home,
            Some("WORK") | Some("INFERRED_WORK") => SemanticType::Work,
            _ => SemanticType::Other,
        }
    }

    /// Home and work are excluded from density maps.
    pub fn is_routine(&self) -> bool {
        matches!(self, SemanticType::Home | SemanticType::Work)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub time: Option<Timestamp>,
    pub place_id: String,
    pub location: Option<GpsPoint>,
    pub semantic_type: SemanticType,
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub distance_meters: f64,
    pub raw_type: String,
    pub mode: CanonicalMode,
    pub utc_offset_minutes: Option<i32>,
}

impl Activity {
    pub fn distance_km(&self) -> f64 {
        self.distance_meters / 1000.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripMarker {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub distance_from_origin_km: f64,
    pub utc_offset_minutes: Option<i32>,
}

/// A normalized timeline segment. Exactly one kind per record.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Visit(Visit),
    Activity(Activity),
    Trip(TripMarker),
}

impl Segment {
    /// Timestamp used for year/month/day bucketing.
    pub fn time(&self) -> Option<&Timestamp> {
        match self {
            Segment::Visit(v) => v.time.as_ref(),
            Segment::Activity(a) => a.start.as_ref(),
            Segment::Trip(t) => t.start.as_ref(),
        }
    }

    pub fn utc_offset_minutes(&self) -> Option<i32> {
        match self {
            Segment::Visit(v) => v.utc_offset_minutes,
            Segment::Activity(a) => a.utc_offset_minutes,
            Segment::Trip(t) => t.utc_offset_minutes,
        }
    }

    /// Every calendar date this record touches (start and, if present, end).
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let (start, end) = match self {
            Segment::Visit(v) => (v.time, None),
            Segment::Activity(a) => (a.start, a.end),
            Segment::Trip(t) => (t.start, t.end),
        };
        start.into_iter().chain(end).map(|ts| local_date(&ts))
    }
}

// ============================================================================
// Normalizer
// ============================================================================

/// Parse an optional RFC 3339 field.
///
/// `Ok(None)` when absent, `Err(())` when present but unparseable.
fn parse_time(raw: Option<&str>) -> Result<Option<Timestamp>, ()> {
    match raw {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s.trim()).map(Some).map_err(|_| ()),
    }
}

fn valid_distance(value: Option<f64>) -> Option<f64> {
    value.filter(|d| d.is_finite() && *d >= 0.0)
}

/// Convert a raw export entry into a typed [`Segment`].
///
/// Returns `None` for entries that would corrupt aggregation: no recognizable
/// kind, an unparseable timestamp, a visit without a place id, or a missing,
/// negative or non-finite distance. Discriminator precedence when several
/// sub-objects coexist is visit, activity, trip.
pub fn normalize(raw: RawSegment) -> Option<Segment> {
    let start = parse_time(raw.start_time.as_deref()).ok()?;
    let end = parse_time(raw.end_time.as_deref()).ok()?;
    let utc_offset_minutes = raw.start_time_timezone_utc_offset_minutes;

    if let Some(visit) = raw.visit {
        let candidate = visit.top_candidate?;
        let place_id = candidate.place_id.filter(|id| !id.trim().is_empty())?;
        let location = candidate
            .place_location
            .and_then(|loc| loc.lat_lng)
            .and_then(|s| parse_lat_lng(&s));

        return Some(Segment::Visit(Visit {
            time: start,
            place_id,
            location,
            semantic_type: SemanticType::parse(candidate.semantic_type.as_deref()),
            utc_offset_minutes,
        }));
    }

    if let Some(activity) = raw.activity {
        let distance_meters = valid_distance(activity.distance_meters)?;
        let raw_type = activity
            .top_candidate
            .and_then(|c| c.kind)
            .unwrap_or_default();

        return Some(Segment::Activity(Activity {
            start,
            end,
            distance_meters,
            mode: classify(&raw_type),
            raw_type,
            utc_offset_minutes,
        }));
    }

    let trip = raw.timeline_memory.and_then(|m| m.trip)?;
    Some(Segment::Trip(TripMarker {
        start,
        end,
        distance_from_origin_km: valid_distance(trip.distance_from_origin_kms)?,
        utc_offset_minutes,
    }))
}
