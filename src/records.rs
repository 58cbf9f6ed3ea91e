//! Running extremes collected during the aggregation fold.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusiestYear {
    pub year: i32,
    pub visits: u64,
}

/// A single distance-bearing record (flight or trip).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceRecord {
    pub distance_km: f64,
    pub date: Option<NaiveDate>,
}

impl DistanceRecord {
    /// Longer wins; on equal distance the earlier date wins and an undated
    /// record loses to a dated one.
    fn beats(&self, other: &DistanceRecord) -> bool {
        if self.distance_km != other.distance_km {
            return self.distance_km > other.distance_km;
        }
        match (self.date, other.date) {
            (Some(a), Some(b)) => a < b,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostActiveDay {
    pub date: NaiveDate,
    pub activities: u64,
}

/// Extremal facts of one run. A field is `None` when nothing qualified.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStats {
    pub busiest_year: Option<BusiestYear>,
    pub longest_flight: Option<DistanceRecord>,
    pub most_active_day: Option<MostActiveDay>,
    pub farthest_trip: Option<DistanceRecord>,
}

fn keep_best(slot: &mut Option<DistanceRecord>, candidate: DistanceRecord) {
    if slot.as_ref().map_or(true, |current| candidate.beats(current)) {
        *slot = Some(candidate);
    }
}

/// Accumulator for [`RecordStats`]. Mergeable, so shards can track their own
/// extremes and combine them afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordTracker {
    longest_flight: Option<DistanceRecord>,
    farthest_trip: Option<DistanceRecord>,
    activities_per_day: BTreeMap<NaiveDate, u64>,
}

impl RecordTracker {
    /// Offer a flying activity. Zero-distance flights never qualify.
    pub fn observe_flight(&mut self, distance_km: f64, date: Option<NaiveDate>) {
        if distance_km > 0.0 {
            keep_best(&mut self.longest_flight, DistanceRecord { distance_km, date });
        }
    }

    pub fn observe_trip(&mut self, distance_km: f64, date: Option<NaiveDate>) {
        keep_best(&mut self.farthest_trip, DistanceRecord { distance_km, date });
    }

    pub fn count_activity(&mut self, date: NaiveDate) {
        *self.activities_per_day.entry(date).or_insert(0) += 1;
    }

    pub fn merge(mut self, other: RecordTracker) -> RecordTracker {
        if let Some(flight) = other.longest_flight {
            keep_best(&mut self.longest_flight, flight);
        }
        if let Some(trip) = other.farthest_trip {
            keep_best(&mut self.farthest_trip, trip);
        }
        for (date, count) in other.activities_per_day {
            *self.activities_per_day.entry(date).or_insert(0) += count;
        }
        self
    }

    /// Resolve the final records. `yearly_visits` must be in ascending year
    /// order so ties go to the lowest year.
    pub fn finish(self, yearly_visits: impl IntoIterator<Item = (i32, u64)>) -> RecordStats {
        let mut busiest_year: Option<BusiestYear> = None;
        for (year, visits) in yearly_visits {
            if visits > busiest_year.as_ref().map_or(0, |b| b.visits) {
                busiest_year = Some(BusiestYear { year, visits });
            }
        }

        let mut most_active_day: Option<MostActiveDay> = None;
        for (date, activities) in self.activities_per_day {
            if activities > most_active_day.as_ref().map_or(0, |d| d.activities) {
                most_active_day = Some(MostActiveDay { date, activities });
            }
        }

        RecordStats {
            busiest_year,
            longest_flight: self.longest_flight,
            most_active_day,
            farthest_trip: self.farthest_trip,
        }
    }
}
