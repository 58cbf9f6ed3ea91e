//! Single-pass aggregation of normalized segments.
//!
//! [`Aggregator`] is an associative accumulator: `Default` is the identity,
//! [`Aggregator::add`] folds one segment, [`Aggregator::merge`] combines two
//! partial results. [`aggregate`] runs the fold, sharded over rayon when the
//! `parallel` feature is on.
//!
//! Distances are kept per mode only; every `total_km` is derived from the
//! per-mode map so the totals always equal the sum of their modes.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use crate::mode::CanonicalMode;
use crate::records::{RecordStats, RecordTracker};
use crate::resolver::GeoResolver;
use crate::segment::{local_date, Segment};

/// Kilometres per canonical mode.
pub type ModeKm = BTreeMap<CanonicalMode, f64>;

/// Sum of all modes. Folds from `+0.0`: an empty f64 `sum()` is `-0.0`.
fn total_km(km: &ModeKm) -> f64 {
    km.values().fold(0.0, |acc, v| acc + v)
}

fn add_km(km: &mut ModeKm, mode: CanonicalMode, value: f64) {
    *km.entry(mode).or_insert(0.0) += value;
}

fn merge_km(into: &mut ModeKm, from: ModeKm) {
    for (mode, value) in from {
        add_km(into, mode, value);
    }
}

/// Calendar month key, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// ============================================================================
// Output types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Overall distance, flattened as `{ totalKm, flying: .., driving: .. }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceSummary {
    pub total_km: f64,
    #[serde(flatten)]
    pub by_mode: ModeKm,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub total_visits: u64,
    pub unique_places: usize,
    pub total_activities: u64,
    pub total_trips: u64,
    pub total_days_tracked: usize,
    pub total_raw_records: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyStat {
    pub year: i32,
    pub visits: u64,
    pub activities: u64,
    pub total_km: f64,
    pub km_by_mode: ModeKm,
    pub unique_places: usize,
    pub days_tracked: usize,
    pub trips: u64,
    /// Distinct UTC offsets seen this year.
    pub timezones: usize,
    pub top_mode: Option<CanonicalMode>,
    pub km_per_day: f64,
    pub countries: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStat {
    pub month: String,
    pub visits: u64,
    pub activities: u64,
    pub total_km: f64,
    #[serde(skip)]
    pub km_by_mode: ModeKm,
}

/// Everything the aggregation pass produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub data_range: Option<DataRange>,
    pub distance: DistanceSummary,
    pub counts: Counts,
    pub yearly: Vec<YearlyStat>,
    pub monthly: Vec<MonthlyStat>,
    pub activity_distribution: BTreeMap<CanonicalMode, u32>,
    pub records: RecordStats,
}

// ============================================================================
// Accumulators
// ============================================================================

#[derive(Debug, Clone, Default)]
struct MonthBucket {
    visits: u64,
    activities: u64,
    km_by_mode: ModeKm,
}

impl MonthBucket {
    fn merge(&mut self, other: MonthBucket) {
        self.visits += other.visits;
        self.activities += other.activities;
        merge_km(&mut self.km_by_mode, other.km_by_mode);
    }
}

#[derive(Debug, Clone, Default)]
struct YearBucket {
    visits: u64,
    activities: u64,
    trips: u64,
    km_by_mode: ModeKm,
    places: HashSet<String>,
    days: HashSet<NaiveDate>,
    utc_offsets: BTreeSet<i32>,
    countries: BTreeSet<&'static str>,
}

impl YearBucket {
    fn merge(&mut self, other: YearBucket) {
        self.visits += other.visits;
        self.activities += other.activities;
        self.trips += other.trips;
        merge_km(&mut self.km_by_mode, other.km_by_mode);
        self.places.extend(other.places);
        self.days.extend(other.days);
        self.utc_offsets.extend(other.utc_offsets);
        self.countries.extend(other.countries);
    }

    /// Highest-km mode; earlier declaration order wins ties.
    fn top_mode(&self) -> Option<CanonicalMode> {
        let mut best: Option<(CanonicalMode, f64)> = None;
        for (&mode, &km) in &self.km_by_mode {
            if km > best.map_or(0.0, |(_, b)| b) {
                best = Some((mode, km));
            }
        }
        best.map(|(mode, _)| mode)
    }

    fn into_stat(self, year: i32) -> YearlyStat {
        let total = total_km(&self.km_by_mode);
        let days_tracked = self.days.len();
        YearlyStat {
            year,
            visits: self.visits,
            activities: self.activities,
            total_km: total,
            top_mode: self.top_mode(),
            km_by_mode: self.km_by_mode,
            unique_places: self.places.len(),
            days_tracked,
            trips: self.trips,
            timezones: self.utc_offsets.len(),
            km_per_day: if days_tracked > 0 {
                total / days_tracked as f64
            } else {
                0.0
            },
            countries: self.countries.into_iter().collect(),
        }
    }
}

/// Associative accumulator over [`Segment`]s.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    visits: u64,
    activities: u64,
    trips: u64,
    km_by_mode: ModeKm,
    places: HashSet<String>,
    days: HashSet<NaiveDate>,
    years: BTreeMap<i32, YearBucket>,
    months: BTreeMap<YearMonth, MonthBucket>,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    records: RecordTracker,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn widen_range(&mut self, date: NaiveDate) {
        self.first_date = Some(self.first_date.map_or(date, |d| d.min(date)));
        self.last_date = Some(self.last_date.map_or(date, |d| d.max(date)));
    }

    /// Fold one segment into the running totals.
    pub fn add(&mut self, segment: &Segment) {
        for date in segment.dates() {
            self.widen_range(date);
        }

        let date = segment.time().map(local_date);
        if let (Some(date), Some(offset)) = (date, segment.utc_offset_minutes()) {
            self.years
                .entry(date.year())
                .or_default()
                .utc_offsets
                .insert(offset);
        }

        match segment {
            Segment::Visit(visit) => {
                self.visits += 1;
                self.places.insert(visit.place_id.clone());

                if let Some(date) = date {
                    let year = self.years.entry(date.year()).or_default();
                    year.visits += 1;
                    year.places.insert(visit.place_id.clone());
                    if let Some(code) = visit
                        .location
                        .as_ref()
                        .and_then(|p| GeoResolver::global().resolve(p))
                    {
                        year.countries.insert(code);
                    }
                    self.months.entry(YearMonth::of(date)).or_default().visits += 1;
                }
            }
            Segment::Activity(activity) => {
                let km = activity.distance_km();
                self.activities += 1;
                add_km(&mut self.km_by_mode, activity.mode, km);

                if let Some(date) = date {
                    self.days.insert(date);
                    self.records.count_activity(date);

                    let year = self.years.entry(date.year()).or_default();
                    year.activities += 1;
                    year.days.insert(date);
                    add_km(&mut year.km_by_mode, activity.mode, km);

                    let month = self.months.entry(YearMonth::of(date)).or_default();
                    month.activities += 1;
                    add_km(&mut month.km_by_mode, activity.mode, km);
                }

                if activity.mode == CanonicalMode::Flying {
                    self.records.observe_flight(km, date);
                }
            }
            Segment::Trip(trip) => {
                self.trips += 1;
                if let Some(date) = date {
                    self.years.entry(date.year()).or_default().trips += 1;
                }
                self.records.observe_trip(trip.distance_from_origin_km, date);
            }
        }
    }

    /// Combine two partial aggregations.
    pub fn merge(mut self, other: Aggregator) -> Aggregator {
        self.visits += other.visits;
        self.activities += other.activities;
        self.trips += other.trips;
        merge_km(&mut self.km_by_mode, other.km_by_mode);
        self.places.extend(other.places);
        self.days.extend(other.days);
        for (year, bucket) in other.years {
            self.years.entry(year).or_default().merge(bucket);
        }
        for (month, bucket) in other.months {
            self.months.entry(month).or_default().merge(bucket);
        }
        if let Some(d) = other.first_date {
            self.widen_range(d);
        }
        if let Some(d) = other.last_date {
            self.widen_range(d);
        }
        self.records = self.records.merge(other.records);
        self
    }

    /// Derive the final statistics. `raw_records` is the number of entries
    /// read from the export, including those the normalizer dropped.
    pub fn finish(self, raw_records: u64) -> Aggregates {
        let overall = total_km(&self.km_by_mode);
        let activity_distribution = if overall > 0.0 {
            self.km_by_mode
                .iter()
                .filter(|(_, &km)| km > 0.0)
                .map(|(&mode, &km)| (mode, (km / overall * 100.0).round() as u32))
                .collect()
        } else {
            BTreeMap::new()
        };

        let records = self
            .records
            .finish(self.years.iter().map(|(&year, b)| (year, b.visits)));

        let monthly = self
            .months
            .into_iter()
            .map(|(month, bucket)| MonthlyStat {
                month: month.to_string(),
                visits: bucket.visits,
                activities: bucket.activities,
                total_km: total_km(&bucket.km_by_mode),
                km_by_mode: bucket.km_by_mode,
            })
            .collect();

        let yearly = self
            .years
            .into_iter()
            .map(|(year, bucket)| bucket.into_stat(year))
            .collect();

        let data_range = match (self.first_date, self.last_date) {
            (Some(start), Some(end)) => Some(DataRange { start, end }),
            _ => None,
        };

        Aggregates {
            data_range,
            distance: DistanceSummary {
                total_km: overall,
                by_mode: self.km_by_mode,
            },
            counts: Counts {
                total_visits: self.visits,
                unique_places: self.places.len(),
                total_activities: self.activities,
                total_trips: self.trips,
                total_days_tracked: self.days.len(),
                total_raw_records: raw_records,
            },
            yearly,
            monthly,
            activity_distribution,
            records,
        }
    }
}

impl<'a> Extend<&'a Segment> for Aggregator {
    fn extend<I: IntoIterator<Item = &'a Segment>>(&mut self, iter: I) {
        for segment in iter {
            self.add(segment);
        }
    }
}

/// Sequential fold over all segments.
pub fn aggregate_sequential(segments: &[Segment]) -> Aggregator {
    let mut acc = Aggregator::new();
    acc.extend(segments);
    acc
}

/// Fold over all segments, sharded into `chunk`-sized pieces across the
/// rayon pool and merged in order.
#[cfg(feature = "parallel")]
pub fn aggregate_parallel(segments: &[Segment], chunk: usize) -> Aggregator {
    use rayon::prelude::*;

    segments
        .par_chunks(chunk.max(1))
        .map(aggregate_sequential)
        .reduce(Aggregator::new, Aggregator::merge)
}

/// Run the aggregation pass with whatever parallelism is compiled in.
pub fn aggregate(segments: &[Segment], chunk: usize) -> Aggregator {
    #[cfg(feature = "parallel")]
    {
        aggregate_parallel(segments, chunk)
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = chunk;
        aggregate_sequential(segments)
    }
}
