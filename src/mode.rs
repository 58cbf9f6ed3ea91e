//! Transport-mode classification.
//!
//! Timeline exports tag movement with free-form activity types
//! (`IN_PASSENGER_VEHICLE`, `in train`, `FLYING`, ...). Everything is folded
//! into the closed [`CanonicalMode`] set before aggregation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical transport mode. Declaration order is the tie-break order used
/// wherever modes are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalMode {
    Flying,
    Driving,
    Train,
    Motorcycling,
    Ferry,
    Walking,
    Cycling,
    Bus,
    Subway,
    Running,
    Tram,
    Skiing,
    Other,
}

impl CanonicalMode {
    /// Every mode, in declaration order.
    pub const ALL: [CanonicalMode; 13] = [
        CanonicalMode::Flying,
        CanonicalMode::Driving,
        CanonicalMode::Train,
        CanonicalMode::Motorcycling,
        CanonicalMode::Ferry,
        CanonicalMode::Walking,
        CanonicalMode::Cycling,
        CanonicalMode::Bus,
        CanonicalMode::Subway,
        CanonicalMode::Running,
        CanonicalMode::Tram,
        CanonicalMode::Skiing,
        CanonicalMode::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalMode::Flying => "flying",
            CanonicalMode::Driving => "driving",
            CanonicalMode::Train => "train",
            CanonicalMode::Motorcycling => "motorcycling",
            CanonicalMode::Ferry => "ferry",
            CanonicalMode::Walking => "walking",
            CanonicalMode::Cycling => "cycling",
            CanonicalMode::Bus => "bus",
            CanonicalMode::Subway => "subway",
            CanonicalMode::Running => "running",
            CanonicalMode::Tram => "tram",
            CanonicalMode::Skiing => "skiing",
            CanonicalMode::Other => "other",
        }
    }
}

impl fmt::Display for CanonicalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed tag table. Extend by adding rows only.
const MODE_TABLE: &[(&str, CanonicalMode)] = &[
    ("FLYING", CanonicalMode::Flying),
    ("IN_PASSENGER_VEHICLE", CanonicalMode::Driving),
    ("IN_VEHICLE", CanonicalMode::Driving),
    ("IN_CAR", CanonicalMode::Driving),
    ("DRIVING", CanonicalMode::Driving),
    ("IN_TAXI", CanonicalMode::Driving),
    ("IN_TRAIN", CanonicalMode::Train),
    ("IN_RAIL_VEHICLE", CanonicalMode::Train),
    ("MOTORCYCLING", CanonicalMode::Motorcycling),
    ("IN_FERRY", CanonicalMode::Ferry),
    ("SAILING", CanonicalMode::Ferry),
    ("WALKING", CanonicalMode::Walking),
    ("ON_FOOT", CanonicalMode::Walking),
    ("CYCLING", CanonicalMode::Cycling),
    ("ON_BICYCLE", CanonicalMode::Cycling),
    ("IN_BUS", CanonicalMode::Bus),
    ("IN_SUBWAY", CanonicalMode::Subway),
    ("RUNNING", CanonicalMode::Running),
    ("IN_TRAM", CanonicalMode::Tram),
    ("SKIING", CanonicalMode::Skiing),
];

/// Classify a raw activity tag. Total: unknown tags are [`CanonicalMode::Other`].
///
/// Tags are compared after trimming, uppercasing and mapping spaces and
/// hyphens to underscores, so `"in passenger vehicle"` and
/// `"IN_PASSENGER_VEHICLE"` are the same tag.
///
/// # Example
/// ```
/// use timeline_digest::{classify, CanonicalMode};
///
/// assert_eq!(classify("FLYING"), CanonicalMode::Flying);
/// assert_eq!(classify("in passenger vehicle"), CanonicalMode::Driving);
/// assert_eq!(classify("HOVERCRAFT"), CanonicalMode::Other);
/// ```
pub fn classify(raw: &str) -> CanonicalMode {
    let tag: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();

    MODE_TABLE
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|&(_, mode)| mode)
        .unwrap_or(CanonicalMode::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(classify("FLYING"), CanonicalMode::Flying);
        assert_eq!(classify("IN_PASSENGER_VEHICLE"), CanonicalMode::Driving);
        assert_eq!(classify("IN_TRAIN"), CanonicalMode::Train);
        assert_eq!(classify("IN_FERRY"), CanonicalMode::Ferry);
        assert_eq!(classify("IN_SUBWAY"), CanonicalMode::Subway);
        assert_eq!(classify("IN_TRAM"), CanonicalMode::Tram);
        assert_eq!(classify("SKIING"), CanonicalMode::Skiing);
    }

    #[test]
    fn test_tag_normalization() {
        assert_eq!(classify("  in bus "), CanonicalMode::Bus);
        assert_eq!(classify("on-bicycle"), CanonicalMode::Cycling);
        assert_eq!(classify("Motorcycling"), CanonicalMode::Motorcycling);
    }

    #[test]
    fn test_classifier_is_total() {
        for raw in ["", "UNKNOWN_ACTIVITY_TYPE", "STILL", "🚀", "FLYINGX", "IN_"] {
            assert_eq!(classify(raw), CanonicalMode::Other, "{raw:?}");
        }
    }

    #[test]
    fn test_no_substring_matching() {
        // "FLYING" inside a longer tag must not leak into flying totals
        assert_eq!(classify("NOT_FLYING"), CanonicalMode::Other);
    }

    #[test]
    fn test_table_covers_every_mode_but_other() {
        for mode in CanonicalMode::ALL {
            if mode == CanonicalMode::Other {
                continue;
            }
            assert!(MODE_TABLE.iter().any(|&(_, m)| m == mode), "{mode}");
        }
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&CanonicalMode::Motorcycling).unwrap();
        assert_eq!(json, "\"motorcycling\"");
    }
}
