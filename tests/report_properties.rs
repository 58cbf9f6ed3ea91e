//! End-to-end checks over JSON fixtures written to a temp dir.

use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

use timeline_digest::{
    build_overlay, build_report, classify, load_photos, load_reviews, load_timeline, CanonicalMode,
    DigestConfig, Error,
};

fn write(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path
}

fn visit(time: &str, place: &str, lat_lng: &str, semantic: &str) -> Value {
    json!({
        "startTime": time,
        "endTime": time,
        "startTimeTimezoneUtcOffsetMinutes": 60,
        "visit": { "topCandidate": {
            "placeId": place,
            "semanticType": semantic,
            "placeLocation": { "latLng": lat_lng }
        }}
    })
}

fn activity(time: &str, kind: &str, meters: f64) -> Value {
    json!({
        "startTime": time,
        "endTime": time,
        "activity": { "distanceMeters": meters, "topCandidate": { "type": kind } }
    })
}

fn trip(time: &str, km: f64) -> Value {
    json!({
        "startTime": time,
        "endTime": time,
        "timelineMemory": { "trip": { "distanceFromOriginKms": km } }
    })
}

fn fixture() -> Value {
    json!({ "semanticSegments": [
        visit("2022-06-01T10:00:00.000+02:00", "zurich-cafe", "47.3769°, 8.5417°", "UNKNOWN"),
        visit("2022-06-02T10:00:00.000+02:00", "zurich-cafe", "47.3769°, 8.5417°", "UNKNOWN"),
        visit("2023-03-01T10:00:00.000-05:00", "toronto-bar", "43.6532°, -79.3832°", "UNKNOWN"),
        visit("2023-03-02T10:00:00.000-05:00", "home", "43.6500°, -79.3800°", "HOME"),
        visit("2023-03-03T10:00:00.000-05:00", "tokyo-shrine", "35.6762°, 139.6503°", "UNKNOWN"),
        activity("2023-03-01T08:00:00.000-05:00", "FLYING", 9_000_000.0),
        activity("2023-03-01T12:00:00.000-05:00", "IN_PASSENGER_VEHICLE", 50_000.0),
        activity("2023-03-01T15:00:00.000-05:00", "WALKING", 20_000.0),
        activity("2022-06-01T15:00:00.000+02:00", "hovercraft", 1_000.0),
        trip("2023-03-05T00:00:00.000-05:00", 6_400.0),
        { "startTime": "garbage", "visit": {} },
        { "activity": { "distanceMeters": -5.0 } }
    ]})
}

#[test]
fn test_report_properties() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "Timeline.json", &fixture());

    let export = load_timeline(&path).unwrap();
    let report = build_report(&export, None, None, &DigestConfig::default());

    // Totals equal the sum of their modes
    let mode_sum: f64 = report.distance.by_mode.values().sum();
    assert!((report.distance.total_km - mode_sum).abs() < 1e-9);
    for year in &report.yearly_stats {
        let sum: f64 = year.km_by_mode.values().sum();
        assert!((year.total_km - sum).abs() < 1e-9);
    }

    // The 9000/50/20 km scenario
    assert_eq!(report.distance.by_mode[&CanonicalMode::Flying], 9000.0);
    assert_eq!(report.distance.by_mode[&CanonicalMode::Driving], 50.0);
    assert_eq!(report.distance.by_mode[&CanonicalMode::Walking], 20.0);
    assert_eq!(report.distance.by_mode[&CanonicalMode::Other], 1.0);
    let flight = report.records.longest_flight.unwrap();
    assert_eq!(flight.distance_km, 9000.0);
    assert_eq!(report.activity_distribution[&CanonicalMode::Flying], 99);

    // Duplicate place ids count once
    assert_eq!(report.counts.total_visits, 5);
    assert_eq!(report.counts.unique_places, 4);
    let max_yearly_places = report.yearly_stats.iter().map(|y| y.unique_places).max().unwrap();
    assert!(report.counts.unique_places >= max_yearly_places);

    // Busiest year matches the yearly maximum
    let busiest = report.records.busiest_year.clone().unwrap();
    let max_visits = report.yearly_stats.iter().map(|y| y.visits).max().unwrap();
    assert_eq!(busiest.visits, max_visits);
    assert_eq!(busiest.year, 2023);

    // Border rule puts Toronto in Canada
    let y2023 = report.yearly_stats.iter().find(|y| y.year == 2023).unwrap();
    assert_eq!(y2023.countries, vec!["CA", "JP"]);

    assert_eq!(report.counts.total_raw_records, 12);
    assert_eq!(report.counts.total_trips, 1);
    assert_eq!(report.records.farthest_trip.unwrap().distance_km, 6400.0);
}

#[test]
fn test_classifier_is_total() {
    for raw in ["", "   ", "FLYING", "flying", "in passenger vehicle", "UNKNOWN_ACTIVITY_TYPE", "🚀"] {
        let mode = classify(raw);
        assert!(CanonicalMode::ALL.contains(&mode));
    }
}

#[test]
fn test_heat_weights_equal_eligible_visits() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "Timeline.json", &fixture());
    let export = load_timeline(&path).unwrap();

    let overlay = build_overlay(&export, None, None, &DigestConfig::default());
    let weights: u64 = overlay.heat_points.iter().map(|p| p.weight as u64).sum();
    // Five visits, one of them home
    assert_eq!(weights, 4);
    assert_eq!(overlay.stats.heat_visits, 4);
}

#[test]
fn test_bare_array_and_object_agree() {
    let dir = tempfile::tempdir().unwrap();
    let object = write(&dir, "object.json", &fixture());
    let array = write(&dir, "array.json", &fixture()["semanticSegments"]);

    let config = DigestConfig::default();
    let a = build_report(&load_timeline(&object).unwrap(), None, None, &config);
    let b = build_report(&load_timeline(&array).unwrap(), None, None, &config);
    assert_eq!(a, b);
}

#[test]
fn test_non_array_timeline_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "Timeline.json", &json!({ "semanticSegments": "nope" }));
    assert!(matches!(load_timeline(&path), Err(Error::Json { .. })));

    let path = write(&dir, "scalar.json", &json!(7));
    assert!(load_timeline(&path).is_err());
}

#[test]
fn test_reviews_and_photos_sections() {
    let dir = tempfile::tempdir().unwrap();
    let timeline = write(&dir, "Timeline.json", &fixture());
    let reviews = write(
        &dir,
        "Reviews.json",
        &json!({ "type": "FeatureCollection", "features": [
            { "geometry": { "coordinates": [8.5417, 47.3769] },
              "properties": { "date": "2022-06-01T12:00:00Z", "five_star_rating_published": 0,
                              "location": { "name": "Cafe", "country_code": "CH" } } },
            { "geometry": { "coordinates": [139.6503, 35.6762] },
              "properties": { "date": "2023-03-03T12:00:00Z", "five_star_rating_published": 4,
                              "review_text_published": "Quiet and green" } },
            { "geometry": { "coordinates": [0, 0] },
              "properties": { "five_star_rating_published": 2 } }
        ]}),
    );
    let photos = write(
        &dir,
        "photos.json",
        &json!([
            { "title": "a.jpg", "imageViews": "10", "photoTakenTime": { "timestamp": "1654077600" },
              "geoData": { "latitude": 47.376912, "longitude": 8.541694 } },
            { "title": "b.jpg", "imageViews": "250", "photoTakenTime": { "timestamp": "1677844800" },
              "geoData": { "latitude": 0.0, "longitude": 0.0 },
              "geoDataExif": { "latitude": 35.6762, "longitude": 139.6503 } },
            { "title": "c.jpg", "geoData": { "latitude": 0.0, "longitude": 0.0 } }
        ]),
    );

    let export = load_timeline(&timeline).unwrap();
    let reviews = load_reviews(&reviews).unwrap();
    let photos = load_photos(&photos).unwrap();
    let config = DigestConfig::default();

    let report = build_report(&export, Some(&reviews), Some(&photos), &config);
    let json = serde_json::to_value(&report).unwrap();

    let r = &json["reviews"];
    assert_eq!(r["total"], 3);
    assert_eq!(r["avgRating"], 3.0);
    assert_eq!(r["ratingDistribution"]["0"], 1);
    assert_eq!(r["byCountry"]["CH"], 1);
    assert_eq!(r["byCountry"]["JP"], 1);

    let p = &json["photos"];
    assert_eq!(p["total"], 3);
    assert_eq!(p["geotagged"], 2);

    let overlay = build_overlay(&export, Some(&reviews), Some(&photos), &config);
    assert_eq!(overlay.reviews.len(), 2);
    assert_eq!(overlay.top_photos.len(), 2);
    assert_eq!(overlay.top_photos[0].title, "b.jpg");
    assert_eq!((overlay.top_photos[1].lat, overlay.top_photos[1].lng), (47.3769, 8.5417));
}
