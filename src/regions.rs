//! Static country regions for offline attribution.
//!
//! Each entry is a coarse bounding box plus a representative centroid.
//! Boxes overlap freely (Hong Kong sits inside China's box, Switzerland
//! inside France's); the resolver disambiguates. Values are approximate and
//! must not be read as administrative boundaries.

use crate::{Bounds, GpsPoint};

/// A country approximated by a lat/lng rectangle and a centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryRegion {
    /// ISO 3166-1 alpha-2 code.
    pub code: &'static str,
    pub bounds: Bounds,
    pub centroid: GpsPoint,
}

const fn region(
    code: &'static str,
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
    centroid_lat: f64,
    centroid_lng: f64,
) -> CountryRegion {
    CountryRegion {
        code,
        bounds: Bounds {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        },
        centroid: GpsPoint {
            latitude: centroid_lat,
            longitude: centroid_lng,
        },
    }
}

/// All known regions. Table order breaks exact centroid-distance ties.
#[rustfmt::skip]
pub static REGIONS: &[CountryRegion] = &[
    // North America & Caribbean
    region("US",  18.90,  71.40, -179.20,  -66.90,  39.80,  -98.60),
    region("CA",  41.70,  83.10, -141.00,  -52.60,  56.10, -106.30),
    region("MX",  14.50,  32.70, -118.40,  -86.70,  23.60, -102.50),
    region("GT",  13.70,  17.80,  -92.20,  -88.20,  15.80,  -90.20),
    region("BZ",  15.90,  18.50,  -89.20,  -87.80,  17.20,  -88.50),
    region("HN",  13.00,  16.50,  -89.40,  -83.10,  14.80,  -86.60),
    region("SV",  13.10,  14.50,  -90.10,  -87.70,  13.80,  -88.90),
    region("NI",  10.70,  15.00,  -87.70,  -82.70,  12.90,  -85.20),
    region("CR",   8.00,  11.20,  -85.95,  -82.55,   9.70,  -83.80),
    region("PA",   7.20,   9.60,  -83.05,  -77.20,   8.50,  -80.80),
    region("CU",  19.80,  23.30,  -85.00,  -74.10,  21.50,  -79.50),
    region("JM",  17.70,  18.50,  -78.40,  -76.20,  18.10,  -77.30),
    region("HT",  18.00,  20.10,  -74.50,  -71.60,  19.00,  -72.70),
    region("DO",  17.50,  19.95,  -72.00,  -68.30,  18.70,  -70.20),
    region("PR",  17.90,  18.50,  -67.30,  -65.20,  18.20,  -66.50),
    region("BS",  20.90,  27.30,  -79.30,  -72.70,  24.30,  -76.00),
    region("GL",  59.75,  83.65,  -73.30,  -11.30,  71.70,  -42.60),
    // South America
    region("CO",  -4.20,  12.50,  -79.00,  -66.90,   4.60,  -74.30),
    region("VE",   0.60,  12.20,  -73.40,  -59.80,   6.40,  -66.60),
    region("EC",  -5.00,   1.70,  -81.10,  -75.20,  -1.80,  -78.20),
    region("PE", -18.40,   0.00,  -81.40,  -68.70,  -9.20,  -75.00),
    region("BO", -22.90,  -9.70,  -69.60,  -57.50, -16.30,  -63.60),
    region("BR", -33.80,   5.30,  -74.00,  -34.80, -14.20,  -51.90),
    region("CL", -56.00, -17.50,  -75.70,  -66.40, -35.70,  -71.50),
    region("AR", -55.10, -21.80,  -73.60,  -53.60, -38.40,  -63.60),
    region("UY", -35.00, -30.10,  -58.40,  -53.10, -32.50,  -55.80),
    region("PY", -27.60, -19.30,  -62.70,  -54.30, -23.40,  -58.40),
    region("GY",   1.20,   8.60,  -61.40,  -56.50,   4.90,  -58.90),
    region("SR",   1.80,   6.00,  -58.10,  -53.90,   3.90,  -56.00),
    // Europe
    region("GB",  49.90,  60.90,   -8.20,    1.80,  54.00,   -2.00),
    region("IE",  51.40,  55.40,  -10.50,   -6.00,  53.40,   -8.20),
    region("FR",  41.30,  51.10,   -5.20,    9.60,  46.60,    2.20),
    region("ES",  36.00,  43.80,   -9.30,    3.30,  40.40,   -3.70),
    region("PT",  36.90,  42.20,   -9.50,   -6.20,  39.40,   -8.20),
    region("DE",  47.30,  55.10,    5.90,   15.00,  51.20,   10.40),
    region("NL",  50.75,  53.55,    3.35,    7.20,  52.10,    5.30),
    region("BE",  49.50,  51.50,    2.50,    6.40,  50.50,    4.50),
    region("LU",  49.45,  50.20,    5.70,    6.55,  49.80,    6.10),
    region("CH",  45.80,  47.80,    5.95,   10.50,  46.80,    8.20),
    region("AT",  46.40,  49.00,    9.50,   17.20,  47.50,   14.60),
    region("IT",  36.60,  47.10,    6.60,   18.50,  42.80,   12.60),
    region("MT",  35.80,  36.10,   14.20,   14.60,  35.90,   14.40),
    region("DK",  54.55,  57.75,    8.00,   15.20,  56.00,   10.00),
    region("NO",  57.95,  71.20,    4.60,   31.10,  60.50,    8.50),
    region("SE",  55.30,  69.10,   11.10,   24.20,  60.10,   18.60),
    region("FI",  59.80,  70.10,   20.50,   31.60,  61.90,   25.70),
    region("IS",  63.30,  66.60,  -24.50,  -13.50,  64.90,  -19.00),
    region("PL",  49.00,  54.85,   14.10,   24.15,  51.90,   19.10),
    region("CZ",  48.55,  51.05,   12.10,   18.85,  49.80,   15.50),
    region("SK",  47.75,  49.60,   16.80,   22.60,  48.70,   19.70),
    region("HU",  45.70,  48.60,   16.10,   22.90,  47.20,   19.50),
    region("SI",  45.40,  46.90,   13.40,   16.60,  46.15,   14.99),
    region("HR",  42.40,  46.55,   13.50,   19.45,  45.10,   15.20),
    region("BA",  42.55,  45.30,   15.70,   19.65,  43.90,   17.70),
    region("RS",  42.20,  46.20,   18.80,   23.00,  44.00,   21.00),
    region("ME",  41.85,  43.55,   18.45,   20.35,  42.70,   19.40),
    region("AL",  39.60,  42.70,   19.25,   21.10,  41.15,   20.20),
    region("MK",  40.85,  42.40,   20.45,   23.05,  41.60,   21.70),
    region("GR",  34.80,  41.75,   19.40,   29.65,  39.10,   21.80),
    region("BG",  41.20,  44.20,   22.35,   28.60,  42.70,   25.50),
    region("RO",  43.60,  48.30,   20.25,   29.70,  45.90,   24.97),
    region("MD",  45.45,  48.50,   26.60,   30.15,  47.40,   28.40),
    region("UA",  44.40,  52.40,   22.10,   40.20,  48.40,   31.20),
    region("BY",  51.25,  56.20,   23.20,   32.80,  53.70,   27.95),
    region("LT",  53.90,  56.45,   20.90,   26.85,  55.20,   23.90),
    region("LV",  55.65,  58.10,   20.95,   28.25,  56.90,   24.60),
    region("EE",  57.50,  59.70,   21.75,   28.20,  58.60,   25.00),
    region("RU",  41.20,  81.90,   19.60,  180.00,  61.50,  105.30),
    region("TR",  35.80,  42.10,   25.60,   44.80,  39.00,   35.20),
    region("CY",  34.55,  35.70,   32.25,   34.60,  35.10,   33.40),
    // Middle East
    region("IL",  29.45,  33.35,   34.25,   35.90,  31.00,   34.85),
    region("JO",  29.20,  33.40,   34.95,   39.30,  30.60,   36.20),
    region("LB",  33.05,  34.70,   35.10,   36.65,  33.85,   35.86),
    region("SY",  32.30,  37.35,   35.70,   42.40,  34.80,   38.99),
    region("IQ",  29.05,  37.40,   38.80,   48.60,  33.20,   43.70),
    region("IR",  25.05,  39.80,   44.00,   63.35,  32.40,   53.70),
    region("SA",  16.35,  32.15,   34.50,   55.70,  23.90,   45.10),
    region("AE",  22.60,  26.10,   51.50,   56.40,  23.40,   53.80),
    region("QA",  24.45,  26.20,   50.70,   51.65,  25.35,   51.18),
    region("OM",  16.60,  26.40,   52.00,   59.85,  21.50,   55.90),
    // Africa
    region("EG",  22.00,  31.70,   24.70,   36.90,  26.80,   30.80),
    region("MA",  27.60,  35.95,  -13.20,   -1.00,  31.80,   -7.10),
    region("DZ",  18.95,  37.10,   -8.70,   12.00,  28.00,    1.65),
    region("TN",  30.20,  37.55,    7.50,   11.60,  33.90,    9.50),
    region("SN",  12.30,  16.70,  -17.55,  -11.35,  14.50,  -14.45),
    region("GH",   4.70,  11.20,   -3.25,    1.20,   7.90,   -1.00),
    region("NG",   4.25,  13.90,    2.65,   14.70,   9.10,    8.70),
    region("ET",   3.40,  14.90,   32.95,   48.00,   9.10,   40.50),
    region("KE",  -4.70,   5.05,   33.90,   41.90,   0.00,   37.90),
    region("TZ", -11.75,  -0.95,   29.30,   40.45,  -6.40,   34.90),
    region("NA", -28.95, -16.95,   11.70,   25.30, -22.96,   18.50),
    region("ZA", -34.85, -22.10,   16.45,   32.90, -30.60,   22.90),
    region("MG", -25.60, -11.95,   43.20,   50.50, -18.80,   46.90),
    // Asia
    region("IN",   6.75,  35.50,   68.10,   97.40,  20.60,   79.00),
    region("PK",  23.70,  37.10,   60.90,   77.80,  30.40,   69.30),
    region("NP",  26.35,  30.45,   80.05,   88.20,  28.40,   84.10),
    region("LK",   5.90,   9.85,   79.65,   81.90,   7.90,   80.80),
    region("BD",  20.60,  26.65,   88.00,   92.70,  23.70,   90.40),
    region("CN",  18.15,  53.55,   73.50,  134.80,  35.90,  104.20),
    region("MN",  41.60,  52.15,   87.75,  119.90,  46.90,  103.80),
    region("KZ",  40.55,  55.45,   46.50,   87.30,  48.00,   66.90),
    region("UZ",  37.20,  45.60,   56.00,   73.15,  41.40,   64.60),
    region("JP",  24.20,  45.55,  122.90,  153.99,  36.20,  138.25),
    region("KR",  33.10,  38.60,  124.60,  131.90,  35.90,  127.80),
    region("TW",  21.90,  25.30,  120.00,  122.00,  23.70,  121.00),
    region("HK",  22.15,  22.56,  113.83,  114.44,  22.30,  114.17),
    region("VN",   8.40,  23.40,  102.15,  109.50,  14.06,  108.28),
    region("LA",  13.90,  22.50,  100.10,  107.65,  19.86,  102.50),
    region("KH",  10.40,  14.70,  102.30,  107.65,  12.57,  104.99),
    region("TH",   5.60,  20.45,   97.35,  105.65,  15.87,  100.99),
    region("MM",   9.80,  28.55,   92.20,  101.20,  21.90,   95.96),
    region("MY",   0.85,   7.40,   99.60,  119.30,   4.20,  101.98),
    region("SG",   1.15,   1.47,  103.60,  104.10,   1.35,  103.82),
    region("ID", -11.00,   6.10,   95.00,  141.00,  -0.79,  113.92),
    region("PH",   4.60,  21.10,  116.90,  126.60,  12.88,  121.77),
    // Oceania
    region("AU", -43.65, -10.65,  113.15,  153.65, -25.27,  133.78),
    region("NZ", -47.30, -34.40,  166.40,  178.60, -40.90,  174.90),
    region("FJ", -19.20, -16.00,  177.00,  180.00, -17.70,  178.10),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<_> = REGIONS.iter().map(|r| r.code).collect();
        assert_eq!(codes.len(), REGIONS.len());
    }

    #[test]
    fn test_boxes_are_well_formed() {
        for r in REGIONS {
            assert!(r.bounds.min_lat < r.bounds.max_lat, "{}", r.code);
            assert!(r.bounds.min_lng < r.bounds.max_lng, "{}", r.code);
            assert!(r.centroid.is_valid(), "{}", r.code);
            assert_eq!(r.code.len(), 2, "{}", r.code);
        }
    }

    #[test]
    fn test_centroids_fall_inside_their_box() {
        for r in REGIONS {
            assert!(r.bounds.contains(&r.centroid), "{}", r.code);
        }
    }
}
