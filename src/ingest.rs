//! Export loading.
//!
//! The timeline export can be hundreds of megabytes, so its segment array is
//! walked element by element: each entry is decoded on its own, normalized,
//! and dropped if it does not fit. One malformed record never fails the file.
//!
//! Accepted top-level shapes:
//! - `{ "semanticSegments": [ ... ], ... }` (other keys ignored)
//! - `[ ... ]`
//!
//! Anything else is fatal. Reviews and photos are optional inputs: a missing
//! or unreadable file is logged and yields `None`.

use log::{info, warn};
use serde::de::{self, DeserializeOwned, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::overlay::{PhotoSidecar, ReviewCollection, ReviewFeature};
use crate::segment::{normalize, RawSegment, Segment};

/// Normalized content of a timeline export.
#[derive(Debug, Clone, Default)]
pub struct TimelineExport {
    pub segments: Vec<Segment>,
    /// Entries read from the export, including the ones dropped
    pub raw_records: u64,
}

impl TimelineExport {
    pub fn dropped(&self) -> u64 {
        self.raw_records.saturating_sub(self.segments.len() as u64)
    }

    fn push_raw(&mut self, value: Value) {
        self.raw_records += 1;
        if let Some(segment) = serde_json::from_value::<RawSegment>(value).ok().and_then(normalize) {
            self.segments.push(segment);
        }
    }
}

struct SegmentArray<'a>(&'a mut TimelineExport);

impl<'de, 'a> DeserializeSeed<'de> for SegmentArray<'a> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<(), D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, 'a> Visitor<'de> for SegmentArray<'a> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of timeline segments")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<(), A::Error> {
        while let Some(value) = seq.next_element::<Value>()? {
            self.0.push_raw(value);
        }
        Ok(())
    }
}

struct ExportVisitor<'a>(&'a mut TimelineExport);

impl<'de, 'a> Visitor<'de> for ExportVisitor<'a> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object with `semanticSegments` or an array of segments")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> std::result::Result<(), A::Error> {
        SegmentArray(self.0).visit_seq(seq)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<(), A::Error> {
        let export = self.0;
        let mut found = false;
        while let Some(key) = map.next_key::<String>()? {
            if key == "semanticSegments" {
                map.next_value_seed(SegmentArray(&mut *export))?;
                found = true;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        if !found {
            return Err(de::Error::missing_field("semanticSegments"));
        }
        Ok(())
    }
}

/// Stream a timeline export from any reader.
pub fn read_timeline<R: Read>(reader: R) -> serde_json::Result<TimelineExport> {
    let mut export = TimelineExport::default();
    let mut de = serde_json::Deserializer::from_reader(reader);
    (&mut de).deserialize_any(ExportVisitor(&mut export))?;
    de.end()?;
    Ok(export)
}

/// Load the mandatory timeline export. I/O and top-level shape errors are fatal.
pub fn load_timeline(path: &Path) -> Result<TimelineExport> {
    let start = Instant::now();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let export = read_timeline(BufReader::new(file)).map_err(|e| Error::json(path, e))?;

    info!(
        "[Ingest] {} records -> {} segments ({} dropped) in {:?}",
        export.raw_records,
        export.segments.len(),
        export.dropped(),
        start.elapsed()
    );
    Ok(export)
}

/// Array whose malformed elements are skipped instead of failing the whole
/// document.
#[derive(Debug, Clone)]
pub struct LenientSeq<T>(pub Vec<T>);

impl<'de, T: DeserializeOwned> Deserialize<'de> for LenientSeq<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SeqVisitor<T>(PhantomData<T>);

        impl<'de, T: DeserializeOwned> Visitor<'de> for SeqVisitor<T> {
            type Value = LenientSeq<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an array")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(value) = seq.next_element::<Value>()? {
                    if let Ok(item) = serde_json::from_value(value) {
                        items.push(item);
                    }
                }
                Ok(LenientSeq(items))
            }
        }

        deserializer.deserialize_seq(SeqVisitor(PhantomData))
    }
}

impl<T> Default for LenientSeq<T> {
    fn default() -> Self {
        LenientSeq(Vec::new())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::json(path, e))
}

/// Load the reviews GeoJSON. Failure degrades to `None`.
pub fn load_reviews(path: &Path) -> Option<Vec<ReviewFeature>> {
    match read_json::<ReviewCollection>(path) {
        Ok(collection) => {
            info!("[Ingest] {} reviews from {}", collection.features.0.len(), path.display());
            Some(collection.features.0)
        }
        Err(e) => {
            warn!("[Ingest] Skipping reviews: {}", e);
            None
        }
    }
}

/// Load the photo sidecar array. Failure degrades to `None`.
pub fn load_photos(path: &Path) -> Option<Vec<PhotoSidecar>> {
    match read_json::<LenientSeq<PhotoSidecar>>(path) {
        Ok(LenientSeq(photos)) => {
            info!("[Ingest] {} photo sidecars from {}", photos.len(), path.display());
            Some(photos)
        }
        Err(e) => {
            warn!("[Ingest] Skipping photos: {}", e);
            None
        }
    }
}
