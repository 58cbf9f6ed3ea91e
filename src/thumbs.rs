//! Thumbnail generation for the top photos.
//!
//! Each ranked photo is looked up by title in the photos directory, shrunk to
//! fit a square of `size` pixels and written as JPEG under `<out>/thumbs/`.
//! A photo that cannot be read or decoded keeps `thumbnail: None`.

use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::overlay::PhotoPoint;

/// Directory under the output dir, also the prefix of display paths.
pub const THUMBS_DIR: &str = "thumbs";

/// File name for the thumbnail of the `index`-th ranked photo.
fn thumb_name(index: usize, title: &str) -> String {
    let stem = Path::new(title)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let clean: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{:04}-{}.jpg", index, clean)
}

fn make_thumbnail(source: &Path, dest: &Path, size: u32) -> Result<()> {
    let img = image::open(source).map_err(|e| Error::Image {
        path: source.to_path_buf(),
        source: e,
    })?;
    img.thumbnail(size, size)
        .to_rgb8()
        .save(dest)
        .map_err(|e| Error::Image {
            path: dest.to_path_buf(),
            source: e,
        })
}

fn attach(index: usize, photo: &mut PhotoPoint, photos_dir: &Path, thumbs_dir: &Path, size: u32) {
    // Titles are file names; never follow directories out of photos_dir
    let Some(file_name) = Path::new(&photo.title).file_name() else {
        return;
    };
    let name = thumb_name(index, &photo.title);
    match make_thumbnail(&photos_dir.join(file_name), &thumbs_dir.join(&name), size) {
        Ok(()) => photo.thumbnail = Some(format!("{}/{}", THUMBS_DIR, name)),
        Err(e) => warn!("[Thumbs] {}", e),
    }
}

/// Write thumbnails for `photos` and record their display paths.
///
/// Returns how many were written. Only failing to create the thumbs
/// directory is an error.
pub fn write_thumbnails(
    photos: &mut [PhotoPoint],
    photos_dir: &Path,
    out_dir: &Path,
    size: u32,
) -> Result<usize> {
    let thumbs_dir = out_dir.join(THUMBS_DIR);
    fs::create_dir_all(&thumbs_dir).map_err(|e| Error::io(&thumbs_dir, e))?;

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        photos
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, photo)| attach(i, photo, photos_dir, &thumbs_dir, size));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (i, photo) in photos.iter_mut().enumerate() {
            attach(i, photo, photos_dir, &thumbs_dir, size);
        }
    }

    let written = photos.iter().filter(|p| p.thumbnail.is_some()).count();
    info!("[Thumbs] {}/{} thumbnails written to {}", written, photos.len(), thumbs_dir.display());
    Ok(written)
}
