//! Texture loading and caching.
//!
//! Textures are the one best-effort corner of the crate: a missing or
//! undecodable file logs a warning and substitutes a solid fill in the
//! inherited background color instead of failing the frame. Decoded images
//! are cached by resolved path, write-once, shared via `Arc`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::{self, FilterType};

use crate::color::Color;
use crate::geometry::Vector;

/// Decoded RGBA pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixels {
    pub size: Vector,
    /// Row-major RGBA bytes, `size.x * size.y * 4` of them.
    pub rgba: Vec<u8>,
}

impl Pixels {
    /// A solid single-color block.
    pub fn solid(size: Vector, color: Color) -> Self {
        let w = size.x.max(0) as usize;
        let h = size.y.max(0) as usize;
        let mut rgba = Vec::with_capacity(w * h * 4);
        let bytes = color.bytes();
        for _ in 0..w * h {
            rgba.extend_from_slice(&bytes);
        }
        Self { size: Vector::new(w as i32, h as i32), rgba }
    }
}

/// Path-keyed texture cache. Entries are never updated or evicted; a file
/// changed on disk after first load is not noticed for the process lifetime.
#[derive(Default)]
pub struct ImageCache {
    decoded: HashMap<PathBuf, Arc<Pixels>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixels for the texture at `path`, decoded on first reference.
    ///
    /// With `scale_down` set the decoded image is resized to `declared`
    /// before caching. Load failures substitute a solid `fallback` fill of
    /// the declared size; the substitute is not cached, so a file that
    /// appears later still gets a chance on the next frame.
    pub fn load(
        &mut self,
        path: &Path,
        declared: Vector,
        scale_down: bool,
        fallback: Color,
    ) -> Arc<Pixels> {
        if let Some(pixels) = self.decoded.get(path) {
            return Arc::clone(pixels);
        }

        match self.decode(path, declared, scale_down) {
            Ok(pixels) => {
                let pixels = Arc::new(pixels);
                self.decoded.insert(path.to_owned(), Arc::clone(&pixels));
                pixels
            }
            Err(err) => {
                log::warn!("texture {} unavailable ({err}), using fill", path.display());
                Arc::new(Pixels::solid(declared, fallback))
            }
        }
    }

    fn decode(
        &self,
        path: &Path,
        declared: Vector,
        scale_down: bool,
    ) -> image::ImageResult<Pixels> {
        let decoded = image::open(path)?;
        let mut rgba = decoded.into_rgba8();

        if scale_down && declared.x > 0 && declared.y > 0 {
            rgba = imageops::resize(
                &rgba,
                declared.x as u32,
                declared.y as u32,
                FilterType::Triangle,
            );
        }

        let size = Vector::new(rgba.width() as i32, rgba.height() as i32);
        Ok(Pixels { size, rgba: rgba.into_raw() })
    }
}
