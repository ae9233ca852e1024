use image::{Rgba, RgbaImage, imageops};
use rayon::prelude::*;

use crate::{
    atlas::source::ImageSource,
    foundation::error::{CubefieldError, CubefieldResult},
};

/// Grid shape of a packed atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AtlasMetrics {
    pub cols: u32,
    pub rows: u32,
}

impl AtlasMetrics {
    /// `cols = ceil(sqrt(count))`, `rows = ceil(count / cols)`.
    pub fn for_count(count: usize) -> Self {
        if count == 0 {
            return Self { cols: 0, rows: 0 };
        }
        let mut cols = (count as f64).sqrt().ceil() as usize;
        // Guard against sqrt rounding just under an exact square.
        while cols * cols < count {
            cols += 1;
        }
        let rows = count.div_ceil(cols);
        Self {
            cols: cols as u32,
            rows: rows as u32,
        }
    }

    pub fn cell_count(self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

/// Texture-space rectangle of one atlas cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    /// Lower-left corner, with `v` counted from the bottom of the texture.
    pub offset: [f32; 2],
    pub scale: [f32; 2],
}

/// One packed texture holding every image of a scene.
#[derive(Clone, Debug)]
pub struct Atlas {
    /// Straight-alpha RGBA8; image row 0 is the top row of cells.
    pub texture: RgbaImage,
    pub metrics: AtlasMetrics,
    pub cell_px: u32,
    image_count: usize,
    loaded: Vec<bool>,
    cell_colors: Vec<[u8; 4]>,
}

impl Atlas {
    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn is_loaded(&self, index: usize) -> bool {
        self.loaded.get(index).copied().unwrap_or(false)
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.loaded
            .iter()
            .enumerate()
            .filter_map(|(i, ok)| (!ok).then_some(i))
            .collect()
    }

    /// Wrap any instance number into `[0, image_count)`.
    pub fn atlas_index(&self, instance: usize) -> u32 {
        atlas_index_for(instance, self.image_count)
    }

    /// `(col, row)` of an atlas index, row counted from the top of the texture.
    pub fn cell_of(&self, index: u32) -> (u32, u32) {
        let cols = self.metrics.cols.max(1);
        let index = index % (self.image_count.max(1) as u32);
        (index % cols, index / cols)
    }

    /// Texture-coordinate rectangle for an atlas index. Rows are flipped so that `v = 0` is
    /// the bottom of the texture, matching the sampler convention of the instanced renderer.
    pub fn uv_rect(&self, index: u32) -> UvRect {
        let (col, row) = self.cell_of(index);
        let cols = self.metrics.cols.max(1) as f32;
        let rows = self.metrics.rows.max(1) as f32;
        let flipped = self.metrics.rows.max(1) - 1 - row;
        UvRect {
            offset: [col as f32 / cols, flipped as f32 / rows],
            scale: [1.0 / cols, 1.0 / rows],
        }
    }

    /// Mean straight-alpha color of a cell; blank cells are fully transparent.
    pub fn cell_color(&self, index: u32) -> [u8; 4] {
        let i = index as usize % self.image_count.max(1);
        self.cell_colors.get(i).copied().unwrap_or([0, 0, 0, 0])
    }
}

/// Per-instance atlas index: instances cycle through the images in order.
pub fn atlas_index_for(instance: usize, image_count: usize) -> u32 {
    if image_count == 0 {
        return 0;
    }
    (instance % image_count) as u32
}

/// Load every reference in parallel and pack the results into one texture.
///
/// A reference that fails to load is logged and leaves its cell blank; the atlas dimensions
/// never depend on which loads succeeded.
#[tracing::instrument(skip(references, source), fields(count = references.len()))]
pub fn build_atlas(
    references: &[String],
    source: &dyn ImageSource,
    cell_px: u32,
) -> CubefieldResult<Atlas> {
    if references.is_empty() {
        return Err(CubefieldError::atlas("atlas needs at least one image"));
    }
    if cell_px == 0 {
        return Err(CubefieldError::validation("atlas cell_px must be > 0"));
    }

    let metrics = AtlasMetrics::for_count(references.len());
    let width = metrics.cols.checked_mul(cell_px);
    let height = metrics.rows.checked_mul(cell_px);
    let (Some(width), Some(height)) = (width, height) else {
        return Err(CubefieldError::atlas("atlas texture dimensions overflow u32"));
    };

    let cells: Vec<Option<RgbaImage>> = references
        .par_iter()
        .enumerate()
        .map(|(i, reference)| match source.load(reference) {
            Ok(img) => Some(imageops::resize(
                &img,
                cell_px,
                cell_px,
                imageops::FilterType::Triangle,
            )),
            Err(e) => {
                tracing::warn!(index = i, reference = %reference, error = %e, "image load failed, leaving cell blank");
                None
            }
        })
        .collect();

    let mut texture = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let mut loaded = Vec::with_capacity(cells.len());
    let mut cell_colors = Vec::with_capacity(cells.len());
    for (i, cell) in cells.iter().enumerate() {
        let col = i as u32 % metrics.cols;
        let row = i as u32 / metrics.cols;
        match cell {
            Some(img) => {
                imageops::replace(
                    &mut texture,
                    img,
                    i64::from(col * cell_px),
                    i64::from(row * cell_px),
                );
                loaded.push(true);
                cell_colors.push(mean_color(img));
            }
            None => {
                loaded.push(false);
                cell_colors.push([0, 0, 0, 0]);
            }
        }
    }

    let failed = loaded.iter().filter(|ok| !**ok).count();
    tracing::debug!(
        cols = metrics.cols,
        rows = metrics.rows,
        failed,
        "atlas packed"
    );

    Ok(Atlas {
        texture,
        metrics,
        cell_px,
        image_count: references.len(),
        loaded,
        cell_colors,
    })
}

fn mean_color(img: &RgbaImage) -> [u8; 4] {
    let mut sum = [0u64; 4];
    for px in img.pixels() {
        for (s, c) in sum.iter_mut().zip(px.0) {
            *s += u64::from(c);
        }
    }
    let n = u64::from(img.width()) * u64::from(img.height());
    if n == 0 {
        return [0, 0, 0, 0];
    }
    sum.map(|s| ((s + n / 2) / n) as u8)
}

#[cfg(test)]
#[path = "../../tests/unit/atlas/builder.rs"]
mod tests;
