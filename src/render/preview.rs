use glam::{Mat4, Vec3, Vec4};

use crate::{
    atlas::builder::Atlas,
    foundation::{
        core::FLOATS_PER_TRANSFORM,
        error::{CubefieldError, CubefieldResult},
    },
    render::{RenderSurface, frame::FrameImage},
    scene::field::CubeField,
};

const NEAR: f32 = 0.05;
const FAR: f32 = 10_000.0;

#[derive(Clone, Debug, PartialEq)]
pub struct PreviewSettings {
    pub width: u32,
    pub height: u32,
    pub fov_y_deg: f32,
    pub clear_rgba: [u8; 4],
    /// Used for instances whose atlas cell is blank.
    pub blank_rgba: [u8; 4],
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            fov_y_deg: 45.0,
            clear_rgba: [18, 20, 28, 255],
            blank_rgba: [64, 66, 74, 255],
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Splat {
    depth: f32,
    x: f32,
    y: f32,
    half: f32,
    color: [u8; 4],
}

/// CPU stand-in for the instanced renderer: each instance becomes a depth-sorted square of
/// its atlas cell's mean color, projected from the field's camera.
#[derive(Debug)]
pub struct PreviewRenderer {
    settings: PreviewSettings,
    palette: Vec<[u8; 4]>,
    pixels: Vec<u8>,
    splats: Vec<Splat>,
    drawn: bool,
}

impl PreviewRenderer {
    pub fn new(settings: PreviewSettings, palette: Vec<[u8; 4]>) -> CubefieldResult<Self> {
        if settings.width == 0 || settings.height == 0 {
            return Err(CubefieldError::validation(
                "preview width/height must be non-zero",
            ));
        }
        if !(settings.fov_y_deg > 0.0 && settings.fov_y_deg < 180.0) {
            return Err(CubefieldError::validation(
                "preview fov_y_deg must be in (0, 180)",
            ));
        }
        let len = settings.width as usize * settings.height as usize * 4;
        Ok(Self {
            settings,
            palette,
            pixels: vec![0; len],
            splats: Vec::new(),
            drawn: false,
        })
    }

    pub fn with_atlas(settings: PreviewSettings, atlas: &Atlas) -> CubefieldResult<Self> {
        let palette = (0..atlas.image_count() as u32)
            .map(|i| atlas.cell_color(i))
            .collect();
        Self::new(settings, palette)
    }

    pub fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    fn color_for(&self, atlas_index: u32) -> [u8; 4] {
        if self.palette.is_empty() {
            return self.settings.blank_rgba;
        }
        let c = self.palette[atlas_index as usize % self.palette.len()];
        if c[3] == 0 { self.settings.blank_rgba } else { c }
    }

    fn view_projection(&self, eye: Vec3, target: Vec3) -> Mat4 {
        let forward = (target - eye).normalize_or_zero();
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let aspect = self.settings.width as f32 / self.settings.height as f32;
        let proj = Mat4::perspective_rh(self.settings.fov_y_deg.to_radians(), aspect, NEAR, FAR);
        proj * Mat4::look_at_rh(eye, target, up)
    }

    fn clear(&mut self) {
        let c = self.settings.clear_rgba;
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
    }

    fn fill_square(&mut self, s: &Splat) {
        let w = self.settings.width as i64;
        let h = self.settings.height as i64;
        let x0 = ((s.x - s.half).floor() as i64).max(0);
        let x1 = ((s.x + s.half).ceil() as i64).min(w);
        let y0 = ((s.y - s.half).floor() as i64).max(0);
        let y1 = ((s.y + s.half).ceil() as i64).min(h);
        for y in y0..y1 {
            let row = (y * w) as usize * 4;
            for x in x0..x1 {
                let i = row + x as usize * 4;
                self.pixels[i..i + 4].copy_from_slice(&s.color);
            }
        }
    }
}

impl RenderSurface for PreviewRenderer {
    fn size(&self) -> (u32, u32) {
        (self.settings.width, self.settings.height)
    }

    fn render(&mut self, field: &CubeField) -> CubefieldResult<()> {
        let vp = self.view_projection(field.eye(), field.look_target());
        let w = self.settings.width as f32;
        let h = self.settings.height as f32;
        let focal = (h * 0.5) / (self.settings.fov_y_deg.to_radians() * 0.5).tan();

        let buffer = field.buffer();
        let mut splats = std::mem::take(&mut self.splats);
        splats.clear();
        for (m, &atlas_index) in buffer
            .transforms()
            .chunks_exact(FLOATS_PER_TRANSFORM)
            .zip(buffer.atlas_indices())
        {
            let scale = Vec3::new(m[0], m[1], m[2]).length();
            let clip = vp * Vec4::new(m[12], m[13], m[14], 1.0);
            if clip.w <= NEAR {
                continue;
            }
            let ndc_x = clip.x / clip.w;
            let ndc_y = clip.y / clip.w;
            let half = (scale * 0.5 * focal / clip.w).max(0.5);
            splats.push(Splat {
                depth: clip.w,
                x: (ndc_x * 0.5 + 0.5) * w,
                y: (0.5 - ndc_y * 0.5) * h,
                half,
                color: self.color_for(atlas_index),
            });
        }
        // Painter's order: farthest first.
        splats.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        self.clear();
        for s in &splats {
            self.fill_square(s);
        }
        self.splats = splats;
        self.drawn = true;
        Ok(())
    }

    fn capture(&mut self) -> CubefieldResult<Option<FrameImage>> {
        if !self.drawn {
            return Ok(None);
        }
        FrameImage::new(
            self.settings.width,
            self.settings.height,
            self.pixels.clone(),
        )
        .map(Some)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;
