use glam::Mat4;

use crate::foundation::{
    core::{FLOATS_PER_TRANSFORM, MAX_INSTANCES},
    error::{CubefieldError, CubefieldResult},
};

/// Flat per-instance storage shared with the instanced renderer.
///
/// Capacity is fixed at [`MAX_INSTANCES`] so changing the grid size never reallocates. Only the
/// first `count` entries are live.
#[derive(Clone, Debug)]
pub struct InstanceBuffer {
    transforms: Vec<f32>,
    atlas_indices: Vec<u32>,
    count: usize,
    dirty: bool,
}

impl Default for InstanceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceBuffer {
    pub fn new() -> Self {
        let mut transforms = vec![0.0; MAX_INSTANCES * FLOATS_PER_TRANSFORM];
        for m in transforms.chunks_exact_mut(FLOATS_PER_TRANSFORM) {
            m.copy_from_slice(&Mat4::IDENTITY.to_cols_array());
        }
        Self {
            transforms,
            atlas_indices: vec![0; MAX_INSTANCES],
            count: 0,
            dirty: true,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        MAX_INSTANCES
    }

    pub fn set_count(&mut self, count: usize) -> CubefieldResult<()> {
        if count > MAX_INSTANCES {
            return Err(CubefieldError::validation(format!(
                "instance count {count} exceeds buffer capacity {MAX_INSTANCES}"
            )));
        }
        if count != self.count {
            self.count = count;
            self.dirty = true;
        }
        Ok(())
    }

    /// Live transforms, 16 column-major floats per instance.
    pub fn transforms(&self) -> &[f32] {
        &self.transforms[..self.count * FLOATS_PER_TRANSFORM]
    }

    pub(crate) fn transforms_mut(&mut self) -> &mut [f32] {
        &mut self.transforms[..self.count * FLOATS_PER_TRANSFORM]
    }

    pub fn transform(&self, i: usize) -> Option<Mat4> {
        if i >= self.count {
            return None;
        }
        let start = i * FLOATS_PER_TRANSFORM;
        Some(Mat4::from_cols_slice(
            &self.transforms[start..start + FLOATS_PER_TRANSFORM],
        ))
    }

    /// Live transforms as raw bytes for upload.
    pub fn transform_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.transforms())
    }

    pub fn atlas_indices(&self) -> &[u32] {
        &self.atlas_indices[..self.count]
    }

    pub fn atlas_index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.atlas_indices())
    }

    /// Assign every slot an atlas index in `[0, image_count)`, cycling in instance order.
    pub fn assign_atlas_indices(&mut self, image_count: usize) {
        for (i, slot) in self.atlas_indices.iter_mut().enumerate() {
            *slot = crate::atlas::builder::atlas_index_for(i, image_count);
        }
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Return whether an upload is pending and clear the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
