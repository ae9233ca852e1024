//! Per-tick transform writes into the shared instance buffer.
//!
//! Layouts that need no orientation get a diagonal scale-plus-translation with no trig or
//! normalization. The rest build a look-at basis toward the origin.

use glam::Vec3;

use crate::{
    foundation::core::FLOATS_PER_TRANSFORM,
    instances::{buffer::InstanceBuffer, state::InstanceState},
    layout::kind::LayoutKind,
};

/// Below this distance from the origin an instance keeps the identity orientation.
pub const FACING_MIN_DISTANCE: f32 = 1e-5;

/// Live scalars applied on top of unit-space positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateParams {
    /// Eased morph progress in `[0, 1]`.
    pub progress: f32,
    pub spacing: f32,
    pub cube_size: f32,
}

/// Advance every live instance and rewrite its transform. Marks the buffer dirty once.
pub fn update_instances(
    kind: LayoutKind,
    state: &mut InstanceState,
    buffer: &mut InstanceBuffer,
    params: &UpdateParams,
) {
    state.advance(params.progress);
    let out = buffer.transforms_mut();
    if kind.orients_to_origin() {
        write_facing_origin(state.current(), params.spacing, params.cube_size, out);
    } else {
        write_axis_aligned(state.current(), params.spacing, params.cube_size, out);
    }
    buffer.mark_dirty();
}

/// Fast path: `diag(scale) + translation(position * spacing)`.
pub fn write_axis_aligned(positions: &[f32], spacing: f32, scale: f32, out: &mut [f32]) {
    for (p, m) in positions
        .chunks_exact(3)
        .zip(out.chunks_exact_mut(FLOATS_PER_TRANSFORM))
    {
        m[0] = scale;
        m[1] = 0.0;
        m[2] = 0.0;
        m[3] = 0.0;
        m[4] = 0.0;
        m[5] = scale;
        m[6] = 0.0;
        m[7] = 0.0;
        m[8] = 0.0;
        m[9] = 0.0;
        m[10] = scale;
        m[11] = 0.0;
        m[12] = p[0] * spacing;
        m[13] = p[1] * spacing;
        m[14] = p[2] * spacing;
        m[15] = 1.0;
    }
}

/// Slow path: local `+Z` points at the origin, `+Y` stays as close to world up as it can.
pub fn write_facing_origin(positions: &[f32], spacing: f32, scale: f32, out: &mut [f32]) {
    for (p, m) in positions
        .chunks_exact(3)
        .zip(out.chunks_exact_mut(FLOATS_PER_TRANSFORM))
    {
        let pos = Vec3::new(p[0], p[1], p[2]) * spacing;
        let (x, y, z) = facing_basis(pos);
        let (x, y, z) = (x * scale, y * scale, z * scale);
        m[0] = x.x;
        m[1] = x.y;
        m[2] = x.z;
        m[3] = 0.0;
        m[4] = y.x;
        m[5] = y.y;
        m[6] = y.z;
        m[7] = 0.0;
        m[8] = z.x;
        m[9] = z.y;
        m[10] = z.z;
        m[11] = 0.0;
        m[12] = pos.x;
        m[13] = pos.y;
        m[14] = pos.z;
        m[15] = 1.0;
    }
}

fn facing_basis(pos: Vec3) -> (Vec3, Vec3, Vec3) {
    let dist_sq = pos.length_squared();
    if dist_sq < FACING_MIN_DISTANCE * FACING_MIN_DISTANCE {
        return (Vec3::X, Vec3::Y, Vec3::Z);
    }
    let forward = -pos / dist_sq.sqrt();
    // Looking straight up or down: borrow +Z as the up hint.
    let up = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let right = up.cross(forward).normalize();
    let new_up = forward.cross(right);
    (right, new_up, forward)
}

#[cfg(test)]
#[path = "../../tests/unit/instances/updater.rs"]
mod tests;
