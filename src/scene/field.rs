use glam::Vec3;

use crate::{
    foundation::{core::GridSize, error::CubefieldResult},
    instances::{
        buffer::InstanceBuffer,
        state::InstanceState,
        updater::{UpdateParams, update_instances},
    },
    layout::{
        generator::{LayoutParams, generate_layout},
        kind::LayoutKind,
    },
    timeline::track::TimelineSample,
};

/// Discrete inputs that decide the layout targets. Targets are regenerated only when this
/// changes, never on an ordinary tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LayoutKey {
    kind: LayoutKind,
    n: GridSize,
    start_hour_bits: u64,
}

/// Live cube field: owns the instance buffer and drives layout generation plus the
/// per-tick transform update from timeline samples.
#[derive(Debug)]
pub struct CubeField {
    buffer: InstanceBuffer,
    state: InstanceState,
    key: Option<LayoutKey>,
    segment: Option<usize>,
    eye: Vec3,
    regenerations: u64,
}

impl CubeField {
    /// `image_count` sets the per-instance atlas indices.
    pub fn new(image_count: usize) -> Self {
        let mut buffer = InstanceBuffer::new();
        buffer.assign_atlas_indices(image_count);
        Self {
            buffer,
            state: InstanceState::new(),
            key: None,
            segment: None,
            eye: Vec3::new(0.0, 0.0, 1.0),
            regenerations: 0,
        }
    }

    #[tracing::instrument(level = "trace", skip(self, sample), fields(segment = sample.segment))]
    pub fn apply(&mut self, sample: &TimelineSample) -> CubefieldResult<()> {
        let cfg = &sample.config;
        let key = LayoutKey {
            kind: cfg.layout,
            n: cfg.n,
            start_hour_bits: cfg.start_hour.to_bits(),
        };

        if self.key != Some(key) {
            // Targets keep the spacing and cube size of this sample until the key changes.
            let params = LayoutParams::new(cfg.n, cfg.spacing, cfg.cube_size, cfg.start_hour);
            let target = generate_layout(cfg.layout, cfg.n.instance_count(), &params);
            if self.key.is_none() {
                self.state.snap_to(&target)?;
            } else {
                self.state.retarget(&target)?;
            }
            self.buffer.set_count(self.state.count())?;
            self.key = Some(key);
            self.regenerations += 1;
            tracing::debug!(
                layout = %cfg.layout,
                n = cfg.n.get(),
                start_hour = cfg.start_hour,
                "layout targets regenerated"
            );
        } else if self.segment != Some(sample.segment) {
            // Same key across a keyframe boundary: progress restarts at 0, so finish the
            // morph instead of replaying it.
            self.state.settle();
        }
        self.segment = Some(sample.segment);

        update_instances(
            cfg.layout,
            &mut self.state,
            &mut self.buffer,
            &UpdateParams {
                progress: sample.config_progress as f32,
                spacing: cfg.spacing,
                cube_size: cfg.cube_size,
            },
        );
        self.eye = sample.eye;
        Ok(())
    }

    pub fn buffer(&self) -> &InstanceBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut InstanceBuffer {
        &mut self.buffer
    }

    pub fn instance_count(&self) -> usize {
        self.buffer.count()
    }

    /// Camera position of the last applied sample.
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// The camera always looks at the coordinate origin.
    pub fn look_target(&self) -> Vec3 {
        Vec3::ZERO
    }

    /// How many times layout targets have been generated.
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/field.rs"]
mod tests;
