use glam::Vec3;

use crate::{
    foundation::{
        error::{CubefieldError, CubefieldResult},
        math::{lerp, spherical_to_cartesian},
    },
    timeline::{
        clock::TimeSource,
        ease::held_progress,
        keyframe::{CameraPose, FrameConfig, Keyframe, SceneTuning},
    },
};

/// Immutable, validated keyframe sequence plus its per-scene tuning.
#[derive(Clone, Debug)]
pub struct Timeline {
    keys: Vec<Keyframe>,
    tuning: SceneTuning,
}

/// Everything the runtime needs for one instant of the timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineSample {
    /// Index of the segment's first keyframe.
    pub segment: usize,
    /// Linear segment progress after the hold delay, in `[0, 1]`.
    pub linear: f64,
    /// `linear` through the scene ease; drives the camera.
    pub progress: f64,
    /// Progress for continuous config fields and the layout morph (the snap curve when set).
    pub config_progress: f64,
    pub camera: CameraPose,
    /// Camera position; it always looks at the origin.
    pub eye: Vec3,
    pub config: FrameConfig,
    /// At or past the final keyframe.
    pub finished: bool,
}

impl Timeline {
    pub fn new(keys: Vec<Keyframe>, tuning: SceneTuning) -> CubefieldResult<Self> {
        if keys.is_empty() {
            return Err(CubefieldError::timeline(
                "timeline needs at least one keyframe",
            ));
        }
        for (i, k) in keys.iter().enumerate() {
            if !k.time.is_finite() || k.time < 0.0 {
                return Err(CubefieldError::timeline(format!(
                    "keyframe {i} time must be finite and >= 0"
                )));
            }
            if !(k.camera.radius.is_finite() && k.camera.radius > 0.0) {
                return Err(CubefieldError::timeline(format!(
                    "keyframe {i} camera radius must be > 0"
                )));
            }
            if !(k.camera.theta.is_finite() && k.camera.phi.is_finite()) {
                return Err(CubefieldError::timeline(format!(
                    "keyframe {i} camera angles must be finite"
                )));
            }
            k.config.validate().map_err(|e| {
                CubefieldError::timeline(format!("keyframe {i} config: {e}"))
            })?;
        }
        if !keys.windows(2).all(|w| w[0].time <= w[1].time) {
            return Err(CubefieldError::timeline(
                "keyframes must be sorted by time",
            ));
        }
        tuning.validate()?;
        Ok(Self { keys, tuning })
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn tuning(&self) -> &SceneTuning {
        &self.tuning
    }

    /// Time of the final keyframe.
    pub fn duration_secs(&self) -> f64 {
        self.keys.last().map(|k| k.time).unwrap_or(0.0)
    }

    /// Sample at the time reported by `clock`. Live playback passes a wall clock, export
    /// passes a virtual frame clock.
    pub fn sample_with(&self, clock: &dyn TimeSource) -> TimelineSample {
        self.sample(clock.elapsed_secs())
    }

    /// Sample at `elapsed` seconds. Past the final keyframe this returns the final keyframe's
    /// exact values on every call.
    pub fn sample(&self, elapsed: f64) -> TimelineSample {
        let last_idx = self.keys.len() - 1;
        let last = &self.keys[last_idx];
        if elapsed >= last.time || elapsed.is_nan() {
            return Self::at_key(last_idx, last, 1.0, true);
        }

        let first = &self.keys[0];
        if elapsed < first.time {
            return Self::at_key(0, first, 0.0, false);
        }

        // First key strictly after `elapsed`; exists because elapsed < last.time.
        let next = self.keys.partition_point(|k| k.time <= elapsed);
        let seg = next - 1;
        let a = &self.keys[seg];
        let b = &self.keys[next];

        let local = elapsed - a.time;
        let duration = b.time - a.time;
        let linear = held_progress(local, duration, self.tuning.hold_delay_secs);
        let progress = self.tuning.ease.apply(linear);
        let config_progress = match self.tuning.snap {
            Some(snap) => snap.ease.apply_sped_up(linear, snap.speed),
            None => progress,
        };

        let pt = progress as f32;
        let camera = CameraPose {
            radius: lerp(a.camera.radius, b.camera.radius, pt),
            theta: lerp(a.camera.theta, b.camera.theta, pt),
            phi: lerp(a.camera.phi, b.camera.phi, pt),
        };
        let ct = config_progress as f32;
        let config = FrameConfig {
            layout: a.config.layout,
            n: a.config.n,
            start_hour: a.config.start_hour,
            spacing: lerp(a.config.spacing, b.config.spacing, ct),
            cube_size: lerp(a.config.cube_size, b.config.cube_size, ct),
        };

        TimelineSample {
            segment: seg,
            linear,
            progress,
            config_progress,
            camera,
            eye: spherical_to_cartesian(camera.radius, camera.theta, camera.phi),
            config,
            finished: false,
        }
    }

    fn at_key(segment: usize, key: &Keyframe, p: f64, finished: bool) -> TimelineSample {
        TimelineSample {
            segment,
            linear: p,
            progress: p,
            config_progress: p,
            camera: key.camera,
            eye: spherical_to_cartesian(key.camera.radius, key.camera.theta, key.camera.phi),
            config: key.config,
            finished,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/track.rs"]
mod tests;
