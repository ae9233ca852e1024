use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::{
        core::Fps,
        error::{CubefieldError, CubefieldResult},
    },
    timeline::{
        keyframe::{Keyframe, SceneTuning},
        track::Timeline,
    },
};

fn default_fps() -> u32 {
    30
}

fn default_cell_px() -> u32 {
    128
}

/// Hand-authored scene: image list, tuning constants and keyframes. Loaded once and never
/// written back.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneFile {
    pub name: String,
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Export length; defaults to the final keyframe time.
    #[serde(default)]
    pub duration_secs: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_cell_px")]
    pub cell_px: u32,
    #[serde(default)]
    pub tuning: SceneTuning,
    pub keyframes: Vec<Keyframe>,
}

impl SceneFile {
    pub fn from_json_str(json: &str) -> CubefieldResult<Self> {
        let scene: Self = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn load(path: &Path) -> CubefieldResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> CubefieldResult<()> {
        if self.name.trim().is_empty() {
            return Err(CubefieldError::validation("scene name must not be empty"));
        }
        if self
            .name
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '\0'))
        {
            return Err(CubefieldError::validation(
                "scene name is used in file names and must not contain path separators",
            ));
        }
        self.fps()?;
        if self.cell_px == 0 {
            return Err(CubefieldError::validation("cell_px must be > 0"));
        }
        if let Some(d) = self.duration_secs
            && !(d.is_finite() && d >= 0.0)
        {
            return Err(CubefieldError::validation(
                "duration_secs must be finite and >= 0",
            ));
        }
        self.timeline().map(|_| ())
    }

    pub fn fps(&self) -> CubefieldResult<Fps> {
        Fps::whole(self.fps)
    }

    pub fn timeline(&self) -> CubefieldResult<Timeline> {
        Timeline::new(self.keyframes.clone(), self.tuning)
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs.unwrap_or_else(|| {
            self.keyframes.last().map(|k| k.time).unwrap_or(0.0)
        })
    }

    /// Frames needed to cover the duration, including the frame at the final keyframe.
    pub fn total_frames(&self) -> CubefieldResult<u64> {
        let fps = self.fps()?;
        Ok(fps.secs_to_frames_ceil(self.duration_secs()) + 1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
