use crate::{
    foundation::{
        core::GridSize,
        error::{CubefieldError, CubefieldResult},
    },
    layout::kind::LayoutKind,
};

/// Camera on a sphere around the origin: `theta` is azimuth, `phi` the polar angle from +Y.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraPose {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

/// Layout configuration carried by a keyframe.
///
/// `layout`, `n` and `start_hour` are discrete: they switch at keyframe boundaries and are
/// never blended. `spacing` and `cube_size` are interpolated.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameConfig {
    pub layout: LayoutKind,
    #[serde(alias = "N")]
    pub n: GridSize,
    pub spacing: f32,
    #[serde(alias = "cubeSize")]
    pub cube_size: f32,
    #[serde(default, alias = "startHour")]
    pub start_hour: f64,
}

impl FrameConfig {
    pub fn validate(&self) -> CubefieldResult<()> {
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(CubefieldError::validation(format!(
                "spacing must be finite and > 0, got {}",
                self.spacing
            )));
        }
        if !(self.cube_size.is_finite() && self.cube_size > 0.0) {
            return Err(CubefieldError::validation(format!(
                "cube_size must be finite and > 0, got {}",
                self.cube_size
            )));
        }
        if !self.start_hour.is_finite() {
            return Err(CubefieldError::validation("start_hour must be finite"));
        }
        Ok(())
    }
}

/// An authored `(time, camera, config)` anchor.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Seconds from the start of the scene.
    pub time: f64,
    pub camera: CameraPose,
    pub config: FrameConfig,
}

/// Faster curve for continuous config fields.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snap {
    pub ease: crate::timeline::ease::Ease,
    /// Progress multiplier; `2.0` finishes the config blend halfway through the segment.
    pub speed: f64,
}

/// Per-scene playback constants. These are tuned by hand for each scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneTuning {
    /// Progress is pinned at 0 for this long at the start of every segment.
    #[serde(default)]
    pub hold_delay_secs: f64,
    #[serde(default)]
    pub ease: crate::timeline::ease::Ease,
    #[serde(default)]
    pub snap: Option<Snap>,
}

impl SceneTuning {
    pub fn validate(&self) -> CubefieldResult<()> {
        if !(self.hold_delay_secs.is_finite() && self.hold_delay_secs >= 0.0) {
            return Err(CubefieldError::validation(
                "hold_delay_secs must be finite and >= 0",
            ));
        }
        if let Some(snap) = self.snap
            && !(snap.speed.is_finite() && snap.speed > 0.0)
        {
            return Err(CubefieldError::validation("snap speed must be > 0"));
        }
        Ok(())
    }
}
