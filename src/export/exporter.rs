use std::time::Duration;

use crate::{
    export::sink::{FrameKey, FrameSink, SinkConfig},
    foundation::{
        core::{FrameIndex, Fps},
        error::{CubefieldError, CubefieldResult},
    },
    render::RenderSurface,
    scene::field::CubeField,
    timeline::{clock::VirtualClock, playback::StopHandle, track::Timeline},
};

/// Render passes per frame before capture. One pass uploads, the second draws the
/// committed state.
pub const DEFAULT_RENDER_PASSES: u32 = 2;

#[derive(Clone, Debug)]
pub struct ExportConfig {
    /// Prefix of every frame key.
    pub sequence: String,
    pub total_frames: u64,
    pub fps: Fps,
    pub render_passes: u32,
    /// Pause between the last render pass and capture.
    pub settle_delay: Duration,
}

impl ExportConfig {
    pub fn new(sequence: impl Into<String>, total_frames: u64, fps: Fps) -> Self {
        Self {
            sequence: sequence.into(),
            total_frames,
            fps,
            render_passes: DEFAULT_RENDER_PASSES,
            settle_delay: Duration::ZERO,
        }
    }

    pub fn validate(&self) -> CubefieldResult<()> {
        if self.sequence.is_empty() {
            return Err(CubefieldError::validation(
                "export sequence name must be non-empty",
            ));
        }
        if self.sequence.contains(['/', '\\']) {
            return Err(CubefieldError::validation(
                "export sequence name must not contain path separators",
            ));
        }
        if self.total_frames == 0 {
            return Err(CubefieldError::validation(
                "export total_frames must be > 0",
            ));
        }
        if self.render_passes == 0 {
            return Err(CubefieldError::validation(
                "export render_passes must be >= 1",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportProgress {
    /// Frame that was just persisted.
    pub frame: FrameIndex,
    pub frames_done: u64,
    pub total_frames: u64,
}

impl ExportProgress {
    pub fn percent(&self) -> f64 {
        if self.total_frames == 0 {
            return 100.0;
        }
        self.frames_done as f64 * 100.0 / self.total_frames as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportState {
    Completed,
    Cancelled,
    Failed,
}

/// Terminal outcome of one export run.
#[derive(Debug)]
pub struct ExportReport {
    pub state: ExportState,
    pub frames_written: u64,
    pub last_error: Option<CubefieldError>,
}

impl ExportReport {
    /// `Err` only for [`ExportState::Failed`]; a cancelled export is not an error.
    pub fn into_result(self) -> CubefieldResult<Self> {
        match (self.state, self.last_error) {
            (ExportState::Failed, Some(e)) => Err(e),
            (ExportState::Failed, None) => Err(CubefieldError::persist(
                "export failed without a recorded error",
            )),
            (state, last_error) => Ok(Self {
                state,
                frames_written: self.frames_written,
                last_error,
            }),
        }
    }
}

/// Drives a timeline through a virtual frame clock and persists every frame in order.
///
/// Frame `k + 1` is never rendered before `persist(k)` has returned, and the first failed
/// capture or persist ends the run. Cancellation is checked before each frame and again
/// before persisting; a frame captured after cancellation is dropped.
#[derive(Debug)]
pub struct FrameExporter {
    cfg: ExportConfig,
    stop: StopHandle,
}

impl FrameExporter {
    pub fn new(cfg: ExportConfig) -> Self {
        Self {
            cfg,
            stop: StopHandle::new(),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.cfg
    }

    /// Flip this from any thread to cancel at the next frame boundary.
    pub fn cancel_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[tracing::instrument(
        skip_all,
        fields(sequence = %self.cfg.sequence, total = self.cfg.total_frames)
    )]
    pub fn run(
        &self,
        timeline: &Timeline,
        field: &mut CubeField,
        surface: &mut dyn RenderSurface,
        sink: &mut dyn FrameSink,
        on_progress: &mut dyn FnMut(ExportProgress),
    ) -> ExportReport {
        let mut written = 0u64;
        let outcome = self.drive(timeline, field, surface, sink, on_progress, &mut written);
        match outcome {
            Ok(ExportState::Completed) => {
                tracing::info!(frames = written, "export completed");
                ExportReport {
                    state: ExportState::Completed,
                    frames_written: written,
                    last_error: None,
                }
            }
            Ok(state) => {
                sink.abort();
                tracing::warn!(frames = written, "export cancelled");
                ExportReport {
                    state,
                    frames_written: written,
                    last_error: None,
                }
            }
            Err(e) => {
                sink.abort();
                tracing::error!(frames = written, error = %e, "export failed");
                ExportReport {
                    state: ExportState::Failed,
                    frames_written: written,
                    last_error: Some(e),
                }
            }
        }
    }

    fn drive(
        &self,
        timeline: &Timeline,
        field: &mut CubeField,
        surface: &mut dyn RenderSurface,
        sink: &mut dyn FrameSink,
        on_progress: &mut dyn FnMut(ExportProgress),
        written: &mut u64,
    ) -> CubefieldResult<ExportState> {
        self.cfg.validate()?;
        let (width, height) = surface.size();
        sink.begin(&SinkConfig {
            width,
            height,
            fps: self.cfg.fps,
            total_frames: self.cfg.total_frames,
        })?;
        tracing::info!(
            width,
            height,
            fps = self.cfg.fps.as_f64(),
            "export started"
        );

        let mut clock = VirtualClock::new(self.cfg.fps);
        for f in 0..self.cfg.total_frames {
            if self.stop.is_stopped() {
                return Ok(ExportState::Cancelled);
            }
            let index = FrameIndex(f);
            clock.set_frame(index);
            let sample = timeline.sample_with(&clock);
            field.apply(&sample)?;
            for _ in 0..self.cfg.render_passes {
                surface.render(field)?;
            }
            if !self.cfg.settle_delay.is_zero() {
                std::thread::sleep(self.cfg.settle_delay);
            }

            let frame = surface.capture()?.ok_or_else(|| {
                CubefieldError::capture(format!("surface returned no image for frame {f}"))
            })?;
            if self.stop.is_stopped() {
                return Ok(ExportState::Cancelled);
            }

            let key = FrameKey::new(self.cfg.sequence.as_str(), index);
            sink.persist(&key, &frame).map_err(|e| match e {
                CubefieldError::Persist(_) => e,
                other => CubefieldError::persist(format!("frame {f}: {other}")),
            })?;
            *written += 1;
            tracing::trace!(frame = f, "frame persisted");
            on_progress(ExportProgress {
                frame: index,
                frames_done: *written,
                total_frames: self.cfg.total_frames,
            });
        }

        sink.end()?;
        Ok(ExportState::Completed)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
