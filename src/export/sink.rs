use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::{FrameIndex, Fps},
        error::{CubefieldError, CubefieldResult},
    },
    render::frame::FrameImage,
};

/// Identity of one persisted frame.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameKey {
    pub sequence: String,
    pub index: FrameIndex,
}

impl FrameKey {
    pub fn new(sequence: impl Into<String>, index: FrameIndex) -> Self {
        Self {
            sequence: sequence.into(),
            index,
        }
    }

    /// `{sequence}_{index:05}`; sorts lexically in frame order up to 99999 frames.
    pub fn file_stem(&self) -> String {
        format!("{}_{:05}", self.sequence, self.index.0)
    }
}

/// Shape of the sequence a sink is about to receive.
#[derive(Clone, Debug, PartialEq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub total_frames: u64,
}

/// Destination for exported frames.
///
/// `persist` is synchronous: the exporter does not render the next frame until it returns.
/// An `Err` aborts the export.
pub trait FrameSink {
    fn begin(&mut self, cfg: &SinkConfig) -> CubefieldResult<()>;
    fn persist(&mut self, key: &FrameKey, frame: &FrameImage) -> CubefieldResult<()>;
    fn end(&mut self) -> CubefieldResult<()>;

    /// Called instead of `end` when the export stops early.
    fn abort(&mut self) {}
}

/// Keeps every frame in memory.
#[derive(Debug, Default)]
pub struct InMemorySink {
    pub config: Option<SinkConfig>,
    pub frames: Vec<(FrameKey, FrameImage)>,
    pub ended: bool,
    pub aborted: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: &SinkConfig) -> CubefieldResult<()> {
        self.config = Some(cfg.clone());
        self.frames.clear();
        self.ended = false;
        self.aborted = false;
        Ok(())
    }

    fn persist(&mut self, key: &FrameKey, frame: &FrameImage) -> CubefieldResult<()> {
        self.frames.push((key.clone(), frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> CubefieldResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

/// Writes each frame as `<dir>/{sequence}_{index:05}.png`.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn path_for(&self, key: &FrameKey) -> PathBuf {
        self.dir.join(format!("{}.png", key.file_stem()))
    }
}

impl FrameSink for DirectorySink {
    fn begin(&mut self, _cfg: &SinkConfig) -> CubefieldResult<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory '{}'", self.dir.display())
        })?;
        self.written.clear();
        Ok(())
    }

    fn persist(&mut self, key: &FrameKey, frame: &FrameImage) -> CubefieldResult<()> {
        let path = self.path_for(key);
        image::save_buffer_with_format(
            &path,
            &frame.data,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            CubefieldError::persist(format!("failed to write '{}': {e}", path.display()))
        })?;
        tracing::trace!(path = %path.display(), "frame written");
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> CubefieldResult<()> {
        tracing::info!(
            dir = %self.dir.display(),
            frames = self.written.len(),
            "png sequence complete"
        );
        Ok(())
    }

    fn abort(&mut self) {
        // Partial sequences are left on disk; the report says how many frames landed.
        tracing::warn!(
            dir = %self.dir.display(),
            frames = self.written.len(),
            "png sequence aborted"
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
