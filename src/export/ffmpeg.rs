use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    export::sink::{FrameKey, FrameSink, SinkConfig},
    foundation::error::{CubefieldError, CubefieldResult},
    render::frame::FrameImage,
};

#[derive(Clone, Debug)]
pub struct FfmpegSinkConfig {
    pub out_path: PathBuf,
    pub overwrite: bool,
    /// Alpha is flattened over this color; the output has no alpha channel.
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkConfig {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn ensure_parent_dir(path: &Path) -> CubefieldResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("failed to create output directory '{}'", parent.display())
        })?;
    }
    Ok(())
}

/// Checks a sequence shape against what the yuv420p H.264 output accepts.
pub fn validate_sink_config(cfg: &SinkConfig) -> CubefieldResult<()> {
    if cfg.width == 0 || cfg.height == 0 {
        return Err(CubefieldError::validation(
            "encode width/height must be non-zero",
        ));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(CubefieldError::validation(
            "encode width/height must be even (required for yuv420p mp4 output)",
        ));
    }
    Ok(())
}

struct Encoder {
    width: u32,
    height: u32,
    child: Child,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
}

/// Pipes frames as raw RGBA into the system `ffmpeg` binary, producing an H.264 MP4.
pub struct FfmpegSink {
    cfg: FfmpegSinkConfig,
    encoder: Option<Encoder>,
}

impl FfmpegSink {
    pub fn new(cfg: FfmpegSinkConfig) -> Self {
        Self { cfg, encoder: None }
    }

    pub fn out_path(&self) -> &Path {
        &self.cfg.out_path
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, seq: &SinkConfig) -> CubefieldResult<()> {
        validate_sink_config(seq)?;
        ensure_parent_dir(&self.cfg.out_path)?;
        if !self.cfg.overwrite && self.cfg.out_path.exists() {
            return Err(CubefieldError::validation(format!(
                "output file '{}' already exists",
                self.cfg.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(CubefieldError::persist(
                "ffmpeg is required for MP4 output, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.cfg.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", seq.width, seq.height),
            "-r",
            &format!("{}/{}", seq.fps.num, seq.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&self.cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            CubefieldError::persist(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| CubefieldError::persist("failed to open ffmpeg stdin"))?;

        tracing::debug!(out = %self.cfg.out_path.display(), "ffmpeg started");
        self.encoder = Some(Encoder {
            width: seq.width,
            height: seq.height,
            child,
            stdin: Some(stdin),
            scratch: vec![0; seq.width as usize * seq.height as usize * 4],
        });
        Ok(())
    }

    fn persist(&mut self, _key: &FrameKey, frame: &FrameImage) -> CubefieldResult<()> {
        let Some(enc) = self.encoder.as_mut() else {
            return Err(CubefieldError::persist("ffmpeg sink was not started"));
        };
        if frame.width != enc.width || frame.height != enc.height {
            return Err(CubefieldError::persist(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, enc.width, enc.height
            )));
        }
        flatten_to_opaque_rgba8(&mut enc.scratch, &frame.data, self.cfg.bg_rgba)?;
        let Some(stdin) = enc.stdin.as_mut() else {
            return Err(CubefieldError::persist("ffmpeg sink is already finalized"));
        };
        stdin.write_all(&enc.scratch).map_err(|e| {
            CubefieldError::persist(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn end(&mut self) -> CubefieldResult<()> {
        let Some(mut enc) = self.encoder.take() else {
            return Err(CubefieldError::persist("ffmpeg sink was not started"));
        };
        drop(enc.stdin.take());
        let output = enc.child.wait_with_output().map_err(|e| {
            CubefieldError::persist(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CubefieldError::persist(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        tracing::info!(out = %self.cfg.out_path.display(), "mp4 written");
        Ok(())
    }

    fn abort(&mut self) {
        if let Some(mut enc) = self.encoder.take() {
            drop(enc.stdin.take());
            if let Err(e) = enc.child.kill() {
                tracing::warn!(error = %e, "failed to kill ffmpeg");
            }
            let _ = enc.child.wait();
        }
    }
}

/// Composite straight-alpha RGBA8 over an opaque background.
fn flatten_to_opaque_rgba8(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> CubefieldResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(CubefieldError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = mul_div255(u16::from(s[c]), a) + mul_div255(u16::from(bg_rgba[c]), inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u16
}
