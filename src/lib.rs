//! Cubefield animates up to 24³ textured cubes between layouts derived from parametric
//! coordinate systems, keyframed on a timeline and exportable frame by frame.
//!
//! The crate is split into small stages:
//!
//! - [`layout`]: the twelve layouts and the target-position generator
//! - [`instances`]: the fixed-capacity transform buffer and the per-tick updater
//! - [`atlas`]: parallel image loading and texture-atlas packing
//! - [`timeline`]: keyframes, easing, clocks and playback
//! - [`scene`]: scene files and the live [`CubeField`] runtime
//! - [`render`]: the [`RenderSurface`] seam plus a CPU preview renderer
//! - [`export`]: deterministic frame export into a [`FrameSink`]
//!
//! See [`guide`] for a walkthrough.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod export;
pub mod foundation;
pub mod guide;
pub mod instances;
pub mod layout;
pub mod render;
pub mod scene;
pub mod timeline;

pub use crate::atlas::builder::{Atlas, AtlasMetrics, UvRect, build_atlas};
pub use crate::atlas::source::{FsImageSource, ImageSource};
pub use crate::export::exporter::{
    ExportConfig, ExportProgress, ExportReport, ExportState, FrameExporter,
};
pub use crate::export::ffmpeg::{FfmpegSink, FfmpegSinkConfig};
pub use crate::export::sink::{DirectorySink, FrameKey, FrameSink, InMemorySink, SinkConfig};
pub use crate::foundation::core::{Fps, FrameIndex, GridSize, MAX_GRID_N, MAX_INSTANCES};
pub use crate::foundation::error::{CubefieldError, CubefieldResult};
pub use crate::instances::buffer::InstanceBuffer;
pub use crate::layout::generator::{LayoutParams, generate_layout};
pub use crate::layout::kind::LayoutKind;
pub use crate::render::RenderSurface;
pub use crate::render::frame::FrameImage;
pub use crate::render::preview::{PreviewRenderer, PreviewSettings};
pub use crate::scene::config::SceneFile;
pub use crate::scene::field::CubeField;
pub use crate::timeline::clock::{FixedTime, TimeSource, VirtualClock, WallClock};
pub use crate::timeline::ease::Ease;
pub use crate::timeline::keyframe::{CameraPose, FrameConfig, Keyframe, SceneTuning, Snap};
pub use crate::timeline::playback::{Playback, PlaybackState, StopHandle};
pub use crate::timeline::track::{Timeline, TimelineSample};
