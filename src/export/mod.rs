//! Deterministic frame export: a virtual-clock driver plus the sinks it persists into.
pub mod exporter;
pub mod ffmpeg;
pub mod sink;
