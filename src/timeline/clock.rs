use std::time::Instant;

use crate::foundation::core::{Fps, FrameIndex};

/// Where the timeline gets "now" from.
pub trait TimeSource {
    /// Seconds since playback started.
    fn elapsed_secs(&self) -> f64;
}

/// Real time since [`WallClock::start`].
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn restart(&mut self) {
        self.origin = Instant::now();
    }
}

impl TimeSource for WallClock {
    fn elapsed_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// `frame / fps`, independent of how long rendering takes.
#[derive(Clone, Copy, Debug)]
pub struct VirtualClock {
    fps: Fps,
    frame: FrameIndex,
}

impl VirtualClock {
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            frame: FrameIndex(0),
        }
    }

    pub fn set_frame(&mut self, frame: FrameIndex) {
        self.frame = frame;
    }

    pub fn frame(&self) -> FrameIndex {
        self.frame
    }
}

impl TimeSource for VirtualClock {
    fn elapsed_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.frame.0)
    }
}

/// Fixed time, mostly for tests and single-frame renders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedTime(pub f64);

impl TimeSource for FixedTime {
    fn elapsed_secs(&self) -> f64 {
        self.0
    }
}
