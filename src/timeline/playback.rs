use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::timeline::{
    clock::{TimeSource, WallClock},
    track::{Timeline, TimelineSample},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// Shared running flag. Flipping it stops playback (or an export) at the top of the next
/// tick; work already in flight finishes and its result is dropped.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// `Idle -> Playing -> Idle` driver for live playback. Never loops: once the final keyframe
/// is reached it emits the frozen final sample and returns to idle.
#[derive(Debug)]
pub struct Playback<C: TimeSource = WallClock> {
    clock: C,
    state: PlaybackState,
    stop: StopHandle,
}

impl Playback<WallClock> {
    /// Start real-time playback now.
    pub fn start_now() -> Self {
        let mut p = Self::new(WallClock::start());
        p.play();
        p
    }

    /// Restart from the beginning of the timeline.
    pub fn restart(&mut self) {
        self.clock.restart();
        self.play();
    }
}

impl<C: TimeSource> Playback<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: PlaybackState::Idle,
            stop: StopHandle::new(),
        }
    }

    pub fn play(&mut self) {
        self.stop.reset();
        self.state = PlaybackState::Playing;
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// One per-frame callback. Returns `None` while idle or after a stop request.
    pub fn tick(&mut self, timeline: &Timeline) -> Option<TimelineSample> {
        if self.state == PlaybackState::Idle {
            return None;
        }
        if self.stop.is_stopped() {
            self.state = PlaybackState::Idle;
            return None;
        }
        let sample = timeline.sample_with(&self.clock);
        if sample.finished {
            self.state = PlaybackState::Idle;
        }
        Some(sample)
    }
}
