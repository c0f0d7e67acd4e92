//! Frame clock.
//!
//! The host owns a [`Time`] and ticks it once per frame, from the wall clock
//! with [`Time::update`] or by a fixed step with [`Time::advance`]. Both
//! return the [`FrameTime`] snapshot that [`frame`](crate::app::frame) takes.

use std::time::{Duration, Instant};

/// Timing values handed to [`frame`](crate::app::frame).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the loop started.
    pub elapsed_secs: f32,
    /// Seconds since the previous frame.
    pub delta_secs: f32,
}

impl FrameTime {
    pub fn new(elapsed_secs: f32, delta_secs: f32) -> Self {
        Self { elapsed_secs, delta_secs }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Time {
    last_tick: Instant,
    elapsed: Duration,
    delta: Duration,
    frames: u64,
}

impl Time {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
            frames: 0,
        }
    }

    /// Tick by the wall-clock time since the previous tick.
    pub fn update(&mut self) -> FrameTime {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        self.tick(delta)
    }

    /// Tick by a fixed `step`, ignoring the wall clock. Keeps headless runs
    /// deterministic.
    pub fn advance(&mut self, step: Duration) -> FrameTime {
        self.last_tick += step;
        self.tick(step)
    }

    fn tick(&mut self, delta: Duration) -> FrameTime {
        self.delta = delta;
        self.elapsed += delta;
        self.frames += 1;
        self.frame_time()
    }

    pub fn frame_time(&self) -> FrameTime {
        FrameTime::new(self.elapsed.as_secs_f32(), self.delta.as_secs_f32())
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Ticks so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
