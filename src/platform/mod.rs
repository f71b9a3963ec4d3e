//! Platform abstraction layer
//!
//! The frame loop only needs a monotonic clock. Window, context and input
//! polling live in whatever backend drives the loop.

use std::time::Instant;

use crate::consts::MAX_FRAME_DT;

/// Monotonic seconds since start
pub trait Clock {
    fn now(&self) -> f64;

    /// Advance to the next frame and return the elapsed seconds
    fn frame_delta(&mut self) -> f32;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
    last: f64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last: 0.0,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn frame_delta(&mut self) -> f32 {
        let now = self.now();
        let dt = now - self.last;
        self.last = now;
        clamp_frame_dt(dt as f32)
    }
}

/// Deterministic clock advancing a fixed step per frame
#[derive(Debug, Clone)]
pub struct FixedClock {
    step: f32,
    elapsed: f64,
}

impl FixedClock {
    pub fn new(step: f32) -> Self {
        Self { step, elapsed: 0.0 }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.elapsed
    }

    fn frame_delta(&mut self) -> f32 {
        let dt = clamp_frame_dt(self.step);
        self.elapsed += dt as f64;
        dt
    }
}

/// Clamp a frame delta so a stall doesn't teleport entities
#[inline]
pub fn clamp_frame_dt(dt: f32) -> f32 {
    dt.clamp(0.0, MAX_FRAME_DT)
}
