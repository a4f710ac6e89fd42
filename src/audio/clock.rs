use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// Monotonic clock anchored to the output stream's own timeline. The engine
// bumps the frame counter once per rendered block, so `now` advances in
// device time rather than wall time; everything the scheduler decides is
// expressed against this clock.
#[derive(Clone, Debug)]
pub struct AudioClock {
    frames: Arc<AtomicU64>,
    sample_rate: f64,
}

impl AudioClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
        }
    }

    /// Seconds of audio rendered so far.
    pub fn now(&self) -> f64 {
        self.frames.load(Ordering::Relaxed) as f64 / self.sample_rate
    }

    pub fn frame(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Frame index on this clock's timeline for a time in seconds.
    pub fn frame_at(&self, seconds: f64) -> u64 {
        (seconds * self.sample_rate).round().max(0.0) as u64
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    // Called by the engine after rendering a block.
    pub(crate) fn advance(&self, frames: u64) {
        self.frames.fetch_add(frames, Ordering::Relaxed);
    }
}
