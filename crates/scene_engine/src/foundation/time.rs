//! Frame timing utilities

use std::time::{Duration, Instant};

/// Frame timer producing the `delta_time` fed to `Engine::update_frame`
///
/// Deltas are clamped to `max_delta` so a stalled frame (asset load, debugger
/// break) does not launch the player through a wall on the next tick.
pub struct FrameClock {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    max_delta: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl FrameClock {
    /// Create a new clock with the given delta clamp (seconds)
    pub fn new(max_delta: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            max_delta,
        }
    }

    /// Sample the wall clock (call once per frame) and return the clamped delta
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.advance(elapsed)
    }

    /// Advance by an explicit duration instead of the wall clock
    pub fn advance(&mut self, elapsed: Duration) -> f32 {
        self.delta_time = elapsed.as_secs_f32().min(self.max_delta);
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total simulated time
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since clock creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
