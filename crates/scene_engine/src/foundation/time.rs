//! Frame timing

use std::time::Instant;

/// Frame clock producing per-frame delta times
///
/// Delta times are clamped to `max_delta` so a stalled frame (debugger
/// break, window drag) does not fling orbiting entities across their path.
pub struct FrameClock {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    max_delta: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl FrameClock {
    /// Create a new clock with the given delta clamp in seconds
    pub fn new(max_delta: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            max_delta: max_delta.max(0.0),
        }
    }

    /// Advance the clock; call once per frame. Returns the clamped delta.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(elapsed)
    }

    /// Advance by an explicit amount instead of wall time
    pub fn advance(&mut self, elapsed: f32) -> f32 {
        self.delta_time = elapsed.min(self.max_delta);
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }

    /// Time since the previous tick, after clamping
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Sum of all clamped deltas
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of ticks so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average FPS over the clock's lifetime
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
