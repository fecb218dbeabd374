//! The two clocks of the frame loop.
//!
//! - The **logical tick** (`FrameTimer::frame_count`) advances once per loop
//!   iteration and drives animation cadence.
//! - The **wall clock** (`Clock::now_ms`) is monotonic milliseconds since the
//!   clock was created and drives countdowns, hurt expiry and the phase
//!   transition hold.
//!
//! There is no fixed-timestep accumulator: simulation runs once per polled
//! frame and `FrameTimer::end_frame` only tells the caller how long to sleep
//! to approximate the nominal tick.

use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 60;
const OVERRUN_WARN_FACTOR: u64 = 4;

pub trait Clock {
    /// Monotonic milliseconds.
    fn now_ms(&self) -> u64;
    fn sleep(&mut self, duration: Duration);
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Simulated clock: time only moves when told to, and sleeping advances it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: u64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self { now_ms: start_ms }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn sleep(&mut self, duration: Duration) {
        self.now_ms += duration.as_millis() as u64;
    }
}

/// Fires once per elapsed `interval_ms` of wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SecondTimer {
    interval_ms: u64,
    last_ms: u64,
}

impl SecondTimer {
    pub fn new(now_ms: u64) -> Self {
        Self::with_interval(now_ms, 1000)
    }

    pub fn with_interval(now_ms: u64, interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            last_ms: now_ms,
        }
    }

    /// Restart the interval from `now_ms`, discarding any partial progress.
    pub fn reset(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }

    /// Returns true at most once per call when an interval has elapsed.
    /// Intervals stay aligned to the original start unless the caller fell
    /// more than one interval behind, in which case the timer resyncs.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_ms) < self.interval_ms {
            return false;
        }
        self.last_ms += self.interval_ms;
        if now_ms.saturating_sub(self.last_ms) >= self.interval_ms {
            self.last_ms = now_ms;
        }
        true
    }
}

pub struct FrameTimer {
    pub tick_ms: u64,
    pub frame_count: u64,
    pub real_dt_ms: u64,
    frame_start_ms: u64,
    last_frame_start_ms: Option<u64>,

    fps_samples: [u64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FrameTimer {
    pub fn new(tick_ms: u64) -> Self {
        let tick_ms = tick_ms.max(1);
        Self {
            tick_ms,
            frame_count: 0,
            real_dt_ms: 0,
            frame_start_ms: 0,
            last_frame_start_ms: None,
            fps_samples: [tick_ms; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 1000.0 / tick_ms as f64,
            smoothed_frame_time_ms: tick_ms as f64,
        }
    }

    pub fn begin_frame(&mut self, now_ms: u64) {
        if let Some(last) = self.last_frame_start_ms {
            self.real_dt_ms = now_ms.saturating_sub(last);
        }
        self.last_frame_start_ms = Some(now_ms);
        self.frame_start_ms = now_ms;
        self.frame_count += 1;

        if self.real_dt_ms > self.tick_ms * OVERRUN_WARN_FACTOR {
            log::warn!(
                "Frame took {}ms against a {}ms tick",
                self.real_dt_ms,
                self.tick_ms
            );
        }

        // FPS smoothing
        if self.frame_count > 1 {
            self.fps_samples[self.fps_sample_index] = self.real_dt_ms;
            self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        }
        let avg_dt = self.fps_samples.iter().sum::<u64>() as f64 / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt;
        self.smoothed_fps = if avg_dt > 0.0 { 1000.0 / avg_dt } else { 0.0 };
    }

    /// Time left in this tick, to be slept by the caller.
    pub fn end_frame(&self, now_ms: u64) -> Duration {
        let spent = now_ms.saturating_sub(self.frame_start_ms);
        Duration::from_millis(self.tick_ms.saturating_sub(spent))
    }
}
