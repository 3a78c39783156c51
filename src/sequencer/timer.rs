//! Timer seam
//!
//! Background playback needs two things from a timer: a millisecond clock to
//! compare note end times against, and a switch that turns tick generation
//! on and off.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Periodic tick source and millisecond clock
pub trait TimerSource {
    /// Milliseconds elapsed since an arbitrary, fixed epoch
    fn now_ms(&self) -> u64;

    /// Enable tick generation
    fn arm(&mut self);

    /// Disable tick generation
    fn disarm(&mut self);

    /// Whether ticks are currently generated
    fn is_armed(&self) -> bool;
}

/// Wall-clock timer whose arm state is shared with a tick thread
#[derive(Debug, Clone)]
pub struct SystemTimer {
    epoch: Instant,
    armed: Arc<AtomicBool>,
}

impl SystemTimer {
    /// Create a disarmed timer with its epoch at the current instant
    pub fn new() -> Self {
        SystemTimer {
            epoch: Instant::now(),
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag a tick thread polls to know whether to deliver ticks
    pub fn armed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.armed)
    }
}

impl Default for SystemTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerSource for SystemTimer {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn arm(&mut self) {
        self.armed.store(true, Ordering::Release);
    }

    fn disarm(&mut self) {
        self.armed.store(false, Ordering::Release);
    }

    fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }
}

/// Virtual clock for tests and offline rendering
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualTimer {
    now_ms: u64,
    armed: bool,
    arm_count: u32,
}

impl ManualTimer {
    /// Create a disarmed timer at time 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance_by(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    /// Set the clock to an absolute time
    pub fn set_now(&mut self, ms: u64) {
        self.now_ms = ms;
    }

    /// How many times the timer has been armed
    pub fn arm_count(&self) -> u32 {
        self.arm_count
    }
}

impl TimerSource for ManualTimer {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn arm(&mut self) {
        self.armed = true;
        self.arm_count += 1;
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    fn is_armed(&self) -> bool {
        self.armed
    }
}
