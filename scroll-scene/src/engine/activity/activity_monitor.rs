use bevy::log::info;
use serde::{Deserialize, Serialize};

/// Opaque id of a scheduled frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Render loop the monitor gates.
pub trait FrameDriver {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
    /// Run one frame of scene work.
    fn animate(&mut self);
    fn set_idle_overlay(&mut self, visible: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTransition {
    Suspended,
    Resumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivitySettings {
    pub poll_interval: f64,
    pub idle_threshold: f64,
}

impl Default for ActivitySettings {
    fn default() -> Self {
        Self {
            poll_interval: constants::activity::ACTIVITY_POLL_INTERVAL_SECS,
            idle_threshold: constants::activity::IDLE_THRESHOLD_SECS,
        }
    }
}

/// Suspends the render loop after a stretch without input.
///
/// Holds at most one outstanding frame request; suspending cancels it and
/// resuming runs one frame immediately before re-arming.
#[derive(Debug, Clone)]
pub struct ActivityMonitor {
    last_activity: f64,
    last_poll: f64,
    suspended: bool,
    pending_frame: Option<FrameHandle>,
    settings: ActivitySettings,
}

impl ActivityMonitor {
    pub fn new(now: f64, settings: ActivitySettings) -> Self {
        Self {
            last_activity: now,
            last_poll: now,
            suspended: false,
            pending_frame: None,
            settings,
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    /// Arm the first frame request if none is outstanding.
    pub fn start<D: FrameDriver>(&mut self, driver: &mut D) {
        if !self.suspended {
            self.rearm(driver);
        }
    }

    /// Record qualifying input. Wakes a suspended loop.
    pub fn track_activity<D: FrameDriver>(
        &mut self,
        now: f64,
        driver: &mut D,
    ) -> Option<ActivityTransition> {
        self.last_activity = now;
        if !self.suspended {
            return None;
        }

        self.suspended = false;
        driver.set_idle_overlay(false);
        driver.animate();
        self.rearm(driver);
        info!("Render loop resumed after input");
        Some(ActivityTransition::Resumed)
    }

    /// Periodic idle check; does nothing until a poll interval has elapsed.
    /// Suspends only once strictly more than the idle threshold has passed.
    pub fn poll<D: FrameDriver>(
        &mut self,
        now: f64,
        driver: &mut D,
    ) -> Option<ActivityTransition> {
        if now - self.last_poll < self.settings.poll_interval {
            return None;
        }
        self.last_poll = now;

        if self.suspended || now - self.last_activity <= self.settings.idle_threshold {
            return None;
        }

        if let Some(handle) = self.pending_frame.take() {
            driver.cancel_frame(handle);
        }
        self.suspended = true;
        driver.set_idle_overlay(true);
        info!(
            "Render loop suspended after {:.1}s idle",
            now - self.last_activity
        );
        Some(ActivityTransition::Suspended)
    }

    /// Called when the frame behind `handle` fires. Runs the frame and
    /// schedules the next one while active; stale handles are ignored.
    pub fn on_frame<D: FrameDriver>(&mut self, handle: FrameHandle, driver: &mut D) -> bool {
        if self.pending_frame != Some(handle) {
            return false;
        }
        self.pending_frame = None;
        if self.suspended {
            return false;
        }

        driver.animate();
        self.rearm(driver);
        true
    }

    /// Cancel the outstanding request, if any. Used on teardown.
    pub fn stop<D: FrameDriver>(&mut self, driver: &mut D) {
        if let Some(handle) = self.pending_frame.take() {
            driver.cancel_frame(handle);
        }
    }

    fn rearm<D: FrameDriver>(&mut self, driver: &mut D) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(driver.request_frame());
        }
    }
}
