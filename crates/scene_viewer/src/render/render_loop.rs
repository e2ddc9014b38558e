//! Render loop
//!
//! One tick per display refresh: advance the camera controller to `now`,
//! collect the scene, render it through the live camera. Cancelling the loop
//! is permanent; a cancelled loop never ticks or renders again.

use std::time::{Duration, Instant};

use crate::camera::controller::CameraController;
use crate::foundation::time::Timer;
use crate::render::backend::{BackendResult, FrameContext, RenderBackend};
use crate::scene::scene_manager::SceneGraphManager;

/// Fixed-rate tick source standing in for the display refresh
#[derive(Debug, Clone, Copy)]
pub struct TickSource {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl TickSource {
    /// Tick source firing `rate` times per second
    pub fn from_rate(rate: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / rate.max(1),
            next_tick: None,
        }
    }

    /// Interval between ticks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next tick is due
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next_tick.map_or(Duration::ZERO, |next| next.saturating_duration_since(now))
    }

    /// Record a tick at `now` and schedule the next one
    ///
    /// A late tick schedules from `now` instead of accumulating a backlog.
    fn fire(&mut self, now: Instant) {
        let next = match self.next_tick {
            Some(due) if due + self.interval > now => due + self.interval,
            _ => now + self.interval,
        };
        self.next_tick = Some(next);
    }
}

/// Drives controller ticks and frame rendering
#[derive(Debug)]
pub struct RenderLoop {
    timer: Timer,
    tick_source: TickSource,
    cancelled: bool,
}

impl RenderLoop {
    /// Create a loop ticking at `target_fps`
    pub fn new(target_fps: u32) -> Self {
        Self {
            timer: Timer::new(),
            tick_source: TickSource::from_rate(target_fps),
            cancelled: false,
        }
    }

    /// Run one tick: advance the camera and render a frame
    ///
    /// Returns `Ok(false)` without doing anything once the loop is cancelled.
    pub fn tick(
        &mut self,
        now: Instant,
        controller: &mut CameraController,
        scene: &SceneGraphManager,
        backend: &mut dyn RenderBackend,
    ) -> BackendResult<bool> {
        if self.cancelled {
            return Ok(false);
        }

        self.timer.update(now);
        self.tick_source.fire(now);
        controller.tick(now);

        let queue = scene.render_queue();
        let pose = controller.active_transform();
        let frame = FrameContext {
            view: controller.view_matrix(),
            projection: controller.projection().matrix(),
            camera_position: pose.position,
            queue: &queue,
        };
        backend.render_frame(&frame)?;

        if self.timer.frame_count() % 600 == 0 {
            log::debug!("Render loop: {} frames, {:.1} fps average", self.timer.frame_count(), self.timer.average_fps());
        }
        Ok(true)
    }

    /// Stop the loop for good
    pub fn cancel(&mut self) {
        if !self.cancelled {
            log::debug!("Render loop cancelled after {} frames", self.timer.frame_count());
        }
        self.cancelled = true;
    }

    /// Whether the loop still ticks
    pub fn is_running(&self) -> bool {
        !self.cancelled
    }

    /// Time left until the next tick is due
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.tick_source.time_until_next(now)
    }

    /// Frame timing
    pub fn timer(&self) -> &Timer {
        &self.timer
    }
}
