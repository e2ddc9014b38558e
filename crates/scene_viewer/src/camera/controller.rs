//! # Camera Transition Controller
//!
//! Owns the single live camera transform and moves it between registry
//! cameras with eased, wall-clock driven transitions.
//!
//! ## State Machine
//!
//! ```text
//!   Idle ──arm(target)──▶ Animating ──tick(now) past the end──▶ Idle
//!     ▲                      │
//!     └──jump_to / reset─────┘
//! ```
//!
//! Position follows `ease_in_out(elapsed / position_duration)`. Rotation is
//! either driven by the same eased value (`rotation_delay_fraction == 0`) or
//! staggered: it holds the start orientation until `delay * position_duration`
//! has elapsed, then runs its own eased clock over `rotation_duration`.
//! On completion the live transform is snapped exactly onto the target.

use std::time::{Duration, Instant};
use thiserror::Error;

use crate::camera::config::{CameraConfig, CameraPose};
use crate::camera::projection::Projection;
use crate::camera::registry::CameraRegistry;
use crate::core::config::TransitionConfig;
use crate::foundation::math::{easing, utils, Mat4, Mat4Ext};

/// Reasons a trigger or camera switch was not applied
///
/// None of these are failures of the viewer; they are reported so callers
/// can log them and otherwise ignore the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TriggerRejected {
    /// A transition is already in flight
    #[error("a camera transition is already in progress")]
    Busy,

    /// Transitions need at least two cameras
    #[error("need at least 2 cameras to transition, registry has {0}")]
    TooFewCameras(usize),

    /// Index outside the registry
    #[error("camera index {index} out of range (registry has {len})")]
    InvalidTarget {
        /// Requested index
        index: usize,
        /// Registry length
        len: usize,
    },

    /// Target is the camera already active
    #[error("camera {0} is already active")]
    AlreadyActive(usize),
}

/// In-flight transition parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Live pose captured when the transition was armed
    pub start: CameraPose,
    /// Registry pose of the target camera
    pub target: CameraPose,
    /// Arm instant
    pub start_time: Instant,
    /// Duration of the positional move
    pub position_duration: Duration,
    /// Duration of the gated rotation phase
    pub rotation_duration: Duration,
    /// Fraction of `position_duration` before rotation begins
    pub rotation_delay_fraction: f32,
    /// Field of view captured at arm time
    pub start_fov: f32,
    /// Field of view of the target camera
    pub target_fov: f32,
}

impl Transition {
    fn position_progress(&self, now: Instant) -> f32 {
        normalized(now.saturating_duration_since(self.start_time), self.position_duration)
    }

    fn staggered(&self) -> bool {
        self.rotation_delay_fraction > 0.0
    }

    /// Instant at which the gated rotation begins; its clock runs from here
    fn rotation_gate(&self) -> Instant {
        let delay = Duration::try_from_secs_f32(self.position_duration.as_secs_f32() * self.rotation_delay_fraction)
            .unwrap_or(Duration::ZERO);
        self.start_time.checked_add(delay).unwrap_or(self.start_time)
    }
}

/// Transition state of the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionState {
    /// Live transform rests on the active camera
    Idle,
    /// Live transform is moving towards the active camera
    Animating(Transition),
}

impl TransitionState {
    /// Whether a transition is in flight
    pub fn is_animating(&self) -> bool {
        matches!(self, Self::Animating(_))
    }
}

/// Camera transition state machine
///
/// Holds the camera registry, the active index, the live pose and the live
/// projection. All mutation happens on the render/event thread.
#[derive(Debug)]
pub struct CameraController {
    registry: CameraRegistry,
    active_index: usize,
    live: CameraPose,
    projection: Projection,
    state: TransitionState,
    transition: TransitionConfig,
}

impl CameraController {
    /// Create a controller resting on the registry's primary camera
    ///
    /// # Arguments
    /// * `registry` - Cameras to move between (index 0 becomes active)
    /// * `transition` - Durations and rotation stagger
    /// * `aspect` - Current viewport aspect ratio
    pub fn new(registry: CameraRegistry, transition: &TransitionConfig, aspect: f32) -> Self {
        let primary = registry.primary();
        let live = primary.pose;
        let projection = Projection::new(&primary.projection, aspect);

        Self {
            registry,
            active_index: 0,
            live,
            projection,
            state: TransitionState::Idle,
            transition: *transition,
        }
    }

    /// Start a transition towards `target`
    ///
    /// The start pose is the live pose at this instant, not the registry pose
    /// of the previously active camera. The active index changes immediately.
    pub fn arm(&mut self, target: usize, now: Instant) -> Result<(), TriggerRejected> {
        let result = self.check_target(target);
        if let Err(reason) = result {
            log::debug!("Camera trigger rejected: {reason}");
            return Err(reason);
        }

        let target_camera = &self.registry.cameras()[target];
        let transition = Transition {
            start: self.live,
            target: target_camera.pose,
            start_time: now,
            position_duration: self.transition.position_duration(),
            rotation_duration: self.transition.rotation_duration(),
            rotation_delay_fraction: self.transition.rotation_delay_fraction,
            start_fov: self.projection.fov_y,
            target_fov: target_camera.projection.fov_y,
        };

        self.projection.near = target_camera.projection.near;
        self.projection.far = target_camera.projection.far;

        log::info!(
            "Camera transition {} -> {} ({:.2}s)",
            self.active_label(),
            target_camera.label(target),
            transition.position_duration.as_secs_f32()
        );

        self.active_index = target;
        self.state = TransitionState::Animating(transition);
        Ok(())
    }

    fn check_target(&self, target: usize) -> Result<(), TriggerRejected> {
        if self.state.is_animating() {
            return Err(TriggerRejected::Busy);
        }
        let len = self.registry.len();
        if len < 2 {
            return Err(TriggerRejected::TooFewCameras(len));
        }
        if target >= len {
            return Err(TriggerRejected::InvalidTarget { index: target, len });
        }
        if target == self.active_index {
            return Err(TriggerRejected::AlreadyActive(target));
        }
        Ok(())
    }

    /// Advance the transition to `now`
    pub fn tick(&mut self, now: Instant) {
        let TransitionState::Animating(transition) = &mut self.state else {
            return;
        };

        let u = transition.position_progress(now);
        let eased = easing::ease_in_out(u);

        let position = transition.start.position.lerp(&transition.target.position, eased);
        self.projection.fov_y = utils::lerp(transition.start_fov, transition.target_fov, eased);

        let rotation_done;
        let rotation = if transition.staggered() {
            let gate = transition.rotation_gate();
            if now < gate {
                rotation_done = false;
                transition.start.rotation
            } else {
                let rotation_u = normalized(now.saturating_duration_since(gate), transition.rotation_duration);
                rotation_done = rotation_u >= 1.0;
                utils::slerp_shortest(
                    &transition.start.rotation,
                    &transition.target.rotation,
                    easing::ease_in_out(rotation_u),
                )
            }
        } else {
            rotation_done = true;
            utils::slerp_shortest(&transition.start.rotation, &transition.target.rotation, eased)
        };

        if u >= 1.0 && rotation_done {
            self.live = transition.target;
            self.projection.fov_y = transition.target_fov;
            self.state = TransitionState::Idle;
            log::debug!("Camera transition complete, active camera {}", self.active_label());
        } else {
            self.live = CameraPose::new(position, rotation);
        }
    }

    /// Live pose used for rendering
    pub fn active_transform(&self) -> &CameraPose {
        &self.live
    }

    /// Index of the active (or target) camera
    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Current transition state
    pub fn state(&self) -> &TransitionState {
        &self.state
    }

    /// Next trigger target: alternates 0 and 1 when exactly two cameras exist
    pub fn toggle_target(&self) -> Option<usize> {
        (self.registry.len() == 2).then(|| 1 - self.active_index)
    }

    /// Cut immediately to camera `index`, cancelling any transition
    pub fn jump_to(&mut self, index: usize) -> Result<(), TriggerRejected> {
        let Some(camera) = self.registry.get(index) else {
            let reason = TriggerRejected::InvalidTarget {
                index,
                len: self.registry.len(),
            };
            log::debug!("Camera jump rejected: {reason}");
            return Err(reason);
        };

        self.live = camera.pose;
        self.projection.adopt(&camera.projection);
        self.active_index = index;
        self.state = TransitionState::Idle;
        log::info!("Switched to camera {}", camera.label(index));
        Ok(())
    }

    /// Snap the live pose back onto the active camera, cancelling any transition
    pub fn reset(&mut self) {
        let camera = &self.registry.cameras()[self.active_index];
        self.live = camera.pose;
        self.projection.adopt(&camera.projection);
        self.state = TransitionState::Idle;
        log::debug!("Camera reset to {}", camera.label(self.active_index));
    }

    /// Read-only view of the registry
    pub fn cameras(&self) -> &[CameraConfig] {
        self.registry.cameras()
    }

    /// Live projection
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Live projection, for viewport changes
    pub fn projection_mut(&mut self) -> &mut Projection {
        &mut self.projection
    }

    /// View matrix of the live pose
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::view_from_pose(&self.live.position, &self.live.rotation)
    }

    fn active_label(&self) -> String {
        self.registry.cameras()[self.active_index].label(self.active_index)
    }
}

fn normalized(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::config::ProjectionParams;
    use crate::core::config::CameraSettings;
    use crate::foundation::math::{look_at_rotation, Vec3};
    use crate::foundation::time::{Clock, ManualClock};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn camera(name: &str, position: Vec3, fov_y: f32) -> CameraConfig {
        let pose = CameraPose::new(position, look_at_rotation(&position, &Vec3::zeros(), &Vec3::y()));
        let projection = ProjectionParams {
            fov_y,
            aspect: None,
            near: 0.1,
            far: 100.0,
        };
        CameraConfig::new(pose, projection).with_name(name)
    }

    fn two_camera_registry() -> CameraRegistry {
        CameraRegistry::build(
            vec![
                camera("Primary", Vec3::new(0.0, 2.0, 5.0), 1.0),
                camera("Desk", Vec3::new(0.04, 1.24, 0.73), 0.8),
            ],
            &CameraSettings::default(),
        )
    }

    fn simultaneous() -> TransitionConfig {
        TransitionConfig {
            position_duration_secs: 2.0,
            rotation_duration_secs: 1.0,
            rotation_delay_fraction: 0.0,
        }
    }

    fn secs(value: f32) -> Duration {
        Duration::from_secs_f32(value)
    }

    #[test]
    fn test_starts_idle_on_primary() {
        let controller = CameraController::new(two_camera_registry(), &TransitionConfig::default(), 1.5);
        assert_eq!(controller.active_index(), 0);
        assert_eq!(*controller.state(), TransitionState::Idle);
        assert_eq!(controller.active_transform(), &controller.cameras()[0].pose);
        assert_eq!(controller.projection().aspect, 1.5);
    }

    #[test]
    fn test_transition_endpoints_are_exact() {
        let registry = two_camera_registry();
        let start_pose = registry.cameras()[0].pose;
        let target_pose = registry.cameras()[1].pose;
        let mut controller = CameraController::new(registry, &TransitionConfig::default(), 1.0);
        let t0 = Instant::now();

        controller.arm(1, t0).unwrap();
        controller.tick(t0);
        assert_eq!(controller.active_transform().position, start_pose.position);
        assert_relative_eq!(controller.active_transform().rotation.angle_to(&start_pose.rotation), 0.0, epsilon = 1e-3);

        controller.tick(t0 + secs(2.0));
        assert_eq!(controller.active_transform().position, target_pose.position);
        assert_eq!(controller.active_transform().rotation, target_pose.rotation);
        assert_eq!(*controller.state(), TransitionState::Idle);
    }

    #[test]
    fn test_eased_midpoint_scenario() {
        let mut controller = CameraController::new(two_camera_registry(), &TransitionConfig::default(), 1.0);
        let t0 = Instant::now();
        controller.arm(1, t0).unwrap();

        // u = 0.25 -> e = 2 * 0.25^2 = 0.125
        controller.tick(t0 + secs(0.5));
        let a = Vec3::new(0.0, 2.0, 5.0);
        let b = Vec3::new(0.04, 1.24, 0.73);
        assert_relative_eq!(controller.active_transform().position, a + (b - a) * 0.125, epsilon = EPSILON);

        // u = 0.5 -> e = 1 - 1^3 / 2 = 0.5
        controller.tick(t0 + secs(1.0));
        assert_relative_eq!(controller.active_transform().position, Vec3::new(0.02, 1.62, 2.865), epsilon = EPSILON);
    }

    #[test]
    fn test_staggered_rotation_holds_until_gate() {
        let registry = two_camera_registry();
        let start_rotation = registry.cameras()[0].pose.rotation;
        let target_rotation = registry.cameras()[1].pose.rotation;
        let mut controller = CameraController::new(registry, &TransitionConfig::default(), 1.0);
        let t0 = Instant::now();
        controller.arm(1, t0).unwrap();

        // Delay fraction 0.5 of 2s: rotation is frozen for the first second
        controller.tick(t0 + secs(0.9));
        assert_eq!(controller.active_transform().rotation, start_rotation);

        // Halfway through the 1s rotation clock
        controller.tick(t0 + secs(1.5));
        let expected = utils::slerp_shortest(&start_rotation, &target_rotation, 0.5);
        assert_relative_eq!(controller.active_transform().rotation.angle_to(&expected), 0.0, epsilon = 1e-3);
        assert!(controller.state().is_animating());
    }

    #[test]
    fn test_staggered_rotation_extends_past_position_duration() {
        let config = TransitionConfig {
            position_duration_secs: 2.0,
            rotation_duration_secs: 2.0,
            rotation_delay_fraction: 0.5,
        };
        let registry = two_camera_registry();
        let target_pose = registry.cameras()[1].pose;
        let mut controller = CameraController::new(registry, &config, 1.0);
        let t0 = Instant::now();
        controller.arm(1, t0).unwrap();

        // Position done, rotation still has a second to go
        controller.tick(t0 + secs(2.0));
        assert!(controller.state().is_animating());
        assert_relative_eq!(controller.active_transform().position, target_pose.position, epsilon = EPSILON);

        controller.tick(t0 + secs(3.0));
        assert_eq!(*controller.state(), TransitionState::Idle);
        assert_eq!(*controller.active_transform(), target_pose);
    }

    #[test]
    fn test_arm_while_animating_is_rejected() {
        let registry = CameraRegistry::build(
            vec![
                camera("Primary", Vec3::new(0.0, 2.0, 5.0), 1.0),
                camera("B", Vec3::new(3.0, 1.0, 0.0), 1.0),
                camera("C", Vec3::new(-3.0, 1.0, 0.0), 1.0),
            ],
            &CameraSettings::default(),
        );
        let mut controller = CameraController::new(registry, &simultaneous(), 1.0);
        let t0 = Instant::now();
        controller.arm(1, t0).unwrap();
        let in_flight = *controller.state();

        assert_eq!(controller.arm(2, t0 + secs(0.5)), Err(TriggerRejected::Busy));
        assert_eq!(controller.arm(0, t0 + secs(0.5)), Err(TriggerRejected::Busy));
        assert_eq!(controller.active_index(), 1);
        assert_eq!(*controller.state(), in_flight);
    }

    #[test]
    fn test_single_camera_never_arms() {
        let mut controller = CameraController::new(
            CameraRegistry::fallback(&CameraSettings::default()),
            &TransitionConfig::default(),
            1.0,
        );
        let before = *controller.active_transform();

        assert_eq!(controller.arm(1, Instant::now()), Err(TriggerRejected::TooFewCameras(1)));
        assert_eq!(controller.arm(0, Instant::now()), Err(TriggerRejected::TooFewCameras(1)));
        assert_eq!(controller.toggle_target(), None);
        assert_eq!(*controller.active_transform(), before);
        assert_eq!(controller.active_index(), 0);
    }

    #[test]
    fn test_invalid_and_current_targets_are_rejected() {
        let mut controller = CameraController::new(two_camera_registry(), &simultaneous(), 1.0);
        assert_eq!(
            controller.arm(5, Instant::now()),
            Err(TriggerRejected::InvalidTarget { index: 5, len: 2 })
        );
        assert_eq!(controller.arm(0, Instant::now()), Err(TriggerRejected::AlreadyActive(0)));
        assert_eq!(*controller.state(), TransitionState::Idle);
    }

    #[test]
    fn test_round_trip_returns_to_original_pose() {
        let registry = two_camera_registry();
        let original = registry.cameras()[0].pose;
        let mut controller = CameraController::new(registry, &TransitionConfig::default(), 1.0);
        let clock = ManualClock::new();

        controller.arm(controller.toggle_target().unwrap(), clock.now()).unwrap();
        for _ in 0..150 {
            clock.advance(Duration::from_millis(16));
            controller.tick(clock.now());
        }
        assert_eq!(controller.active_index(), 1);
        assert!(!controller.state().is_animating());

        controller.arm(controller.toggle_target().unwrap(), clock.now()).unwrap();
        for _ in 0..150 {
            clock.advance(Duration::from_millis(16));
            controller.tick(clock.now());
        }

        assert_eq!(controller.active_index(), 0);
        assert_relative_eq!(controller.active_transform().position, original.position, epsilon = EPSILON);
        assert_relative_eq!(controller.active_transform().rotation.angle_to(&original.rotation), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_field_of_view_follows_position_easing() {
        let mut controller = CameraController::new(two_camera_registry(), &TransitionConfig::default(), 1.0);
        let t0 = Instant::now();
        controller.arm(1, t0).unwrap();

        controller.tick(t0 + secs(1.0));
        assert_relative_eq!(controller.projection().fov_y, 0.9, epsilon = EPSILON);

        controller.tick(t0 + secs(2.0));
        assert_eq!(controller.projection().fov_y, 0.8);
        assert_eq!(controller.projection().aspect, 1.0);
    }

    #[test]
    fn test_jump_to_cancels_transition() {
        let registry = two_camera_registry();
        let primary = registry.cameras()[0].pose;
        let mut controller = CameraController::new(registry, &simultaneous(), 1.0);
        let t0 = Instant::now();
        controller.arm(1, t0).unwrap();
        controller.tick(t0 + secs(0.5));

        controller.jump_to(0).unwrap();
        assert_eq!(*controller.state(), TransitionState::Idle);
        assert_eq!(*controller.active_transform(), primary);
        assert_eq!(controller.active_index(), 0);

        assert!(controller.jump_to(9).is_err());
        assert_eq!(controller.active_index(), 0);
    }

    #[test]
    fn test_reset_snaps_to_active_camera() {
        let registry = two_camera_registry();
        let target = registry.cameras()[1].pose;
        let mut controller = CameraController::new(registry, &simultaneous(), 1.0);
        let t0 = Instant::now();
        controller.arm(1, t0).unwrap();
        controller.tick(t0 + secs(0.3));

        controller.reset();
        assert_eq!(*controller.active_transform(), target);
        assert_eq!(*controller.state(), TransitionState::Idle);
    }

    #[test]
    fn test_tick_when_idle_is_noop() {
        let mut controller = CameraController::new(two_camera_registry(), &simultaneous(), 1.0);
        let before = *controller.active_transform();
        controller.tick(Instant::now() + secs(10.0));
        assert_eq!(*controller.active_transform(), before);
    }

    #[test]
    fn test_start_is_captured_from_live_pose() {
        let mut controller = CameraController::new(two_camera_registry(), &simultaneous(), 1.0);
        let t0 = Instant::now();
        controller.jump_to(1).unwrap();
        let live = *controller.active_transform();

        controller.arm(0, t0).unwrap();
        let TransitionState::Animating(transition) = controller.state() else {
            panic!("expected animating state");
        };
        assert_eq!(transition.start, live);
        assert_eq!(transition.start_time, t0);
        assert_eq!(transition.target, controller.cameras()[0].pose);
    }

    #[test]
    fn test_unvalidated_huge_durations_do_not_panic() {
        let transition = TransitionConfig {
            position_duration_secs: 1.0e20,
            rotation_duration_secs: 1.0e20,
            rotation_delay_fraction: 0.5,
        };
        let mut controller = CameraController::new(two_camera_registry(), &transition, 1.0);
        let clock = ManualClock::new();

        controller.arm(1, clock.now()).unwrap();
        clock.advance_secs(10.0);
        controller.tick(clock.now());

        assert!(controller.state().is_animating());
        assert_eq!(controller.active_index(), 1);
    }
}
