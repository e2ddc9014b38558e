//! Camera system
//!
//! Authored camera configurations, the registry built from them, the live
//! projection, and the transition controller that moves between them.

pub mod config;
pub mod controller;
pub mod projection;
pub mod registry;

pub use config::{CameraConfig, CameraPose, ProjectionParams};
pub use controller::{CameraController, Transition, TransitionState, TriggerRejected};
pub use projection::Projection;
pub use registry::CameraRegistry;
