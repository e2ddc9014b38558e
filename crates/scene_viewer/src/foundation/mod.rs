//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the viewer:
//! - Math types, easing and interpolation
//! - Time sources and frame timing
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
