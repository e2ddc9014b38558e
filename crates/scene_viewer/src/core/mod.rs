//! # Core Viewer Module
//!
//! Shared configuration used by every viewer subsystem.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for window, logging, asset, cameras,
//!   transitions and lighting

pub mod config;

// Re-export commonly used config types
pub use config::{
    AssetConfig,
    CameraSettings,
    LightingConfig,
    LoggingConfig,
    TransitionConfig,
    ViewerConfig,
    WindowConfig,
};
pub use crate::config::{Config, ConfigError};
