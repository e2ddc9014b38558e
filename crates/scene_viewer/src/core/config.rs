//! # Unified Viewer Configuration
//!
//! All viewer settings in one serializable structure. Every field has a
//! default, so a partial file (or no file at all) yields a usable viewer.
//!
//! ## Configuration Categories
//!
//! - **Window**: Surface size, title, tick rate
//! - **Logging**: Default log filter
//! - **Asset**: Scene file and recentering anchor
//! - **Cameras**: Primary camera name and fallback camera
//! - **Transition**: Durations and rotation stagger of camera moves
//! - **Lighting**: Default light rig and shadow flags

use serde::{Serialize, Deserialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec3;

/// # Window Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial surface width in pixels
    pub width: u32,
    /// Initial surface height in pixels
    pub height: u32,
    /// Whether the window can be resized
    pub resizable: bool,
    /// Tick source rate (display refresh) in frames per second
    pub target_fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Scene Viewer".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
            target_fps: 60,
        }
    }
}

/// # Logging Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

/// # Asset Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Path of the glTF/GLB scene to load
    pub scene_path: PathBuf,
    /// World point that becomes the asset's local origin
    pub anchor: [f32; 3],
}

impl AssetConfig {
    /// Anchor as a vector
    pub fn anchor(&self) -> Vec3 {
        Vec3::from(self.anchor)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            scene_path: PathBuf::from("resources/models/office.glb"),
            anchor: [0.0, 0.0, 0.0],
        }
    }
}

/// # Camera Settings
///
/// Registry construction rules and the fallback camera used when the asset
/// carries no cameras (or fails to load).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Name that marks a discovered camera as primary (promoted to index 0)
    pub primary_name: String,
    /// Fallback camera position relative to the anchor
    pub fallback_offset: [f32; 3],
    /// Fallback vertical field of view in degrees
    pub fov_degrees: f32,
    /// Fallback near clipping plane
    pub near: f32,
    /// Fallback far clipping plane
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            primary_name: "Primary".to_string(),
            fallback_offset: [0.0, 2.0, 5.0],
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// # Transition Configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Duration of the positional move in seconds
    pub position_duration_secs: f32,
    /// Duration of the (possibly delayed) rotation in seconds
    pub rotation_duration_secs: f32,
    /// Fraction of the position duration before rotation begins (0 = simultaneous)
    pub rotation_delay_fraction: f32,
}

impl TransitionConfig {
    /// Longest accepted transition phase in seconds
    pub const MAX_DURATION_SECS: f32 = 3600.0;

    /// Position duration as a `Duration`
    pub fn position_duration(&self) -> Duration {
        checked_duration(self.position_duration_secs)
    }

    /// Rotation duration as a `Duration`
    pub fn rotation_duration(&self) -> Duration {
        checked_duration(self.rotation_duration_secs)
    }
}

/// Seconds to `Duration`, capped at `MAX_DURATION_SECS`; negative values become zero
fn checked_duration(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs.min(TransitionConfig::MAX_DURATION_SECS)).unwrap_or(Duration::ZERO)
}

fn validate_duration(name: &str, secs: f32) -> Result<(), ConfigError> {
    let in_range = secs > 0.0 && secs <= TransitionConfig::MAX_DURATION_SECS;
    if !in_range || Duration::try_from_secs_f32(secs).is_err() {
        return Err(ConfigError::Invalid(format!(
            "{name} must be within (0, {}], got {secs}",
            TransitionConfig::MAX_DURATION_SECS
        )));
    }
    Ok(())
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            position_duration_secs: 2.0,
            rotation_duration_secs: 1.0,
            rotation_delay_fraction: 0.5,
        }
    }
}

/// # Lighting Configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Add the default ambient/hemisphere/directional rig
    pub enabled: bool,
    /// Mark asset meshes as shadow casters and receivers
    pub shadows: bool,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self { enabled: true, shadows: true }
    }
}

/// # Complete Viewer Configuration
///
/// Top-level configuration that encompasses all viewer subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Window and tick source
    pub window: WindowConfig,
    /// Logging
    pub logging: LoggingConfig,
    /// Scene asset
    pub asset: AssetConfig,
    /// Camera registry rules
    pub cameras: CameraSettings,
    /// Camera transitions
    pub transition: TransitionConfig,
    /// Lighting
    pub lighting: LightingConfig,
}

impl ViewerConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.window.target_fps == 0 {
            return Err(ConfigError::Invalid("target_fps must be at least 1".to_string()));
        }

        let transition = &self.transition;
        validate_duration("position_duration_secs", transition.position_duration_secs)?;
        validate_duration("rotation_duration_secs", transition.rotation_duration_secs)?;
        if !(0.0..=1.0).contains(&transition.rotation_delay_fraction) {
            return Err(ConfigError::Invalid(format!(
                "rotation_delay_fraction must be within [0, 1], got {}",
                transition.rotation_delay_fraction
            )));
        }

        let cameras = &self.cameras;
        if !(cameras.fov_degrees > 0.0 && cameras.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "fov_degrees must be within (0, 180), got {}",
                cameras.fov_degrees
            )));
        }
        if !(cameras.near > 0.0 && cameras.near < cameras.far) {
            return Err(ConfigError::Invalid(format!(
                "clipping planes must satisfy 0 < near < far, got near={} far={}",
                cameras.near, cameras.far
            )));
        }

        Ok(())
    }
}

impl Config for ViewerConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ViewerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ViewerConfig = toml::from_str(
            r#"
            [transition]
            position_duration_secs = 3.5

            [asset]
            anchor = [1.0, 0.0, -2.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.transition.position_duration_secs, 3.5);
        assert_eq!(config.transition.rotation_delay_fraction, 0.5);
        assert_eq!(config.asset.anchor(), Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn test_validate_rejects_bad_delay_fraction() {
        let mut config = ViewerConfig::default();
        config.transition.rotation_delay_fraction = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_durations() {
        for secs in [1.0e20, f32::INFINITY, f32::NAN, 0.0, -1.0] {
            let mut config = ViewerConfig::default();
            config.transition.position_duration_secs = secs;
            assert!(config.validate().is_err(), "position {secs} accepted");

            let mut config = ViewerConfig::default();
            config.transition.rotation_duration_secs = secs;
            assert!(config.validate().is_err(), "rotation {secs} accepted");
        }

        let mut config = ViewerConfig::default();
        config.transition.position_duration_secs = TransitionConfig::MAX_DURATION_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duration_conversion_is_capped() {
        let transition = TransitionConfig {
            position_duration_secs: 1.0e20,
            rotation_duration_secs: -3.0,
            rotation_delay_fraction: 0.5,
        };
        assert_eq!(
            transition.position_duration(),
            Duration::from_secs_f32(TransitionConfig::MAX_DURATION_SECS)
        );
        assert_eq!(transition.rotation_duration(), Duration::ZERO);
    }

    #[test]
    fn test_validate_rejects_inverted_clip_planes() {
        let mut config = ViewerConfig::default();
        config.cameras.near = 10.0;
        config.cameras.far = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_through_ron_file() {
        let path = std::env::temp_dir().join(format!("scene_viewer_config_{}.ron", std::process::id()));
        let mut config = ViewerConfig::default();
        config.cameras.primary_name = "Overview".to_string();

        config.save_to_file(&path).unwrap();
        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.cameras.primary_name, "Overview");
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let path = std::env::temp_dir().join(format!("scene_viewer_config_{}.yaml", std::process::id()));
        std::fs::write(&path, "window: {}").unwrap();

        let result = ViewerConfig::load_from_file(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
