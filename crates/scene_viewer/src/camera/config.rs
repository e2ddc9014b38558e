//! Camera configurations
//!
//! A camera configuration is an authored viewpoint: a pose plus the
//! projection parameters the asset declared for it.

use crate::core::config::CameraSettings;
use crate::foundation::math::{look_at_rotation, utils, Quat, Transform, Vec3};

/// Position and orientation of a camera in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Eye position
    pub position: Vec3,
    /// Orientation (the camera looks down its local -Z)
    pub rotation: Quat,
}

impl CameraPose {
    /// Create a pose
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `eye` oriented towards `target`
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            position: eye,
            rotation: look_at_rotation(&eye, &target, &Vec3::y()),
        }
    }

    /// Pose of a world transform (scale is ignored)
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
        }
    }
}

/// Authored projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Aspect ratio declared by the asset (the viewport always overrides it)
    pub aspect: Option<f32>,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl ProjectionParams {
    /// Projection parameters of the configured fallback camera
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            fov_y: utils::deg_to_rad(settings.fov_degrees),
            aspect: None,
            near: settings.near,
            far: settings.far,
        }
    }
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

/// One authored viewpoint
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    /// Authored name, if any
    pub name: Option<String>,
    /// World pose
    pub pose: CameraPose,
    /// Projection parameters
    pub projection: ProjectionParams,
}

impl CameraConfig {
    /// Create an unnamed camera
    pub fn new(pose: CameraPose, projection: ProjectionParams) -> Self {
        Self {
            name: None,
            pose,
            projection,
        }
    }

    /// Builder pattern: set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Copy of this camera moved by `offset`
    pub fn translated(&self, offset: &Vec3) -> Self {
        let mut moved = self.clone();
        moved.pose.position += offset;
        moved
    }

    /// Display label: the name, or `#index` for unnamed cameras
    pub fn label(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{index}"))
    }
}
