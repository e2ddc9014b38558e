//! # Perspective Projection
//!
//! Projection state of the live camera. The field of view and clipping planes
//! come from the authored cameras; the aspect ratio always comes from the
//! viewport.
//!
//! ## Design Principles
//! - **Viewport wins**: An asset-declared aspect ratio never overrides the surface's
//! - **Immediate**: Updates take effect on the next matrix request, there is no cache

use crate::camera::config::ProjectionParams;
use crate::foundation::math::{utils, Mat4, Mat4Ext};

/// Live perspective projection
///
/// # Coordinate System
/// Right-handed, Y-up view space with the camera looking down -Z. The matrix
/// maps depth to the OpenGL-style `[-1, 1]` clip range; backends that use a
/// different convention apply their own correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians
    pub fov_y: f32,

    /// Aspect ratio (width / height) of the viewport
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Projection {
    /// Create a projection from authored parameters and the viewport aspect
    ///
    /// # Arguments
    /// * `params` - Field of view and clipping planes (its own aspect is ignored)
    /// * `aspect` - Viewport aspect ratio (width / height)
    pub fn new(params: &ProjectionParams, aspect: f32) -> Self {
        Self {
            fov_y: params.fov_y,
            aspect,
            near: params.near,
            far: params.far,
        }
    }

    /// Adopt the field of view and clipping planes of another camera
    ///
    /// The viewport aspect ratio is preserved.
    pub fn adopt(&mut self, params: &ProjectionParams) {
        self.fov_y = params.fov_y;
        self.near = params.near;
        self.far = params.far;
        log::trace!(
            "Projection: fov {:.1} deg, near {}, far {}",
            utils::rad_to_deg(self.fov_y),
            self.near,
            self.far
        );
    }

    /// Update the aspect ratio for viewport changes
    ///
    /// Non-finite or non-positive ratios are ignored and reported as `false`.
    ///
    /// # Automatic Change Detection
    /// Only logs aspect ratio changes when the difference is significant
    /// (> 0.01) to reduce log noise during window resize events.
    pub fn set_aspect_ratio(&mut self, aspect: f32) -> bool {
        if !aspect.is_finite() || aspect <= 0.0 {
            log::warn!("Ignoring invalid aspect ratio {aspect}");
            return false;
        }

        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
        true
    }

    /// Generate the perspective projection matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov_y, self.aspect, self.near, self.far)
    }
}
