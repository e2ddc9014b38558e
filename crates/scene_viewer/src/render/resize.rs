//! Viewport resize handling

use thiserror::Error;

use crate::camera::controller::CameraController;
use crate::render::backend::RenderBackend;

/// Resize errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResizeError {
    /// Width or height is zero (e.g. a minimized window)
    #[error("degenerate viewport {width}x{height}")]
    DegenerateViewport {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
}

/// Applies viewport changes to the live projection and the render surface
///
/// Never touches the transition state: a resize in the middle of a camera
/// move only changes the projection the move is seen through.
pub struct ResizeAdapter;

impl ResizeAdapter {
    /// Set the aspect ratio to exactly `width / height` and resize the surface
    ///
    /// Zero-area viewports are rejected and leave projection and surface
    /// untouched, so no NaN or infinite aspect ratio can reach the projection.
    pub fn on_resize(
        width: u32,
        height: u32,
        controller: &mut CameraController,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), ResizeError> {
        if width == 0 || height == 0 {
            log::warn!("Ignoring resize to degenerate viewport {width}x{height}");
            return Err(ResizeError::DegenerateViewport { width, height });
        }

        controller.projection_mut().set_aspect_ratio(width as f32 / height as f32);
        backend.resize_surface(width, height);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::registry::CameraRegistry;
    use crate::core::config::{CameraSettings, TransitionConfig};
    use crate::render::headless::HeadlessBackend;

    fn controller() -> CameraController {
        CameraController::new(
            CameraRegistry::fallback(&CameraSettings::default()),
            &TransitionConfig::default(),
            16.0 / 9.0,
        )
    }

    #[test]
    fn test_aspect_is_exact_ratio() {
        let mut controller = controller();
        let mut backend = HeadlessBackend::new(1280, 720);

        for (width, height) in [(800, 600), (1, 1), (3840, 1), (1, 2160), (1366, 768), (7, 3)] {
            ResizeAdapter::on_resize(width, height, &mut controller, &mut backend).unwrap();
            assert_eq!(controller.projection().aspect, width as f32 / height as f32);
            assert_eq!(backend.surface_extent(), (width, height));
        }
    }

    #[test]
    fn test_zero_area_is_rejected() {
        let mut controller = controller();
        let mut backend = HeadlessBackend::new(1280, 720);

        assert_eq!(
            ResizeAdapter::on_resize(0, 720, &mut controller, &mut backend),
            Err(ResizeError::DegenerateViewport { width: 0, height: 720 })
        );
        assert!(ResizeAdapter::on_resize(1280, 0, &mut controller, &mut backend).is_err());

        assert_eq!(controller.projection().aspect, 16.0 / 9.0);
        assert!(controller.projection().matrix().iter().all(|value| value.is_finite()));
        assert_eq!(backend.surface_extent(), (1280, 720));
    }
}
