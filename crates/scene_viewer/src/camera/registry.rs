//! Ordered set of authored viewpoints

use crate::camera::config::{CameraConfig, CameraPose, ProjectionParams};
use crate::core::config::CameraSettings;
use crate::foundation::math::Vec3;

/// Camera registry
///
/// Never empty. Index 0 is the primary camera: the first discovered camera
/// whose name equals the configured primary name, or the first discovered
/// camera otherwise. Remaining cameras keep their discovery order.
#[derive(Debug, Clone)]
pub struct CameraRegistry {
    cameras: Vec<CameraConfig>,
}

impl CameraRegistry {
    /// Build the registry from cameras discovered in an asset
    ///
    /// With no discovered cameras the registry holds a single fallback
    /// camera at `settings.fallback_offset`, looking at the origin.
    pub fn build(discovered: Vec<CameraConfig>, settings: &CameraSettings) -> Self {
        if discovered.is_empty() {
            log::info!("No cameras found in scene, using fallback camera");
            return Self::fallback(settings);
        }

        let mut cameras = discovered;
        if let Some(primary) = cameras
            .iter()
            .position(|camera| camera.name.as_deref() == Some(settings.primary_name.as_str()))
        {
            if primary != 0 {
                let camera = cameras.remove(primary);
                cameras.insert(0, camera);
            }
        }

        log::info!(
            "Camera registry built with {} camera(s), primary: {}",
            cameras.len(),
            cameras[0].label(0)
        );
        for (index, camera) in cameras.iter().enumerate() {
            log::debug!("  [{index}] {} at {:?}", camera.label(index), camera.pose.position);
        }

        Self { cameras }
    }

    /// Registry holding only the fallback camera
    pub fn fallback(settings: &CameraSettings) -> Self {
        let eye = Vec3::from(settings.fallback_offset);
        let camera = CameraConfig::new(
            CameraPose::looking_at(eye, Vec3::zeros()),
            ProjectionParams::from_settings(settings),
        )
        .with_name("Fallback");

        Self { cameras: vec![camera] }
    }

    /// Number of cameras (at least 1)
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Camera at `index`
    pub fn get(&self, index: usize) -> Option<&CameraConfig> {
        self.cameras.get(index)
    }

    /// The primary camera
    pub fn primary(&self) -> &CameraConfig {
        &self.cameras[0]
    }

    /// All cameras in registry order
    pub fn cameras(&self) -> &[CameraConfig] {
        &self.cameras
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;

    fn camera(name: Option<&str>, x: f32) -> CameraConfig {
        let config = CameraConfig::new(
            CameraPose::new(Vec3::new(x, 0.0, 0.0), Quat::identity()),
            ProjectionParams::default(),
        );
        match name {
            Some(name) => config.with_name(name),
            None => config,
        }
    }

    #[test]
    fn test_empty_discovery_yields_fallback() {
        let settings = CameraSettings::default();
        let registry = CameraRegistry::build(Vec::new(), &settings);

        assert_eq!(registry.len(), 1);
        assert_relative_eq!(registry.primary().pose.position, Vec3::new(0.0, 2.0, 5.0));

        let forward = registry.primary().pose.rotation * Vec3::new(0.0, 0.0, -1.0);
        let expected = (Vec3::zeros() - Vec3::new(0.0, 2.0, 5.0)).normalize();
        assert_relative_eq!(forward, expected, epsilon = 1e-5);
    }

    #[test]
    fn test_primary_name_is_promoted() {
        let settings = CameraSettings::default();
        let registry = CameraRegistry::build(
            vec![camera(Some("Side"), 1.0), camera(None, 2.0), camera(Some("Primary"), 3.0)],
            &settings,
        );

        let names: Vec<_> = registry.cameras().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec![Some("Primary".to_string()), Some("Side".to_string()), None]);
    }

    #[test]
    fn test_discovery_order_kept_without_primary() {
        let settings = CameraSettings::default();
        let registry = CameraRegistry::build(vec![camera(Some("B"), 1.0), camera(Some("A"), 2.0)], &settings);

        assert_eq!(registry.primary().name.as_deref(), Some("B"));
        assert_eq!(registry.get(1).and_then(|c| c.name.as_deref()), Some("A"));
        assert!(registry.get(2).is_none());
    }

    #[test]
    fn test_primary_match_is_case_sensitive() {
        let settings = CameraSettings::default();
        let registry = CameraRegistry::build(vec![camera(Some("Side"), 1.0), camera(Some("primary"), 2.0)], &settings);
        assert_eq!(registry.primary().name.as_deref(), Some("Side"));
    }
}
