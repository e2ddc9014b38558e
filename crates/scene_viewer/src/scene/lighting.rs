//! Lighting

use crate::assets::scene_asset::{LightKind, LightNode};
use crate::foundation::math::{Transform, Vec3};

/// Light types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightType {
    /// Uniform light from every direction
    Ambient,
    /// Sky/ground gradient light (sky color is the light color)
    Hemisphere {
        /// Color received by downward-facing surfaces
        ground_color: Vec3,
    },
    /// Directional light (like sunlight)
    Directional,
    /// Point light (like a lightbulb)
    Point,
    /// Spot light (like a flashlight)
    Spot {
        /// Inner cone angle in radians
        inner_cone_angle: f32,
        /// Outer cone angle in radians
        outer_cone_angle: f32,
    },
}

/// Shadow map parameters of a shadow-casting light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    /// Shadow map width and height in texels
    pub map_size: u32,
    /// Shadow camera near plane
    pub near: f32,
    /// Shadow camera far plane
    pub far: f32,
}

/// Light source in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Light type
    pub light_type: LightType,
    /// Light position (unused by ambient lights)
    pub position: Vec3,
    /// Light direction (for directional/spot lights)
    pub direction: Vec3,
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Light range (for point/spot lights), unlimited when absent
    pub range: Option<f32>,
    /// Shadow casting parameters
    pub shadow: Option<ShadowSettings>,
}

impl Light {
    /// Create an ambient light
    pub fn ambient(color: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Ambient,
            position: Vec3::zeros(),
            direction: Vec3::zeros(),
            color,
            intensity,
            range: None,
            shadow: None,
        }
    }

    /// Create a hemisphere light
    pub fn hemisphere(position: Vec3, sky_color: Vec3, ground_color: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Hemisphere { ground_color },
            position,
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: sky_color,
            intensity,
            range: None,
            shadow: None,
        }
    }

    /// Create a directional light shining from `position` towards the origin
    pub fn directional_from(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Directional,
            position,
            direction: (-position).normalize(),
            color,
            intensity,
            range: None,
            shadow: None,
        }
    }

    /// Builder pattern: cast shadows
    pub fn with_shadow(mut self, shadow: ShadowSettings) -> Self {
        self.shadow = Some(shadow);
        self
    }

    /// World-space light for a punctual light node
    ///
    /// Directional and spot lights shine along the node's local -Z.
    pub fn from_node(node: &LightNode, world: &Transform) -> Self {
        let light_type = match node.kind {
            LightKind::Directional => LightType::Directional,
            LightKind::Point => LightType::Point,
            LightKind::Spot {
                inner_cone_angle,
                outer_cone_angle,
            } => LightType::Spot {
                inner_cone_angle,
                outer_cone_angle,
            },
        };

        Self {
            light_type,
            position: world.position,
            direction: world.rotation * Vec3::new(0.0, 0.0, -1.0),
            color: Vec3::from(node.color),
            intensity: node.intensity,
            range: node.range,
            shadow: None,
        }
    }
}

/// Lights that exist independently of any loaded asset
#[derive(Debug, Clone, Default)]
pub struct LightingEnvironment {
    /// List of lights
    pub lights: Vec<Light>,
}

impl LightingEnvironment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a light to the environment
    pub fn add_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    /// Viewer light rig: ambient fill, sky/ground hemisphere, and a shadowed key light
    pub fn viewer_default() -> Self {
        let white = Vec3::new(1.0, 1.0, 1.0);
        // 0x666666
        let ground = Vec3::new(0.4, 0.4, 0.4);

        Self::new()
            .add_light(Light::ambient(white, 1.2))
            .add_light(Light::hemisphere(Vec3::new(0.0, 20.0, 0.0), white, ground, 0.8))
            .add_light(
                Light::directional_from(Vec3::new(5.0, 10.0, 7.0), white, 1.5).with_shadow(ShadowSettings {
                    map_size: 2048,
                    near: 0.5,
                    far: 50.0,
                }),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;

    #[test]
    fn test_viewer_default_rig() {
        let environment = LightingEnvironment::viewer_default();
        assert_eq!(environment.lights.len(), 3);

        let key = environment.lights[2];
        assert_eq!(key.light_type, LightType::Directional);
        assert_eq!(key.intensity, 1.5);
        assert_eq!(key.shadow.map(|shadow| shadow.map_size), Some(2048));
        assert_relative_eq!(key.direction, -Vec3::new(5.0, 10.0, 7.0).normalize());

        assert!(environment.lights.iter().filter(|light| light.shadow.is_some()).count() == 1);
    }

    #[test]
    fn test_spot_node_points_down_rotated_negative_z() {
        let node = LightNode {
            kind: LightKind::Spot {
                inner_cone_angle: 0.2,
                outer_cone_angle: 0.4,
            },
            color: [1.0, 0.5, 0.25],
            intensity: 10.0,
            range: Some(8.0),
        };
        let world = Transform::from_position_rotation(
            Vec3::new(0.0, 3.0, 0.0),
            Quat::from_axis_angle(&Vec3::x_axis(), -std::f32::consts::FRAC_PI_2),
        );

        let light = Light::from_node(&node, &world);
        assert_relative_eq!(light.direction, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
        assert_eq!(light.position, Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(light.range, Some(8.0));
    }
}
