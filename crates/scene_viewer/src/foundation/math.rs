//! Math utilities and types
//!
//! Provides fundamental math types for 3D scene viewing, plus the easing and
//! interpolation helpers used by camera transitions.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

use nalgebra::{Isometry3, Translation3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Create a transform from glTF-style decomposed components
    pub fn from_decomposed(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        // glTF stores quaternions as [x, y, z, w]
        let quaternion = Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]);
        Self {
            position: Vec3::from(translation),
            rotation: Quat::new_normalize(quaternion),
            scale: Vec3::from(scale),
        }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Combine this transform with another (`self` is the parent)
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            position: self.position + self.rotation * (self.scale.component_mul(&other.position)),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Quat};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Shortest-arc spherical interpolation between two orientations
    ///
    /// Falls back to normalized linear interpolation when the two rotations
    /// are so close that the slerp denominator vanishes.
    pub fn slerp_shortest(from: &Quat, to: &Quat, t: f32) -> Quat {
        from.try_slerp(to, t, 1.0e-6).unwrap_or_else(|| {
            if from.coords.dot(&to.coords) < 0.0 {
                // Same rotation, opposite hemisphere: nlerp towards the flipped target
                let flipped = Quat::new_unchecked(-to.into_inner());
                from.nlerp(&flipped, t)
            } else {
                from.nlerp(to, t)
            }
        })
    }
}

/// Easing curves over normalized time
pub mod easing {
    /// Ease-in-out curve: quadratic acceleration, cubic deceleration
    ///
    /// `f(u) = 2u²` for `u < 0.5`, `1 - (-2u + 2)³ / 2` otherwise. Input is
    /// clamped to `[0, 1]`, so `f(0) = 0` and `f(1) = 1` exactly.
    pub fn ease_in_out(u: f32) -> f32 {
        let u = u.clamp(0.0, 1.0);
        if u < 0.5 {
            2.0 * u * u
        } else {
            1.0 - (-2.0 * u + 2.0).powi(3) / 2.0
        }
    }
}

/// Extension trait for Mat4 with camera matrix constructors
pub trait Mat4Ext {
    /// Create a right-handed perspective projection matrix
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a view matrix for an eye at `position` with orientation `rotation`
    ///
    /// The camera looks down its local -Z axis with +Y up.
    fn view_from_pose(position: &Vec3, rotation: &Quat) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn view_from_pose(position: &Vec3, rotation: &Quat) -> Mat4 {
        Isometry3::from_parts(Translation3::from(*position), *rotation)
            .inverse()
            .to_homogeneous()
    }
}

/// Orientation that makes a camera at `eye` look at `target`
///
/// Produces a rotation whose local -Z axis points from `eye` to `target`.
pub fn look_at_rotation(eye: &Vec3, target: &Vec3, up: &Vec3) -> Quat {
    let backward = eye - target;
    if backward.norm_squared() <= f32::EPSILON {
        return Quat::identity();
    }
    Quat::face_towards(&backward, up)
}
