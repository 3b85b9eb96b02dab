//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the handful of angle helpers the scene
//! layer needs. Matrices follow OpenGL conventions (right-handed, Y-up,
//! clip-space depth in [-1, 1]).

pub use nalgebra::{Matrix4, Unit, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = std::f32::consts::TAU;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Wrap an angle in radians into `[0, 2π)`.
    ///
    /// Works for any finite input, including large negative values.
    pub fn wrap_angle(radians: f32) -> f32 {
        let wrapped = radians.rem_euclid(constants::TAU);
        // rem_euclid rounds tiny negative inputs up to exactly TAU
        if wrapped >= constants::TAU {
            0.0
        } else {
            wrapped
        }
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Rotation about the X axis, angle in degrees
    fn rotation_x_deg(degrees: f32) -> Mat4;

    /// Rotation about the Y axis, angle in degrees
    fn rotation_y_deg(degrees: f32) -> Mat4;

    /// Rotation about the Z axis, angle in degrees
    fn rotation_z_deg(degrees: f32) -> Mat4;

    /// Right-handed perspective projection, vertical field of view in degrees
    fn perspective_deg(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x_deg(degrees: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), utils::deg_to_rad(degrees))
    }

    fn rotation_y_deg(degrees: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), utils::deg_to_rad(degrees))
    }

    fn rotation_z_deg(degrees: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), utils::deg_to_rad(degrees))
    }

    fn perspective_deg(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, utils::deg_to_rad(fov_y_degrees), near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }
}
