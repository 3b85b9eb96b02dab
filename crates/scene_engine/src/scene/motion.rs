//! Procedural motion
//!
//! An entity on an [`EllipticalOrbit`] circles `center` in the XZ plane:
//!
//! ```text
//! position(θ) = center + (a·cos θ, 0, b·sin θ)
//! heading(θ)  = normalize(−a·sin θ, 0, b·cos θ)
//! yaw(θ)      = degrees(atan2(heading.x, heading.z))
//! ```
//!
//! `a` is the semi-major (X) extent and `b` the semi-minor (Z) extent. The
//! yaw turns the model's +Z forward axis onto the direction of travel.

use crate::foundation::math::{constants, utils, Vec3};

/// Motion state of a scene entity
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Motion {
    /// Transform only changes when set explicitly
    #[default]
    Static,
    /// Transform is derived from an orbit every update
    Kinematic(EllipticalOrbit),
}

impl Motion {
    /// The orbit, for kinematic entities
    pub fn orbit(&self) -> Option<&EllipticalOrbit> {
        match self {
            Self::Static => None,
            Self::Kinematic(orbit) => Some(orbit),
        }
    }

    /// True for kinematic entities
    pub fn is_kinematic(&self) -> bool {
        matches!(self, Self::Kinematic(_))
    }
}

/// Closed elliptical path in the XZ plane
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticalOrbit {
    phase: f32,
    angular_speed: f32,
    semi_major: f32,
    semi_minor: f32,
    center: Vec3,
    yaw_deg: f32,
}

impl Default for EllipticalOrbit {
    fn default() -> Self {
        Self::new(0.5, 1.0, 2.0, Vec3::new(0.0, 1.5, 0.0))
    }
}

impl EllipticalOrbit {
    /// Orbit starting at phase zero
    pub fn new(angular_speed: f32, semi_major: f32, semi_minor: f32, center: Vec3) -> Self {
        let mut orbit = Self {
            phase: 0.0,
            angular_speed,
            semi_major,
            semi_minor,
            center,
            yaw_deg: 0.0,
        };
        orbit.refresh_yaw();
        orbit
    }

    /// Start somewhere else on the path; `phase` is wrapped into `[0, 2π)`
    #[must_use]
    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = utils::wrap_angle(phase);
        self.refresh_yaw();
        self
    }

    /// Advance the phase by `angular_speed * dt`.
    ///
    /// Zero and negative `dt` are accepted; non-finite `dt` is ignored.
    pub fn advance(&mut self, dt: f32) {
        let step = self.angular_speed * dt;
        if !step.is_finite() {
            log::warn!("Ignoring non-finite orbit step (dt = {dt})");
            return;
        }
        self.phase = utils::wrap_angle(self.phase + step);
        self.refresh_yaw();
    }

    fn refresh_yaw(&mut self) {
        // degenerate paths keep the last yaw
        if let Some(heading) = self.heading() {
            self.yaw_deg = utils::rad_to_deg(heading.x.atan2(heading.z));
        }
    }

    /// Current point on the path
    pub fn position(&self) -> Vec3 {
        let (sin, cos) = self.phase.sin_cos();
        self.center + Vec3::new(self.semi_major * cos, 0.0, self.semi_minor * sin)
    }

    /// Unit direction of travel, `None` when both semi-axes are zero
    pub fn heading(&self) -> Option<Vec3> {
        let (sin, cos) = self.phase.sin_cos();
        Vec3::new(-self.semi_major * sin, 0.0, self.semi_minor * cos).try_normalize(f32::EPSILON)
    }

    /// Rotation about Y, in degrees, facing the direction of travel
    pub fn yaw_degrees(&self) -> f32 {
        self.yaw_deg
    }

    /// Current phase in `[0, 2π)`
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Angular speed in radians per second
    pub fn angular_speed(&self) -> f32 {
        self.angular_speed
    }

    /// Semi-axis along X
    pub fn semi_major(&self) -> f32 {
        self.semi_major
    }

    /// Semi-axis along Z
    pub fn semi_minor(&self) -> f32 {
        self.semi_minor
    }

    /// Center of the ellipse
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Seconds per lap, `None` for a stationary orbit
    pub fn period(&self) -> Option<f32> {
        (self.angular_speed != 0.0).then(|| constants::TAU / self.angular_speed.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::TAU;
    use approx::assert_relative_eq;

    #[test]
    fn test_start_of_orbit() {
        let orbit = EllipticalOrbit::default();
        assert_relative_eq!(orbit.position(), Vec3::new(1.0, 1.5, 0.0));
        // heading is +Z at θ = 0, so no yaw
        assert_relative_eq!(orbit.heading().unwrap(), Vec3::z());
        assert_relative_eq!(orbit.yaw_degrees(), 0.0);
    }

    #[test]
    fn test_quarter_lap() {
        let mut orbit = EllipticalOrbit::default();
        orbit.advance(TAU / 4.0 / 0.5);

        assert_relative_eq!(orbit.position(), Vec3::new(0.0, 1.5, 2.0), epsilon = 1e-5);
        assert_relative_eq!(orbit.heading().unwrap(), -Vec3::x(), epsilon = 1e-5);
        assert_relative_eq!(orbit.yaw_degrees(), -90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_phase_stays_in_range() {
        let mut orbit = EllipticalOrbit::new(3.0, 1.0, 1.0, Vec3::zeros());
        for dt in [0.0, 1.7, -4.2, 100.0, -0.001, 1e-7] {
            orbit.advance(dt);
            assert!((0.0..TAU).contains(&orbit.phase()), "phase {} after dt {dt}", orbit.phase());
        }
    }

    #[test]
    fn test_non_finite_dt_is_ignored() {
        let mut orbit = EllipticalOrbit::default().with_phase(1.0);
        orbit.advance(f32::NAN);
        orbit.advance(f32::INFINITY);
        assert_relative_eq!(orbit.phase(), 1.0);
    }

    #[test]
    fn test_degenerate_orbit_keeps_yaw() {
        let mut orbit = EllipticalOrbit::new(1.0, 0.0, 0.0, Vec3::new(2.0, 0.0, 0.0));
        assert!(orbit.heading().is_none());
        orbit.advance(0.3);
        assert!(orbit.yaw_degrees().is_finite());
        assert_relative_eq!(orbit.position(), Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_period() {
        assert_relative_eq!(EllipticalOrbit::default().period().unwrap(), TAU / 0.5);
        assert!(EllipticalOrbit::new(0.0, 1.0, 1.0, Vec3::zeros()).period().is_none());
    }
}
