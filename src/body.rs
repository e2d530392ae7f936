use ultraviolet::Vec3;

use crate::error::SceneError;
use crate::geometry::{Color, Widened};

/// Surface properties of a body.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Lambertian diffuse color.
    pub diffuse: Color,
    /// Loaded with the scene but not consulted by shading.
    pub reflection: f32,
}

impl Material {
    pub fn new(diffuse: Color, reflection: f32) -> Self {
        Self {
            diffuse,
            reflection,
        }
    }
}

/// A rigid sphere in the simulation.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Position vector.
    pub pos: Vec3,
    /// Velocity vector.
    pub vel: Vec3,
    /// Acceleration used for the last committed mini-step.
    pub acc: Vec3,
    /// Sphere radius, strictly positive.
    pub radius: f32,
    /// Mass, strictly positive.
    pub mass: f32,
    pub material: Material,
}

impl Body {
    /// Creates a new Body at rest with respect to acceleration.
    pub fn new(pos: Vec3, vel: Vec3, mass: f32, radius: f32, material: Material) -> Self {
        Self {
            pos,
            vel,
            acc: Vec3::zero(),
            radius,
            mass,
            material,
        }
    }

    /// Returns this body advanced by `dt` under acceleration `acc`.
    /// Semi-implicit Euler: velocity first, then position from the new velocity.
    #[inline]
    pub fn integrated(&self, acc: Vec3, dt: f32) -> Self {
        let vel = self.vel.wide_add(acc * dt);
        let pos = self.pos.wide_add(vel * dt);
        Self {
            pos,
            vel,
            acc,
            ..*self
        }
    }

    /// Rejects bodies that would produce infinite accelerations or empty spheres.
    /// NaN fails both checks.
    pub fn validate(&self, index: usize) -> Result<(), SceneError> {
        if !(self.mass > 0.0) {
            return Err(SceneError::NonPositiveMass {
                index,
                mass: self.mass,
            });
        }
        if !(self.radius > 0.0) {
            return Err(SceneError::NonPositiveRadius {
                index,
                radius: self.radius,
            });
        }
        Ok(())
    }
}

/// A point light.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub intensity: Color,
}

impl Light {
    pub fn new(position: Vec3, intensity: Color) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(mass: f32, radius: f32) -> Body {
        Body::new(
            Vec3::zero(),
            Vec3::zero(),
            mass,
            radius,
            Material::new(Color::new(1.0, 1.0, 1.0), 0.0),
        )
    }

    #[test]
    fn integrated_uses_updated_velocity_for_position() {
        let body = Body {
            vel: Vec3::new(1.0, 0.0, 0.0),
            ..plain(1.0, 1.0)
        };
        let next = body.integrated(Vec3::new(2.0, 0.0, 0.0), 0.5);
        assert_eq!(next.vel, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(next.pos, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(next.acc, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(next.mass, body.mass);
    }

    #[test]
    fn validate_rejects_zero_and_nan() {
        assert!(plain(1.0, 1.0).validate(0).is_ok());
        assert!(matches!(
            plain(0.0, 1.0).validate(3),
            Err(SceneError::NonPositiveMass { index: 3, .. })
        ));
        assert!(matches!(
            plain(f32::NAN, 1.0).validate(0),
            Err(SceneError::NonPositiveMass { .. })
        ));
        assert!(matches!(
            plain(1.0, -2.0).validate(1),
            Err(SceneError::NonPositiveRadius { index: 1, .. })
        ));
    }
}
