use ultraviolet::Vec3;

use crate::error::SceneError;
use crate::geometry::{Widened, is_zero};

/// World up axis used to derive the horizontal basis vector.
#[inline]
pub fn up() -> Vec3 {
    Vec3::new(0.0, 0.0, 1.0)
}

/// Radians turned by one rotation step of the interactive controls.
pub const ROTATE_STEP: f32 = 0.1;

/// Pinhole camera: eye position plus an orthonormal basis.
///
/// `w` follows the view direction, `u` is horizontal (`up × w`) and `v = w × u`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub view_direction: Vec3,
    pub w: Vec3,
    pub u: Vec3,
    pub v: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(800.0, 100.0, 0.0),
            view_direction: Vec3::new(-1.0, 0.0, 0.0),
            w: Vec3::new(-1.0, 0.0, 0.0),
            u: Vec3::new(0.0, -1.0, 0.0),
            v: Vec3::new(0.0, 0.0, 1.0),
        }
    }
}

impl Camera {
    pub fn new(eye: Vec3, view_direction: Vec3) -> Result<Self, SceneError> {
        let (w, u, v) = basis(view_direction).ok_or(SceneError::DegenerateView)?;
        Ok(Self {
            eye,
            view_direction,
            w,
            u,
            v,
        })
    }

    /// Moves the eye without changing the view direction.
    pub fn translate(&mut self, delta: Vec3) {
        self.eye = self.eye.wide_add(delta);
    }

    /// Turns the view direction about the up axis by `angle` radians.
    /// The vertical component of the view direction is kept as is.
    pub fn rotate(&mut self, angle: f32) -> Result<(), SceneError> {
        let d = self.view_direction;
        if d.x == 0.0 && d.y == 0.0 {
            return Err(SceneError::DegenerateView);
        }
        let heading = d.y.atan2(d.x) + angle;
        let direction = Vec3::new(heading.cos(), heading.sin(), d.z);
        *self = Self::new(self.eye, direction)?;
        Ok(())
    }
}

fn basis(view_direction: Vec3) -> Option<(Vec3, Vec3, Vec3)> {
    let len = view_direction.wide_mag();
    if len == 0.0 {
        return None;
    }
    let w = view_direction * (1.0 / len);
    let side = up().wide_cross(w);
    let side_len = side.wide_mag();
    if is_zero(side) || side_len == 0.0 {
        return None;
    }
    let u = side * (1.0 / side_len);
    let v = w.wide_cross(u);
    Some((w, u, v))
}
