//! Vector, color and ray primitives shared by the integrator and the renderer.
//!
//! Vectors are stored as `f32`, but every sum, difference and accumulated
//! product goes through `f64` before being rounded back. Results are only
//! reproducible frame-to-frame if that rounding happens in exactly these places.

use ultraviolet::Vec3;

/// Widened `f32` vector arithmetic.
pub trait Widened {
    /// Component-wise sum, added in `f64`.
    fn wide_add(self, other: Vec3) -> Vec3;
    /// Component-wise difference, subtracted in `f64`.
    fn wide_sub(self, other: Vec3) -> Vec3;
    /// Dot product. Products are taken in `f32`, summed in `f64`.
    fn wide_dot(self, other: Vec3) -> f32;
    /// Cross product. Products are taken in `f32`, differenced in `f64`.
    fn wide_cross(self, other: Vec3) -> Vec3;
    /// Euclidean length.
    fn wide_mag(self) -> f32;
    /// Euclidean distance, computed entirely in `f64` before rounding.
    fn wide_dist(self, other: Vec3) -> f32;
}

impl Widened for Vec3 {
    #[inline]
    fn wide_add(self, other: Vec3) -> Vec3 {
        Vec3::new(
            (self.x as f64 + other.x as f64) as f32,
            (self.y as f64 + other.y as f64) as f32,
            (self.z as f64 + other.z as f64) as f32,
        )
    }

    #[inline]
    fn wide_sub(self, other: Vec3) -> Vec3 {
        Vec3::new(
            (self.x as f64 - other.x as f64) as f32,
            (self.y as f64 - other.y as f64) as f32,
            (self.z as f64 - other.z as f64) as f32,
        )
    }

    #[inline]
    fn wide_dot(self, other: Vec3) -> f32 {
        let x = self.x * other.x;
        let y = self.y * other.y;
        let z = self.z * other.z;
        (x as f64 + y as f64 + z as f64) as f32
    }

    #[inline]
    fn wide_cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            ((self.y * other.z) as f64 - (self.z * other.y) as f64) as f32,
            ((self.z * other.x) as f64 - (self.x * other.z) as f64) as f32,
            ((self.x * other.y) as f64 - (self.y * other.x) as f64) as f32,
        )
    }

    #[inline]
    fn wide_mag(self) -> f32 {
        let sum = self.wide_dot(self);
        (sum as f64).sqrt() as f32
    }

    #[inline]
    fn wide_dist(self, other: Vec3) -> f32 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        let dz = self.z as f64 - other.z as f64;
        let sq = (dx * dx + dy * dy + dz * dz) as f32;
        (sq as f64).sqrt() as f32
    }
}

/// Returns `true` if every component is exactly zero.
#[inline]
pub fn is_zero(v: Vec3) -> bool {
    v.x == 0.0 && v.y == 0.0 && v.z == 0.0
}

/// An RGB triple. Inputs may exceed 1; rendered pixels are clamped.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }
}

impl From<[f32; 3]> for Color {
    fn from([red, green, blue]: [f32; 3]) -> Self {
        Self::new(red, green, blue)
    }
}

/// A half-line with a unit-length direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    /// Point reached after travelling `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin.wide_add(self.dir * t)
    }
}
