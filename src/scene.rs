//! The simulation context: bodies, lights and camera.
//!
//! Every core operation takes a [`Scene`] (or parts of it) explicitly.

use ultraviolet::Vec3;

use crate::body::{Body, Light};
use crate::buffer::DoubleBuffer;
use crate::camera::Camera;
use crate::error::SceneError;
use crate::geometry::Color;

/// Maximum number of lights the interactive controls cycle through.
pub const MAX_LIGHTS: usize = 3;

/// The three lights of the stock scene.
pub fn default_lights() -> Vec<Light> {
    vec![
        Light::new(Vec3::new(0.0, 240.0, -100.0), Color::new(1.0, 1.0, 1.0)),
        Light::new(Vec3::new(3200.0, 3000.0, -1000.0), Color::new(0.6, 0.7, 1.0)),
        Light::new(Vec3::new(600.0, 0.0, -100.0), Color::new(0.3, 0.5, 1.0)),
    ]
}

#[derive(Clone, Debug)]
pub struct Scene {
    /// Gravitational constant.
    pub g: f64,
    pub camera: Camera,
    bodies: DoubleBuffer<Body>,
    lights: Vec<Light>,
    active_bodies: usize,
    active_lights: usize,
}

impl Scene {
    /// Builds a scene, failing fast on bodies with non-positive mass or radius.
    /// All bodies and lights start active.
    pub fn new(
        g: f64,
        bodies: Vec<Body>,
        lights: Vec<Light>,
        camera: Camera,
    ) -> Result<Self, SceneError> {
        for (index, body) in bodies.iter().enumerate() {
            body.validate(index)?;
        }
        let active_bodies = bodies.len();
        let active_lights = lights.len();
        Ok(Self {
            g,
            camera,
            bodies: DoubleBuffer::new(bodies),
            lights,
            active_bodies,
            active_lights,
        })
    }

    /// Number of simulated bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// All committed bodies.
    pub fn bodies(&self) -> &[Body] {
        self.bodies.current()
    }

    /// The committed bodies that are sorted and rendered.
    pub fn active_bodies(&self) -> &[Body] {
        &self.bodies.current()[..self.active_bodies]
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn active_lights(&self) -> &[Light] {
        &self.lights[..self.active_lights]
    }

    pub fn active_body_count(&self) -> usize {
        self.active_bodies
    }

    pub fn active_light_count(&self) -> usize {
        self.active_lights
    }

    /// Sets how many bodies are rendered, clamped to `[1, body_count]`.
    /// The physics keeps advancing every body regardless.
    pub fn set_active_bodies(&mut self, n: usize) {
        self.active_bodies = clamp_count(n, self.bodies.len());
    }

    /// Sets how many lights contribute to shading, clamped to `[1, light_count]`.
    pub fn set_active_lights(&mut self, n: usize) {
        self.active_lights = clamp_count(n, self.lights.len());
    }

    pub fn buffers(&self) -> &DoubleBuffer<Body> {
        &self.bodies
    }

    pub fn buffers_mut(&mut self) -> &mut DoubleBuffer<Body> {
        &mut self.bodies
    }
}

fn clamp_count(n: usize, len: usize) -> usize {
    n.clamp(len.min(1), len)
}
