use crate::body::{Body, Material};
use crate::camera::Camera;
use crate::geometry::Color;
use crate::scene::{Scene, default_lights};
use ultraviolet::Vec3;

/// Gravitational constant used for generated scenes.
pub const GENERATED_G: f64 = 1.0;

/// Generates `n` bodies in a disc facing the default camera.
/// - Places a massive central body at the origin.
/// - Scatters the others uniformly by area in the y-z plane.
/// - Gives each a roughly circular orbital velocity about the x axis.
///
/// The same `seed` always produces the same bodies.
pub fn random_bodies(n: usize, seed: u64) -> Vec<Body> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let inner_radius = 40.0f32;
    let outer_radius = inner_radius + (n as f32).sqrt() * 12.0;

    let mut bodies: Vec<Body> = Vec::with_capacity(n);
    if n == 0 {
        return bodies;
    }

    let core = Material::new(Color::new(1.0, 0.85, 0.4), 0.0);
    bodies.push(Body::new(Vec3::zero(), Vec3::zero(), 1e4, inner_radius * 0.5, core));

    while bodies.len() < n {
        let a = rng.f32() * std::f32::consts::TAU;
        let (sin, cos) = a.sin_cos();

        // uniform area distribution between the two radii
        let t = inner_radius / outer_radius;
        let r = rng.f32() * (1.0 - t * t) + t * t;
        let pos = Vec3::new(0.0, cos, sin) * (outer_radius * r.sqrt());
        let vel = Vec3::new(0.0, sin, -cos);

        let radius = 1.0 + rng.f32() * 3.0;
        let mass = radius * radius * radius;
        let color = Color::new(0.2 + rng.f32() * 0.8, 0.2 + rng.f32() * 0.8, 0.2 + rng.f32() * 0.8);
        bodies.push(Body::new(pos, vel, mass, radius, Material::new(color, rng.f32())));
    }

    // closest to the center first, so enclosed mass accumulates outward
    bodies.sort_by(|a, b| a.pos.mag_sq().total_cmp(&b.pos.mag_sq()));

    let mut enclosed = 0.0f64;
    for body in bodies.iter_mut() {
        enclosed += body.mass as f64;
        let r = body.pos.mag();
        if r == 0.0 {
            continue;
        }
        // v = sqrt(GM / r)
        let speed = (GENERATED_G * enclosed / r as f64).sqrt() as f32;
        body.vel = body.vel * speed;
    }

    bodies
}

/// A complete scene around [`random_bodies`] with the stock camera and lights.
pub fn random_scene(n: usize, seed: u64) -> Scene {
    Scene::new(GENERATED_G, random_bodies(n, seed), default_lights(), Camera::default())
        .unwrap_or_else(|e| unreachable!("generated bodies are always valid: {e}"))
}
