//! One-ray-per-pixel ray tracer with Lambertian shading.
//!
//! No shadows, reflections or refraction: a pixel is the sum over lights of
//! `diffuse * intensity * cos(theta)` at the first hit, clamped to 1.

use std::path::Path;

use rayon::prelude::*;
use serde::Deserialize;
use ultraviolet::Vec3;

use crate::body::{Body, Light};
use crate::camera::Camera;
use crate::geometry::{Ray, Widened};
use crate::integrator::ExecutionMode;

/// Starting "infinite" distance for the hit search.
pub const FAR: f32 = 20000.0;

/// How the per-pixel search picks among intersected bodies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitSearch {
    /// Stop at the first body, in depth-sorted order, whose hit beats the
    /// running best. Fast, and exact whenever camera distance order matches hit
    /// order along the ray.
    #[default]
    FirstImproving,
    /// Scan every body and keep the true nearest hit.
    Nearest,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSettings {
    pub hit_search: HitSearch,
    pub mode: ExecutionMode,
}

/// Row-major RGB float image.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<f32>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0.0; width * height * 3],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        let i = (x + y * self.width) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// Quantizes to 8-bit RGB with row 0 at the bottom, as the frame is drawn.
    pub fn to_rgb8(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let flipped = self.height - 1 - y as usize;
            let [r, g, b] = self.pixel(x as usize, flipped);
            image::Rgb([quantize(r), quantize(g), quantize(b)])
        })
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.to_rgb8().save(path)
    }
}

fn quantize(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Primary ray through pixel `(x, y)`.
///
/// The image plane passes through the world origin, spanned by `u` and `v` with
/// one unit per pixel; the ray runs from the eye through the pixel's point on
/// that plane. Returns `None` if the eye sits on the plane point.
pub fn eye_ray(camera: &Camera, width: usize, height: usize, x: usize, y: usize) -> Option<Ray> {
    let us = -((width / 2) as f32) + x as f32;
    let vs = -((height / 2) as f32) + y as f32;
    let on_plane = (camera.u * us).wide_add(camera.v * vs);
    let dir = on_plane.wide_sub(camera.eye);
    let len = dir.wide_mag();
    if len == 0.0 {
        return None;
    }
    Some(Ray::new(camera.eye, dir * (1.0 / len)))
}

/// Ray-sphere test. If the nearer root is positive and below `*t`, stores it in
/// `t` and returns `true`.
pub fn intersect(ray: &Ray, body: &Body, t: &mut f32) -> bool {
    let dist = ray.origin.wide_sub(body.pos);
    let a = ray.dir.wide_dot(ray.dir);
    let b = 2.0 * ray.dir.wide_dot(dist);
    let c = (dist.wide_dot(dist) as f64 - (body.radius * body.radius) as f64) as f32;
    let discr = ((b * b) as f64 - (4.0 * a * c) as f64) as f32;
    if discr < 0.0 {
        return false;
    }

    let root = discr.sqrt();
    let sol1 = ((-b) as f64 + root as f64) as f32 / 2.0;
    let sol2 = ((-b) as f64 - root as f64) as f32 / 2.0;
    let new_t = sol1.min(sol2);
    if new_t > 0.0 && new_t < *t {
        *t = new_t;
        return true;
    }
    false
}

/// Index of the hit body and distance along the ray.
pub fn find_hit(ray: &Ray, bodies: &[Body], search: HitSearch) -> Option<(usize, f32)> {
    let mut t = FAR;
    let mut hit = None;
    for (i, body) in bodies.iter().enumerate() {
        if intersect(ray, body, &mut t) {
            hit = Some(i);
            if search == HitSearch::FirstImproving {
                break;
            }
        }
    }
    hit.map(|i| (i, t))
}

/// Lambertian color of `body` at distance `t` along `ray`.
pub fn shade(ray: &Ray, t: f32, body: &Body, lights: &[Light]) -> [f32; 3] {
    let point = ray.at(t);
    let normal = point.wide_sub(body.pos);
    let len = normal.wide_mag();
    if len == 0.0 {
        return [0.0; 3];
    }
    let normal = normal * (1.0 / len);
    let diffuse = body.material.diffuse;

    let (mut red, mut green, mut blue) = (0.0f64, 0.0f64, 0.0f64);
    for light in lights {
        let to_light = light.position.wide_sub(point);
        if normal.wide_dot(to_light) <= 0.0 {
            continue;
        }
        let dir = to_light * (1.0 / to_light.wide_mag());
        let lambert = dir.wide_dot(normal);
        red += (light.intensity.red * diffuse.red * lambert) as f64;
        green += (light.intensity.green * diffuse.green * lambert) as f64;
        blue += (light.intensity.blue * diffuse.blue * lambert) as f64;
    }

    [
        (red as f32).min(1.0),
        (green as f32).min(1.0),
        (blue as f32).min(1.0),
    ]
}

/// Color of pixel `(x, y)`; background is black.
pub fn trace_pixel(
    camera: &Camera,
    bodies: &[Body],
    lights: &[Light],
    search: HitSearch,
    (width, height): (usize, usize),
    (x, y): (usize, usize),
) -> [f32; 3] {
    let Some(ray) = eye_ray(camera, width, height, x, y) else {
        return [0.0; 3];
    };
    match find_hit(&ray, bodies, search) {
        Some((i, t)) => shade(&ray, t, &bodies[i], lights),
        None => [0.0; 3],
    }
}

/// Renders `bodies` lit by `lights` into `frame`.
pub fn render(
    camera: &Camera,
    bodies: &[Body],
    lights: &[Light],
    settings: RenderSettings,
    frame: &mut Frame,
) {
    render_into(
        camera,
        bodies,
        lights,
        settings,
        frame.width,
        frame.height,
        &mut frame.pixels,
    );
}

/// Renders into a caller-owned `width * height * 3` buffer.
pub fn render_into(
    camera: &Camera,
    bodies: &[Body],
    lights: &[Light],
    settings: RenderSettings,
    width: usize,
    height: usize,
    pixels: &mut [f32],
) {
    debug_assert_eq!(pixels.len(), width * height * 3);
    if width == 0 {
        return;
    }
    let size = (width, height);
    let search = settings.hit_search;
    let fill_row = |y: usize, row: &mut [f32]| {
        for (x, out) in row.chunks_exact_mut(3).enumerate() {
            out.copy_from_slice(&trace_pixel(camera, bodies, lights, search, size, (x, y)));
        }
    };

    match settings.mode {
        ExecutionMode::Reference => {
            for (y, row) in pixels.chunks_exact_mut(width * 3).enumerate() {
                fill_row(y, row);
            }
        }
        ExecutionMode::Parallel => {
            pixels
                .par_chunks_exact_mut(width * 3)
                .enumerate()
                .for_each(|(y, row)| fill_row(y, row));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Material;
    use crate::geometry::Color;
    use approx::assert_relative_eq;

    const W: usize = 8;
    const H: usize = 4;

    fn ball(x: f32, radius: f32, diffuse: Color) -> Body {
        Body::new(
            Vec3::new(x, 0.0, 0.0),
            Vec3::zero(),
            1.0,
            radius,
            Material::new(diffuse, 0.9),
        )
    }

    fn axis_camera() -> Camera {
        Camera::new(Vec3::new(800.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)).unwrap()
    }

    fn front_light(intensity: Color) -> Light {
        Light::new(Vec3::new(1000.0, 0.0, 0.0), intensity)
    }

    #[test]
    fn center_ray_points_at_origin() {
        let ray = eye_ray(&axis_camera(), W, H, W / 2, H / 2).unwrap();
        assert_eq!(ray.dir, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(ray.origin, Vec3::new(800.0, 0.0, 0.0));
    }

    #[test]
    fn intersect_takes_near_root_only_if_closer() {
        let ray = eye_ray(&axis_camera(), W, H, W / 2, H / 2).unwrap();
        let body = ball(0.0, 1.0, Color::BLACK);
        let mut t = FAR;
        assert!(intersect(&ray, &body, &mut t));
        assert_eq!(t, 799.0);
        let mut t = 10.0;
        assert!(!intersect(&ray, &body, &mut t));
        assert_eq!(t, 10.0);
    }

    #[test]
    fn head_on_light_gives_diffuse_times_intensity() {
        let body = ball(0.0, 1.0, Color::new(0.5, 0.25, 1.0));
        let light = front_light(Color::new(1.0, 1.0, 0.5));
        let mut frame = Frame::new(W, H);
        render(&axis_camera(), &[body], &[light], RenderSettings::default(), &mut frame);
        let [r, g, b] = frame.pixel(W / 2, H / 2);
        assert_relative_eq!(r, 0.5);
        assert_relative_eq!(g, 0.25);
        assert_relative_eq!(b, 0.5);
    }

    #[test]
    fn accumulated_light_is_clamped() {
        let body = ball(0.0, 1.0, Color::new(1.0, 0.4, 1.0));
        let white = Color::new(1.0, 1.0, 1.0);
        let lights = [front_light(white), front_light(white)];
        let ray = eye_ray(&axis_camera(), W, H, W / 2, H / 2).unwrap();
        let [r, g, b] = shade(&ray, 799.0, &body, &lights);
        assert_eq!(r, 1.0);
        assert_relative_eq!(g, 0.8);
        assert_eq!(b, 1.0);
    }

    #[test]
    fn miss_is_background() {
        let body = ball(0.0, 1.0, Color::new(1.0, 1.0, 1.0));
        let mut frame = Frame::new(W, H);
        render(
            &axis_camera(),
            &[body],
            &[front_light(Color::new(1.0, 1.0, 1.0))],
            RenderSettings::default(),
            &mut frame,
        );
        assert_eq!(frame.pixel(0, 0), [0.0; 3]);
    }

    #[test]
    fn light_behind_surface_contributes_nothing() {
        let body = ball(0.0, 1.0, Color::new(1.0, 1.0, 1.0));
        let behind = Light::new(Vec3::new(-1000.0, 0.0, 0.0), Color::new(1.0, 1.0, 1.0));
        let ray = eye_ray(&axis_camera(), W, H, W / 2, H / 2).unwrap();
        assert_eq!(shade(&ray, 799.0, &body, &[behind]), [0.0; 3]);
    }

    #[test]
    fn first_improving_trusts_list_order() {
        // the far body is listed first, so the early exit stops on it
        let far = ball(-100.0, 1.0, Color::new(1.0, 0.0, 0.0));
        let near = ball(0.0, 1.0, Color::new(0.0, 1.0, 0.0));
        let bodies = [far, near];
        let ray = eye_ray(&axis_camera(), W, H, W / 2, H / 2).unwrap();

        let (i, _) = find_hit(&ray, &bodies, HitSearch::FirstImproving).unwrap();
        assert_eq!(i, 0);
        let (i, t) = find_hit(&ray, &bodies, HitSearch::Nearest).unwrap();
        assert_eq!(i, 1);
        assert_eq!(t, 799.0);
    }

    #[test]
    fn eye_inside_sphere_sees_nothing() {
        let body = ball(800.0, 5.0, Color::new(1.0, 1.0, 1.0));
        let ray = eye_ray(&axis_camera(), W, H, W / 2, H / 2).unwrap();
        assert_eq!(find_hit(&ray, &[body], HitSearch::Nearest), None);
    }

    #[test]
    fn png_rows_are_flipped() {
        let mut frame = Frame::new(2, 2);
        frame.pixels[0..3].copy_from_slice(&[1.0, 0.0, 0.0]);
        let img = frame.to_rgb8();
        assert_eq!(img.get_pixel(0, 1).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
    }
}
