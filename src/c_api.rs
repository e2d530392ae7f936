//! C ABI for an external display front end.
//!
//! The front end owns the window and the pixel buffer; it drives the core
//! once per displayed frame with `Advance`, `SortByDepth` and `Render`.

use std::ffi::{CStr, c_char};

use tracing::error;
use ultraviolet::Vec3;

use crate::{
    body::Body,
    camera::Camera,
    integrator::ExecutionMode,
    loader,
    render,
    scene::{Scene, default_lights},
    simulation::Simulation,
};

/// Loads a scene file with the stock camera and lights. Returns null on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Load(path: *const c_char) -> *mut Simulation {
    if path.is_null() {
        return std::ptr::null_mut();
    }
    let path = unsafe { CStr::from_ptr(path) }.to_string_lossy().into_owned();
    let scene = loader::load(&path)
        .and_then(|file| Scene::new(file.g, file.bodies, default_lights(), Camera::default()));
    match scene {
        Ok(scene) => Box::into_raw(Box::new(Simulation::new(scene))),
        Err(e) => {
            error!(%path, error = %e, "failed to load scene");
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Destroy(handle: *mut Simulation) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

/// Returns the number of mini-steps taken.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Advance(handle: *mut Simulation) -> usize {
    unsafe { handle.as_mut() }.map_or(0, |sim| sim.advance().mini_steps)
}

/// Returns the number of element shifts.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_SortByDepth(handle: *mut Simulation) -> usize {
    unsafe { handle.as_mut() }.map_or(0, |sim| sim.sort_by_depth())
}

/// Renders into `pixels`, which must hold `width * height * 3` floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Render(
    handle: *const Simulation,
    pixels: *mut f32,
    width: usize,
    height: usize,
) -> bool {
    let Some(sim) = (unsafe { handle.as_ref() }) else {
        return false;
    };
    if pixels.is_null() {
        return false;
    }
    let out = unsafe { std::slice::from_raw_parts_mut(pixels, width * height * 3) };
    render::render_into(
        &sim.scene.camera,
        sim.scene.active_bodies(),
        sim.scene.active_lights(),
        sim.settings,
        width,
        height,
        out,
    );
    true
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodyCount(handle: *const Simulation) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |sim| sim.scene.body_count())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodies(handle: *const Simulation) -> *const Body {
    unsafe { handle.as_ref() }.map_or(std::ptr::null(), |sim| sim.scene.bodies().as_ptr())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_SetActiveBodies(handle: *mut Simulation, n: usize) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.scene.set_active_bodies(n);
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_SetActiveLights(handle: *mut Simulation, n: usize) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.scene.set_active_lights(n);
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_MoveCamera(handle: *mut Simulation, dx: f32, dy: f32, dz: f32) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.scene.camera.translate(Vec3::new(dx, dy, dz));
    }
}

/// Returns false if the view direction cannot be rotated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_RotateCamera(handle: *mut Simulation, angle: f32) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|sim| sim.scene.camera.rotate(angle).is_ok())
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_SetParallel(handle: *mut Simulation, parallel: bool) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.set_mode(if parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Reference
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::io::Write;

    #[test]
    fn drives_a_loaded_scene_through_the_abi() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"1.0 2\n1 1 0 0 0 0 0 0 1 1 1 0\n1 1 0 10 0 0 0 0 1 0 0 0\n")
            .unwrap();
        let path = CString::new(file.path().to_str().unwrap()).unwrap();

        unsafe {
            let sim = Simulation_Load(path.as_ptr());
            assert!(!sim.is_null());
            assert_eq!(Simulation_GetBodyCount(sim), 2);
            assert!(Simulation_Advance(sim) >= 1);
            Simulation_SortByDepth(sim);
            Simulation_SetActiveBodies(sim, 1);
            Simulation_MoveCamera(sim, -1.0, 0.0, 0.0);
            assert!(Simulation_RotateCamera(sim, 0.1));

            let mut pixels = vec![0.0f32; 4 * 2 * 3];
            assert!(Simulation_Render(sim, pixels.as_mut_ptr(), 4, 2));
            assert!(pixels.iter().all(|c| (0.0..=1.0).contains(c)));

            let bodies = std::slice::from_raw_parts(Simulation_GetBodies(sim), 2);
            assert_eq!(bodies.len(), 2);
            Simulation_Destroy(sim);
        }
    }

    #[test]
    fn null_handles_are_ignored() {
        unsafe {
            assert!(Simulation_Load(std::ptr::null()).is_null());
            assert_eq!(Simulation_Advance(std::ptr::null_mut()), 0);
            assert_eq!(Simulation_GetBodyCount(std::ptr::null()), 0);
            assert!(!Simulation_Render(std::ptr::null(), std::ptr::null_mut(), 1, 1));
            Simulation_Destroy(std::ptr::null_mut());
        }
    }
}
