use tracing::debug;

use crate::integrator::{self, ExecutionMode, FrameTime, StepReport};
use crate::render::{self, Frame, RenderSettings};
use crate::scene::Scene;
use crate::sort;

/// Owns a scene and drives the per-frame pipeline: advance, depth sort, render.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub scene: Scene,
    /// Simulated time per frame.
    pub frame_time: FrameTime,
    pub settings: RenderSettings,
    /// Current frame count.
    pub frame: usize,
}

impl Simulation {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            frame_time: FrameTime::default(),
            settings: RenderSettings::default(),
            frame: 0,
        }
    }

    pub fn with_settings(scene: Scene, frame_time: FrameTime, settings: RenderSettings) -> Self {
        Self {
            scene,
            frame_time,
            settings,
            frame: 0,
        }
    }

    /// Sets the execution mode for both physics and rendering.
    pub fn set_mode(&mut self, mode: ExecutionMode) {
        self.settings.mode = mode;
    }

    /// Advances every body by one frame's worth of simulated time.
    pub fn advance(&mut self) -> StepReport {
        let dt = self.frame_time.for_bodies(self.scene.body_count());
        let g = self.scene.g;
        let report = integrator::advance(self.scene.buffers_mut(), g, dt, self.settings.mode);
        debug!(
            frame = self.frame,
            dt,
            mini_steps = report.mini_steps,
            collisions = report.collisions,
            "advanced"
        );
        report
    }

    /// Reorders the active bodies front-to-back from the camera.
    pub fn sort_by_depth(&mut self) -> usize {
        let eye = self.scene.camera.eye;
        let count = self.scene.active_body_count();
        sort::sort_by_depth(self.scene.buffers_mut(), count, eye)
    }

    /// Renders the active bodies and lights into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        render::render(
            &self.scene.camera,
            self.scene.active_bodies(),
            self.scene.active_lights(),
            self.settings,
            frame,
        );
    }

    /// Runs one full frame: advance, sort, render.
    pub fn step(&mut self, frame: &mut Frame) -> StepReport {
        let report = self.advance();
        self.sort_by_depth();
        self.render(frame);
        self.frame += 1;
        report
    }
}
