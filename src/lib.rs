pub mod body;
pub mod buffer;
pub mod c_api;
pub mod camera;
pub mod collision;
pub mod config;
pub mod error;
pub mod geometry;
pub mod harness;
pub mod integrator;
pub mod loader;
pub mod render;
pub mod scene;
pub mod simulation;
pub mod sort;
pub mod utils;

pub use body::{Body, Light, Material};
pub use buffer::DoubleBuffer;
pub use camera::Camera;
pub use config::RunConfig;
pub use error::{ConfigError, HarnessError, SceneError};
pub use geometry::{Color, Ray, Widened};
pub use integrator::{ExecutionMode, FrameTime, StepReport};
pub use render::{Frame, HitSearch, RenderSettings};
pub use scene::Scene;
pub use simulation::Simulation;
pub use ultraviolet::Vec3;
