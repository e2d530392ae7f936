//! Run configuration loaded from YAML.
//!
//! Every field is optional; missing fields take the stock values:
//!
//! ```yaml
//! image:
//!   width: 512
//!   height: 256
//!
//! camera:
//!   eye: [800.0, 100.0, 0.0]
//!   view_direction: [-1.0, 0.0, 0.0]
//!
//! lights:
//!   - position: [0.0, 240.0, -100.0]
//!     intensity: [1.0, 1.0, 1.0]
//!
//! frame_time: 0.2          # omit for 1 / ln(body count)
//! hit_search: first_improving   # or "nearest"
//! execution: parallel      # or "reference"
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use ultraviolet::Vec3;

use crate::body::Light;
use crate::camera::Camera;
use crate::error::ConfigError;
use crate::integrator::{ExecutionMode, FrameTime};
use crate::render::{HitSearch, RenderSettings};
use crate::scene::default_lights;

/// Output image dimensions in pixels.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ImageConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 256,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub view_direction: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [800.0, 100.0, 0.0],
            view_direction: [-1.0, 0.0, 0.0],
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub intensity: [f32; 3],
}

/// Top-level run configuration.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub image: ImageConfig,
    pub camera: CameraConfig,
    pub lights: Vec<LightConfig>,
    /// Fixed simulated time per frame; `None` selects `1 / ln(N)`.
    pub frame_time: Option<f32>,
    pub hit_search: HitSearch,
    pub execution: ExecutionMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            image: ImageConfig::default(),
            camera: CameraConfig::default(),
            lights: default_lights()
                .into_iter()
                .map(|l| LightConfig {
                    position: [l.position.x, l.position.y, l.position.z],
                    intensity: [l.intensity.red, l.intensity.green, l.intensity.blue],
                })
                .collect(),
            frame_time: None,
            hit_search: HitSearch::default(),
            execution: ExecutionMode::default(),
        }
    }
}

impl RunConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: RunConfig = serde_yaml::from_reader(BufReader::new(file))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let cfg: RunConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ImageConfig { width, height } = self.image;
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyImage { width, height });
        }
        Ok(())
    }

    pub fn camera(&self) -> Result<Camera, ConfigError> {
        let [ex, ey, ez] = self.camera.eye;
        let [dx, dy, dz] = self.camera.view_direction;
        Ok(Camera::new(Vec3::new(ex, ey, ez), Vec3::new(dx, dy, dz))?)
    }

    pub fn lights(&self) -> Vec<Light> {
        self.lights
            .iter()
            .map(|l| {
                let [x, y, z] = l.position;
                Light::new(Vec3::new(x, y, z), l.intensity.into())
            })
            .collect()
    }

    pub fn frame_time(&self) -> FrameTime {
        self.frame_time.map_or(FrameTime::LogBodyCount, FrameTime::Fixed)
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            hit_search: self.hit_search,
            mode: self.execution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_stock_setup() {
        let cfg = RunConfig::from_yaml("{}").unwrap();
        assert_eq!(cfg, RunConfig::default());
        assert_eq!(cfg.lights(), default_lights());
        assert_eq!(cfg.camera().unwrap(), Camera::default());
        assert_eq!(cfg.frame_time(), FrameTime::LogBodyCount);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = RunConfig::from_yaml(
            "image:\n  width: 64\nframe_time: 0.25\nhit_search: nearest\nexecution: reference\n\
             lights:\n  - position: [1.0, 2.0, 3.0]\n    intensity: [0.5, 0.5, 0.5]\n",
        )
        .unwrap();
        assert_eq!(cfg.image, ImageConfig { width: 64, height: 256 });
        assert_eq!(cfg.frame_time(), FrameTime::Fixed(0.25));
        assert_eq!(
            cfg.render_settings(),
            RenderSettings {
                hit_search: HitSearch::Nearest,
                mode: ExecutionMode::Reference,
            }
        );
        assert_eq!(cfg.lights().len(), 1);
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        assert!(matches!(
            RunConfig::from_yaml("image: {width: 0, height: 4}"),
            Err(ConfigError::EmptyImage { .. })
        ));
    }

    #[test]
    fn vertical_camera_is_rejected() {
        let cfg = RunConfig::from_yaml("camera: {view_direction: [0.0, 0.0, 1.0]}").unwrap();
        assert!(matches!(cfg.camera(), Err(ConfigError::Scene(_))));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.yaml");
        std::fs::write(&path, "execution: reference\n").unwrap();
        assert_eq!(RunConfig::load(&path).unwrap().execution, ExecutionMode::Reference);
    }
}
