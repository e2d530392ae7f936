use std::path::PathBuf;

use thiserror::Error;

/// Reasons a scene cannot be built or loaded.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: cannot parse `{token}` as {expected}")]
    Parse {
        line: usize,
        token: String,
        expected: &'static str,
    },
    #[error("scene ended early: expected {expected} values, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("body {index} has non-positive mass {mass}")]
    NonPositiveMass { index: usize, mass: f32 },
    #[error("body {index} has non-positive radius {radius}")]
    NonPositiveRadius { index: usize, radius: f32 },
    #[error("camera view direction is zero or parallel to the up axis")]
    DegenerateView,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("image size {width}x{height} must be non-zero")]
    EmptyImage { width: usize, height: usize },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Failures of the export / diff / tier tooling.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}, frame {frame}: cannot parse `{token}`")]
    Parse {
        path: PathBuf,
        frame: usize,
        token: String,
    },
    #[error("frame {frame}: dumps hold {left} and {right} values")]
    LengthMismatch {
        frame: usize,
        left: usize,
        right: usize,
    },
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}
