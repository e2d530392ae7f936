//! Pixel-wise comparison of frame dumps, with optional heatmaps.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::HarnessError;

/// Difference statistics for one frame. Each pixel's difference is the mean
/// absolute difference of its three channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub average: f32,
    pub max: f32,
    pub min: f32,
    pub std_dev: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiffReport {
    pub frames: Vec<FrameStats>,
}

impl DiffReport {
    /// Every frame matched exactly.
    pub fn passed(&self) -> bool {
        self.frames.iter().all(|f| f.max == 0.0)
    }

    pub fn last(&self) -> Option<&FrameStats> {
        self.frames.last()
    }
}

/// Per-pixel differences between two RGB buffers, plus their statistics.
pub fn compare_frames(actual: &[f32], expected: &[f32]) -> (FrameStats, Vec<f32>) {
    let heat: Vec<f32> = actual
        .chunks_exact(3)
        .zip(expected.chunks_exact(3))
        .map(|(a, e)| ((a[0] - e[0]).abs() + (a[1] - e[1]).abs() + (a[2] - e[2]).abs()) / 3.0)
        .collect();

    let n = heat.len().max(1) as f64;
    let (mut sum, mut sum_sq) = (0.0f64, 0.0f64);
    let (mut max, mut min) = (0.0f32, f32::INFINITY);
    for &d in &heat {
        sum += d as f64;
        sum_sq += d as f64 * d as f64;
        max = max.max(d);
        min = min.min(d);
    }
    if heat.is_empty() {
        min = 0.0;
    }

    let variance = ((sum_sq - sum * sum / n) / n).max(0.0);
    let stats = FrameStats {
        average: (sum / n) as f32,
        max,
        min,
        std_dev: variance.sqrt() as f32,
    };
    (stats, heat)
}

/// Writes per-pixel differences as a grayscale image (white = 1.0 difference).
pub fn save_heatmap(
    heat: &[f32],
    (width, height): (usize, usize),
    path: &Path,
) -> Result<(), HarnessError> {
    let img = image::GrayImage::from_fn(width as u32, height as u32, |x, y| {
        let flipped = height - 1 - y as usize;
        let d = heat[x as usize + flipped * width];
        image::Luma([(d.clamp(0.0, 1.0) * 255.0).round() as u8])
    });
    img.save(path)?;
    Ok(())
}

struct DumpReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl DumpReader {
    fn open(path: &Path) -> Result<Self, HarnessError> {
        let file = File::open(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
        })
    }

    fn next_frame(&mut self, frame: usize) -> Result<Option<Vec<f32>>, HarnessError> {
        let Some(line) = self.lines.next() else {
            return Ok(None);
        };
        let line = line.map_err(|source| HarnessError::Io {
            path: self.path.clone(),
            source,
        })?;
        line.split_whitespace()
            .map(|tok| {
                tok.parse::<f32>().map_err(|_| HarnessError::Parse {
                    path: self.path.clone(),
                    frame,
                    token: tok.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Compares two dumps frame by frame until either runs out.
///
/// With `heatmap_dir`, writes `heatmap_<frame>.png` for every frame.
pub fn diff_dumps(
    actual_path: &Path,
    expected_path: &Path,
    size: (usize, usize),
    heatmap_dir: Option<&Path>,
) -> Result<DiffReport, HarnessError> {
    let mut actual_in = DumpReader::open(actual_path)?;
    let mut expected_in = DumpReader::open(expected_path)?;
    let mut report = DiffReport::default();

    for frame in 0.. {
        let (Some(actual), Some(expected)) =
            (actual_in.next_frame(frame)?, expected_in.next_frame(frame)?)
        else {
            break;
        };
        if actual.len() != expected.len() {
            return Err(HarnessError::LengthMismatch {
                frame,
                left: actual.len(),
                right: expected.len(),
            });
        }

        let (stats, heat) = compare_frames(&actual, &expected);
        info!(
            frame,
            average = stats.average,
            max = stats.max,
            std_dev = stats.std_dev,
            "compared frame"
        );

        if let Some(dir) = heatmap_dir {
            if heat.len() == size.0 * size.1 {
                save_heatmap(&heat, size, &dir.join(format!("heatmap_{frame:04}.png")))?;
            } else {
                warn!(frame, pixels = heat.len(), "frame size does not match, skipping heatmap");
            }
        }
        report.frames.push(stats);
    }

    Ok(report)
}
