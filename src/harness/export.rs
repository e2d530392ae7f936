//! Frame dumps for comparing the optimized paths against the reference ones.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::HarnessError;
use crate::integrator::ExecutionMode;
use crate::render::{Frame, RenderSettings};
use crate::simulation::Simulation;

pub const RENDER_NEW: &str = "framesRenderNew.txt";
pub const RENDER_OLD: &str = "framesRenderOld.txt";
pub const SIM_NEW: &str = "framesSimNew.txt";
pub const SIM_OLD: &str = "framesSimOld.txt";

/// Which pair of dumps to produce or compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DumpKind {
    Render,
    Simulate,
}

impl DumpKind {
    /// `(optimized, reference)` file names.
    pub fn file_names(self) -> (&'static str, &'static str) {
        match self {
            DumpKind::Render => (RENDER_NEW, RENDER_OLD),
            DumpKind::Simulate => (SIM_NEW, SIM_OLD),
        }
    }
}

struct DumpWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl DumpWriter {
    fn create(path: PathBuf) -> Result<Self, HarnessError> {
        let file = File::create(&path).map_err(|source| HarnessError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
        })
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), HarnessError> {
        let mut write = || -> std::io::Result<()> {
            let mut first = true;
            for value in &frame.pixels {
                if !first {
                    self.out.write_all(b" ")?;
                }
                first = false;
                write!(self.out, "{value:.6}")?;
            }
            self.out.write_all(b"\n")
        };
        write().map_err(|source| HarnessError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn finish(mut self) -> Result<(), HarnessError> {
        self.out.flush().map_err(|source| HarnessError::Io {
            path: self.path,
            source,
        })
    }
}

/// Runs `frames` reference frames, rendering each with both the parallel and
/// the reference renderer.
pub fn export_render_frames(
    sim: &mut Simulation,
    frames: usize,
    (width, height): (usize, usize),
    dir: &Path,
) -> Result<(), HarnessError> {
    let (new_name, old_name) = DumpKind::Render.file_names();
    let mut new_out = DumpWriter::create(dir.join(new_name))?;
    let mut old_out = DumpWriter::create(dir.join(old_name))?;

    let original = sim.settings;
    let reference = with_mode(original, ExecutionMode::Reference);
    let parallel = with_mode(original, ExecutionMode::Parallel);
    let mut test = Frame::new(width, height);
    let mut refr = Frame::new(width, height);

    for n in 0..frames {
        sim.settings = reference;
        sim.advance();
        sim.sort_by_depth();

        sim.settings = parallel;
        sim.render(&mut test);
        sim.settings = reference;
        sim.render(&mut refr);

        new_out.write_frame(&test)?;
        old_out.write_frame(&refr)?;
        sim.frame += 1;
        info!(frame = n, "exported render frame");
    }

    sim.settings = original;
    new_out.finish()?;
    old_out.finish()
}

/// From one snapshot per frame, advances with the parallel integrator and with
/// the reference integrator, rendering both with the reference renderer.
/// The run continues from the reference result.
pub fn export_simulate_frames(
    sim: &mut Simulation,
    frames: usize,
    (width, height): (usize, usize),
    dir: &Path,
) -> Result<(), HarnessError> {
    let (new_name, old_name) = DumpKind::Simulate.file_names();
    let mut new_out = DumpWriter::create(dir.join(new_name))?;
    let mut old_out = DumpWriter::create(dir.join(old_name))?;

    let original = sim.settings;
    let reference = with_mode(original, ExecutionMode::Reference);
    let parallel = with_mode(original, ExecutionMode::Parallel);
    let mut test = Frame::new(width, height);
    let mut refr = Frame::new(width, height);

    for n in 0..frames {
        let snapshot = sim.scene.clone();

        sim.settings = parallel;
        sim.advance();
        sim.sort_by_depth();
        sim.settings = reference;
        sim.render(&mut test);

        sim.scene = snapshot;
        sim.advance();
        sim.sort_by_depth();
        sim.render(&mut refr);

        new_out.write_frame(&test)?;
        old_out.write_frame(&refr)?;
        sim.frame += 1;
        info!(frame = n, "exported simulate frame");
    }

    sim.settings = original;
    new_out.finish()?;
    old_out.finish()
}

fn with_mode(settings: RenderSettings, mode: ExecutionMode) -> RenderSettings {
    RenderSettings { mode, ..settings }
}
