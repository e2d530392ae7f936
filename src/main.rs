use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use nbody_raytracer::harness::diff::diff_dumps;
use nbody_raytracer::harness::export::{DumpKind, export_render_frames, export_simulate_frames};
use nbody_raytracer::harness::tiers::{TierPlan, run_tiers};
use nbody_raytracer::harness::{FRAME_HEIGHT, FRAME_WIDTH};
use nbody_raytracer::{ExecutionMode, Frame, RunConfig, Scene, Simulation, loader};

const DEFAULT_SCENE: &str = "simulations/250.txt";

#[derive(Parser, Debug)]
#[command(name = "nbody-raytracer")]
#[command(about = "Colliding gravitating spheres, ray traced every frame")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate and render frames headlessly
    Run {
        /// Scene file
        #[arg(short = 'f', long, default_value = DEFAULT_SCENE)]
        file: PathBuf,
        /// Number of frames
        #[arg(short = 'n', long, default_value_t = 10)]
        frames: usize,
        /// YAML run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the configured execution mode
        #[arg(long)]
        mode: Option<Mode>,
        /// Save the last frame as a PNG
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write frame dumps of the optimized and reference paths
    Export {
        #[arg(short = 'f', long, default_value = DEFAULT_SCENE)]
        file: PathBuf,
        #[arg(short = 'n', long, default_value_t = 10)]
        frames: usize,
        /// Directory for the dump files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Compare dumps written by `export`
    Diff {
        #[arg(value_enum)]
        kind: Kind,
        /// Directory holding the dump files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Write per-frame heatmaps into this directory
        #[arg(long)]
        heatmap: Option<PathBuf>,
    },
    /// Run the tiered performance test
    Tiers {
        /// Directory holding tier<k>.txt scenes
        #[arg(long, default_value = "tiers")]
        tier_dir: PathBuf,
        #[arg(long, default_value_t = 0)]
        start_tier: usize,
        #[arg(long)]
        highest_tier: Option<usize>,
        #[arg(long)]
        mode: Option<Mode>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    Reference,
    Parallel,
}

impl From<Mode> for ExecutionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Reference => ExecutionMode::Reference,
            Mode::Parallel => ExecutionMode::Parallel,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Render,
    Simulate,
}

impl From<Kind> for DumpKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Render => DumpKind::Render,
            Kind::Simulate => DumpKind::Simulate,
        }
    }
}

const PASS: &str = "\x1b[0;32mPASS\x1b[0m";
const FAIL: &str = "\x1b[0;31mFAIL\x1b[0m";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    match args.command {
        Command::Run {
            file,
            frames,
            config,
            mode,
            output,
        } => run(&file, frames, config.as_deref(), mode, output.as_deref()),
        Command::Export { file, frames, dir } => export(&file, frames, &dir),
        Command::Diff { kind, dir, heatmap } => diff(kind.into(), &dir, heatmap.as_deref()),
        Command::Tiers {
            tier_dir,
            start_tier,
            highest_tier,
            mode,
        } => tiers(tier_dir, start_tier, highest_tier, mode),
    }
}

fn load_simulation(file: &Path, cfg: &RunConfig) -> Result<Simulation> {
    let scene_file = loader::load(file)
        .with_context(|| format!("failed to load scene {}", file.display()))?;
    let scene = Scene::new(scene_file.g, scene_file.bodies, cfg.lights(), cfg.camera()?)?;
    Ok(Simulation::with_settings(
        scene,
        cfg.frame_time(),
        cfg.render_settings(),
    ))
}

fn run(
    file: &Path,
    frames: usize,
    config: Option<&Path>,
    mode: Option<Mode>,
    output: Option<&Path>,
) -> Result<()> {
    let cfg = match config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let mut sim = load_simulation(file, &cfg)?;
    if let Some(mode) = mode {
        sim.set_mode(mode.into());
    }

    let mut frame = Frame::new(cfg.image.width, cfg.image.height);
    let start = Instant::now();
    for _ in 0..frames {
        sim.step(&mut frame);
    }
    let elapsed = start.elapsed();

    if let Some(path) = output {
        frame
            .save_png(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "saved last frame");
    }

    println!(
        "Num spheres: {}\nImg size: {}x{}\nNum frames: {}\n\
         ---- RESULTS ----\nTime elapsed: {} ms\n---- END RESULTS ----",
        sim.scene.body_count(),
        cfg.image.height,
        cfg.image.width,
        frames,
        elapsed.as_millis()
    );
    Ok(())
}

fn export(file: &Path, frames: usize, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let cfg = RunConfig::default();
    let size = (FRAME_WIDTH, FRAME_HEIGHT);

    let mut sim = load_simulation(file, &cfg)?;
    export_render_frames(&mut sim, frames, size, dir)?;

    let mut sim = load_simulation(file, &cfg)?;
    export_simulate_frames(&mut sim, frames, size, dir)?;
    Ok(())
}

fn diff(kind: DumpKind, dir: &Path, heatmap: Option<&Path>) -> Result<()> {
    if let Some(heatmap) = heatmap {
        std::fs::create_dir_all(heatmap)?;
    }
    let (new_name, old_name) = kind.file_names();
    let report = diff_dumps(
        &dir.join(new_name),
        &dir.join(old_name),
        (FRAME_WIDTH, FRAME_HEIGHT),
        heatmap,
    )?;
    let Some(last) = report.last() else {
        bail!("no frames found in {} / {}", new_name, old_name);
    };

    println!("Frames compared: {}", report.frames.len());
    println!("Average difference: {:.6}", last.average);
    println!("Maximum difference: {:.6}", last.max);
    println!("Minimum difference: {:.6}", last.min);
    println!("Standard deviation: {:.6}\n", last.std_dev);
    if report.passed() {
        println!("{PASS}\tYay! Correctness test passed.");
    } else {
        println!("{FAIL}\tCorrectness failed:(");
    }
    Ok(())
}

fn tiers(
    tier_dir: PathBuf,
    start_tier: usize,
    highest_tier: Option<usize>,
    mode: Option<Mode>,
) -> Result<()> {
    let defaults = TierPlan::default();
    let plan = TierPlan {
        tier_dir,
        start_tier,
        highest_tier: highest_tier.unwrap_or(defaults.highest_tier),
        mode: mode.map_or(defaults.mode, Into::into),
        ..defaults
    };

    let celebrations = ["yay", "woot", "boyah", "skrrt", "ayy", "yeee", "eoo"];
    let outcome = run_tiers(&plan)?;
    for r in &outcome.results {
        if r.passed {
            let cheer = celebrations[fastrand::usize(..celebrations.len())];
            println!(
                "{PASS} ({cheer}!):\tTier {} :\tRan {}x{}\timage with {} bodies in {} ms",
                r.tier,
                r.size,
                r.size,
                r.bodies,
                r.elapsed.as_millis()
            );
        } else {
            println!(
                "{FAIL} (timeout):\tTier {} :\tRan {}x{}\timage with {} bodies in {} ms \
                 but the cutoff is {} ms",
                r.tier,
                r.size,
                r.size,
                r.bodies,
                r.elapsed.as_millis(),
                plan.tier_timeout.as_millis()
            );
        }
    }
    if outcome.timed_out {
        println!("End execution due to {} s timeout", plan.total_timeout.as_secs());
    }

    match outcome.highest_pass {
        None => println!("{FAIL}: too slow for any tiers"),
        Some(tier) => {
            println!("Result: reached tier {tier}");
            if tier == plan.highest_tier {
                println!("You reached the highest tier you specified!");
            }
        }
    }
    Ok(())
}
