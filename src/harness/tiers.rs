//! Tiered performance test.
//!
//! Each tier renders three full frames of an N×N image; a tier passes when
//! those frames finish under the tier timeout. Tiers are searched linearly
//! (tolerating a few failures) and then by bisection up to the highest tier.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::camera::Camera;
use crate::error::HarnessError;
use crate::integrator::ExecutionMode;
use crate::loader;
use crate::render::{Frame, RenderSettings};
use crate::scene::{Scene, default_lights};
use crate::simulation::Simulation;
use crate::utils::random_scene;

pub const MAX_TIER: usize = 80;
/// Frames timed per tier.
pub const FRAMES_PER_TIER: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct TierPlan {
    pub tier_timeout: Duration,
    pub total_timeout: Duration,
    pub start_size: usize,
    pub growth: f64,
    pub start_tier: usize,
    pub highest_tier: usize,
    pub linear_tiers: usize,
    pub blowthroughs: u32,
    /// Directory holding `tier<k>.txt` scene files.
    pub tier_dir: PathBuf,
    pub mode: ExecutionMode,
}

impl Default for TierPlan {
    fn default() -> Self {
        Self {
            tier_timeout: Duration::from_millis(2000),
            total_timeout: Duration::from_millis(58000),
            start_size: 512,
            growth: 1.08,
            start_tier: 0,
            highest_tier: MAX_TIER,
            linear_tiers: MAX_TIER,
            blowthroughs: 2,
            tier_dir: PathBuf::from("tiers"),
            mode: ExecutionMode::Parallel,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierResult {
    pub tier: usize,
    pub size: usize,
    pub bodies: usize,
    pub elapsed: Duration,
    pub passed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TierOutcome {
    pub results: Vec<TierResult>,
    /// Highest tier that passed, if any.
    pub highest_pass: Option<usize>,
    /// The overall timeout cut the search short.
    pub timed_out: bool,
}

/// Image sizes by tier: every two tiers the size grows by `growth`, rounded up
/// to a multiple of 64.
pub fn tier_sizes(start: usize, growth: f64) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(MAX_TIER + 2);
    let mut n = start;
    while sizes.len() <= MAX_TIER {
        sizes.push(n);
        sizes.push(n);
        n = ((n as f64 * growth / 64.0).ceil() as usize) * 64;
    }
    sizes
}

/// Body count used when no scene file exists for `tier`.
pub fn generated_body_count(tier: usize) -> usize {
    16 + 8 * tier
}

fn tier_scene(dir: &Path, tier: usize) -> Result<Scene, HarnessError> {
    let path = dir.join(format!("tier{tier}.txt"));
    if path.exists() {
        let file = loader::load(&path)?;
        return Ok(Scene::new(file.g, file.bodies, default_lights(), Camera::default())?);
    }
    Ok(random_scene(generated_body_count(tier), tier as u64))
}

/// Times [`FRAMES_PER_TIER`] full frames of `scene` at `size`×`size`.
pub fn timed_eval(scene: Scene, size: usize, mode: ExecutionMode) -> Duration {
    let settings = RenderSettings {
        mode,
        ..RenderSettings::default()
    };
    let mut sim = Simulation::with_settings(scene, Default::default(), settings);
    let mut frame = Frame::new(size, size);
    let start = Instant::now();
    for _ in 0..FRAMES_PER_TIER {
        sim.step(&mut frame);
    }
    start.elapsed()
}

struct Runner<'a> {
    plan: &'a TierPlan,
    sizes: Vec<usize>,
    started: Instant,
    outcome: TierOutcome,
}

impl Runner<'_> {
    fn out_of_time(&mut self) -> bool {
        if self.started.elapsed() >= self.plan.total_timeout {
            if !self.outcome.timed_out {
                warn!(timeout = ?self.plan.total_timeout, "overall timeout reached");
            }
            self.outcome.timed_out = true;
        }
        self.outcome.timed_out
    }

    fn run_tier(&mut self, tier: usize) -> Result<bool, HarnessError> {
        let size = self.sizes[tier];
        let scene = tier_scene(&self.plan.tier_dir, tier)?;
        let bodies = scene.body_count();
        let elapsed = timed_eval(scene, size, self.plan.mode);
        let passed = elapsed < self.plan.tier_timeout;
        info!(tier, size, bodies, elapsed_ms = elapsed.as_millis() as u64, passed, "tier finished");
        self.outcome.results.push(TierResult {
            tier,
            size,
            bodies,
            elapsed,
            passed,
        });
        Ok(passed)
    }
}

/// Runs the linear-then-binary tier search described by `plan`.
pub fn run_tiers(plan: &TierPlan) -> Result<TierOutcome, HarnessError> {
    let highest = plan.highest_tier.min(MAX_TIER);
    let mut runner = Runner {
        plan,
        sizes: tier_sizes(plan.start_size, plan.growth),
        started: Instant::now(),
        outcome: TierOutcome::default(),
    };

    let linear_cutoff = (plan.start_tier + plan.linear_tiers).min(highest);
    let mut blowthroughs = plan.blowthroughs;
    let mut highest_pass: Option<usize> = None;

    info!(from = plan.start_tier, to = linear_cutoff, "linear search");
    for tier in plan.start_tier..=linear_cutoff {
        if runner.out_of_time() {
            break;
        }
        if runner.run_tier(tier)? {
            highest_pass = Some(tier);
        } else if blowthroughs > 0 && tier != linear_cutoff {
            blowthroughs -= 1;
            info!(remaining = blowthroughs, "blowing through failure");
        } else {
            break;
        }
    }

    if highest_pass == Some(linear_cutoff) && !runner.outcome.timed_out {
        let mut lowest_fail = highest + 1;
        let mut pass = linear_cutoff;
        if lowest_fail - pass > 1 {
            info!(from = pass, to = lowest_fail - 1, "binary search");
        }
        while lowest_fail - pass > 1 && !runner.out_of_time() {
            let tier = (lowest_fail + pass) / 2;
            if runner.run_tier(tier)? {
                pass = tier;
            } else {
                lowest_fail = tier;
            }
        }
        highest_pass = Some(pass);
    }

    runner.outcome.highest_pass = highest_pass;
    Ok(runner.outcome)
}
