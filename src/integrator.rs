//! Adaptive sub-stepping integrator with continuous collision detection.
//!
//! A frame's time budget is split into mini-steps, each ending at the earliest
//! predicted contact. Every mini-step runs the same phases in order, each one
//! completing for all bodies before the next starts:
//!
//! 1. pairwise gravitational accelerations from the committed state,
//! 2. tentative semi-implicit Euler over the whole remaining window,
//! 3. a scan of every pair for the earliest contact along the chord from each
//!    body's committed position to its tentative one,
//! 4. integration over exactly the chosen mini-step, shortened by bisection
//!    while any pair that started clear would end up overlapping, then commit,
//! 5. an elastic impulse for the contacting pair, if its surfaces meet.
//!
//! Under gravity the integrated paths curve away from the chord, so the scan
//! alone can stop early (the pair is still apart and gets no impulse) or late
//! (phase 4 pulls the step back to the last clear instant).
//!
//! [`ExecutionMode::Reference`] runs each phase as plain loops;
//! [`ExecutionMode::Parallel`] splits them with rayon and produces bit-identical
//! results, since every per-body sum keeps its sequential order and the pair
//! searches break ties on the lowest pair index.

use rayon::prelude::*;
use serde::Deserialize;
use tracing::trace;
use ultraviolet::Vec3;

use crate::body::Body;
use crate::buffer::{DoubleBuffer, Scratch};
use crate::collision::{self, Contact};
use crate::geometry::Widened;

/// Remaining time below which a frame is considered finished.
pub const TIME_EPSILON: f64 = 1e-6;

/// How the per-frame loops are executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Straight sequential loops.
    Reference,
    /// Data-parallel across bodies, pairs and pixels.
    #[default]
    Parallel,
}

/// Simulated time covered by one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum FrameTime {
    /// `1 / ln(N)` for N bodies.
    #[default]
    LogBodyCount,
    Fixed(f32),
}

impl FrameTime {
    /// Used by [`FrameTime::LogBodyCount`] when fewer than two bodies make `ln(N)`
    /// zero or undefined.
    pub const FALLBACK: f32 = 1.0;

    pub fn for_bodies(&self, n: usize) -> f32 {
        match *self {
            FrameTime::Fixed(t) => t,
            FrameTime::LogBodyCount if n < 2 => Self::FALLBACK,
            FrameTime::LogBodyCount => (1.0 / (n as f64).ln()) as f32,
        }
    }
}

/// What happened during one call to [`advance`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepReport {
    pub mini_steps: usize,
    pub collisions: usize,
    /// Sum of all mini-step durations.
    pub elapsed: f64,
}

/// Advances every body by `frame_time`, resolving contacts as they occur.
pub fn advance(
    bodies: &mut DoubleBuffer<Body>,
    g: f64,
    frame_time: f32,
    mode: ExecutionMode,
) -> StepReport {
    let mut report = StepReport::default();
    let mut acc = vec![Vec3::zero(); bodies.len()];
    let mut time_left = frame_time;

    while time_left as f64 > TIME_EPSILON {
        {
            let (current, mut scratch) = bodies.stage();
            accelerations(current, g, mode, &mut acc);
            integrate(current, &acc, time_left, mode, &mut scratch);
        }

        let (current, tentative) = bodies.halves();
        let mut contact = earliest_contact(current, tentative, time_left, mode);
        let mut dt = contact.map_or(time_left, |c| c.time);
        // pairs held together by gravity alone; the impulse cannot separate them
        let mut resting: Vec<(usize, usize)> = Vec::new();

        loop {
            {
                let (current, mut scratch) = bodies.stage();
                integrate(current, &acc, dt, mode, &mut scratch);
            }
            let (current, next) = bodies.halves();
            let Some((i, j)) = first_new_overlap(current, next, &resting, mode) else {
                break;
            };
            let (a, b) = (&current[i], &current[j]);
            let time = collision::last_clear_time(a, acc[i], b, acc[j], dt);
            if time == 0.0 && !collision::closing(a, b) {
                resting.push((i, j));
                continue;
            }
            trace!(first = i, second = j, from = dt, to = time, "mini-step shortened");
            contact = Some(Contact {
                first: i,
                second: j,
                time,
            });
            dt = time;
        }
        bodies.commit();

        if let Some(c) = contact {
            let (a, b) = collision::pair_mut(bodies.current_mut(), c.first, c.second);
            if collision::touching(a, b) {
                collision::resolve_elastic(a, b);
                report.collisions += 1;
                trace!(first = c.first, second = c.second, dt, "contact resolved");
            } else {
                trace!(first = c.first, second = c.second, dt, "predicted contact not reached");
            }
        }

        time_left -= dt;
        report.mini_steps += 1;
        report.elapsed += dt as f64;
    }

    report
}

/// Gravitational acceleration on body `i` from every other body.
/// Coincident centers contribute nothing.
pub fn acceleration_on(bodies: &[Body], i: usize, g: f64) -> Vec3 {
    let (mut rx, mut ry, mut rz) = (0.0f64, 0.0f64, 0.0f64);
    let pos = bodies[i].pos;
    for (j, other) in bodies.iter().enumerate() {
        if i == j {
            continue;
        }
        let i_minus_j = pos.wide_sub(other.pos);
        let r = i_minus_j.wide_mag();
        if r == 0.0 {
            continue;
        }
        let j_minus_i = i_minus_j * -1.0;
        let strength = (g * other.mass as f64 / (r as f64).powi(3)) as f32;
        let force = j_minus_i * strength;
        rx += force.x as f64;
        ry += force.y as f64;
        rz += force.z as f64;
    }
    Vec3::new(rx as f32, ry as f32, rz as f32)
}

/// Fills `out` with the acceleration of every body.
pub fn accelerations(bodies: &[Body], g: f64, mode: ExecutionMode, out: &mut [Vec3]) {
    match mode {
        ExecutionMode::Reference => {
            for (i, a) in out.iter_mut().enumerate() {
                *a = acceleration_on(bodies, i, g);
            }
        }
        ExecutionMode::Parallel => {
            out.par_iter_mut()
                .enumerate()
                .for_each(|(i, a)| *a = acceleration_on(bodies, i, g));
        }
    }
}

fn integrate(
    current: &[Body],
    acc: &[Vec3],
    dt: f32,
    mode: ExecutionMode,
    scratch: &mut Scratch<'_, Body>,
) {
    match mode {
        ExecutionMode::Reference => {
            for (i, (body, a)) in current.iter().zip(acc).enumerate() {
                scratch.set(i, body.integrated(*a, dt));
            }
        }
        ExecutionMode::Parallel => {
            scratch
                .slots_mut()
                .par_iter_mut()
                .zip(current.par_iter().zip(acc.par_iter()))
                .for_each(|(slot, (body, a))| *slot = body.integrated(*a, dt));
        }
    }
}

/// The first contact strictly inside `time_left`, predicted from each body's
/// committed and `tentative` end-of-window positions.
pub fn earliest_contact(
    bodies: &[Body],
    tentative: &[Body],
    time_left: f32,
    mode: ExecutionMode,
) -> Option<Contact> {
    let n = bodies.len();
    let contact = |i: usize, j: usize| {
        let (a, b) = (&bodies[i], &bodies[j]);
        collision::contact_along(a, tentative[i].pos, b, tentative[j].pos, time_left)
            .filter(|&time| time < time_left)
            .map(|time| Contact {
                first: i,
                second: j,
                time,
            })
    };

    match mode {
        ExecutionMode::Reference => {
            let mut best: Option<Contact> = None;
            for i in 0..n {
                for j in (i + 1)..n {
                    if let Some(c) = contact(i, j) {
                        if best.is_none_or(|b| c.time < b.time) {
                            best = Some(c);
                        }
                    }
                }
            }
            best
        }
        ExecutionMode::Parallel => (0..n)
            .into_par_iter()
            .flat_map_iter(|i| ((i + 1)..n).filter_map(move |j| contact(i, j)))
            .reduce_with(Contact::earlier),
    }
}

/// Lowest pair, outside `resting`, that is clear in `current` but overlaps in
/// `next`.
fn first_new_overlap(
    current: &[Body],
    next: &[Body],
    resting: &[(usize, usize)],
    mode: ExecutionMode,
) -> Option<(usize, usize)> {
    let n = current.len();
    let newly_overlapping = |&(i, j): &(usize, usize)| {
        collision::overlapping(&next[i], &next[j])
            && !collision::overlapping(&current[i], &current[j])
            && !resting.contains(&(i, j))
    };

    match mode {
        ExecutionMode::Reference => (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .find(newly_overlapping),
        ExecutionMode::Parallel => (0..n)
            .into_par_iter()
            .flat_map_iter(|i| ((i + 1)..n).map(move |j| (i, j)))
            .find_first(newly_overlapping),
    }
}
