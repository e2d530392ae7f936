//! Contact prediction and elastic response for sphere pairs.

use ultraviolet::Vec3;

use crate::body::Body;
use crate::geometry::{Widened, is_zero};

/// The earliest predicted contact of a mini-step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    pub first: usize,
    pub second: usize,
    /// Time from the start of the mini-step until the surfaces touch.
    pub time: f32,
}

impl Contact {
    /// Earlier contact wins; equal times fall back to the lower pair index.
    pub fn earlier(self, other: Contact) -> Contact {
        let key = |c: &Contact| (c.first, c.second);
        if other.time < self.time || (other.time == self.time && key(&other) < key(&self)) {
            other
        } else {
            self
        }
    }
}

/// Relative clearance below which two surfaces count as overlapping.
const OVERLAP_SLOP: f64 = 1e-6;

/// Relative gap within which two surfaces count as touching.
pub const TOUCH_TOLERANCE: f64 = 1e-4;

/// Halvings used by [`last_clear_time`].
const BISECTION_STEPS: usize = 48;

/// Predicts whether `b` touches `a` within `time_left`, returning the time of
/// first contact. Both bodies move as the integrator would move them over the
/// whole window.
pub fn time_to_contact(
    a: &Body,
    a_acc: Vec3,
    b: &Body,
    b_acc: Vec3,
    time_left: f32,
) -> Option<f32> {
    let a_end = a.integrated(a_acc, time_left).pos;
    let b_end = b.integrated(b_acc, time_left).pos;
    contact_along(a, a_end, b, b_end, time_left)
}

/// Contact prediction from the positions each body reaches at the end of the
/// window.
///
/// Works in `a`'s rest frame: `b` travels the straight chord between its
/// relative start and end positions, and the closest approach to `a`'s center
/// is found from the right triangle formed by the center offset, its
/// projection on the motion, and the summed radii.
pub fn contact_along(a: &Body, a_end: Vec3, b: &Body, b_end: Vec3, time_left: f32) -> Option<f32> {
    let dist_vec = a.pos.wide_sub(b.pos);
    let dist = dist_vec.wide_mag();
    let sum_radii = (a.radius as f64 + b.radius as f64) as f32;

    let move_vec = b_end.wide_sub(b.pos).wide_sub(a_end.wide_sub(a.pos));

    if is_zero(move_vec) {
        return None;
    }
    let mag = move_vec.wide_mag();
    if (mag as f64) < dist as f64 - sum_radii as f64 {
        return None;
    }

    let unit = move_vec * (1.0 / mag);
    let along = unit.wide_dot(dist_vec);
    if along <= 0.0 {
        return None;
    }

    let offset_sq = ((dist * dist) as f64 - (along * along) as f64) as f32;
    let sum_radii_sq = sum_radii * sum_radii;
    if offset_sq >= sum_radii_sq {
        return None;
    }

    let extra = (sum_radii_sq as f64 - offset_sq as f64) as f32;
    if extra < 0.0 {
        return None;
    }

    // distance b travels before the surfaces meet
    let distance = (along as f64 - (extra as f64).sqrt()) as f32;
    if mag < distance {
        return None;
    }

    if distance <= 0.0 {
        // Already touching: only a contact while the velocities still approach.
        return closing(a, b).then_some(0.0);
    }

    Some(distance / mag * time_left)
}

/// Surface gap between `a` and `b`; negative when they interpenetrate.
fn gap(a: &Body, b: &Body) -> f64 {
    a.pos.wide_dist(b.pos) as f64 - (a.radius as f64 + b.radius as f64)
}

/// `true` when the surfaces are closer than a hair's breadth apart.
pub fn overlapping(a: &Body, b: &Body) -> bool {
    gap(a, b) < (a.radius as f64 + b.radius as f64) * OVERLAP_SLOP
}

/// `true` when the surfaces meet within [`TOUCH_TOLERANCE`].
pub fn touching(a: &Body, b: &Body) -> bool {
    gap(a, b) <= (a.radius as f64 + b.radius as f64) * TOUCH_TOLERANCE
}

/// `true` while the relative velocity carries the centers toward each other.
pub fn closing(a: &Body, b: &Body) -> bool {
    b.vel.wide_sub(a.vel).wide_dot(a.pos.wide_sub(b.pos)) > 0.0
}

/// Latest time in `[0, dt]` at which `a` and `b`, integrated under their
/// accelerations, are still clear of each other.
///
/// Expects the pair clear at 0 and overlapping at `dt`. The result is found by
/// bisection on the integrator's own trajectory, so integrating the pair by the
/// returned time leaves it clear.
pub fn last_clear_time(a: &Body, a_acc: Vec3, b: &Body, b_acc: Vec3, dt: f32) -> f32 {
    let clear_at = |t: f32| !overlapping(&a.integrated(a_acc, t), &b.integrated(b_acc, t));
    let (mut lo, mut hi) = (0.0f32, dt);
    for _ in 0..BISECTION_STEPS {
        let mid = lo + (hi - lo) * 0.5;
        if mid <= lo || mid >= hi {
            break;
        }
        if clear_at(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Applies an instantaneous elastic impulse along the line of centers.
///
/// Each body's change is weighted by the other's share of the pair's mass, so
/// momentum is conserved. Coincident centers leave both bodies untouched.
pub fn resolve_elastic(a: &mut Body, b: &mut Body) {
    let dist_vec = a.pos.wide_sub(b.pos);
    let dist_norm = dist_vec.wide_dot(dist_vec);
    if dist_norm == 0.0 {
        return;
    }

    let total = (a.mass as f64 + b.mass as f64) as f32;
    let scale_a = 2.0 * b.mass / total;
    let scale_b = 2.0 * a.mass / total;

    let vel_diff = a.vel.wide_sub(b.vel);
    let projected = dist_vec * (vel_diff.wide_dot(dist_vec) / dist_norm);

    a.vel = a.vel.wide_sub(projected * scale_a);
    b.vel = b.vel.wide_sub(projected * (-scale_b));
}

/// Two distinct mutable elements of a slice, `i < j`.
pub(crate) fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert!(i < j);
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}
