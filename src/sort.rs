//! Orders bodies front-to-back from the camera.
//!
//! Insertion sort: consecutive frames rarely reorder more than a few bodies,
//! so the common case is a single linear pass.

use ultraviolet::Vec3;

use crate::body::Body;
use crate::buffer::DoubleBuffer;
use crate::geometry::Widened;

/// Sorts the first `count` bodies by ascending distance from `eye`, permuting
/// the scratch generation alongside the committed one. Equal distances keep
/// their relative order.
///
/// Returns the number of element shifts performed (zero for sorted input).
pub fn sort_by_depth(bodies: &mut DoubleBuffer<Body>, count: usize, eye: Vec3) -> usize {
    let (current, scratch) = bodies.halves_mut();
    let count = count.min(current.len());
    let mut keys: Vec<f32> = current[..count].iter().map(|b| b.pos.wide_dist(eye)).collect();
    let mut shifts = 0;

    for i in 1..count {
        let key = keys[i];
        let body = current[i];
        let paired = scratch[i];

        let mut j = i;
        while j > 0 && keys[j - 1] > key {
            keys[j] = keys[j - 1];
            current[j] = current[j - 1];
            scratch[j] = scratch[j - 1];
            j -= 1;
            shifts += 1;
        }
        keys[j] = key;
        current[j] = body;
        scratch[j] = paired;
    }

    shifts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Material;
    use crate::geometry::Color;

    fn at(x: f32, tag: f32) -> Body {
        Body::new(
            Vec3::new(x, 0.0, 0.0),
            Vec3::zero(),
            tag,
            1.0,
            Material::new(Color::new(1.0, 1.0, 1.0), 0.0),
        )
    }

    fn masses(bodies: &[Body]) -> Vec<f32> {
        bodies.iter().map(|b| b.mass).collect()
    }

    #[test]
    fn sorted_input_needs_no_shifts() {
        let mut buf = DoubleBuffer::new((0..50).map(|i| at(-(i as f32), 1.0 + i as f32)).collect());
        assert_eq!(sort_by_depth(&mut buf, 50, Vec3::zero()), 0);
    }

    #[test]
    fn reverse_input_is_reordered_with_its_scratch_pair() {
        let mut buf = DoubleBuffer::new(vec![at(30.0, 1.0), at(20.0, 2.0), at(10.0, 3.0)]);
        let shifts = sort_by_depth(&mut buf, 3, Vec3::zero());
        assert_eq!(shifts, 3);
        assert_eq!(masses(buf.current()), vec![3.0, 2.0, 1.0]);
        buf.commit();
        assert_eq!(masses(buf.current()), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn equal_distances_keep_order() {
        let mut buf = DoubleBuffer::new(vec![at(5.0, 1.0), at(-5.0, 2.0), at(1.0, 3.0)]);
        sort_by_depth(&mut buf, 3, Vec3::zero());
        assert_eq!(masses(buf.current()), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn only_the_active_prefix_moves() {
        let mut buf = DoubleBuffer::new(vec![at(30.0, 1.0), at(20.0, 2.0), at(10.0, 3.0)]);
        sort_by_depth(&mut buf, 2, Vec3::zero());
        assert_eq!(masses(buf.current()), vec![2.0, 1.0, 3.0]);
    }
}
