//! Two-generation storage for body state.
//!
//! Writers only see the scratch generation through [`Scratch`]; readers only
//! see the committed generation. [`DoubleBuffer::commit`] is the single point
//! where scratch becomes authoritative.

/// Committed state plus a scratch generation of the same length.
#[derive(Clone, Debug)]
pub struct DoubleBuffer<T> {
    current: Vec<T>,
    scratch: Vec<T>,
}

/// Write handle to the scratch generation.
#[derive(Debug)]
pub struct Scratch<'a, T> {
    slots: &'a mut [T],
}

impl<T> Scratch<'_, T> {
    #[inline]
    pub fn set(&mut self, index: usize, value: T) {
        self.slots[index] = value;
    }

    /// Mutable slots for bulk writers (e.g. parallel iterators).
    pub fn slots_mut(&mut self) -> &mut [T] {
        self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T: Clone> DoubleBuffer<T> {
    pub fn new(items: Vec<T>) -> Self {
        let scratch = items.clone();
        Self {
            current: items,
            scratch,
        }
    }
}

impl<T> DoubleBuffer<T> {
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// The committed generation.
    pub fn current(&self) -> &[T] {
        &self.current
    }

    /// The committed generation, for in-place updates between mini-steps.
    pub fn current_mut(&mut self) -> &mut [T] {
        &mut self.current
    }

    /// Read-only committed state alongside a write handle to scratch.
    pub fn stage(&mut self) -> (&[T], Scratch<'_, T>) {
        (
            &self.current,
            Scratch {
                slots: &mut self.scratch,
            },
        )
    }

    /// Makes scratch the committed generation.
    ///
    /// Callers must have overwritten every scratch slot since the last commit.
    pub fn commit(&mut self) {
        std::mem::swap(&mut self.current, &mut self.scratch);
    }

    /// Committed state and whatever was last staged into scratch.
    pub fn halves(&self) -> (&[T], &[T]) {
        (&self.current, &self.scratch)
    }

    /// Both generations, for permutations that must move them together.
    pub fn halves_mut(&mut self) -> (&mut [T], &mut [T]) {
        (&mut self.current, &mut self.scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_publishes_scratch() {
        let mut buf = DoubleBuffer::new(vec![1, 2, 3]);
        {
            let (current, mut scratch) = buf.stage();
            for (i, v) in current.iter().enumerate() {
                scratch.set(i, v * 10);
            }
        }
        assert_eq!(buf.current(), &[1, 2, 3]);
        assert_eq!(buf.halves(), (&[1, 2, 3][..], &[10, 20, 30][..]));
        buf.commit();
        assert_eq!(buf.current(), &[10, 20, 30]);
    }

    #[test]
    fn halves_expose_both_generations() {
        let mut buf = DoubleBuffer::new(vec!['a', 'b']);
        let (current, scratch) = buf.halves_mut();
        current.swap(0, 1);
        scratch.swap(0, 1);
        buf.commit();
        assert_eq!(buf.current(), &['b', 'a']);
    }
}
