//! Tooling around the core: reference dumps, dump diffs and performance tiers.

pub mod diff;
pub mod export;
pub mod tiers;

/// Frame size used by the dump and diff tools.
pub const FRAME_WIDTH: usize = 512;
pub const FRAME_HEIGHT: usize = 256;
