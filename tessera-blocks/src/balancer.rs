//! Strategy seam for block-size policy.

use crate::collection::{DEFAULT_BLOCK_SIZE, DEFAULT_MAX_BLOCK_SIZE};

/// Strategy object for choosing the chain's block sizes.
///
/// A `Balancer` is accepted and stored by
/// [`BlockMap`](crate::block_map::BlockMap) so that an adaptive size policy
/// can consult it as the array grows and shrinks. The positional queries do
/// not read it; the seam exists so size policy can evolve without changing
/// the query contracts.
pub trait Balancer: Send + Sync {
    /// Target size for newly created blocks.
    fn default_block_size(&self) -> usize;

    /// Upper bound on the element count of a single block.
    fn max_block_size(&self) -> usize;
}

/// A [`Balancer`] that always answers with the same pair of sizes.
#[derive(Debug, Clone)]
pub struct FixedBalancer {
    default_block_size: usize,
    max_block_size: usize,
}

impl FixedBalancer {
    /// # Panics
    ///
    /// Panics if `default_block_size > max_block_size`.
    pub fn new(default_block_size: usize, max_block_size: usize) -> FixedBalancer {
        assert!(
            default_block_size <= max_block_size,
            "default block size {default_block_size} exceeds max block size {max_block_size}"
        );
        FixedBalancer {
            default_block_size,
            max_block_size,
        }
    }
}

impl Default for FixedBalancer {
    fn default() -> FixedBalancer {
        FixedBalancer::new(DEFAULT_BLOCK_SIZE, DEFAULT_MAX_BLOCK_SIZE)
    }
}

impl Balancer for FixedBalancer {
    fn default_block_size(&self) -> usize {
        self.default_block_size
    }

    fn max_block_size(&self) -> usize {
        self.max_block_size
    }
}
