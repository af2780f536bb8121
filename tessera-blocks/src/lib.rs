//! Chunked big-array storage engine.
//!
//! A big array stores its elements in many fixed-capacity blocks instead of
//! one contiguous buffer, so mid-sequence insertion and deletion never pay a
//! cost proportional to the total element count. This crate is the core of
//! that design: the block chain with its size-bound and splitting
//! invariants, and the resolver that turns global element indexes into
//! `(block, offset)` coordinates.
//!
//! # Key types
//!
//! - [`Block`]: a growable bucket of elements, the unit of storage.
//! - [`BlockCollection`]: the ordered chain of blocks; enforces size
//!   bounds, splits oversize material, exposes block-level CRUD over a
//!   pluggable [`BlockStore`] backing.
//! - [`BlockMap`]: the index-to-block resolver; maintains a lazily built
//!   prefix-sum cache over the chain and answers point lookups
//!   ([`BlockMap::block_info`]) and range projections
//!   ([`BlockMap::multi_block_range`],
//!   [`BlockMap::reverse_multi_block_range`]).
//! - [`Span`], [`BlockInfo`], [`BlockRange`], [`MultiBlockRange`]: the
//!   positional records those queries speak in.
//! - [`Balancer`]: strategy seam reserved for adaptive block-size policy.
//!
//! The user-facing facade (element-level `insert`/`remove`/`at`,
//! enumeration) is a thin wrapper over these pieces and lives with the
//! consumer; the facade owns the [`BlockMap`], mutates the chain through
//! [`BlockMap::blocks_mut`] and reports each structural mutation through the
//! `data_changed*` notifications.

pub mod balancer;
pub mod block;
pub mod block_map;
pub mod collection;
pub mod layout;
pub mod store;

pub use balancer::{Balancer, FixedBalancer};
pub use block::Block;
pub use block_map::{BlockMap, CountMemo};
pub use collection::{BlockCollection, DEFAULT_BLOCK_SIZE, DEFAULT_MAX_BLOCK_SIZE};
pub use layout::{BlockInfo, BlockRange, MultiBlockRange, Span};
pub use store::{BlockStore, VecBlockStore};
