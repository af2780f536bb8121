//! Ordered sequence of blocks: size bounds, the splitting policy and
//! block-level CRUD.

use std::marker::PhantomData;

use itertools::Itertools;

use crate::block::Block;
use crate::store::{BlockStore, VecBlockStore};

/// Target size for newly created blocks when none is configured.
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Upper bound on the size of any single block when none is configured.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 4096;

/// An ordered chain of blocks over a pluggable backing store.
///
/// The collection owns two size parameters:
///
/// - `default_block_size`: target size of newly created blocks; every block
///   produced by the splitting policy is allocated with this capacity hint.
/// - `max_block_size`: hard upper bound on the element count of a single
///   block, enforced on demand via [`try_divide_block`].
///
/// `default_block_size <= max_block_size` holds at all times; both setters
/// check it. Bulk operations never produce empty blocks; only
/// [`add_new_block`] and [`insert_new_block`] create one explicitly.
///
/// [`try_divide_block`]: BlockCollection::try_divide_block
/// [`add_new_block`]: BlockCollection::add_new_block
/// [`insert_new_block`]: BlockCollection::insert_new_block
#[derive(Debug, Clone)]
pub struct BlockCollection<T, S: BlockStore<T> = VecBlockStore<T>> {
    store: S,
    default_block_size: usize,
    max_block_size: usize,
    _t: PhantomData<T>,
}

impl<T> BlockCollection<T> {
    /// Creates an empty collection over the default flat-vector store.
    pub fn new() -> BlockCollection<T> {
        BlockCollection::with_store(VecBlockStore::new())
    }

    /// Creates a collection seeded with `items`, split into blocks of the
    /// default block size.
    pub fn from_vec(items: Vec<T>) -> BlockCollection<T> {
        BlockCollection::with_store_and_seed(VecBlockStore::new(), items)
    }
}

impl<T> Default for BlockCollection<T> {
    fn default() -> BlockCollection<T> {
        BlockCollection::new()
    }
}

impl<T, S: BlockStore<T>> BlockCollection<T, S> {
    /// Creates an empty collection over a caller-provided backing store.
    pub fn with_store(store: S) -> BlockCollection<T, S> {
        BlockCollection {
            store,
            default_block_size: DEFAULT_BLOCK_SIZE,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            _t: PhantomData,
        }
    }

    /// Creates a collection over a caller-provided store, seeded with
    /// `items` split into blocks of the default block size.
    pub fn with_store_and_seed(store: S, items: Vec<T>) -> BlockCollection<T, S> {
        let mut collection = BlockCollection::with_store(store);
        collection.add_vec(items);
        collection
    }

    /// Reconfigures both size parameters, consuming and returning the
    /// collection.
    ///
    /// # Panics
    ///
    /// Panics if `default_block_size > max_block_size`.
    pub fn with_block_sizes(
        mut self,
        default_block_size: usize,
        max_block_size: usize,
    ) -> BlockCollection<T, S> {
        assert!(
            default_block_size <= max_block_size,
            "default block size {default_block_size} exceeds max block size {max_block_size}"
        );
        self.default_block_size = default_block_size;
        self.max_block_size = max_block_size;
        self
    }

    /// Number of blocks in the chain.
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Total number of elements across all blocks. Linear in the number of
    /// blocks.
    pub fn element_count(&self) -> usize {
        self.iter().map(Block::len).sum()
    }

    #[inline]
    pub fn default_block_size(&self) -> usize {
        self.default_block_size
    }

    /// Sets the target size for newly created blocks.
    ///
    /// # Panics
    ///
    /// Panics if `size > max_block_size`.
    pub fn set_default_block_size(&mut self, size: usize) {
        assert!(
            size <= self.max_block_size,
            "default block size {size} exceeds max block size {}",
            self.max_block_size
        );
        self.default_block_size = size;
    }

    #[inline]
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Sets the upper bound on the size of a single block.
    ///
    /// # Panics
    ///
    /// Panics if `size < default_block_size`.
    pub fn set_max_block_size(&mut self, size: usize) {
        assert!(
            self.default_block_size <= size,
            "max block size {size} is below default block size {}",
            self.default_block_size
        );
        self.max_block_size = size;
    }

    /// Borrows the block at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn get(&self, index: usize) -> &Block<T> {
        self.store.get(index)
    }

    /// Mutably borrows the block at `index` so the owner can edit elements
    /// in place. Structural changes to the chain go through the dedicated
    /// operations, not through this accessor.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn block_mut(&mut self, index: usize) -> &mut Block<T> {
        self.store.get_mut(index)
    }

    /// Iterates the blocks in chain order.
    pub fn iter(&self) -> BlockIter<'_, T, S> {
        BlockIter {
            collection: self,
            next: 0,
        }
    }

    /// Appends the elements of `block`, re-packed by the splitting policy.
    /// An empty block adds nothing.
    pub fn add_block(&mut self, block: Block<T>) {
        self.add_vec(block.into_items());
    }

    /// Appends `items`, split into `ceil(n / default_block_size)` fresh
    /// blocks (the last possibly shorter). Empty input adds nothing.
    ///
    /// # Panics
    ///
    /// Panics if `items` is non-empty and `default_block_size == 0`.
    pub fn add_vec(&mut self, items: Vec<T>) {
        let blocks = self.split_into_blocks(items);
        for block in blocks {
            self.store.push(block);
        }
    }

    /// Appends the elements of `items`, cloning each. See [`add_vec`].
    ///
    /// [`add_vec`]: BlockCollection::add_vec
    pub fn add_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.add_vec(items.to_vec());
    }

    /// Appends one empty block with the default capacity hint.
    pub fn add_new_block(&mut self) {
        self.store.push(Block::with_capacity(self.default_block_size));
    }

    /// Appends every input block, re-packed by the splitting policy.
    /// Empty input blocks contribute nothing.
    pub fn add_range<I>(&mut self, blocks: I)
    where
        I: IntoIterator<Item = Block<T>>,
    {
        for block in blocks {
            self.add_block(block);
        }
    }

    /// Splits `block` by the splitting policy and inserts the results as a
    /// contiguous run starting at `index`. An empty block is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_block(&mut self, index: usize, block: Block<T>) {
        assert!(
            index <= self.len(),
            "insertion index {index} is out of bounds for a chain of {} blocks",
            self.len()
        );
        let parts = self.split_into_blocks(block.into_items());
        self.store.insert_many(index, parts);
    }

    /// Inserts one empty block with the default capacity hint at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_new_block(&mut self, index: usize) {
        assert!(
            index <= self.len(),
            "insertion index {index} is out of bounds for a chain of {} blocks",
            self.len()
        );
        let block = Block::with_capacity(self.default_block_size);
        self.store.insert_many(index, vec![block]);
    }

    /// Splits every input block, concatenates the results and inserts them
    /// as one contiguous group at `index`. An empty concatenation is a
    /// no-op.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_range<I>(&mut self, index: usize, blocks: I)
    where
        I: IntoIterator<Item = Block<T>>,
    {
        assert!(
            index <= self.len(),
            "insertion index {index} is out of bounds for a chain of {} blocks",
            self.len()
        );
        let parts: Vec<Block<T>> = blocks
            .into_iter()
            .flat_map(|block| self.split_into_blocks(block.into_items()))
            .collect();
        self.store.insert_many(index, parts);
    }

    /// Removes the first block equal to `block`, returning whether one was
    /// found.
    pub fn remove(&mut self, block: &Block<T>) -> bool
    where
        T: PartialEq,
    {
        self.store.remove(block)
    }

    /// Removes and returns the block at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Block<T> {
        assert!(
            index < self.len(),
            "block index {index} is out of bounds for a chain of {} blocks",
            self.len()
        );
        self.store.remove_at(index)
    }

    /// Removes all blocks.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Reverses the order of the blocks in place.
    ///
    /// Element order *within* each block is untouched, so this is a full
    /// sequence reversal only if the caller also reverses every block's
    /// contents.
    pub fn reverse(&mut self) {
        self.store.reverse();
    }

    /// If the block at `index` has reached `max_block_size`, replaces it
    /// with its split (per the splitting policy) and returns `true`;
    /// otherwise leaves the chain untouched and returns `false`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn try_divide_block(&mut self, index: usize) -> bool {
        assert!(
            index < self.len(),
            "block index {index} is out of bounds for a chain of {} blocks",
            self.len()
        );
        if self.store.get(index).len() < self.max_block_size {
            return false;
        }
        let block = self.store.remove_at(index);
        let parts = self.split_into_blocks(block.into_items());
        self.store.insert_many(index, parts);
        true
    }

    /// Ensures at least one (possibly empty) block exists.
    pub fn ensure_first_block(&mut self) {
        if self.store.is_empty() {
            self.add_new_block();
        }
    }

    /// Checks the chain invariants, panicking on violation: the size
    /// parameters are ordered, and no block exceeds `max_block_size`.
    pub fn verify(&self) {
        assert!(self.default_block_size <= self.max_block_size);
        for (index, block) in self.iter().enumerate() {
            assert!(
                block.len() <= self.max_block_size,
                "block {index} holds {} elements, above the max of {}",
                block.len(),
                self.max_block_size
            );
        }
    }

    /// Splits `items` into `ceil(n / default_block_size)` blocks: all but
    /// the last hold exactly `default_block_size` elements, and every block
    /// (the short tail included) is allocated with the default capacity
    /// hint. Empty input yields no blocks.
    fn split_into_blocks(&self, items: Vec<T>) -> Vec<Block<T>> {
        if items.is_empty() {
            return Vec::new();
        }
        let size = self.default_block_size;
        assert!(size > 0, "cannot split material into blocks of size 0");

        let mut blocks = Vec::with_capacity(items.len().div_ceil(size));
        let chunks = items.into_iter().chunks(size);
        for chunk in &chunks {
            let mut block = Block::with_capacity(size);
            block.extend(chunk);
            blocks.push(block);
        }
        blocks
    }
}

impl<T, S: BlockStore<T>> std::ops::Index<usize> for BlockCollection<T, S> {
    type Output = Block<T>;

    fn index(&self, index: usize) -> &Block<T> {
        self.store.get(index)
    }
}

/// Iterator over the blocks of a [`BlockCollection`], in chain order.
pub struct BlockIter<'a, T, S: BlockStore<T>> {
    collection: &'a BlockCollection<T, S>,
    next: usize,
}

impl<'a, T, S: BlockStore<T>> Iterator for BlockIter<'a, T, S> {
    type Item = &'a Block<T>;

    fn next(&mut self) -> Option<&'a Block<T>> {
        if self.next < self.collection.len() {
            let block = self.collection.get(self.next);
            self.next += 1;
            Some(block)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.collection.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl<'a, T, S: BlockStore<T>> IntoIterator for &'a BlockCollection<T, S> {
    type Item = &'a Block<T>;
    type IntoIter = BlockIter<'a, T, S>;

    fn into_iter(self) -> BlockIter<'a, T, S> {
        self.iter()
    }
}
