//! The index-to-block resolver.
//!
//! A [`BlockMap`] answers two questions over an arbitrarily evolving block
//! chain: which block holds global element `index`, and which per-block
//! sub-ranges a contiguous global range covers. Both are served from a
//! lazily built prefix-sum cache of [`BlockInfo`] entries:
//!
//! - When the requested index lies inside the already-cached prefix, the map
//!   runs an interpolation search over the cached entries (block sizes tend
//!   to be uniform, so linear extrapolation homes in quickly).
//! - Otherwise it walks the chain forward from the cache frontier, appending
//!   fresh entries as it goes, so the next query starts further along.
//!
//! The owner reports structural mutations through [`BlockMap::data_changed`]
//! and [`BlockMap::data_changed_after_block_removal`]; the map invalidates
//! the cache from the first affected block onward and rebuilds on demand.

use std::sync::{Arc, Mutex, MutexGuard};

use tessera_common::{Result, error::Error};

use crate::balancer::Balancer;
use crate::collection::BlockCollection;
use crate::layout::{BlockInfo, BlockRange, MultiBlockRange, Span};
use crate::store::{BlockStore, VecBlockStore};

/// Memo of the number of globally addressable elements covered by the valid
/// cache prefix, keyed by the `first_changed` value it was computed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountMemo {
    /// The `first_changed` state the memo was computed under; a mismatch
    /// means the memo is stale.
    pub first_changed: Option<usize>,
    /// Element count covered by the valid prefix at that point.
    pub count: usize,
}

/// The mutable cache state, serialized behind the map's lock.
///
/// Entry `i` of `entries`, when valid, truthfully describes block `i`:
/// its chain position, the global index of its first element (the prefix sum
/// of the preceding block lengths) and its element count. Validity is
/// governed by `first_changed`: `None` means the whole list is current,
/// `Some(k)` means entries below `k` are valid and entries at or above `k`
/// are obsolete and must be discarded before reuse.
///
/// Two structural invariants hold between calls: `first_changed`, when
/// `Some(k)`, satisfies `k <= entries.len()`; and `first_changed == None`
/// implies `entries` describes every block of the chain.
#[derive(Debug)]
struct MapCache {
    entries: Vec<BlockInfo>,
    first_changed: Option<usize>,
    count_memo: Option<CountMemo>,
}

impl MapCache {
    /// Length of the valid prefix of `entries`.
    fn cached_block_count(&self) -> usize {
        match self.first_changed {
            None => self.entries.len(),
            Some(k) => k,
        }
    }

    /// Number of globally addressable elements covered by the valid prefix,
    /// memoized until the next invalidation.
    fn cached_element_count<T, S: BlockStore<T>>(
        &mut self,
        blocks: &BlockCollection<T, S>,
    ) -> usize {
        if let Some(memo) = self.count_memo {
            if memo.first_changed == self.first_changed {
                return memo.count;
            }
        }
        let count = match self.first_changed {
            None => {
                if blocks.is_empty() {
                    0
                } else {
                    // A clean cache over a non-empty chain describes every
                    // block, so the last entry is the last block.
                    self.entries
                        .last()
                        .expect("clean cache over a non-empty chain")
                        .end_index()
                }
            }
            Some(0) => 0,
            Some(k) => self.entries[k - 1].end_index(),
        };
        self.count_memo = Some(CountMemo {
            first_changed: self.first_changed,
            count,
        });
        count
    }

    /// Lowers the dirty watermark to `block_index` and drops the count memo.
    fn mark_changed(&mut self, block_index: usize) {
        self.first_changed = Some(match self.first_changed {
            None => block_index,
            Some(k) => k.min(block_index),
        });
        self.count_memo = None;
    }
}

/// Translates global element indexes into `(block, offset)` coordinates over
/// an owned [`BlockCollection`].
///
/// The map owns the chain; the owning facade mutates it through
/// [`blocks_mut`](BlockMap::blocks_mut) and reports every structural
/// mutation through the `data_changed*` notifications. Queries take `&self`
/// and serialize the cache behind one exclusive lock, acquired once per
/// public operation, so concurrent readers are safe; structural mutation
/// requires `&mut self` and is therefore exclusive by construction.
pub struct BlockMap<T, S: BlockStore<T> = VecBlockStore<T>> {
    blocks: BlockCollection<T, S>,
    balancer: Arc<dyn Balancer>,
    cache: Mutex<MapCache>,
}

impl<T, S: BlockStore<T>> BlockMap<T, S> {
    /// Creates a map over `blocks`. A non-empty chain starts fully dirty, so
    /// the first query builds the cache from block 0.
    pub fn new(balancer: Arc<dyn Balancer>, blocks: BlockCollection<T, S>) -> BlockMap<T, S> {
        let first_changed = if blocks.is_empty() { None } else { Some(0) };
        BlockMap {
            blocks,
            balancer,
            cache: Mutex::new(MapCache {
                entries: Vec::new(),
                first_changed,
                count_memo: None,
            }),
        }
    }

    /// The underlying block chain.
    pub fn blocks(&self) -> &BlockCollection<T, S> {
        &self.blocks
    }

    /// Mutable access to the chain. After any structural mutation the caller
    /// must report the first affected block via
    /// [`data_changed`](BlockMap::data_changed) or
    /// [`data_changed_after_block_removal`](BlockMap::data_changed_after_block_removal);
    /// until it does, positional answers may be stale.
    pub fn blocks_mut(&mut self) -> &mut BlockCollection<T, S> {
        &mut self.blocks
    }

    /// Consumes the map, returning the chain.
    pub fn into_blocks(self) -> BlockCollection<T, S> {
        self.blocks
    }

    /// The size-policy capability handed in at construction. Reserved for
    /// adaptive block sizing; the positional queries do not consult it.
    pub fn balancer(&self) -> &Arc<dyn Balancer> {
        &self.balancer
    }

    /// Returns the [`BlockInfo`] of the block containing global `index`,
    /// searching the whole chain.
    pub fn block_info(&self, index: usize) -> Result<BlockInfo> {
        let mut cache = self.lock();
        self.block_info_locked(&mut cache, index, self.full_window())
    }

    /// Returns the [`BlockInfo`] of the block containing global `index`,
    /// restricting the search to the `window` of block ordinals.
    ///
    /// The window is a performance hint, not a semantic change: it must be a
    /// sub-range of `[0, blocks.len())`, and if `index` does not fall inside
    /// it the call fails with an out-of-range error.
    pub fn block_info_within(&self, index: usize, window: Span) -> Result<BlockInfo> {
        let mut cache = self.lock();
        self.block_info_locked(&mut cache, index, window)
    }

    /// Projects the forward range `[span.index, span.index + span.count)`
    /// onto the chain, one [`BlockRange`] per touched block in chain order.
    ///
    /// An empty span projects to an empty range list; its `start_block`
    /// field degenerates into an anchor: 0 when `span.index == 0`, otherwise
    /// the start index of the block containing `span.index - 1`.
    pub fn multi_block_range(&self, span: Span) -> Result<MultiBlockRange> {
        let mut cache = self.lock();
        self.multi_block_range_locked(&mut cache, span)
    }

    /// Projects a backward-walking range onto the chain: `span.index` is the
    /// *last* (inclusive) element and `span.count` the length stepping
    /// backward. Emitted block ranges come in reverse chain order, and each
    /// `sub_index` addresses the block-local *last* contributed element.
    ///
    /// An empty span projects to an empty range list whose `start_block`
    /// anchor is the start index of the block holding `span.index` (0 for
    /// the all-zero span).
    pub fn reverse_multi_block_range(&self, span: Span) -> Result<MultiBlockRange> {
        let mut cache = self.lock();
        let direct_index = if span.index == 0 && span.count == 0 {
            0
        } else {
            if span.count > span.index + 1 {
                return Err(Error::out_of_range(
                    "span",
                    format!(
                        "walking {} elements back from index {} steps before the array",
                        span.count, span.index
                    ),
                ));
            }
            span.index + 1 - span.count
        };
        let forward =
            self.multi_block_range_locked(&mut cache, Span::new(direct_index, span.count))?;
        if forward.count == 0 {
            // An empty projection carries an element-index anchor, not a
            // block ordinal; pass it through untouched.
            return Ok(forward);
        }

        let mut ranges = forward.ranges;
        ranges.reverse();
        for range in &mut ranges {
            // Block-local index of the last contributed element; an empty
            // contribution pins it at 0.
            range.sub_index = (range.sub_index + range.count).saturating_sub(1);
        }
        let start_block = forward.start_block + forward.count - 1;
        Ok(MultiBlockRange::new(start_block, forward.count, ranges))
    }

    /// Number of elements covered by the valid cache prefix.
    pub fn cached_element_count(&self) -> usize {
        self.lock().cached_element_count(&self.blocks)
    }

    /// Number of blocks described by the valid cache prefix.
    pub fn cached_block_count(&self) -> usize {
        self.lock().cached_block_count()
    }

    /// Reports that block `block_index` (and everything after it) changed.
    /// The caller guarantees `block_index < blocks.len()`.
    pub fn data_changed(&self, block_index: usize) {
        debug_assert!(
            block_index < self.blocks.len(),
            "changed block {block_index} is out of bounds for a chain of {} blocks",
            self.blocks.len()
        );
        self.lock().mark_changed(block_index);
    }

    /// Reports that the block previously at `block_index` was removed.
    ///
    /// Removing the chain's tail is special-cased: cache entries for blocks
    /// that no longer exist are dropped, and if no earlier block was dirty
    /// the cache becomes clean again without a rebuild. A removal in the
    /// middle of the chain degrades to [`data_changed`](BlockMap::data_changed).
    pub fn data_changed_after_block_removal(&self, block_index: usize) {
        let mut cache = self.lock();
        if block_index >= self.blocks.len() {
            cache.entries.truncate(self.blocks.len());
            match cache.first_changed {
                Some(k) if k < block_index => {
                    cache.first_changed = Some(k.min(cache.entries.len()));
                }
                _ => cache.first_changed = None,
            }
            cache.count_memo = None;
            return;
        }
        cache.mark_changed(block_index);
    }

    fn lock(&self) -> MutexGuard<'_, MapCache> {
        self.cache.lock().expect("block map cache lock poisoned")
    }

    fn full_window(&self) -> Span {
        Span::new(0, self.blocks.len())
    }

    fn block_info_locked(
        &self,
        cache: &mut MapCache,
        index: usize,
        window: Span,
    ) -> Result<BlockInfo> {
        if window.end() > self.blocks.len() {
            return Err(Error::out_of_range(
                "search window",
                format!(
                    "block window {}..{} is not a sub-range of the chain of {} blocks",
                    window.index,
                    window.end(),
                    self.blocks.len()
                ),
            ));
        }

        if index < cache.cached_element_count(&self.blocks) {
            self.interpolation_search(cache, index, window)
        } else {
            self.linear_search(cache, index, window)
        }
    }

    /// Locates `index` inside the valid cache prefix by interpolation: the
    /// probe position is extrapolated from the element spread between the
    /// window's endpoint entries, then refined like a binary search.
    ///
    /// Precondition: `index < cached_element_count`.
    fn interpolation_search(
        &self,
        cache: &MapCache,
        index: usize,
        window: Span,
    ) -> Result<BlockInfo> {
        let cached = cache.cached_block_count();
        let mut lo = window.index;
        let mut hi = match window.end().min(cached).checked_sub(1) {
            Some(hi) if hi >= lo => hi,
            _ => {
                return Err(Error::out_of_range(
                    "search window",
                    format!("window starting at block {lo} does not cover index {index}"),
                ));
            }
        };

        // The window must contain the index before the search starts.
        let start_idx = cache.entries[lo].start_index;
        let covered = cache.entries[hi].end_index();
        if index < start_idx || index >= covered {
            return Err(Error::out_of_range(
                "search window",
                format!("blocks {lo}..={hi} cover {start_idx}..{covered}, not index {index}"),
            ));
        }

        while lo <= hi {
            let s = cache.entries[lo];
            let e = cache.entries[hi];
            let probe = if index == s.start_index {
                s.block_index
            } else {
                let span_blocks = (e.block_index - s.block_index + 1) as f64;
                let span_elements = (e.end_index() - s.start_index) as f64;
                let offset = (index - s.start_index) as f64 * span_blocks / span_elements;
                // Rounding can push the extrapolation outside the live
                // window; clamp it back in.
                (lo + offset as usize).clamp(lo, hi)
            };

            let b = cache.entries[probe];
            if index < b.start_index {
                let Some(next_hi) = probe.checked_sub(1) else {
                    break;
                };
                hi = next_hi;
            } else if index >= b.end_index() {
                lo = probe + 1;
            } else {
                return Ok(b);
            }
        }

        Err(Error::internal(format!(
            "interpolation search exhausted its window without locating index {index}"
        )))
    }

    /// Locates `index` beyond the cache frontier by scanning the chain
    /// forward from the last valid entry, appending fresh entries along the
    /// way so subsequent queries resume from there.
    ///
    /// Precondition: `index >= cached_element_count`.
    fn linear_search(&self, cache: &mut MapCache, index: usize, window: Span) -> Result<BlockInfo> {
        if self.blocks.is_empty() {
            return Err(Error::index_out_of_range("index", index, 0));
        }

        let start = self.linear_start_info(cache);
        if start.contains(index) {
            return Ok(start);
        }

        let Some(window_last) = window.end().checked_sub(1) else {
            return Err(Error::index_out_of_range("index", index, start.end_index()));
        };

        let mut common_start = start.end_index();
        for i in start.block_index + 1..=window_last {
            debug_assert_eq!(cache.entries.len(), i);
            let info = BlockInfo::new(i, common_start, self.blocks.get(i).len());
            cache.entries.push(info);
            if info.contains(index) {
                cache.first_changed = if i + 1 == self.blocks.len() {
                    None
                } else {
                    Some(i + 1)
                };
                return Ok(info);
            }
            common_start = info.end_index();
        }

        Err(Error::index_out_of_range("index", index, common_start))
    }

    /// Prepares the cache for a forward scan: drops the obsolete tail and
    /// returns the entry the scan resumes after, seeding the entry for block
    /// 0 when nothing valid is left.
    fn linear_start_info(&self, cache: &mut MapCache) -> BlockInfo {
        let valid = cache.cached_block_count().min(cache.entries.len());
        cache.entries.truncate(valid);

        if cache.entries.is_empty() {
            let info = BlockInfo::new(0, 0, self.blocks.get(0).len());
            cache.entries.push(info);
            cache.first_changed = if self.blocks.len() == 1 { None } else { Some(1) };
            info
        } else {
            *cache.entries.last().expect("non-empty valid prefix")
        }
    }

    fn multi_block_range_locked(
        &self,
        cache: &mut MapCache,
        span: Span,
    ) -> Result<MultiBlockRange> {
        if span.count == 0 {
            let anchor = if span.index == 0 {
                0
            } else {
                self.block_info_locked(cache, span.index - 1, self.full_window())?
                    .start_index
            };
            return Ok(MultiBlockRange::empty(anchor));
        }

        let start = self.block_info_locked(cache, span.index, self.full_window())?;
        let last_index = span.end() - 1;
        let end_window = Span::new(start.block_index, self.blocks.len() - start.block_index);
        let end = self.block_info_locked(cache, last_index, end_window)?;

        let block_count = end.block_index - start.block_index + 1;
        let mut ranges = Vec::with_capacity(block_count);
        let mut current_start = start.start_index;
        for i in start.block_index..=end.block_index {
            let len = self.blocks.get(i).len();
            let sub_index = if i == start.block_index {
                span.index - current_start
            } else {
                0
            };
            let count = (len - sub_index).min(last_index - current_start - sub_index + 1);
            ranges.push(BlockRange::new(sub_index, count, current_start));
            current_start += len;
        }

        Ok(MultiBlockRange::new(start.block_index, block_count, ranges))
    }
}

impl<T, S: BlockStore<T>> std::fmt::Debug for BlockMap<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.lock();
        f.debug_struct("BlockMap")
            .field("blocks", &self.blocks.len())
            .field("first_changed", &cache.first_changed)
            .field("cached_entries", &cache.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balancer::FixedBalancer;

    /// Blocks `[[0,1,2,3],[4,5,6,7],[8,9]]`.
    fn seeded_map() -> BlockMap<u32> {
        let mut blocks = BlockCollection::new().with_block_sizes(4, 8);
        blocks.add_vec((0..10u32).collect());
        BlockMap::new(Arc::new(FixedBalancer::new(4, 8)), blocks)
    }

    fn empty_map() -> BlockMap<u32> {
        BlockMap::new(
            Arc::new(FixedBalancer::new(4, 8)),
            BlockCollection::new().with_block_sizes(4, 8),
        )
    }

    #[test]
    fn test_block_info_resolves_each_block() {
        let map = seeded_map();
        assert_eq!(map.block_info(0).unwrap(), BlockInfo::new(0, 0, 4));
        assert_eq!(map.block_info(5).unwrap(), BlockInfo::new(1, 4, 4));
        assert_eq!(map.block_info(8).unwrap(), BlockInfo::new(2, 8, 2));
        assert_eq!(map.block_info(9).unwrap(), BlockInfo::new(2, 8, 2));
    }

    #[test]
    fn test_block_info_past_end_fails() {
        let map = seeded_map();
        assert!(map.block_info(10).is_err());
        assert!(map.block_info(100).is_err());
    }

    #[test]
    fn test_empty_chain_has_no_addressable_index() {
        let map = empty_map();
        assert!(map.block_info(0).is_err());
        assert_eq!(map.cached_element_count(), 0);
        assert_eq!(map.cached_block_count(), 0);
    }

    #[test]
    fn test_linear_scan_extends_cache_incrementally() {
        let map = seeded_map();
        // Construction over a non-empty chain starts fully dirty.
        assert_eq!(map.cached_element_count(), 0);
        assert_eq!(map.cached_block_count(), 0);

        // Resolving inside block 1 caches blocks 0..=1.
        map.block_info(5).unwrap();
        assert_eq!(map.cached_block_count(), 2);
        assert_eq!(map.cached_element_count(), 8);

        // Resolving the last block caches the whole chain.
        map.block_info(9).unwrap();
        assert_eq!(map.cached_block_count(), 3);
        assert_eq!(map.cached_element_count(), 10);
    }

    #[test]
    fn test_cached_queries_hit_interpolation_path() {
        let map = seeded_map();
        map.block_info(9).unwrap();
        assert_eq!(map.cached_element_count(), 10);

        // Every index is now answered from the cached prefix.
        for index in 0..10 {
            let info = map.block_info(index).unwrap();
            assert!(info.contains(index), "index {index} vs {info:?}");
        }
        assert_eq!(map.cached_block_count(), 3);
    }

    #[test]
    fn test_failed_lookup_leaves_no_valid_garbage() {
        let map = seeded_map();
        assert!(map.block_info(42).is_err());
        // The scan seeded block 0 and appended entries past it, but only the
        // seeded entry counts as valid after a failed lookup.
        assert_eq!(map.cached_block_count(), 1);
        assert_eq!(map.cached_element_count(), 4);
        map.block_info(9).unwrap();
        assert_eq!(map.cached_element_count(), 10);
    }

    #[test]
    fn test_window_hint_narrows_search() {
        let map = seeded_map();
        map.block_info(9).unwrap();

        let info = map.block_info_within(5, Span::new(1, 2)).unwrap();
        assert_eq!(info, BlockInfo::new(1, 4, 4));

        // A window that excludes the containing block fails.
        assert!(map.block_info_within(5, Span::new(2, 1)).is_err());
        assert!(map.block_info_within(9, Span::new(0, 2)).is_err());

        // A window that is not a sub-range of the chain fails outright.
        assert!(map.block_info_within(5, Span::new(1, 5)).is_err());
    }

    #[test]
    fn test_data_changed_invalidates_suffix() {
        let mut map = seeded_map();
        map.block_info(9).unwrap();
        assert_eq!(map.cached_element_count(), 10);

        map.blocks_mut().block_mut(1).push(100);
        map.data_changed(1);
        assert_eq!(map.cached_block_count(), 1);
        assert_eq!(map.cached_element_count(), 4);

        // Lookups behind the watermark still hit the cache; beyond it the
        // map rescans live lengths.
        assert_eq!(map.block_info(3).unwrap(), BlockInfo::new(0, 0, 4));
        assert_eq!(map.block_info(8).unwrap(), BlockInfo::new(1, 4, 5));
        assert_eq!(map.block_info(10).unwrap(), BlockInfo::new(2, 9, 2));
        assert_eq!(map.cached_element_count(), 11);
    }

    #[test]
    fn test_data_changed_keeps_earlier_watermark() {
        let map = seeded_map();
        map.block_info(9).unwrap();
        map.data_changed(1);
        map.data_changed(2);
        assert_eq!(map.cached_block_count(), 1);
    }

    #[test]
    fn test_tail_removal_keeps_cache_clean() {
        let mut map = seeded_map();
        map.block_info(9).unwrap();

        let removed = map.blocks_mut().remove_at(2);
        assert_eq!(removed.len(), 2);
        map.data_changed_after_block_removal(2);

        // No earlier block was dirty, so the cache stays clean and the
        // entries for the removed tail are gone.
        assert_eq!(map.cached_block_count(), 2);
        assert_eq!(map.cached_element_count(), 8);
        assert_eq!(map.block_info(7).unwrap(), BlockInfo::new(1, 4, 4));
        assert!(map.block_info(8).is_err());
    }

    #[test]
    fn test_tail_removal_with_stale_entry_does_not_resurrect_it() {
        let mut map = seeded_map();
        map.block_info(9).unwrap();

        // Dirty the tail block, then remove it: the stale entry must not
        // come back to life when the watermark resets.
        map.data_changed(2);
        map.blocks_mut().remove_at(2);
        map.data_changed_after_block_removal(2);

        assert_eq!(map.cached_block_count(), 2);
        assert_eq!(map.cached_element_count(), 8);
        assert!(map.block_info(8).is_err());
    }

    #[test]
    fn test_mid_removal_degrades_to_data_changed() {
        let mut map = seeded_map();
        map.block_info(9).unwrap();

        map.blocks_mut().remove_at(1);
        map.data_changed_after_block_removal(1);

        assert_eq!(map.cached_block_count(), 1);
        assert_eq!(map.block_info(5).unwrap(), BlockInfo::new(1, 4, 2));
        assert!(map.block_info(6).is_err());
    }

    #[test]
    fn test_multi_block_range_tiles_blocks() {
        let map = seeded_map();
        let mbr = map.multi_block_range(Span::new(2, 8)).unwrap();
        assert_eq!(mbr.start_block, 0);
        assert_eq!(mbr.count, 3);
        assert_eq!(
            mbr.ranges,
            vec![
                BlockRange::new(2, 2, 0),
                BlockRange::new(0, 4, 4),
                BlockRange::new(0, 2, 8),
            ]
        );
        assert_eq!(mbr.element_count(), 8);
    }

    #[test]
    fn test_multi_block_range_single_block() {
        let map = seeded_map();
        let mbr = map.multi_block_range(Span::new(5, 2)).unwrap();
        assert_eq!(mbr.start_block, 1);
        assert_eq!(mbr.count, 1);
        assert_eq!(mbr.ranges, vec![BlockRange::new(1, 2, 4)]);
    }

    #[test]
    fn test_multi_block_range_empty_span() {
        let map = seeded_map();
        assert_eq!(
            map.multi_block_range(Span::new(0, 0)).unwrap(),
            MultiBlockRange::empty(0)
        );
        // A non-zero empty span anchors at the block holding the previous
        // element; at the very end of the array that is the last block.
        assert_eq!(
            map.multi_block_range(Span::new(4, 0)).unwrap(),
            MultiBlockRange::empty(0)
        );
        assert_eq!(
            map.multi_block_range(Span::new(10, 0)).unwrap(),
            MultiBlockRange::empty(8)
        );
    }

    #[test]
    fn test_multi_block_range_past_end_fails() {
        let map = seeded_map();
        assert!(map.multi_block_range(Span::new(2, 9)).is_err());
        assert!(map.multi_block_range(Span::new(10, 1)).is_err());
    }

    #[test]
    fn test_multi_block_range_spans_empty_interior_block() {
        let mut blocks = BlockCollection::new().with_block_sizes(4, 8);
        blocks.add_vec((0..4u32).collect());
        blocks.insert_new_block(1);
        blocks.add_vec((4..8u32).collect());
        let map = BlockMap::new(Arc::new(FixedBalancer::new(4, 8)), blocks);

        let mbr = map.multi_block_range(Span::new(0, 8)).unwrap();
        assert_eq!(mbr.count, 3);
        assert_eq!(
            mbr.ranges,
            vec![
                BlockRange::new(0, 4, 0),
                BlockRange::new(0, 0, 4),
                BlockRange::new(0, 4, 4),
            ]
        );
    }

    #[test]
    fn test_reverse_multi_block_range() {
        let map = seeded_map();
        let mbr = map.reverse_multi_block_range(Span::new(9, 5)).unwrap();
        assert_eq!(mbr.start_block, 2);
        assert_eq!(mbr.count, 2);
        assert_eq!(
            mbr.ranges,
            vec![BlockRange::new(1, 2, 8), BlockRange::new(3, 3, 4)]
        );
    }

    #[test]
    fn test_reverse_multi_block_range_full_array() {
        let map = seeded_map();
        let mbr = map.reverse_multi_block_range(Span::new(9, 10)).unwrap();
        assert_eq!(mbr.start_block, 2);
        assert_eq!(mbr.count, 3);
        assert_eq!(
            mbr.ranges,
            vec![
                BlockRange::new(1, 2, 8),
                BlockRange::new(3, 4, 4),
                BlockRange::new(3, 4, 0),
            ]
        );
    }

    #[test]
    fn test_reverse_multi_block_range_degenerate() {
        let map = seeded_map();
        assert_eq!(
            map.reverse_multi_block_range(Span::new(0, 0)).unwrap(),
            MultiBlockRange::empty(0)
        );
        // Walking 5 elements back from index 3 would step before the array.
        assert!(map.reverse_multi_block_range(Span::new(3, 5)).is_err());
    }

    #[test]
    fn test_reverse_empty_span_anchors_at_holding_block() {
        let map = seeded_map();
        // The anchor is the start index of the block holding the span's
        // (inclusive) last element, not a block ordinal.
        assert_eq!(
            map.reverse_multi_block_range(Span::new(5, 0)).unwrap(),
            MultiBlockRange::empty(4)
        );
        assert_eq!(
            map.reverse_multi_block_range(Span::new(9, 0)).unwrap(),
            MultiBlockRange::empty(8)
        );
        assert_eq!(
            map.reverse_multi_block_range(Span::new(3, 0)).unwrap(),
            MultiBlockRange::empty(0)
        );
    }

    #[test]
    fn test_single_empty_block_projections() {
        let mut map = empty_map();
        map.blocks_mut().add_new_block();
        map.data_changed(0);

        assert_eq!(map.blocks().len(), 1);
        assert_eq!(map.blocks().get(0).len(), 0);
        assert_eq!(
            map.multi_block_range(Span::new(0, 0)).unwrap(),
            MultiBlockRange::empty(0)
        );
        assert!(map.block_info(0).is_err());
    }

    #[test]
    fn test_balancer_is_stored_and_exposed() {
        let map = seeded_map();
        assert_eq!(map.balancer().default_block_size(), 4);
        assert_eq!(map.balancer().max_block_size(), 8);
    }
}
