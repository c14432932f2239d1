//! Fixed-size batching over any iterator.

use std::num::NonZeroUsize;

/// Lazily groups an iterator into `Vec`s of at most `size` items.
///
/// Every batch but the last holds exactly `size` items. Order is preserved
/// and each item appears in exactly one batch. Only the batch being built
/// is held in memory.
#[derive(Debug)]
pub struct Batches<I> {
    inner: I,
    size: NonZeroUsize,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<I::Item> = self.inner.by_ref().take(self.size.get()).collect();
        if batch.is_empty() { None } else { Some(batch) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.inner.size_hint();
        let size = self.size.get();
        (lower.div_ceil(size), upper.map(|n| n.div_ceil(size)))
    }
}

/// Split `iter` into batches of at most `size` items.
pub fn batches<I: IntoIterator>(iter: I, size: NonZeroUsize) -> Batches<I::IntoIter> {
    Batches {
        inner: iter.into_iter(),
        size,
    }
}

/// Number of batches `len` items produce.
pub fn batch_count(len: usize, size: NonZeroUsize) -> usize {
    len.div_ceil(size.get())
}
