//! Fixed-size, order-preserving partitioning of the pending list

use std::num::NonZeroUsize;

/// Default maximum number of items per chunk
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(n) => n,
    None => unreachable!(),
};

/// Contiguous chunks of at most `size` items; only the last may be shorter.
///
/// Lazy and `Clone`, so the same partition can be walked again.
pub fn chunk_items<T>(items: &[T], size: NonZeroUsize) -> std::slice::Chunks<'_, T> {
    items.chunks(size.get())
}

/// Number of chunks [`chunk_items`] yields for `len` items.
pub const fn chunk_count(len: usize, size: NonZeroUsize) -> usize {
    len.div_ceil(size.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn partition_properties() {
        for len in [0usize, 1, 2, 3, 7, 10, 11, 1000, 1001] {
            let items: Vec<usize> = (0..len).collect();
            for size in [1usize, 2, 3, 10, 1000] {
                let chunks: Vec<&[usize]> = chunk_items(&items, nz(size)).collect();

                assert_eq!(chunks.len(), len.div_ceil(size), "len={len} size={size}");
                assert_eq!(chunks.len(), chunk_count(len, nz(size)));
                assert_eq!(chunks.concat(), items, "len={len} size={size}");
                if let Some((last, full)) = chunks.split_last() {
                    assert!(full.iter().all(|c| c.len() == size));
                    assert!(!last.is_empty() && last.len() <= size);
                }
            }
        }
    }

    #[test]
    fn three_items_by_two() {
        let items = ["a", "b", "c"];
        let chunks: Vec<_> = chunk_items(&items, nz(2)).collect();
        assert_eq!(chunks, [&["a", "b"][..], &["c"][..]]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let items: [u8; 0] = [];
        assert_eq!(chunk_items(&items, nz(5)).count(), 0);
        assert_eq!(chunk_count(0, nz(5)), 0);
    }

    #[test]
    fn restartable() {
        let items: Vec<u32> = (0..9).collect();
        let chunks = chunk_items(&items, nz(4));
        let first: Vec<_> = chunks.clone().collect();
        let second: Vec<_> = chunks.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn default_size() {
        assert_eq!(DEFAULT_CHUNK_SIZE.get(), 1000);
    }
}
