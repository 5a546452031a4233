use std::collections::BTreeMap;
use std::io::BufRead;

use crate::huffman::{
    Symbol,
    error::{CodecError, Result},
};

if_tracing! {
    use tracing::debug;
}

/// Occurrence count of every symbol seen in a stream.
///
/// Iteration is in ascending symbol order. The tree builder enqueues leaves in
/// that order, so two maps with equal contents always produce the same tree.
///
/// The sum of all counts always fits in a `u64`, which bounds every node
/// frequency of a tree built from the map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyMap {
    counts: BTreeMap<Symbol, u64>,
    total: u64,
}

impl FrequencyMap {
    /// Counts every byte of `input`, once per occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Io`] if the stream fails mid-read.
    pub fn count<R: BufRead>(input: R) -> Result<Self> {
        let mut counts = [0u64; 256];
        for byte in input.bytes() {
            counts[byte? as usize] += 1;
        }

        let map = Self::from_counts(counts.iter().enumerate().map(|(symbol, &count)| (symbol as Symbol, count)))
            .ok_or(CodecError::Overflow("symbol count"))?;

        if_tracing! {{
            debug!(distinct = map.len(), symbols = map.total(), "count pass complete");
        }}
        Ok(map)
    }

    pub fn get(&self, symbol: Symbol) -> Option<u64> {
        self.counts.get(&symbol).copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of symbols counted.
    pub const fn total(&self) -> u64 {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts.iter().map(|(&symbol, &count)| (symbol, count))
    }

    /// Accumulates `(symbol, count)` pairs. Zero counts are dropped so every
    /// key present in the map really occurs.
    ///
    /// Returns `None` if the counts sum past `u64::MAX`.
    pub fn from_counts<I: IntoIterator<Item = (Symbol, u64)>>(iter: I) -> Option<Self> {
        let mut counts = BTreeMap::new();
        let mut total = 0u64;
        for (symbol, count) in iter {
            if count > 0 {
                total = total.checked_add(count)?;
                *counts.entry(symbol).or_insert(0) += count;
            }
        }
        Some(Self { counts, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_repeats() {
        let map = FrequencyMap::count(&b"aaabbc"[..]).unwrap();
        assert_eq!(map.get(b'a'), Some(3));
        assert_eq!(map.get(b'b'), Some(2));
        assert_eq!(map.get(b'c'), Some(1));
        assert_eq!(map.get(b'd'), None);
        assert_eq!(map.len(), 3);
        assert_eq!(map.total(), 6);
    }

    #[test]
    fn empty_stream_is_empty_map() {
        let map = FrequencyMap::count(&b""[..]).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.total(), 0);
    }

    #[test]
    fn iterates_in_symbol_order() {
        let map = FrequencyMap::count(&b"zyxzy\x00"[..]).unwrap();
        let symbols: Vec<Symbol> = map.iter().map(|(s, _)| s).collect();
        assert_eq!(symbols, vec![0, b'x', b'y', b'z']);
    }

    #[test]
    fn from_counts_drops_zeros_and_merges() {
        let map = FrequencyMap::from_counts([(b'a', 2), (b'b', 0), (b'a', 3)]).unwrap();
        assert_eq!(map.get(b'a'), Some(5));
        assert_eq!(map.get(b'b'), None);
        assert_eq!(map.total(), 5);
    }

    #[test]
    fn from_counts_rejects_overflowing_total() {
        assert!(FrequencyMap::from_counts([(b'a', u64::MAX), (b'b', 1)]).is_none());
        assert!(FrequencyMap::from_counts([(b'a', u64::MAX), (b'b', 0)]).is_some());
    }

    #[test]
    fn read_failure_is_reported() {
        struct Failing;
        impl std::io::Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("disk on fire"))
            }
        }

        let err = FrequencyMap::count(std::io::BufReader::new(Failing)).unwrap_err();
        assert!(matches!(err, CodecError::Io(_)));
    }
}
