//! Watch-group partitioning

use crate::market::Instrument;

/// Contiguous slice of the filtered universe scanned in one pass.
///
/// Membership is fixed when the group is built.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchGroup {
    /// Zero-based position within the rotation
    pub index: usize,
    pub instruments: Vec<Instrument>,
}

impl WatchGroup {
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

/// Group size used for `len` instruments: `max(min_group_size, len / num_groups)`
pub fn group_size(len: usize, min_group_size: usize, num_groups: usize) -> usize {
    (len / num_groups.max(1)).max(min_group_size).max(1)
}

/// Split an ordered list into contiguous groups; the last may be smaller
pub fn partition(
    instruments: Vec<Instrument>,
    min_group_size: usize,
    num_groups: usize,
) -> Vec<WatchGroup> {
    let size = group_size(instruments.len(), min_group_size, num_groups);
    instruments
        .chunks(size)
        .enumerate()
        .map(|(index, chunk)| WatchGroup {
            index,
            instruments: chunk.to_vec(),
        })
        .collect()
}
