//! Watch-group rotation

use crate::universe::WatchGroup;

/// Groups of the current universe plus the cursor of the next group to scan.
///
/// The group list is replaced wholesale on refresh, never edited in place.
#[derive(Debug, Default)]
pub struct Rotation {
    groups: Vec<WatchGroup>,
    cursor: usize,
}

impl Rotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when there are no groups or a full rotation has completed
    pub fn needs_refresh(&self) -> bool {
        self.groups.is_empty() || self.cursor == 0
    }

    /// Install freshly partitioned groups and restart at the first one
    pub fn replace(&mut self, groups: Vec<WatchGroup>) {
        self.groups = groups;
        self.cursor = 0;
    }

    /// Group the next pass should scan
    pub fn current(&self) -> Option<&WatchGroup> {
        self.groups.get(self.cursor)
    }

    /// Move to the next group, wrapping to the first
    pub fn advance(&mut self) {
        if self.groups.is_empty() {
            self.cursor = 0;
        } else {
            self.cursor = (self.cursor + 1) % self.groups.len();
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
