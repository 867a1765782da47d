//! Instruction history ring buffer.
//!
//! Pure observability: when enabled, the dispatch loop appends one record
//! per executed instruction. Recording has no effect on execution.

use serde::{Deserialize, Serialize};

/// One executed (or faulted) instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistEntry {
    /// Program counter of the instruction.
    pub rc: u32,
    /// The instruction word.
    pub op: u32,
    /// Effective address.
    pub ea: u32,
    /// Selected index register before execution.
    pub xr: u32,
    /// First operand.
    pub ra: u32,
    /// Second operand.
    pub rb: u32,
    /// Result written back.
    pub rr: u32,
    pub carry: bool,
    pub overflow: bool,
    pub exec: bool,
    pub mode: u8,
}

/// Fixed-capacity ring of [`HistEntry`]. Capacity zero disables recording.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistEntry>,
    next: usize,
    capacity: usize,
}

impl History {
    /// Create a disabled history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable recording with room for `capacity` entries, discarding any
    /// previous contents. Zero disables.
    pub fn resize(&mut self, capacity: usize) {
        self.entries.clear();
        self.next = 0;
        self.capacity = capacity;
    }

    /// True if recording is enabled.
    pub fn enabled(&self) -> bool {
        self.capacity > 0
    }

    /// Append an entry, evicting the oldest once full.
    pub fn push(&mut self, entry: HistEntry) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() < self.capacity {
            self.entries.push(entry);
        } else {
            self.entries[self.next] = entry;
        }
        self.next = (self.next + 1) % self.capacity;
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently pushed entry, so the executor can patch in the
    /// result and effective address as they become known.
    pub fn last_mut(&mut self) -> Option<&mut HistEntry> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = (self.next + self.capacity - 1) % self.capacity;
        self.entries.get_mut(idx)
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &HistEntry> {
        let split = if self.entries.len() == self.capacity {
            self.next
        } else {
            0
        };
        let (tail, head) = self.entries.split_at(split);
        head.iter().chain(tail.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rc: u32) -> HistEntry {
        HistEntry {
            rc,
            ..HistEntry::default()
        }
    }

    #[test]
    fn test_disabled_records_nothing() {
        let mut h = History::new();
        h.push(entry(1));
        assert!(h.is_empty());
        assert!(!h.enabled());
    }

    #[test]
    fn test_ring_wraps_oldest_first() {
        let mut h = History::new();
        h.resize(3);
        for rc in 0..5 {
            h.push(entry(rc));
        }
        assert_eq!(h.len(), 3);
        let rcs: Vec<u32> = h.iter().map(|e| e.rc).collect();
        assert_eq!(rcs, vec![2, 3, 4]);
    }

    #[test]
    fn test_partial_fill_in_order() {
        let mut h = History::new();
        h.resize(8);
        for rc in 0..3 {
            h.push(entry(rc));
        }
        let rcs: Vec<u32> = h.iter().map(|e| e.rc).collect();
        assert_eq!(rcs, vec![0, 1, 2]);
    }
}
