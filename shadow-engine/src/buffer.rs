//! Fixed-capacity bar history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use shadow_domain::Bar;

/// Ring buffer of the most recent bars, oldest first.
///
/// # Invariants
/// - `len() <= capacity()`
/// - Bars are strictly increasing in time; `push` drops bars that are not
///   newer than the newest one held
#[derive(Debug, Clone)]
pub struct BarBuffer {
    bars: VecDeque<Bar>,
    capacity: usize,
}

impl BarBuffer {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            bars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.bars.len() == self.capacity
    }

    /// Time of the newest bar held.
    pub fn last_time(&self) -> Option<DateTime<Utc>> {
        self.bars.back().map(|b| b.time)
    }

    pub fn latest(&self) -> Option<&Bar> {
        self.bars.back()
    }

    /// Append a bar, evicting the oldest when full.
    ///
    /// Returns `false` if the bar was not newer than the newest held.
    pub fn push(&mut self, bar: Bar) -> bool {
        if let Some(last) = self.last_time() {
            if bar.time <= last {
                return false;
            }
        }
        if self.bars.len() == self.capacity {
            self.bars.pop_front();
        }
        self.bars.push_back(bar);
        true
    }

    /// Push every bar in order; returns how many were accepted.
    pub fn extend<I: IntoIterator<Item = Bar>>(&mut self, bars: I) -> usize {
        let mut accepted = 0;
        for bar in bars {
            if self.push(bar) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Contiguous view, oldest first.
    pub fn as_slice(&mut self) -> &[Bar] {
        self.bars.make_contiguous()
    }

    pub fn clear(&mut self) {
        self.bars.clear();
    }
}
