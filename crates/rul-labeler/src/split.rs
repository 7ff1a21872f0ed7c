//! Time-Series Aware Dataset Split
//!
//! Whole units go to one side so no engine's history leaks across the split.

use tracing::debug;

/// Default last unit id of the training side (FD001 has 100 units)
pub const DEFAULT_TRAIN_CUTOFF: u32 = 80;

/// Unit-id split: `unit_id <= cutoff` trains, the rest evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSplit {
    cutoff: u32,
}

impl UnitSplit {
    /// Create a split at the given cutoff
    pub fn new(cutoff: u32) -> Self {
        Self { cutoff }
    }

    /// The configured cutoff
    pub fn cutoff(&self) -> u32 {
        self.cutoff
    }

    /// Whether a unit belongs to the training side
    pub fn is_train(&self, unit_id: u32) -> bool {
        unit_id <= self.cutoff
    }

    /// Partition items into (train, test), preserving order
    pub fn split<T: Clone>(&self, items: &[T], unit_of: impl Fn(&T) -> u32) -> (Vec<T>, Vec<T>) {
        let (train, test): (Vec<T>, Vec<T>) = items
            .iter()
            .cloned()
            .partition(|item| self.is_train(unit_of(item)));
        debug!(
            "Split at unit {}: {} train, {} test",
            self.cutoff,
            train.len(),
            test.len()
        );
        (train, test)
    }
}

impl Default for UnitSplit {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIN_CUTOFF)
    }
}
