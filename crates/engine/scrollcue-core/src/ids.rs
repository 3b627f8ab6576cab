//! Identifiers and simple allocators for engine entities.

use serde::{Deserialize, Serialize};

/// Dense index of a registered element. Valid until the next teardown.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// One visibility watcher per distinct resolved threshold.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct WatcherId(pub u32);

/// Handle of a scheduled task.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl ElementId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Monotonic allocator for ElementId and WatcherId.
///
/// Reset on every teardown so element ids stay dense indices into the
/// engine's record table. Task ids live in the scheduler and never reset.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_element: u32,
    next_watcher: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_element(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element = self.next_element.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_watcher(&mut self) -> WatcherId {
        let id = WatcherId(self.next_watcher);
        self.next_watcher = self.next_watcher.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
