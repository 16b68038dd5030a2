//! Identifiers and simple allocators for tracked elements and engine states.

use serde::{Deserialize, Serialize};

/// Stable identity of a DOM element as seen by the runtime.
///
/// Adapters map their native element references onto these ids; every
/// per-element table in the runtime is keyed by them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Opaque handle to a mounted engine state (one per animated element).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct EngineHandle(pub u32);

/// Monotonic allocator for ElementId and EngineHandle.
/// Ids are never reused within one allocator, so a stale id cannot alias a new element.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_element: u32,
    next_handle: u32,
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
    pub fn alloc_handle(&mut self) -> EngineHandle {
        let id = EngineHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        id
    }
}
