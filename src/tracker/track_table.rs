//! Authoritative mapping from identity to live track.

use std::collections::HashMap;

use crate::error::{FusionError, Result};
use crate::tracker::tracked_object::{Identity, TrackedObject};

/// The set of live tracks plus the session's display-index counter.
///
/// Holds at most one object per identity. `capacity` is the max-track
/// ceiling callers check with [`TrackTable::has_capacity`] before a birth.
/// Display indices come from a monotonic counter that only
/// [`TrackTable::reset`] rewinds.
#[derive(Debug, Clone)]
pub struct TrackTable {
    objects: HashMap<Identity, TrackedObject>,
    capacity: usize,
    next_display_index: u32,
}

impl TrackTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            objects: HashMap::with_capacity(capacity),
            capacity,
            next_display_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether another object may be inserted without exceeding the ceiling.
    pub fn has_capacity(&self) -> bool {
        self.objects.len() < self.capacity
    }

    pub fn get(&self, identity: &Identity) -> Option<&TrackedObject> {
        self.objects.get(identity)
    }

    pub(crate) fn get_mut(&mut self, identity: &Identity) -> Option<&mut TrackedObject> {
        self.objects.get_mut(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.objects.contains_key(identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.values()
    }

    /// Objects sorted by display index, the fixed enumeration order used within a frame.
    pub fn ordered(&self) -> Vec<&TrackedObject> {
        let mut objects: Vec<&TrackedObject> = self.objects.values().collect();
        objects.sort_by_key(|o| o.display_index);
        objects
    }

    /// Owned copy of the table in display order.
    pub fn snapshot(&self) -> Vec<TrackedObject> {
        self.ordered().into_iter().cloned().collect()
    }

    /// Hand out the next display index. Never returns the same value twice
    /// until the table is reset.
    pub fn allocate_display_index(&mut self) -> u32 {
        let index = self.next_display_index;
        self.next_display_index += 1;
        index
    }

    pub fn next_display_index(&self) -> u32 {
        self.next_display_index
    }

    pub(crate) fn insert(&mut self, object: TrackedObject) -> Result<()> {
        if self.objects.contains_key(&object.identity) {
            return Err(FusionError::DuplicateIdentity(object.identity));
        }
        self.objects.insert(object.identity, object);
        Ok(())
    }

    pub(crate) fn remove(&mut self, identity: &Identity) -> Option<TrackedObject> {
        self.objects.remove(identity)
    }

    /// Swap the object under `old` for `successor` in one step.
    ///
    /// Returns the removed object. Fails without touching the table when `old`
    /// is not tracked or the successor's identity is already in use.
    pub(crate) fn replace(&mut self, old: &Identity, successor: TrackedObject) -> Result<TrackedObject> {
        if successor.identity != *old && self.objects.contains_key(&successor.identity) {
            return Err(FusionError::DuplicateIdentity(successor.identity));
        }
        let previous = self
            .objects
            .remove(old)
            .ok_or(FusionError::UnknownIdentity(*old))?;
        self.objects.insert(successor.identity, successor);
        Ok(previous)
    }

    /// Drop every object and rewind the display-index counter.
    pub fn reset(&mut self) {
        self.objects.clear();
        self.next_display_index = 0;
    }
}
