//! Pinned timezones
//!
//! The user's priority zones: at most `MAX_PINNED`, ordered, unique by id.

use std::collections::HashSet;

use log::debug;
use thiserror::Error;

use crate::timezones::Timezone;

/// Capacity of the pinned row
pub const MAX_PINNED: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinnedError {
    #[error("new order is not a permutation of the pinned timezones")]
    NotAPermutation,
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// List was full; nothing changed
    AtCapacity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedTimezoneList {
    zones: Vec<Timezone>,
}

impl PinnedTimezoneList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted data, dropping duplicate ids and anything past
    /// capacity
    pub fn from_saved(zones: Vec<Timezone>) -> Self {
        let mut seen = HashSet::new();
        let mut list = Vec::with_capacity(MAX_PINNED);
        for tz in zones {
            if list.len() == MAX_PINNED {
                debug!("Dropping pinned timezone {} beyond capacity", tz.id);
                continue;
            }
            if seen.insert(tz.id.clone()) {
                list.push(tz);
            }
        }
        Self { zones: list }
    }

    /// Remove if present, otherwise append unless full
    pub fn toggle(&mut self, timezone: &Timezone) -> ToggleOutcome {
        if let Some(pos) = self.position(&timezone.id) {
            self.zones.remove(pos);
            ToggleOutcome::Removed
        } else if self.is_full() {
            ToggleOutcome::AtCapacity
        } else {
            self.zones.push(timezone.clone());
            ToggleOutcome::Added
        }
    }

    /// Remove by id; no-op if absent
    pub fn remove(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.zones.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Replace the order wholesale. The sequence must hold exactly the pinned
    /// ids; otherwise the list is left untouched.
    pub fn reorder(&mut self, sequence: Vec<Timezone>) -> Result<(), PinnedError> {
        if !self.is_permutation(&sequence) {
            return Err(PinnedError::NotAPermutation);
        }
        self.zones = sequence;
        Ok(())
    }

    fn is_permutation(&self, sequence: &[Timezone]) -> bool {
        if sequence.len() != self.zones.len() {
            return false;
        }
        let mut seen = HashSet::new();
        sequence
            .iter()
            .all(|tz| self.contains(&tz.id) && seen.insert(tz.id.as_str()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.zones.iter().position(|tz| tz.id == id)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.zones.len() >= MAX_PINNED
    }

    pub fn as_slice(&self) -> &[Timezone] {
        &self.zones
    }

    pub fn ids(&self) -> Vec<&str> {
        self.zones.iter().map(|tz| tz.id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timezone> {
        self.zones.iter()
    }
}
