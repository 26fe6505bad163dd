use std::collections::HashMap;

use crate::types::{EntityId, NetworkId};

/// Last-sent passenger lists, keyed by owner. Entries are written by an
/// external mount subsystem that also rides on the owner's passenger list;
/// this engine returns an existing entry verbatim (it may carry ids the
/// engine knows nothing about and must not drop) and only derives a list
/// itself when no entry exists.
pub struct PassengerCache {
    entries: HashMap<EntityId, Vec<NetworkId>>,
}

impl PassengerCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, owner: &EntityId) -> Option<&[NetworkId]> {
        self.entries.get(owner).map(Vec::as_slice)
    }

    /// External subsystems record what they last put on the wire here.
    pub fn set(&mut self, owner: EntityId, passengers: Vec<NetworkId>) {
        self.entries.insert(owner, passengers);
    }

    /// Only called when the owner itself leaves the simulation.
    pub(crate) fn remove(&mut self, owner: &EntityId) {
        self.entries.remove(owner);
    }
}

impl Default for PassengerCache {
    fn default() -> Self {
        Self::new()
    }
}
