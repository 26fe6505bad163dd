use std::collections::{HashMap, HashSet};

use super::PassengerCache;
use crate::entity::TrackedEntity;
use crate::overlay::{BehaviorSet, NameTag, TagBehavior};
use crate::types::{EntityId, NetworkId};

// Synthetic display ids live in their own slice of the transport id space so
// they never collide with ids the simulation hands out. The base is
// randomized per process, matching how the id spaces drift apart in practice.
const DISPLAY_ID_FLOOR: u32 = 0x4000_0000;
const DISPLAY_ID_JITTER: u32 = 0x1000_0000;

struct DisplayIdAllocator {
    next: u32,
}

impl DisplayIdAllocator {
    fn new() -> Self {
        Self {
            next: DISPLAY_ID_FLOOR + fastrand::u32(0..DISPLAY_ID_JITTER),
        }
    }

    fn allocate(&mut self) -> NetworkId {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        NetworkId::new(id)
    }
}

/// Read-only counters and viewer dump for the operational surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    pub total_tags: usize,
    pub owner_index_size: usize,
    pub display_index_size: usize,
    pub network_index_size: usize,
    pub passenger_cache_size: usize,
    /// Per-tag viewer sets, sorted by owner for stable output.
    pub viewers: Vec<(EntityId, Vec<EntityId>)>,
}

/// Owns every live nametag and the indexes used to resolve one from whatever
/// identifier an external event happens to carry: owner id, synthetic display
/// id, or the owner's transport-layer numeric id. All three indexes are torn
/// down together on removal.
pub struct TagRegistry {
    tags: HashMap<EntityId, NameTag>,
    display_index: HashMap<NetworkId, EntityId>,
    network_index: HashMap<NetworkId, EntityId>,
    // Survives tag removal and quit/rejoin
    disabled: HashSet<EntityId>,
    passengers: PassengerCache,
    allocator: DisplayIdAllocator,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self {
            tags: HashMap::new(),
            display_index: HashMap::new(),
            network_index: HashMap::new(),
            disabled: HashSet::new(),
            passengers: PassengerCache::new(),
            allocator: DisplayIdAllocator::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, owner: &EntityId) -> bool {
        self.tags.contains_key(owner)
    }

    pub fn is_disabled(&self, owner: &EntityId) -> bool {
        self.disabled.contains(owner)
    }

    /// Flip the disabled flag, returning the new value. Does not touch the
    /// tag itself; the server drives the despawn/respawn that follows.
    pub fn toggle_disabled(&mut self, owner: EntityId) -> bool {
        if self.disabled.remove(&owner) {
            false
        } else {
            self.disabled.insert(owner);
            true
        }
    }

    /// Create a tag for `entity` if one does not exist and the owner is not
    /// disabled. Returns the tag either way it exists afterwards, plus
    /// whether this call created it. Returns `None` only when creation is
    /// suppressed by the disabled flag.
    pub fn get_or_create(
        &mut self,
        entity: &TrackedEntity,
        behaviors: Vec<Box<dyn TagBehavior>>,
    ) -> Option<(bool, &mut NameTag)> {
        let owner = entity.id();
        if self.tags.contains_key(&owner) {
            return Some((false, self.tags.get_mut(&owner).unwrap()));
        }
        if self.disabled.contains(&owner) {
            return None;
        }

        let display_id = self.allocator.allocate();
        let tag = NameTag::new(
            owner,
            display_id,
            entity.tag_position(),
            BehaviorSet::new(owner, behaviors),
        );
        self.display_index.insert(display_id, owner);
        self.network_index.insert(entity.network_id(), owner);
        self.tags.insert(owner, tag);

        Some((true, self.tags.get_mut(&owner).unwrap()))
    }

    pub fn get(&self, owner: &EntityId) -> Option<&NameTag> {
        self.tags.get(owner)
    }

    pub fn get_mut(&mut self, owner: &EntityId) -> Option<&mut NameTag> {
        self.tags.get_mut(owner)
    }

    /// Resolve a tag from its synthetic overlay id.
    pub fn by_display_id(&self, display_id: &NetworkId) -> Option<&NameTag> {
        self.display_index
            .get(display_id)
            .and_then(|owner| self.tags.get(owner))
    }

    /// Resolve a tag from its owner's transport-layer numeric id.
    pub fn by_network_id(&self, network_id: &NetworkId) -> Option<&NameTag> {
        self.network_index
            .get(network_id)
            .and_then(|owner| self.tags.get(owner))
    }

    /// Detach the tag from every index and hand it back. The disabled flag is
    /// left as-is so a disabled owner stays disabled across rejoin.
    pub fn remove(&mut self, owner: &EntityId) -> Option<NameTag> {
        let tag = self.tags.remove(owner)?;
        self.display_index.remove(&tag.display_id());
        self.network_index.retain(|_, mapped| mapped != owner);
        self.passengers.remove(owner);
        Some(tag)
    }

    pub fn owners(&self) -> impl Iterator<Item = &EntityId> {
        self.tags.keys()
    }

    pub fn tags(&self) -> impl Iterator<Item = &NameTag> {
        self.tags.values()
    }

    pub fn passenger_cache(&self) -> &PassengerCache {
        &self.passengers
    }

    pub fn passenger_cache_mut(&mut self) -> &mut PassengerCache {
        &mut self.passengers
    }

    /// The passenger list to put on the wire for `entity`'s tag: a cached
    /// entry verbatim if one exists, otherwise the entity's observable
    /// passengers with the tag's display id appended last.
    pub fn passenger_list(&self, entity: &TrackedEntity, tag: &NameTag) -> Vec<NetworkId> {
        if let Some(cached) = self.passengers.get(&entity.id()) {
            return cached.to_vec();
        }
        let mut list = entity.passengers().to_vec();
        list.push(tag.display_id());
        list
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        let mut viewers: Vec<(EntityId, Vec<EntityId>)> = self
            .tags
            .iter()
            .map(|(owner, tag)| {
                let mut set: Vec<EntityId> = tag.viewers().iter().copied().collect();
                set.sort();
                (*owner, set)
            })
            .collect();
        viewers.sort_by_key(|(owner, _)| *owner);

        DiagnosticsSnapshot {
            total_tags: self.tags.len(),
            owner_index_size: self.tags.len(),
            display_index_size: self.display_index.len(),
            network_index_size: self.network_index.len(),
            passenger_cache_size: self.passengers.len(),
            viewers,
        }
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}
