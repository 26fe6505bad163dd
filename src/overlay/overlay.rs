use std::collections::HashSet;

use super::{BehaviorSet, VisibilityState};
use crate::types::{EntityId, NetworkId, Position};

/// Wire-visible overlay metadata.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct TagMeta {
    pub view_range: f32,
    pub invisible: bool,
}

impl TagMeta {
    pub const DEFAULT_VIEW_RANGE: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            view_range: Self::DEFAULT_VIEW_RANGE,
            invisible: false,
        }
    }
}

impl Default for TagMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// The synthetic nametag overlay bound to one tracked entity. Pure state:
/// all outbound traffic is issued by the server, which mutates this through
/// crate-public accessors so the viewer set always mirrors what was sent.
pub struct NameTag {
    owner: EntityId,
    display_id: NetworkId,
    position: Position,
    meta: TagMeta,
    visibility: VisibilityState,
    viewers: HashSet<EntityId>,
    behaviors: BehaviorSet,
}

impl NameTag {
    pub(crate) fn new(
        owner: EntityId,
        display_id: NetworkId,
        position: Position,
        behaviors: BehaviorSet,
    ) -> Self {
        Self {
            owner,
            display_id,
            position,
            meta: TagMeta::new(),
            visibility: VisibilityState::new(),
            viewers: HashSet::new(),
            behaviors,
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Id of the synthetic overlay entity in the transport id space.
    pub fn display_id(&self) -> NetworkId {
        self.display_id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn meta(&self) -> &TagMeta {
        &self.meta
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility.is_hidden()
    }

    /// Drive the hidden/visible state machine. Returns true when metadata
    /// changed and needs to go out.
    pub(crate) fn update_visibility(&mut self, hidden_condition: bool) -> bool {
        self.visibility.apply(hidden_condition, &mut self.meta)
    }

    pub fn viewers(&self) -> &HashSet<EntityId> {
        &self.viewers
    }

    pub fn has_viewer(&self, viewer: &EntityId) -> bool {
        self.viewers.contains(viewer)
    }

    pub(crate) fn insert_viewer(&mut self, viewer: EntityId) -> bool {
        self.viewers.insert(viewer)
    }

    pub(crate) fn take_viewer(&mut self, viewer: &EntityId) -> bool {
        self.viewers.remove(viewer)
    }

    pub(crate) fn clear_viewers(&mut self) {
        self.viewers.clear();
    }

    pub fn behaviors(&self) -> &BehaviorSet {
        &self.behaviors
    }

    pub(crate) fn behaviors_mut(&mut self) -> &mut BehaviorSet {
        &mut self.behaviors
    }
}
