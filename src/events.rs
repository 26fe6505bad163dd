use std::collections::VecDeque;

use crate::entity::TrackedEntity;
use crate::types::{EntityId, Position, WorldId};

/// One inbound fact about the simulation, in the order it was observed.
pub enum IncomingEvent {
    Join(TrackedEntity),
    Quit(EntityId),
    WorldChange {
        entity: EntityId,
        world: WorldId,
        position: Position,
    },
    VisibilityChange {
        entity: EntityId,
        invisible: bool,
        invisibility_effect: bool,
    },
    VanishHide(EntityId),
    VanishShow(EntityId),
    Toggle(EntityId),
    Reload,
}

/// FIFO queue of inbound events. A single queue rather than per-kind buckets:
/// the engine guarantees that operations on a given overlay apply in the
/// order their triggering events were observed, across kinds.
pub struct IncomingEvents {
    queue: VecDeque<IncomingEvent>,
}

impl IncomingEvents {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn push(&mut self, event: IncomingEvent) {
        self.queue.push_back(event);
    }

    pub fn push_join(&mut self, entity: TrackedEntity) {
        self.push(IncomingEvent::Join(entity));
    }

    pub fn push_quit(&mut self, entity: EntityId) {
        self.push(IncomingEvent::Quit(entity));
    }

    pub fn push_world_change(&mut self, entity: EntityId, world: WorldId, position: Position) {
        self.push(IncomingEvent::WorldChange {
            entity,
            world,
            position,
        });
    }

    pub fn push_visibility_change(
        &mut self,
        entity: EntityId,
        invisible: bool,
        invisibility_effect: bool,
    ) {
        self.push(IncomingEvent::VisibilityChange {
            entity,
            invisible,
            invisibility_effect,
        });
    }

    pub fn push_vanish_hide(&mut self, entity: EntityId) {
        self.push(IncomingEvent::VanishHide(entity));
    }

    pub fn push_vanish_show(&mut self, entity: EntityId) {
        self.push(IncomingEvent::VanishShow(entity));
    }

    pub fn push_toggle(&mut self, entity: EntityId) {
        self.push(IncomingEvent::Toggle(entity));
    }

    pub fn push_reload(&mut self) {
        self.push(IncomingEvent::Reload);
    }

    pub(crate) fn pop(&mut self) -> Option<IncomingEvent> {
        self.queue.pop_front()
    }
}

impl Default for IncomingEvents {
    fn default() -> Self {
        Self::new()
    }
}
