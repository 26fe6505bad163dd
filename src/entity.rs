use crate::types::{EntityId, NetworkId, Position, WorldId};

/// Snapshot of a simulation participant, fed in through inbound events and
/// kept current by the server. This engine never mutates the simulation's own
/// state; it only mirrors the fields it needs for admission and positioning.
#[derive(Clone, Debug)]
pub struct TrackedEntity {
    id: EntityId,
    network_id: NetworkId,
    world: WorldId,
    position: Position,
    bounding_box_height: f64,
    invisible: bool,
    invisibility_effect: bool,
    passengers: Vec<NetworkId>,
}

impl TrackedEntity {
    pub fn new(
        id: EntityId,
        network_id: NetworkId,
        world: WorldId,
        position: Position,
        bounding_box_height: f64,
    ) -> Self {
        Self {
            id,
            network_id,
            world,
            position,
            bounding_box_height,
            invisible: false,
            invisibility_effect: false,
            passengers: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn world(&self) -> WorldId {
        self.world
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Observable passenger list, in mount order.
    pub fn passengers(&self) -> &[NetworkId] {
        &self.passengers
    }

    pub fn set_passengers(&mut self, passengers: Vec<NetworkId>) {
        self.passengers = passengers;
    }

    pub fn set_invisible(&mut self, invisible: bool) {
        self.invisible = invisible;
    }

    pub fn set_invisibility_effect(&mut self, effect: bool) {
        self.invisibility_effect = effect;
    }

    pub(crate) fn set_world(&mut self, world: WorldId) {
        self.world = world;
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// True while the owner should not have a detectable nametag: either the
    /// simulation's invisible flag or an active invisibility effect.
    pub fn is_hidden_condition(&self) -> bool {
        self.invisible || self.invisibility_effect
    }

    /// Where the owner's nametag belongs right now: the owner's position with
    /// `y` raised to the top of the bounding box, orientation zeroed.
    pub fn tag_position(&self) -> Position {
        let mut position = self.position.billboard();
        position.y += self.bounding_box_height;
        position
    }
}
