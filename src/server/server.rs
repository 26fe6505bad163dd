use std::collections::HashMap;
use std::mem;

use log::{info, warn};

use crate::entity::TrackedEntity;
use crate::error::NameTagServerError;
use crate::events::{IncomingEvent, IncomingEvents};
use crate::overlay::TagBehavior;
use crate::registry::{DiagnosticsSnapshot, PassengerCache, TagRegistry};
use crate::scope::may_observe;
use crate::server::ServerConfig;
use crate::transport::{PacketSender, SendError};
use crate::types::{EntityId, NetworkId, Position, WorldId};
use crate::vanish::{VanishBridge, VanishDriver};

/// Builds the behavior set attached to a freshly created nametag.
pub type BehaviorFactory = Box<dyn Fn(EntityId) -> Vec<Box<dyn TagBehavior>>>;

/// The engine facade: owns the entity table, the tag registry, the vanish
/// bridge, and the boxed transport, and applies inbound events to them in
/// observation order. Single-threaded by contract; every operation runs to
/// completion without suspending, and all sends are fire-and-forget.
pub struct NameTagServer {
    config: ServerConfig,
    entities: HashMap<EntityId, TrackedEntity>,
    registry: TagRegistry,
    vanish: VanishBridge,
    io: Box<dyn PacketSender>,
    behavior_factory: Option<BehaviorFactory>,
    errors: Vec<NameTagServerError>,
}

impl NameTagServer {
    pub fn new(config: ServerConfig, io: Box<dyn PacketSender>) -> Self {
        Self {
            config,
            entities: HashMap::new(),
            registry: TagRegistry::new(),
            vanish: VanishBridge::new(),
            io,
            behavior_factory: None,
            errors: Vec::new(),
        }
    }

    /// Hand over the external stealth subsystem, if one was detected at
    /// startup. Without it, vanish queries fail closed.
    pub fn install_vanish_driver(&mut self, driver: Box<dyn VanishDriver>) {
        self.vanish.install_driver(driver);
    }

    pub fn set_behavior_factory(&mut self, factory: BehaviorFactory) {
        self.behavior_factory = Some(factory);
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn vanish(&self) -> &VanishBridge {
        &self.vanish
    }

    pub fn entity(&self, id: &EntityId) -> Option<&TrackedEntity> {
        self.entities.get(id)
    }

    /// Shared with the external mount subsystem, which records what it last
    /// put on the wire here.
    pub fn passenger_cache_mut(&mut self) -> &mut PassengerCache {
        self.registry.passenger_cache_mut()
    }

    /// Send failures recorded since the last call.
    pub fn take_errors(&mut self) -> Vec<NameTagServerError> {
        mem::take(&mut self.errors)
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.registry.diagnostics()
    }

    /// Drain the inbound queue, dispatching each event to its handler in the
    /// order the events were observed.
    pub fn process_events(&mut self, events: &mut IncomingEvents) {
        while let Some(event) = events.pop() {
            match event {
                IncomingEvent::Join(entity) => self.handle_join(entity),
                IncomingEvent::Quit(entity) => self.handle_quit(entity),
                IncomingEvent::WorldChange {
                    entity,
                    world,
                    position,
                } => self.handle_world_change(entity, world, position),
                IncomingEvent::VisibilityChange {
                    entity,
                    invisible,
                    invisibility_effect,
                } => self.handle_visibility_change(entity, invisible, invisibility_effect),
                IncomingEvent::VanishHide(entity) => self.handle_vanish_hide(entity),
                IncomingEvent::VanishShow(entity) => self.handle_vanish_show(entity),
                IncomingEvent::Toggle(entity) => {
                    self.toggle(entity);
                }
                IncomingEvent::Reload => self.reload_all(),
            }
        }
    }

    // Event handlers

    pub fn handle_join(&mut self, entity: TrackedEntity) {
        let owner = entity.id();
        self.entities.insert(owner, entity);

        if self.ensure_tag(owner) {
            self.recompute_viewers(owner);
        }

        // The joiner may now observe tags that already existed
        let others: Vec<EntityId> = self
            .registry
            .owners()
            .filter(|other| **other != owner)
            .copied()
            .collect();
        for other in others {
            self.consider_single_viewer(other, owner);
        }
    }

    pub fn handle_quit(&mut self, owner: EntityId) {
        self.destroy_tag(owner);
        self.entities.remove(&owner);
        self.vanish.clear_vanished(&owner);

        // The quitter stops being a viewer everywhere
        let others: Vec<(EntityId, NetworkId)> = self
            .registry
            .tags()
            .filter(|tag| tag.has_viewer(&owner))
            .map(|tag| (tag.owner(), tag.display_id()))
            .collect();
        for (other, display_id) in others {
            if let Some(tag) = self.registry.get_mut(&other) {
                tag.take_viewer(&owner);
            }
            Self::record(&mut self.errors, self.io.remove_viewer(display_id, owner));
        }
    }

    pub fn handle_world_change(&mut self, owner: EntityId, world: WorldId, position: Position) {
        let Some(entity) = self.entities.get_mut(&owner) else {
            return;
        };
        entity.set_world(world);
        entity.set_position(position);
        let tag_position = entity.tag_position();

        if let Some(tag) = self.registry.get_mut(&owner) {
            tag.set_position(tag_position);
        }
        self.recompute_viewers(owner);

        // The mover's eligibility toward every other tag changed too
        let others: Vec<EntityId> = self
            .registry
            .owners()
            .filter(|other| **other != owner)
            .copied()
            .collect();
        for other in others {
            self.consider_single_viewer(other, owner);
        }
    }

    pub fn handle_visibility_change(
        &mut self,
        owner: EntityId,
        invisible: bool,
        invisibility_effect: bool,
    ) {
        let Some(entity) = self.entities.get_mut(&owner) else {
            return;
        };
        entity.set_invisible(invisible);
        entity.set_invisibility_effect(invisibility_effect);
        let hidden = entity.is_hidden_condition();

        let Some(tag) = self.registry.get_mut(&owner) else {
            return;
        };
        if tag.update_visibility(hidden) {
            let display_id = tag.display_id();
            let meta = *tag.meta();
            Self::record(&mut self.errors, self.io.set_metadata(display_id, &meta));
        }
    }

    /// The stealth subsystem hid `target`. Evict exactly the viewers that can
    /// no longer see it; no passenger resend is needed, removal alone stops
    /// delivery.
    pub fn handle_vanish_hide(&mut self, target: EntityId) {
        self.vanish.mark_vanished(target);

        let Some(tag) = self.registry.get(&target) else {
            return;
        };
        let display_id = tag.display_id();
        let mut to_remove = Vec::new();
        for viewer in tag.viewers() {
            if *viewer == target {
                continue;
            }
            if !self.vanish.can_see(viewer, &target) {
                to_remove.push(*viewer);
            }
        }

        for viewer in to_remove {
            if let Some(tag) = self.registry.get_mut(&target) {
                tag.take_viewer(&viewer);
            }
            Self::record(&mut self.errors, self.io.remove_viewer(display_id, viewer));
        }
    }

    /// The stealth subsystem revealed `target`. Every eligible viewer gets a
    /// forced remove-then-add plus a passenger resend: the remove makes the
    /// transport treat the add as a fresh spawn, which clients that never
    /// held the overlay require.
    pub fn handle_vanish_show(&mut self, target: EntityId) {
        self.vanish.clear_vanished(&target);

        let Some(entity) = self.entities.get(&target).cloned() else {
            return;
        };
        if !self.registry.contains(&target) {
            return;
        }
        let disabled = self.registry.is_disabled(&target);
        let tag_position = entity.tag_position();

        let display_id = {
            let tag = self.registry.get_mut(&target).unwrap();
            tag.set_position(tag_position);
            tag.display_id()
        };

        let mut eligible = Vec::new();
        for viewer in self.entities.values() {
            if may_observe(viewer, &entity, disabled, self.config.show_self, &self.vanish) {
                eligible.push(viewer.id());
            }
        }

        for viewer in eligible {
            if let Some(tag) = self.registry.get_mut(&target) {
                tag.take_viewer(&viewer);
                tag.insert_viewer(viewer);
            }
            Self::record(&mut self.errors, self.io.remove_viewer(display_id, viewer));
            Self::record(&mut self.errors, self.io.add_viewer(display_id, viewer));
            self.send_passenger_packet(target, viewer);
        }
    }

    // Operational surface

    /// Flip the disabled flag for `owner`, returning the new value.
    ///
    /// Disabling despawns the tag for every current viewer but leaves the
    /// registry entry alive in inert form, so toggling back on is cheap.
    /// Re-enabling respawns, recomputes visibility, and re-admits every
    /// eligible viewer unless the owner is currently hidden by the
    /// invisibility condition, in which case viewers return on their own
    /// when the condition clears.
    pub fn toggle(&mut self, owner: EntityId) -> bool {
        let now_disabled = self.registry.toggle_disabled(owner);
        if now_disabled {
            if let Some(tag) = self.registry.get_mut(&owner) {
                let display_id = tag.display_id();
                tag.clear_viewers();
                Self::record(&mut self.errors, self.io.despawn(display_id));
            }
        } else {
            self.enable(owner);
        }
        now_disabled
    }

    fn enable(&mut self, owner: EntityId) {
        let Some(entity) = self.entities.get(&owner).cloned() else {
            return;
        };
        let existed = self.registry.contains(&owner);
        if !self.ensure_tag(owner) {
            return;
        }
        let hidden = entity.is_hidden_condition();
        let tag_position = entity.tag_position();

        let (display_id, position) = {
            let tag = self.registry.get_mut(&owner).unwrap();
            tag.set_position(tag_position);
            (tag.display_id(), tag.position())
        };
        if existed {
            // The inert entry was despawned on disable; announce it again
            Self::record(&mut self.errors, self.io.spawn(display_id, position));
        }

        self.registry
            .get_mut(&owner)
            .unwrap()
            .update_visibility(hidden);

        if !hidden {
            self.recompute_viewers(owner);
        }

        // One metadata refresh at the end, transition or not
        let meta = *self.registry.get(&owner).unwrap().meta();
        Self::record(&mut self.errors, self.io.set_metadata(display_id, &meta));
    }

    /// Destroy and recreate every tracked owner's tag from scratch, then
    /// re-admit all eligible viewers with a forced remove-then-add and a
    /// passenger resend. Externally-owned appearance configuration only takes
    /// effect through full reconstruction, and client-side passenger state is
    /// known to drift over long uptimes; recreation with resend covers both.
    pub fn reload_all(&mut self) {
        info!("reloading all nametags");

        // Behavior teardown happens for every tag before any is rebuilt
        let owners: Vec<EntityId> = self.registry.owners().copied().collect();
        for owner in &owners {
            if let Some(tag) = self.registry.get_mut(owner) {
                tag.behaviors_mut().destroy();
            }
        }

        let tracked: Vec<EntityId> = self.entities.keys().copied().collect();
        for owner in tracked {
            self.destroy_tag(owner);
            if !self.ensure_tag(owner) {
                // Disabled owners stay inert
                continue;
            }
            let Some(entity) = self.entities.get(&owner).cloned() else {
                continue;
            };
            let tag_position = entity.tag_position();
            let display_id = {
                let tag = self.registry.get_mut(&owner).unwrap();
                tag.set_position(tag_position);
                tag.display_id()
            };

            let mut eligible = Vec::new();
            for viewer in self.entities.values() {
                if may_observe(viewer, &entity, false, self.config.show_self, &self.vanish) {
                    eligible.push(viewer.id());
                }
            }
            for viewer in eligible {
                if let Some(tag) = self.registry.get_mut(&owner) {
                    tag.take_viewer(&viewer);
                    tag.insert_viewer(viewer);
                }
                Self::record(&mut self.errors, self.io.remove_viewer(display_id, viewer));
                Self::record(&mut self.errors, self.io.add_viewer(display_id, viewer));
                self.send_passenger_packet(owner, viewer);
            }

            let hidden = entity.is_hidden_condition();
            self.registry
                .get_mut(&owner)
                .unwrap()
                .update_visibility(hidden);
            let meta = *self.registry.get(&owner).unwrap().meta();
            Self::record(&mut self.errors, self.io.set_metadata(display_id, &meta));
        }
    }

    // Internals

    /// Make sure a tag exists for `owner` if one is allowed to. Returns
    /// whether a tag exists afterwards. Creation spawns the overlay and, with
    /// `show_self` on, immediately admits the owner as its own viewer.
    fn ensure_tag(&mut self, owner: EntityId) -> bool {
        let Some(entity) = self.entities.get(&owner).cloned() else {
            return false;
        };
        let behaviors = match &self.behavior_factory {
            Some(factory) => factory(owner),
            None => Vec::new(),
        };
        let (created, display_id, position) = match self.registry.get_or_create(&entity, behaviors)
        {
            None => return false,
            Some((created, tag)) => (created, tag.display_id(), tag.position()),
        };
        if created {
            Self::record(&mut self.errors, self.io.spawn(display_id, position));
            if self.config.show_self {
                self.registry.get_mut(&owner).unwrap().insert_viewer(owner);
                Self::record(&mut self.errors, self.io.add_viewer(display_id, owner));
                self.send_passenger_packet(owner, owner);
            }
        }
        true
    }

    fn destroy_tag(&mut self, owner: EntityId) {
        let Some(mut tag) = self.registry.remove(&owner) else {
            return;
        };
        Self::record(&mut self.errors, self.io.despawn(tag.display_id()));
        tag.behaviors_mut().destroy();
    }

    /// Re-derive the full viewer set for `owner`'s tag and issue the minimal
    /// add/remove deltas. The passenger packet is resent to every admitted
    /// viewer, not only newly admitted ones: client-side passenger state is
    /// the least reliable piece of protocol state.
    fn recompute_viewers(&mut self, owner: EntityId) {
        let Some(owner_entity) = self.entities.get(&owner).cloned() else {
            return;
        };
        let disabled = self.registry.is_disabled(&owner);
        let Some(tag) = self.registry.get(&owner) else {
            return;
        };
        let display_id = tag.display_id();

        let mut admitted = Vec::new();
        for viewer in self.entities.values() {
            if may_observe(
                viewer,
                &owner_entity,
                disabled,
                self.config.show_self,
                &self.vanish,
            ) {
                admitted.push(viewer.id());
            }
        }

        let mut to_remove = Vec::new();
        for viewer in tag.viewers() {
            if !admitted.contains(viewer) {
                to_remove.push(*viewer);
            }
        }
        let mut to_add = Vec::new();
        for viewer in &admitted {
            if !tag.has_viewer(viewer) {
                to_add.push(*viewer);
            }
        }

        if let Some(tag) = self.registry.get_mut(&owner) {
            for viewer in &to_remove {
                tag.take_viewer(viewer);
            }
            for viewer in &to_add {
                tag.insert_viewer(*viewer);
            }
        }
        for viewer in &to_remove {
            Self::record(&mut self.errors, self.io.remove_viewer(display_id, *viewer));
        }
        for viewer in &to_add {
            Self::record(&mut self.errors, self.io.add_viewer(display_id, *viewer));
        }
        for viewer in admitted {
            self.send_passenger_packet(owner, viewer);
        }
    }

    /// Targeted admission check of one viewer against one tag, issuing the
    /// single add or remove (plus passenger resend on add) it implies.
    fn consider_single_viewer(&mut self, owner: EntityId, viewer: EntityId) {
        let Some(owner_entity) = self.entities.get(&owner).cloned() else {
            return;
        };
        let Some(viewer_entity) = self.entities.get(&viewer).cloned() else {
            return;
        };
        let disabled = self.registry.is_disabled(&owner);
        let Some(tag) = self.registry.get(&owner) else {
            return;
        };
        let display_id = tag.display_id();
        let has = tag.has_viewer(&viewer);
        let eligible = may_observe(
            &viewer_entity,
            &owner_entity,
            disabled,
            self.config.show_self,
            &self.vanish,
        );

        if eligible && !has {
            self.registry.get_mut(&owner).unwrap().insert_viewer(viewer);
            Self::record(&mut self.errors, self.io.add_viewer(display_id, viewer));
            self.send_passenger_packet(owner, viewer);
        } else if !eligible && has {
            self.registry.get_mut(&owner).unwrap().take_viewer(&viewer);
            Self::record(&mut self.errors, self.io.remove_viewer(display_id, viewer));
        }
    }

    /// Overwrite `viewer`'s client-side view of the owner's passenger list.
    /// Safe to call repeatedly; each send fully replaces the previous state.
    fn send_passenger_packet(&mut self, owner: EntityId, viewer: EntityId) {
        let Some(entity) = self.entities.get(&owner) else {
            return;
        };
        let Some(tag) = self.registry.get(&owner) else {
            return;
        };
        let list = self.registry.passenger_list(entity, tag);
        let vehicle = entity.network_id();
        Self::record(&mut self.errors, self.io.set_passengers(viewer, vehicle, &list));
    }

    fn record(errors: &mut Vec<NameTagServerError>, result: Result<(), SendError>) {
        if let Err(err) = result {
            warn!("Server Error: outbound packet dropped: {}", err);
            errors.push(NameTagServerError::Send(err));
        }
    }
}
