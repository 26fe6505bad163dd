/// Full reload: every tag is destroyed and rebuilt from scratch, behavior
/// hooks fire, viewers come back through a forced remove-then-add with a
/// passenger resend, and one metadata refresh goes out per tag.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use nametag_server::transport::{PacketChannel, TransportOp};
use nametag_server::{
    EntityId, NameTagServer, NetworkId, Position, ServerConfig, TagBehavior, TrackedEntity,
    WorldId,
};

fn server() -> (NameTagServer, Receiver<TransportOp>) {
    let (sender, receiver) = PacketChannel::unbounded();
    (NameTagServer::new(ServerConfig::default(), sender), receiver)
}

fn player(id: u64, world: u32) -> TrackedEntity {
    TrackedEntity::new(
        EntityId::new(id),
        NetworkId::new(id as u32),
        WorldId::new(world),
        Position::new(0.0, 64.0, 0.0),
        1.8,
    )
}

struct Hooks {
    attaches: Arc<AtomicUsize>,
    destroys: Arc<AtomicUsize>,
}

impl TagBehavior for Hooks {
    fn on_attach(&mut self, _owner: EntityId) {
        self.attaches.fetch_add(1, Ordering::SeqCst);
    }
    fn on_detach(&mut self, _owner: EntityId) {}
    fn on_destroy(&mut self, _owner: EntityId) {
        self.destroys.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn reload_rebuilds_tags_with_fresh_display_ids() {
    let (mut server, receiver) = server();
    server.handle_join(player(1, 0));
    server.handle_join(player(2, 0));

    let old_ids: Vec<NetworkId> = [1u64, 2]
        .iter()
        .map(|id| {
            server
                .registry()
                .get(&EntityId::new(*id))
                .unwrap()
                .display_id()
        })
        .collect();
    receiver.try_iter().count();

    server.reload_all();

    for (index, id) in [1u64, 2].iter().enumerate() {
        let tag = server.registry().get(&EntityId::new(*id)).unwrap();
        assert_ne!(tag.display_id(), old_ids[index]);
    }

    let ops: Vec<TransportOp> = receiver.try_iter().collect();
    let despawns = ops
        .iter()
        .filter(|op| matches!(op, TransportOp::Despawn { .. }))
        .count();
    let spawns = ops
        .iter()
        .filter(|op| matches!(op, TransportOp::Spawn { .. }))
        .count();
    assert_eq!(despawns, 2);
    assert_eq!(spawns, 2);
}

#[test]
fn reload_readmits_viewers_and_refreshes_metadata() {
    let (mut server, receiver) = server();
    server.handle_join(player(1, 0));
    server.handle_join(player(2, 0));
    receiver.try_iter().count();

    server.reload_all();

    let a = server.registry().get(&EntityId::new(1)).unwrap();
    let b = server.registry().get(&EntityId::new(2)).unwrap();
    assert!(a.has_viewer(&EntityId::new(2)));
    assert!(b.has_viewer(&EntityId::new(1)));

    let ops: Vec<TransportOp> = receiver.try_iter().collect();
    for viewer in [EntityId::new(1), EntityId::new(2)] {
        // Forced remove-then-add so the transport re-spawns client-side
        let remove_index = ops
            .iter()
            .position(|op| matches!(op, TransportOp::RemoveViewer { viewer: v, .. } if *v == viewer))
            .expect("forced remove");
        let add_index = ops
            .iter()
            .position(|op| matches!(op, TransportOp::AddViewer { viewer: v, .. } if *v == viewer))
            .expect("re-add");
        assert!(remove_index < add_index);
        assert!(ops
            .iter()
            .any(|op| matches!(op, TransportOp::SetPassengers { viewer: v, .. } if *v == viewer)));
    }
    let metadata_refreshes = ops
        .iter()
        .filter(|op| matches!(op, TransportOp::SetMetadata { .. }))
        .count();
    assert_eq!(metadata_refreshes, 2);
}

#[test]
fn reload_runs_behavior_lifecycle() {
    let (mut server, _receiver) = server();
    let attaches = Arc::new(AtomicUsize::new(0));
    let destroys = Arc::new(AtomicUsize::new(0));
    let (attaches_in, destroys_in) = (attaches.clone(), destroys.clone());
    server.set_behavior_factory(Box::new(move |_owner| {
        vec![Box::new(Hooks {
            attaches: attaches_in.clone(),
            destroys: destroys_in.clone(),
        }) as Box<dyn TagBehavior>]
    }));

    server.handle_join(player(1, 0));
    assert_eq!(attaches.load(Ordering::SeqCst), 1);

    server.reload_all();

    // Old behavior destroyed exactly once despite the double teardown path,
    // new behavior attached for the rebuilt tag
    assert_eq!(destroys.load(Ordering::SeqCst), 1);
    assert_eq!(attaches.load(Ordering::SeqCst), 2);
}

#[test]
fn reload_preserves_hidden_state_from_the_entity_condition() {
    let (mut server, receiver) = server();
    server.handle_join(player(1, 0));
    server.handle_join(player(2, 0));
    server.handle_visibility_change(EntityId::new(1), false, true);
    receiver.try_iter().count();

    server.reload_all();

    let tag = server.registry().get(&EntityId::new(1)).unwrap();
    assert!(tag.is_hidden());
    assert_eq!(tag.meta().view_range, 0.0);
    // Viewers are still admitted; the zeroed view range is what hides it
    assert!(tag.has_viewer(&EntityId::new(2)));
}

#[test]
fn reload_leaves_disabled_owners_inert() {
    let (mut server, receiver) = server();
    server.handle_join(player(1, 0));
    server.handle_join(player(2, 0));
    server.toggle(EntityId::new(1));
    receiver.try_iter().count();

    server.reload_all();

    assert!(server.registry().get(&EntityId::new(1)).is_none());
    assert!(server.registry().is_disabled(&EntityId::new(1)));
    // The other tag came back fine
    assert!(server
        .registry()
        .get(&EntityId::new(2))
        .unwrap()
        .has_viewer(&EntityId::new(1)));
}
