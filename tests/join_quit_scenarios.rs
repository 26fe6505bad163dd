/// Join/quit scenarios: tag creation on join, viewer admission between
/// entities sharing a world, teardown on quit, and the quiescent-state
/// admission invariant.

use std::sync::mpsc::Receiver;

use nametag_server::transport::{PacketChannel, TransportOp};
use nametag_server::{
    may_observe, EntityId, NameTagServer, NetworkId, Position, ServerConfig, TrackedEntity, WorldId,
};

fn server(config: ServerConfig) -> (NameTagServer, Receiver<TransportOp>) {
    let (sender, receiver) = PacketChannel::unbounded();
    (NameTagServer::new(config, sender), receiver)
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

fn viewer_sets_satisfy_admission(server: &NameTagServer) {
    for tag in server.registry().tags() {
        let owner = server.entity(&tag.owner()).expect("tracked owner");
        let disabled = server.registry().is_disabled(&tag.owner());
        for viewer in tag.viewers() {
            let viewer = server.entity(viewer).expect("tracked viewer");
            assert!(
                may_observe(
                    viewer,
                    owner,
                    disabled,
                    server.config().show_self,
                    server.vanish()
                ),
                "viewer {:?} held without admission on {:?}",
                viewer.id(),
                owner.id()
            );
        }
    }
}

#[test]
fn lone_join_creates_tag_with_empty_viewer_set() {
    let (mut server, receiver) = server(ServerConfig::default());

    server.handle_join(player(1, 0));

    let tag = server.registry().get(&EntityId::new(1)).unwrap();
    assert!(tag.viewers().is_empty());

    let ops: Vec<TransportOp> = receiver.try_iter().collect();
    assert!(matches!(ops[0], TransportOp::Spawn { .. }));
    assert_eq!(ops.len(), 1);
}

#[test]
fn second_join_cross_admits_with_one_passenger_packet_each() {
    let (mut server, receiver) = server(ServerConfig::default());

    server.handle_join(player(1, 0));
    receiver.try_iter().count();

    server.handle_join(player(2, 0));

    let a = server.registry().get(&EntityId::new(1)).unwrap();
    let b = server.registry().get(&EntityId::new(2)).unwrap();
    assert!(a.has_viewer(&EntityId::new(2)));
    assert!(b.has_viewer(&EntityId::new(1)));

    let ops: Vec<TransportOp> = receiver.try_iter().collect();
    let packets_to = |viewer: EntityId| {
        ops.iter()
            .filter(|op| matches!(op, TransportOp::SetPassengers { viewer: v, .. } if *v == viewer))
            .count()
    };
    assert_eq!(packets_to(EntityId::new(1)), 1);
    assert_eq!(packets_to(EntityId::new(2)), 1);

    viewer_sets_satisfy_admission(&server);
}

#[test]
fn different_worlds_do_not_admit() {
    let (mut server, _receiver) = server(ServerConfig::default());

    server.handle_join(player(1, 0));
    server.handle_join(player(2, 1));

    assert!(server
        .registry()
        .get(&EntityId::new(1))
        .unwrap()
        .viewers()
        .is_empty());
    assert!(server
        .registry()
        .get(&EntityId::new(2))
        .unwrap()
        .viewers()
        .is_empty());
}

#[test]
fn world_change_moves_viewer_sets() {
    let (mut server, _receiver) = server(ServerConfig::default());

    server.handle_join(player(1, 0));
    server.handle_join(player(2, 1));

    server.handle_world_change(EntityId::new(2), WorldId::new(0), Position::new(1.0, 64.0, 1.0));

    assert!(server
        .registry()
        .get(&EntityId::new(1))
        .unwrap()
        .has_viewer(&EntityId::new(2)));
    assert!(server
        .registry()
        .get(&EntityId::new(2))
        .unwrap()
        .has_viewer(&EntityId::new(1)));
    viewer_sets_satisfy_admission(&server);

    server.handle_world_change(EntityId::new(2), WorldId::new(1), Position::new(1.0, 64.0, 1.0));

    assert!(server
        .registry()
        .get(&EntityId::new(1))
        .unwrap()
        .viewers()
        .is_empty());
    assert!(server
        .registry()
        .get(&EntityId::new(2))
        .unwrap()
        .viewers()
        .is_empty());
    viewer_sets_satisfy_admission(&server);
}

#[test]
fn quit_destroys_tag_and_leaves_no_stale_viewer() {
    let (mut server, receiver) = server(ServerConfig::default());

    server.handle_join(player(1, 0));
    server.handle_join(player(2, 0));
    receiver.try_iter().count();

    server.handle_quit(EntityId::new(2));

    assert!(server.registry().get(&EntityId::new(2)).is_none());
    assert!(server
        .registry()
        .get(&EntityId::new(1))
        .unwrap()
        .viewers()
        .is_empty());

    let ops: Vec<TransportOp> = receiver.try_iter().collect();
    assert!(ops
        .iter()
        .any(|op| matches!(op, TransportOp::Despawn { .. })));
    assert!(ops.iter().any(
        |op| matches!(op, TransportOp::RemoveViewer { viewer, .. } if *viewer == EntityId::new(2))
    ));
}

#[test]
fn show_self_admits_owner_as_viewer() {
    let (mut server, receiver) = server(ServerConfig {
        show_self: true,
    });

    server.handle_join(player(1, 0));

    let tag = server.registry().get(&EntityId::new(1)).unwrap();
    assert!(tag.has_viewer(&EntityId::new(1)));

    let ops: Vec<TransportOp> = receiver.try_iter().collect();
    assert!(ops.iter().any(
        |op| matches!(op, TransportOp::SetPassengers { viewer, .. } if *viewer == EntityId::new(1))
    ));
    viewer_sets_satisfy_admission(&server);
}

#[test]
fn replayed_join_is_idempotent() {
    let (mut server, receiver) = server(ServerConfig::default());

    server.handle_join(player(1, 0));
    server.handle_join(player(2, 0));
    receiver.try_iter().count();

    server.handle_join(player(2, 0));

    let ops: Vec<TransportOp> = receiver.try_iter().collect();
    assert!(!ops
        .iter()
        .any(|op| matches!(op, TransportOp::AddViewer { .. })));
    assert_eq!(server.registry().len(), 2);
    viewer_sets_satisfy_admission(&server);
}

#[test]
fn diagnostics_counts_track_registry_state() {
    let (mut server, _receiver) = server(ServerConfig::default());

    server.handle_join(player(1, 0));
    server.handle_join(player(2, 0));

    let snapshot = server.diagnostics();
    assert_eq!(snapshot.total_tags, 2);
    assert_eq!(snapshot.owner_index_size, 2);
    assert_eq!(snapshot.display_index_size, 2);
    assert_eq!(snapshot.network_index_size, 2);
    assert_eq!(snapshot.viewers.len(), 2);
    assert_eq!(
        snapshot.viewers[0],
        (EntityId::new(1), vec![EntityId::new(2)])
    );

    server.handle_quit(EntityId::new(2));
    let snapshot = server.diagnostics();
    assert_eq!(snapshot.total_tags, 1);
    assert_eq!(snapshot.display_index_size, 1);
    assert_eq!(snapshot.network_index_size, 1);
}
