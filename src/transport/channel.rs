use std::sync::mpsc::{channel, Receiver, Sender};

use super::{PacketSender, SendError};
use crate::overlay::TagMeta;
use crate::types::{EntityId, NetworkId, Position};

/// One outbound operation, as observed by whoever drains the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOp {
    Spawn {
        tag: NetworkId,
        position: Position,
    },
    Despawn {
        tag: NetworkId,
    },
    SetMetadata {
        tag: NetworkId,
        view_range: f32,
        invisible: bool,
    },
    SetPassengers {
        viewer: EntityId,
        vehicle: NetworkId,
        passengers: Vec<NetworkId>,
    },
    AddViewer {
        tag: NetworkId,
        viewer: EntityId,
    },
    RemoveViewer {
        tag: NetworkId,
        viewer: EntityId,
    },
}

pub struct PacketChannel;

impl PacketChannel {
    pub fn unbounded() -> (Box<dyn PacketSender>, Receiver<TransportOp>) {
        let (sender, receiver) = channel();
        (Box::new(ChannelSender { sender }), receiver)
    }
}

struct ChannelSender {
    sender: Sender<TransportOp>,
}

impl ChannelSender {
    fn push(&mut self, op: TransportOp) -> Result<(), SendError> {
        self.sender.send(op).map_err(|_| SendError)
    }
}

impl PacketSender for ChannelSender {
    fn spawn(&mut self, tag: NetworkId, position: Position) -> Result<(), SendError> {
        self.push(TransportOp::Spawn { tag, position })
    }

    fn despawn(&mut self, tag: NetworkId) -> Result<(), SendError> {
        self.push(TransportOp::Despawn { tag })
    }

    fn set_metadata(&mut self, tag: NetworkId, meta: &TagMeta) -> Result<(), SendError> {
        self.push(TransportOp::SetMetadata {
            tag,
            view_range: meta.view_range,
            invisible: meta.invisible,
        })
    }

    fn set_passengers(
        &mut self,
        viewer: EntityId,
        vehicle: NetworkId,
        passengers: &[NetworkId],
    ) -> Result<(), SendError> {
        self.push(TransportOp::SetPassengers {
            viewer,
            vehicle,
            passengers: passengers.to_vec(),
        })
    }

    fn add_viewer(&mut self, tag: NetworkId, viewer: EntityId) -> Result<(), SendError> {
        self.push(TransportOp::AddViewer { tag, viewer })
    }

    fn remove_viewer(&mut self, tag: NetworkId, viewer: EntityId) -> Result<(), SendError> {
        self.push(TransportOp::RemoveViewer { tag, viewer })
    }
}
