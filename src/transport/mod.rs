mod channel;

pub use channel::{PacketChannel, TransportOp};

use thiserror::Error;

use crate::overlay::TagMeta;
use crate::types::{EntityId, NetworkId, Position};

/// The viewer connection the packet could not be handed to is gone or full.
/// Delivery is fire-and-forget; callers log and move on.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("failed to hand packet to the transport layer")]
pub struct SendError;

/// Outbound surface this engine drives. Implementations serialize and deliver;
/// this engine never awaits or retries, and viewer-set membership is driven by
/// membership events rather than delivery feedback.
pub trait PacketSender {
    /// Announce the synthetic overlay entity to the transport layer.
    fn spawn(&mut self, tag: NetworkId, position: Position) -> Result<(), SendError>;

    /// Withdraw the synthetic overlay entity for every viewer holding it.
    fn despawn(&mut self, tag: NetworkId) -> Result<(), SendError>;

    /// Broadcast current overlay metadata (view range, hidden flag) to the
    /// overlay's current viewers.
    fn set_metadata(&mut self, tag: NetworkId, meta: &TagMeta) -> Result<(), SendError>;

    /// Overwrite one viewer's client-side view of `vehicle`'s passenger list.
    fn set_passengers(
        &mut self,
        viewer: EntityId,
        vehicle: NetworkId,
        passengers: &[NetworkId],
    ) -> Result<(), SendError>;

    /// Begin delivering overlay state to `viewer` (spawns it client-side).
    fn add_viewer(&mut self, tag: NetworkId, viewer: EntityId) -> Result<(), SendError>;

    /// Stop delivering overlay state to `viewer` (despawns it client-side).
    fn remove_viewer(&mut self, tag: NetworkId, viewer: EntityId) -> Result<(), SendError>;
}
