//! # Nametag Server
//! A server-side engine that maintains a floating nametag overlay for every
//! tracked entity in a live simulation, and syncs each overlay's visibility,
//! position, and passenger attachment to the set of viewers currently allowed
//! to observe it.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod transport;

mod entity;
mod error;
mod events;
mod overlay;
mod registry;
mod scope;
mod server;
mod types;
mod vanish;

pub use entity::TrackedEntity;
pub use error::NameTagServerError;
pub use events::{IncomingEvent, IncomingEvents};
pub use overlay::{BehaviorSet, NameTag, TagBehavior, TagMeta, VisibilityState};
pub use registry::{DiagnosticsSnapshot, PassengerCache, TagRegistry};
pub use scope::may_observe;
pub use server::{BehaviorFactory, NameTagServer, ServerConfig};
pub use types::{EntityId, NetworkId, Position, WorldId};
pub use vanish::{VanishBridge, VanishDriver};
