// EntityId

/// Stable identifier of a tracked entity, unique for the lifetime of the
/// simulation (survives world changes and reconnects).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

// NetworkId

/// Identifier in the transport layer's numeric id space. Both simulation
/// entities and synthetic overlay entities are addressed by these on the wire.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct NetworkId(u32);

impl NetworkId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn to_u32(&self) -> u32 {
        self.0
    }
}

// WorldId

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct WorldId(u32);

impl WorldId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }
}

// Position

/// A point in a world, with orientation. Overlay positions are always
/// billboarded: `yaw` and `pitch` are zeroed regardless of owner facing.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Same point with orientation zeroed.
    pub fn billboard(&self) -> Self {
        Self {
            x: self.x,
            y: self.y,
            z: self.z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}
