use std::collections::HashSet;

use log::info;

use crate::types::EntityId;

/// Seam to an external stealth subsystem. When one is installed it is the
/// authority on per-viewer visibility of vanished entities.
pub trait VanishDriver {
    fn can_see(&self, viewer: &EntityId, target: &EntityId) -> bool;
}

/// Adapter between this engine and an optional stealth subsystem. Tracks
/// which entities currently carry a vanish marker (mirrored from inbound
/// hide/show events) and answers mutual-visibility queries, falling back to a
/// fail-closed answer when no driver is installed: a vanished identity must
/// not leak just because nobody authoritative is around to ask.
pub struct VanishBridge {
    driver: Option<Box<dyn VanishDriver>>,
    vanished: HashSet<EntityId>,
}

impl VanishBridge {
    pub fn new() -> Self {
        Self {
            driver: None,
            vanished: HashSet::new(),
        }
    }

    pub fn install_driver(&mut self, driver: Box<dyn VanishDriver>) {
        info!("stealth subsystem detected, vanish queries will be delegated");
        self.driver = Some(driver);
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    pub fn is_vanished(&self, entity: &EntityId) -> bool {
        self.vanished.contains(entity)
    }

    pub(crate) fn mark_vanished(&mut self, entity: EntityId) {
        self.vanished.insert(entity);
    }

    pub(crate) fn clear_vanished(&mut self, entity: &EntityId) {
        self.vanished.remove(entity);
    }

    /// A non-vanished target is visible to everyone. A vanished target is
    /// whatever the driver says, or invisible to all when no driver exists.
    pub fn can_see(&self, viewer: &EntityId, target: &EntityId) -> bool {
        if !self.is_vanished(target) {
            return true;
        }
        match &self.driver {
            Some(driver) => driver.can_see(viewer, target),
            None => false,
        }
    }
}

impl Default for VanishBridge {
    fn default() -> Self {
        Self::new()
    }
}
