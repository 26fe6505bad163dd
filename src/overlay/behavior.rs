use crate::types::EntityId;

/// A capability attached to a nametag at construction. The engine treats
/// behaviors as opaque: it only drives their lifecycle hooks during tag
/// create, destroy, and reload. What a behavior does between hooks is its
/// own business.
pub trait TagBehavior {
    fn on_attach(&mut self, owner: EntityId);
    fn on_detach(&mut self, owner: EntityId);
    fn on_destroy(&mut self, owner: EntityId);
}

/// The set of behaviors owned by one nametag.
pub struct BehaviorSet {
    owner: EntityId,
    behaviors: Vec<Box<dyn TagBehavior>>,
    destroyed: bool,
}

impl BehaviorSet {
    pub fn new(owner: EntityId, mut behaviors: Vec<Box<dyn TagBehavior>>) -> Self {
        for behavior in behaviors.iter_mut() {
            behavior.on_attach(owner);
        }
        Self {
            owner,
            behaviors,
            destroyed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// Detach and drop every behavior. Idempotent: a set destroyed twice runs
    /// its hooks once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        for behavior in self.behaviors.iter_mut() {
            behavior.on_detach(self.owner);
            behavior.on_destroy(self.owner);
        }
        self.behaviors.clear();
    }
}
