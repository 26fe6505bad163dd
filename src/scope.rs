use crate::entity::TrackedEntity;
use crate::vanish::VanishBridge;

/// Whether `viewer` may currently observe `owner`'s nametag. Strict
/// conjunction: self-view rules, same world, tag not disabled, and the
/// vanish bridge allows it.
///
/// The owner's hidden (invisibility) state is deliberately not part of this
/// decision. A hidden tag keeps a zeroed view range instead, so admission can
/// stay stable while the condition flickers; it becomes visible again with no
/// viewer-set recomputation when the condition clears.
pub fn may_observe(
    viewer: &TrackedEntity,
    owner: &TrackedEntity,
    tag_disabled: bool,
    show_self: bool,
    vanish: &VanishBridge,
) -> bool {
    if viewer.id() == owner.id() && !show_self {
        return false;
    }
    if viewer.world() != owner.world() {
        return false;
    }
    if tag_disabled {
        return false;
    }
    vanish.can_see(&viewer.id(), &owner.id())
}
