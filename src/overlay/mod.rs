pub(crate) mod behavior;
pub(crate) mod overlay;
pub(crate) mod visibility;

pub use behavior::*;
pub use overlay::*;
pub use visibility::*;
