pub(crate) mod passengers;
pub(crate) mod registry;

pub use passengers::*;
pub use registry::*;
