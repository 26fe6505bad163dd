use std::default::Default;

/// Contains Config properties which will be used by the Server
#[derive(Clone)]
pub struct ServerConfig {
    /// Determines whether an owner receives its own nametag as a viewer.
    pub show_self: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { show_self: false }
    }
}
