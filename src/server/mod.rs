pub(crate) mod server;
pub(crate) mod server_config;

pub use server::*;
pub use server_config::*;
