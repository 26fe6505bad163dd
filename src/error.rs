use thiserror::Error;

use crate::transport::SendError;

/// Failures surfaced by the engine. None of these interrupt an operation:
/// sends are fire-and-forget, so errors are recorded and drained by the host
/// at its leisure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameTagServerError {
    #[error("outbound packet dropped: {0}")]
    Send(#[from] SendError),
}
