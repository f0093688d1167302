use thiserror::Error;

/// Errors raised by chain operations. Out-of-range angles and actions are
/// clamped, never reported here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArmError {
    #[error("expected {expected} joint angles (one per link), got {got}")]
    ArgumentCount { expected: usize, got: usize },
}

/// Device-channel failures.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device channel is closed")]
    Closed,

    #[error("device channel returned no acknowledgement line")]
    EmptyReply,

    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),
}
