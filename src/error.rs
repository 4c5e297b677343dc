//! Error types for streamwire.

use thiserror::Error;

/// Main error type for the fallible outer surfaces: the transport endpoint
/// and control-channel I/O.
///
/// The codec core never returns errors. The memory serializer reports
/// through its sticky status, the network serializer silently drops
/// malformed datagrams, and the frame builders reject chunks by boolean —
/// the transport is lossy by assumption and "drop and continue" is the
/// whole error policy down there.
#[derive(Debug, Error)]
pub enum StreamwireError {
    /// I/O error on a socket or stdio handle.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame or message violated the protocol's preconditions.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The completed-frame channel was closed by its receiver.
    #[error("frame channel closed")]
    ChannelClosed,
}

/// Result type alias using [`StreamwireError`].
pub type Result<T> = std::result::Result<T, StreamwireError>;
