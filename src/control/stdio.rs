//! Stdio I/O for the control channel.
//!
//! The control channel to the companion server runs over stdio, one
//! encoded parameter line per message.
//!
//! # Important
//!
//! - **stdout**: control lines only (one per write, flushed immediately —
//!   the peer waits for the complete line)
//! - **stderr**: logs and debug output (never parsed by the peer)
//! - **Never use `println!`**: it may add `\r\n` on Windows

use std::io::Write;

use crate::error::Result;

use super::line::{InterprocessFrame, LineCodec};

/// Write an already-encoded control line to stdout and flush.
///
/// The line is written verbatim; [`LineCodec::encode`] output already
/// carries its terminating `\n`.
///
/// # Errors
///
/// Returns an IO error if the write or flush fails.
pub fn write_control_line(line: &[u8]) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(line)?;
    handle.flush()?;
    Ok(())
}

/// Encode `frame` with [`LineCodec`] and write it to stdout.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn write_control_frame(frame: &InterprocessFrame) -> Result<()> {
    write_control_line(&LineCodec::encode(frame))?;
    Ok(())
}
