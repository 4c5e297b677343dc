//! Control plane — the line-oriented channel to the companion server.
//!
//! Messages are dictionaries of text parameters, serialized one per line
//! as unpadded-base64 `key=value` tokens ([`LineCodec`]) and exchanged
//! over stdio ([`write_control_frame`]).

mod line;
mod stdio;

pub use line::{InterprocessFrame, LineCodec};
pub use stdio::{write_control_frame, write_control_line};
