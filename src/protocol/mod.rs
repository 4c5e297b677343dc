//! Datagram plane — wire format, frame reassembly, and the network
//! serializer.
//!
//! This module implements the framing protocol of the datagram plane:
//! - bit-exact datagram and chunk headers ([`wire_format`])
//! - the application frame type ([`NetworkFrame`])
//! - per-frame reassembly (internal frame builders)
//! - the frame ⇄ datagram converter ([`NetworkSerializer`])

mod frame;
mod frame_builder;
mod serializer;
pub mod wire_format;

pub use frame::{NetworkFrame, DEFAULT_PRIORITY};
pub use serializer::NetworkSerializer;
pub use wire_format::{
    CHUNK_FLOW_SIZE, CHUNK_MASTER_HEADER_SIZE, CHUNK_MASTER_ID, CHUNK_MAX_SIZE,
    CHUNK_SLAVE_HEADER_SIZE, CHUNK_SLAVE_ID, CHUNK_TASK_SIZE, DATAGRAM_HEADER_SIZE,
    DATAGRAM_MAX_SIZE, DATAGRAM_PROTOCOL_VERSION, FRAME_MAX_SIZE,
};
