//! # streamwire
//!
//! Wire layer for a media-player client that receives a remote video
//! stream fragmented into UDP-sized datagrams, reassembles the original
//! application frames, and drives a companion server over a line-oriented
//! control channel.
//!
//! ## Architecture
//!
//! - **Datagram plane**: variable-size frames are split into size-bounded
//!   chunks, packed one or more per CRC-protected datagram, and
//!   reassembled on the receiver ([`protocol::NetworkSerializer`]).
//! - **Control plane**: `base64(key)=base64(value)` parameter lines over
//!   stdio ([`control::LineCodec`]).
//!
//! The codecs never own sockets: callers feed received datagram bytes in
//! and put emitted datagram bytes on the wire themselves.
//! [`transport::UdpEndpoint`] is the built-in caller that does exactly
//! that over a `tokio` UDP socket.
//!
//! ## Protocol variants
//!
//! With the `extended-protocol` cargo feature, slave chunks carry an
//! explicit 4-byte destination offset, which makes reassembly tolerate
//! reordered and duplicated datagrams. Without it, slave chunks append in
//! arrival order and the wire saves 4 bytes per slave chunk. Sender and
//! receiver must be built with the same choice.
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use streamwire::protocol::{NetworkFrame, NetworkSerializer};
//!
//! let frame = NetworkFrame {
//!     id: 1,
//!     task: "cam".to_string(),
//!     flow: "video".to_string(),
//!     data: Bytes::from_static(&[0xAB; 100]),
//!     ..NetworkFrame::default()
//! };
//!
//! let mut serializer = NetworkSerializer::new();
//! for datagram in serializer.encode(&frame) {
//!     serializer.feed(&datagram);
//! }
//!
//! let completed = serializer.take_completed();
//! assert_eq!(completed.len(), 1);
//! assert_eq!(completed[0].data, frame.data);
//! ```

pub mod checksum;
pub mod clock;
pub mod control;
pub mod error;
pub mod memory;
pub mod protocol;
pub mod transport;

pub use error::{Result, StreamwireError};
pub use memory::{ByteOrder, MemorySerializer, Status};
pub use protocol::{NetworkFrame, NetworkSerializer};
