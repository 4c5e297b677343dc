//! Per-frame reassembly state.
//!
//! A [`NetworkFrameBuilder`] collects the chunks of one frame id until the
//! expected chunk count is reached. The expected count is derived from the
//! frame size carried by the master chunk via [`chunk_count`], which
//! replays the encoder's packing exactly.
//!
//! In the base protocol a master chunk must arrive first and slave chunks
//! append in arrival order; in the extended protocol chunks may arrive in
//! any order and slave payloads land at their carried destination offsets.
//! Rejected chunks leave the builder usable.

use bytes::BytesMut;

use super::frame::NetworkFrame;
use super::wire_format::{
    CHUNK_MASTER_DATA_MAX_SIZE, CHUNK_MASTER_HEADER_SIZE, CHUNK_SLAVE_DATA_MAX_SIZE,
    CHUNK_SLAVE_HEADER_SIZE, DATAGRAM_DATA_MAX_SIZE,
};

/// Number of chunks the encoder produces for a frame of `frame_size` data
/// bytes.
///
/// Replays the packing: datagrams of [`DATAGRAM_DATA_MAX_SIZE`] chunk
/// capacity are filled greedily, the first chunk master-sized and every
/// later one slave-sized, until the whole frame is accounted for. This is
/// the sole source of a builder's expected chunk count, so sender and
/// receiver must pack identically.
pub(crate) fn chunk_count(frame_size: usize) -> usize {
    let mut chunks = 0;
    let mut remaining = frame_size;

    while remaining > 0 {
        let mut capacity = DATAGRAM_DATA_MAX_SIZE;

        while remaining > 0 && capacity > 0 {
            let (header_size, data_max) = if chunks == 0 {
                (CHUNK_MASTER_HEADER_SIZE, CHUNK_MASTER_DATA_MAX_SIZE)
            } else {
                (CHUNK_SLAVE_HEADER_SIZE, CHUNK_SLAVE_DATA_MAX_SIZE)
            };

            if capacity <= header_size {
                break;
            }
            capacity -= header_size;

            let data_size = data_max.min(capacity).min(remaining);
            chunks += 1;
            remaining -= data_size;
            capacity -= data_size;
        }
    }

    chunks
}

/// Reassembly state for a single frame id.
#[derive(Debug, Default)]
pub(crate) struct NetworkFrameBuilder {
    master_found: bool,
    collected: usize,
    detected: usize,
    /// Total data size announced by the master chunk; bounds slave appends
    /// in the base protocol.
    #[cfg(not(feature = "extended-protocol"))]
    expected_size: usize,
    frame: NetworkFrame,
    buffer: BytesMut,
}

impl NetworkFrameBuilder {
    /// True once every detected chunk has been collected.
    pub(crate) fn is_complete(&self) -> bool {
        self.detected != 0 && self.collected == self.detected
    }

    /// Consume the builder and yield the reassembled frame.
    pub(crate) fn into_frame(mut self) -> NetworkFrame {
        self.frame.data = self.buffer.freeze();
        self.frame
    }

    fn copy_metadata(&mut self, partial: &NetworkFrame) {
        self.frame.id = partial.id;
        self.frame.number = partial.number;
        self.frame.interpretation = partial.interpretation;
        self.frame.time = partial.time;
        self.frame.priority = partial.priority;
        self.frame.task = partial.task.clone();
        self.frame.flow = partial.flow.clone();
    }

    /// Accept the frame's master chunk: seed the metadata, account the
    /// payload, and derive the expected chunk count from `frame_size`.
    ///
    /// Rejected when the frame is already complete, a master was already
    /// accepted, the payload is empty, or `frame_size` is inconsistent with
    /// the payload.
    #[cfg(not(feature = "extended-protocol"))]
    pub(crate) fn put_master_chunk(&mut self, frame_size: usize, partial: &NetworkFrame) -> bool {
        if self.is_complete()
            || self.master_found
            || frame_size == 0
            || frame_size < partial.data.len()
            || partial.data.is_empty()
        {
            return false;
        }

        self.copy_metadata(partial);
        self.buffer.reserve(frame_size);
        self.buffer.extend_from_slice(&partial.data);
        self.expected_size = frame_size;
        self.collected = 1;
        self.detected = chunk_count(frame_size);
        self.master_found = true;
        true
    }

    /// Accept a master chunk at any point of the reassembly.
    ///
    /// A master after slave chunks must not imply fewer chunks than already
    /// collected, nor shrink the detected count. Rejected when the frame is
    /// already complete, a master was already accepted, the payload is
    /// empty, or `frame_size` is inconsistent with the payload.
    #[cfg(feature = "extended-protocol")]
    pub(crate) fn put_master_chunk(&mut self, frame_size: usize, partial: &NetworkFrame) -> bool {
        if self.is_complete()
            || self.master_found
            || frame_size == 0
            || frame_size < partial.data.len()
            || partial.data.is_empty()
        {
            return false;
        }

        if self.collected == 0 {
            self.copy_metadata(partial);

            if self.buffer.len() < frame_size {
                self.buffer.resize(frame_size, 0);
            }
            self.buffer[..partial.data.len()].copy_from_slice(&partial.data);

            self.collected = 1;
            self.detected = chunk_count(frame_size);
        } else {
            let detected = chunk_count(frame_size);
            if detected < self.detected || detected < self.collected + 1 {
                return false;
            }

            self.frame.number = partial.number;

            if self.buffer.len() < frame_size {
                self.buffer.resize(frame_size, 0);
            }
            self.buffer[..partial.data.len()].copy_from_slice(&partial.data);

            self.collected += 1;
            self.detected = detected;
        }

        self.master_found = true;
        true
    }

    /// Append a slave chunk in arrival order.
    ///
    /// Accepted only after the master chunk and only while the payload fits
    /// within the frame size the master announced. `frame_offset` is unused
    /// in the base protocol.
    #[cfg(not(feature = "extended-protocol"))]
    pub(crate) fn put_slave_chunk(&mut self, frame_offset: usize, partial: &NetworkFrame) -> bool {
        let _ = frame_offset;

        if self.is_complete()
            || !self.master_found
            || partial.data.is_empty()
            || self.buffer.len() + partial.data.len() > self.expected_size
        {
            return false;
        }

        self.buffer.extend_from_slice(&partial.data);
        self.collected += 1;
        true
    }

    /// Write a slave chunk's payload at its destination offset, growing the
    /// buffer as needed. A slave arriving before the master seeds the
    /// metadata.
    ///
    /// Rejected when the frame is already complete, the offset is zero (a
    /// slave never carries the head of the frame), the payload is empty, or
    /// the payload's tail would run past a frame size the master already
    /// announced.
    #[cfg(feature = "extended-protocol")]
    pub(crate) fn put_slave_chunk(&mut self, frame_offset: usize, partial: &NetworkFrame) -> bool {
        if self.is_complete() || frame_offset == 0 || partial.data.is_empty() {
            return false;
        }

        let end = frame_offset + partial.data.len();
        if self.master_found && end > self.buffer.len() {
            return false;
        }

        if self.collected == 0 {
            self.copy_metadata(partial);
        }

        if self.buffer.len() < end {
            self.buffer.resize(end, 0);
        }
        self.buffer[frame_offset..end].copy_from_slice(&partial.data);

        self.collected += 1;
        true
    }
}
