//! Frame ⇄ datagram conversion and reassembly.
//!
//! [`NetworkSerializer`] is both directions of the datagram plane: `encode`
//! splits a frame into CRC-stamped datagrams, `feed` consumes received
//! datagram bytes and routes their chunks into per-frame builders, and
//! `take_completed` harvests fully reassembled frames.
//!
//! The serializer never owns a socket. It is also deliberately not
//! thread-safe: all calls on one instance, including the harvest, belong to
//! the thread that owns it. Callers that want parallel ingestion shard by
//! frame id or run one serializer per thread.
//!
//! The transport is lossy by assumption, so every decode failure is a
//! silent drop: a malformed datagram (or the malformed tail of one) is
//! discarded without touching any other frame's reassembly state, and
//! feedback channels are somebody else's business.

use std::collections::HashMap;

use bytes::Bytes;

use crate::checksum::{crc16, crc16_with_skip};
use crate::memory::{ByteOrder, MemorySerializer, Status};

use super::frame::NetworkFrame;
use super::frame_builder::NetworkFrameBuilder;
use super::wire_format::{
    DatagramHeader, MasterChunkHeader, SlaveChunkHeader, CHUNK_FLOW_SIZE,
    CHUNK_MASTER_DATA_MAX_SIZE, CHUNK_MASTER_HEADER_SIZE, CHUNK_MASTER_ID,
    CHUNK_MAX_SIZE, CHUNK_SLAVE_DATA_MAX_SIZE, CHUNK_SLAVE_HEADER_SIZE, CHUNK_SLAVE_ID,
    CHUNK_TASK_SIZE, DATAGRAM_CRC_OFFSET, DATAGRAM_HEADER_SIZE, DATAGRAM_MAX_SIZE,
    DATAGRAM_PROTOCOL_VERSION, FRAME_MAX_SIZE,
};

/// Converts frames to datagram lists and reassembles frames from received
/// datagrams.
#[derive(Debug, Default)]
pub struct NetworkSerializer {
    byte_order: ByteOrder,
    builders: HashMap<u32, NetworkFrameBuilder>,
}

impl NetworkSerializer {
    /// Serializer with the big-endian wire default.
    pub fn new() -> Self {
        Self::with_byte_order(ByteOrder::BigEndian)
    }

    /// Serializer with an explicit byte order. Sender and receiver must
    /// agree on it.
    pub fn with_byte_order(byte_order: ByteOrder) -> Self {
        Self {
            byte_order,
            builders: HashMap::new(),
        }
    }

    /// The configured byte order.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Split `frame` into an ordered list of datagrams, each at most
    /// [`DATAGRAM_MAX_SIZE`] bytes.
    ///
    /// A frame that fails the transmit preconditions (empty or oversize
    /// task/flow/data) yields an empty list, as does a serializer failure
    /// mid-encode. The first chunk of the first datagram is the master
    /// chunk; all others are slaves numbered from 1 in emission order.
    pub fn encode(&self, frame: &NetworkFrame) -> Vec<Bytes> {
        if !frame.is_transmissible() {
            return Vec::new();
        }

        let frame_size = frame.data.len();

        let mut task = [0u8; CHUNK_TASK_SIZE];
        task[..frame.task.len()].copy_from_slice(frame.task.as_bytes());
        let mut flow = [0u8; CHUNK_FLOW_SIZE];
        flow[..frame.flow.len()].copy_from_slice(frame.flow.as_bytes());

        let mut datagrams = Vec::new();
        let mut index = 0usize;
        let mut slave_number: u16 = 1;

        while index < frame_size {
            let size = plan_datagram_size(index, frame_size - index);

            let mut raw = Vec::with_capacity(size);
            let mut s = MemorySerializer::writer(&mut raw);
            s.set_byte_order(self.byte_order);

            DatagramHeader::for_size(size as u16).write(&mut s);

            while s.position() < size {
                if index == 0 {
                    let free = size - s.position() - CHUNK_MASTER_HEADER_SIZE;
                    let data_size = free.min(CHUNK_MASTER_DATA_MAX_SIZE);

                    MasterChunkHeader {
                        chunk_size: (CHUNK_MASTER_HEADER_SIZE + data_size) as u16,
                        task,
                        flow,
                        frame_id: frame.id,
                        interpretation: frame.interpretation,
                        priority: frame.priority,
                        time: frame.time,
                        frame_number: frame.number,
                        frame_size: frame_size as u32,
                    }
                    .write(&mut s);

                    s.write_raw(&frame.data[index..index + data_size]);
                    index += data_size;
                } else {
                    let free = size - s.position() - CHUNK_SLAVE_HEADER_SIZE;
                    let data_size = free.min(CHUNK_SLAVE_DATA_MAX_SIZE);

                    SlaveChunkHeader {
                        chunk_size: (CHUNK_SLAVE_HEADER_SIZE + data_size) as u16,
                        task,
                        flow,
                        frame_id: frame.id,
                        interpretation: frame.interpretation,
                        priority: frame.priority,
                        time: frame.time,
                        slave_number,
                        frame_offset: index as u32,
                    }
                    .write(&mut s);
                    slave_number += 1;

                    s.write_raw(&frame.data[index..index + data_size]);
                    index += data_size;
                }
            }

            // The CRC field still holds zero, so the plain checksum here
            // equals the masked one the receiver recomputes.
            let checksum = crc16(s.data());
            s.seek(DATAGRAM_CRC_OFFSET);
            s.write_u16(checksum);

            if s.status() != Status::Ok {
                datagrams.clear();
                break;
            }

            drop(s);
            datagrams.push(Bytes::from(raw));
        }

        datagrams
    }

    /// Consume one received datagram.
    ///
    /// Malformed input — bad length, wrong version, size mismatch, CRC
    /// mismatch, malformed chunk header, unknown chunk id, truncated
    /// payload — is dropped silently at the first offense; chunks already
    /// dispatched from the same datagram stay dispatched, and other frames'
    /// state is never touched. Completed frames are collected with
    /// [`NetworkSerializer::take_completed`].
    pub fn feed(&mut self, datagram: &[u8]) {
        if datagram.len() <= DATAGRAM_HEADER_SIZE || datagram.len() > DATAGRAM_MAX_SIZE {
            tracing::trace!(len = datagram.len(), "datagram dropped: length out of bounds");
            return;
        }

        let mut s = MemorySerializer::reader(datagram);
        s.set_byte_order(self.byte_order);

        let header = DatagramHeader::read(&mut s);

        if header.version != DATAGRAM_PROTOCOL_VERSION
            || header.size as usize != datagram.len()
            || header.checksum != crc16_with_skip(datagram, &[8, 9])
        {
            tracing::trace!(
                version = header.version,
                declared = header.size,
                actual = datagram.len(),
                "datagram dropped: header validation failed"
            );
            return;
        }

        while s.bytes_available() > CHUNK_MASTER_HEADER_SIZE.min(CHUNK_SLAVE_HEADER_SIZE) {
            let more = match s.read_u8() {
                CHUNK_MASTER_ID => self.feed_master_chunk(&mut s, datagram),
                CHUNK_SLAVE_ID => self.feed_slave_chunk(&mut s, datagram),
                id => {
                    tracing::trace!(id, "chunk iteration stopped: unknown chunk id");
                    false
                }
            };
            if !more {
                break;
            }
        }
    }

    /// Parse and dispatch a master chunk; false stops this datagram.
    fn feed_master_chunk(&mut self, s: &mut MemorySerializer<'_>, datagram: &[u8]) -> bool {
        if s.bytes_available() < CHUNK_MASTER_HEADER_SIZE {
            return false;
        }

        let header = MasterChunkHeader::read(s);
        let chunk_size = header.chunk_size as usize;

        if chunk_size <= CHUNK_MASTER_HEADER_SIZE
            || chunk_size > CHUNK_MAX_SIZE
            || header.frame_size as usize > FRAME_MAX_SIZE
            || chunk_size - CHUNK_MASTER_HEADER_SIZE > s.bytes_available()
        {
            return false;
        }

        let start = s.position();
        let payload_len = chunk_size - CHUNK_MASTER_HEADER_SIZE;
        s.skip_raw(payload_len);

        let partial = NetworkFrame {
            id: header.frame_id,
            number: header.frame_number,
            interpretation: header.interpretation,
            time: header.time,
            priority: header.priority,
            task: String::from_utf8_lossy(&header.task).into_owned(),
            flow: String::from_utf8_lossy(&header.flow).into_owned(),
            data: Bytes::copy_from_slice(&datagram[start..start + payload_len]),
        };

        self.builders
            .entry(header.frame_id)
            .or_default()
            .put_master_chunk(header.frame_size as usize, &partial);
        true
    }

    /// Parse and dispatch a slave chunk; false stops this datagram.
    fn feed_slave_chunk(&mut self, s: &mut MemorySerializer<'_>, datagram: &[u8]) -> bool {
        if s.bytes_available() < CHUNK_SLAVE_HEADER_SIZE {
            return false;
        }

        let header = SlaveChunkHeader::read(s);
        let chunk_size = header.chunk_size as usize;

        if chunk_size <= CHUNK_SLAVE_HEADER_SIZE
            || chunk_size > CHUNK_MAX_SIZE
            || chunk_size - CHUNK_SLAVE_HEADER_SIZE > s.bytes_available()
        {
            return false;
        }

        let start = s.position();
        let payload_len = chunk_size - CHUNK_SLAVE_HEADER_SIZE;
        s.skip_raw(payload_len);

        let partial = NetworkFrame {
            id: header.frame_id,
            interpretation: header.interpretation,
            time: header.time,
            priority: header.priority,
            task: String::from_utf8_lossy(&header.task).into_owned(),
            flow: String::from_utf8_lossy(&header.flow).into_owned(),
            data: Bytes::copy_from_slice(&datagram[start..start + payload_len]),
            ..NetworkFrame::default()
        };

        // A slave for an unknown frame opens a builder only when it carries
        // its destination offset; without one it can't be placed and is
        // dropped.
        #[cfg(feature = "extended-protocol")]
        self.builders
            .entry(header.frame_id)
            .or_default()
            .put_slave_chunk(header.frame_offset as usize, &partial);

        #[cfg(not(feature = "extended-protocol"))]
        if let Some(builder) = self.builders.get_mut(&header.frame_id) {
            builder.put_slave_chunk(0, &partial);
        }

        true
    }

    /// Remove and return every fully reassembled frame. Builders still in
    /// progress stay until completed or [`NetworkSerializer::clear`]ed.
    pub fn take_completed(&mut self) -> Vec<NetworkFrame> {
        let completed: Vec<u32> = self
            .builders
            .iter()
            .filter(|(_, builder)| builder.is_complete())
            .map(|(&id, _)| id)
            .collect();

        completed
            .into_iter()
            .filter_map(|id| self.builders.remove(&id))
            .map(NetworkFrameBuilder::into_frame)
            .collect()
    }

    /// Drop all in-progress reassembly state.
    pub fn clear(&mut self) {
        self.builders.clear();
    }
}

/// Plan the total size of the next datagram, greedily packing chunks for
/// the `left` remaining frame bytes. `index == 0` reserves the master
/// chunk.
fn plan_datagram_size(index: usize, left: usize) -> usize {
    let mut grow = 0usize;
    let mut size = DATAGRAM_HEADER_SIZE;

    if index == 0 {
        grow += left.min(CHUNK_MASTER_DATA_MAX_SIZE);
        size += CHUNK_MASTER_HEADER_SIZE + grow;
    }

    while grow < left && DATAGRAM_MAX_SIZE - size > CHUNK_SLAVE_HEADER_SIZE {
        let free = DATAGRAM_MAX_SIZE - CHUNK_SLAVE_HEADER_SIZE - size;
        let data_size = free.min(CHUNK_SLAVE_DATA_MAX_SIZE);
        let pack = data_size.min(left - grow);

        size += CHUNK_SLAVE_HEADER_SIZE + pack;
        grow += pack;
    }

    size
}
