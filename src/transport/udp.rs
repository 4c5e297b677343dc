//! UDP endpoint for the datagram plane.
//!
//! [`UdpEndpoint`] is the socket-owning caller layered on top of the codec
//! core: it sends a frame as its encoded datagram sequence and runs a
//! receive loop that feeds every received datagram to an owned
//! [`NetworkSerializer`], forwarding completed frames over an mpsc
//! channel. The serializer never leaves the receive task, so all
//! reassembly state stays single-owner.
//!
//! # Example
//!
//! ```ignore
//! use streamwire::memory::ByteOrder;
//! use streamwire::transport::UdpEndpoint;
//!
//! let endpoint = UdpEndpoint::bind("0.0.0.0:5004", ByteOrder::BigEndian).await?;
//! let mut frames = endpoint.spawn_receiver();
//!
//! while let Some(frame) = frames.recv().await {
//!     println!("frame {} ({} bytes)", frame.id, frame.data.len());
//! }
//! ```

use std::net::SocketAddr;

use tokio::net::{ToSocketAddrs, UdpSocket};
use tokio::sync::mpsc;

use crate::error::{Result, StreamwireError};
use crate::memory::ByteOrder;
use crate::protocol::{NetworkFrame, NetworkSerializer, DATAGRAM_MAX_SIZE};

/// Capacity of the completed-frame channel.
const FRAME_CHANNEL_CAPACITY: usize = 64;

/// A bound UDP socket speaking the datagram plane.
pub struct UdpEndpoint {
    socket: UdpSocket,
    encoder: NetworkSerializer,
}

impl UdpEndpoint {
    /// Bind a socket. `byte_order` must match the peer's.
    pub async fn bind(addr: impl ToSocketAddrs, byte_order: ByteOrder) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket,
            encoder: NetworkSerializer::with_byte_order(byte_order),
        })
    }

    /// The bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// The configured byte order.
    pub fn byte_order(&self) -> ByteOrder {
        self.encoder.byte_order()
    }

    /// Encode `frame` and send its datagrams to `target` in order.
    ///
    /// Returns the number of datagrams sent.
    ///
    /// # Errors
    ///
    /// [`StreamwireError::Protocol`] when the frame fails the transmit
    /// preconditions (the codec core drops such frames silently; the
    /// endpoint surfaces them, since a caller handing over a frame expects
    /// it on the wire). I/O errors propagate from the socket.
    pub async fn send_frame_to(&self, frame: &NetworkFrame, target: SocketAddr) -> Result<usize> {
        let datagrams = self.encoder.encode(frame);
        if datagrams.is_empty() {
            return Err(StreamwireError::Protocol(
                "frame fails transmit preconditions".to_string(),
            ));
        }

        for datagram in &datagrams {
            self.socket.send_to(datagram, target).await?;
        }

        tracing::trace!(
            frame_id = frame.id,
            datagrams = datagrams.len(),
            %target,
            "frame sent"
        );
        Ok(datagrams.len())
    }

    /// Consume the endpoint and spawn its receive loop.
    ///
    /// Completed frames arrive on the returned channel. The loop ends when
    /// the receiver is dropped or the socket fails.
    pub fn spawn_receiver(self) -> mpsc::Receiver<NetworkFrame> {
        let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            match self.receive_loop(tx).await {
                Ok(()) => {}
                Err(StreamwireError::ChannelClosed) => {
                    tracing::debug!("frame receiver dropped; receive loop ended");
                }
                Err(e) => tracing::error!("receive loop error: {e}"),
            }
        });

        rx
    }

    /// Read datagrams until the channel closes or the socket fails.
    async fn receive_loop(self, tx: mpsc::Sender<NetworkFrame>) -> Result<()> {
        let mut serializer = NetworkSerializer::with_byte_order(self.encoder.byte_order());
        // One byte of headroom so oversize datagrams are seen (and then
        // rejected) instead of silently truncated to the maximum.
        let mut buf = vec![0u8; DATAGRAM_MAX_SIZE + 1];

        loop {
            let (len, from) = self.socket.recv_from(&mut buf).await?;
            tracing::trace!(len, %from, "datagram received");

            serializer.feed(&buf[..len]);

            for frame in serializer.take_completed() {
                if tx.send(frame).await.is_err() {
                    return Err(StreamwireError::ChannelClosed);
                }
            }
        }
    }
}
