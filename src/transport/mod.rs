//! Socket-owning layer above the codec core.

mod udp;

pub use udp::UdpEndpoint;
