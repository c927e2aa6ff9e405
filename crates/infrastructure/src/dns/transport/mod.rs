pub mod udp;

pub use udp::{UdpForwarder, MAX_UPSTREAM_RESPONSE_SIZE};
