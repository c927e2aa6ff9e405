pub mod block_filter;
pub mod codec;
pub mod server;
pub mod transport;

pub use block_filter::{BlockDecisionCache, BlockFilterEngine, DecisionCacheStats};
pub use server::{DnsServerHandler, UdpDnsServer};
pub use transport::UdpForwarder;
