mod block_filter_engine;
mod blocklist_repository;
mod query_log_repository;
mod upstream_forwarder;

pub use block_filter_engine::{BlockFilterEnginePort, FilterDecision};
pub use blocklist_repository::BlocklistRepository;
pub use query_log_repository::QueryLogRepository;
pub use upstream_forwarder::{UpstreamForwarder, UpstreamResponse};
