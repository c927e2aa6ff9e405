use async_trait::async_trait;
use sinkhole_dns_domain::DomainError;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Reply datagram exactly as the upstream sent it.
    pub bytes: Vec<u8>,
    pub latency_ms: u64,
    pub server: SocketAddr,
}

#[async_trait]
pub trait UpstreamForwarder: Send + Sync {
    /// Send the raw query once and wait for a single reply.
    ///
    /// Fails with `UpstreamTimeout` or `UpstreamUnreachable`; callers must not
    /// retry.
    async fn forward(&self, query: &[u8]) -> Result<UpstreamResponse, DomainError>;

    fn server_addr(&self) -> SocketAddr;
}
