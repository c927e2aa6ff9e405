//! UDP forwarding to the upstream resolver (RFC 1035 §4.2.1).
//!
//! Each query gets its own ephemeral socket connected to the upstream, so
//! the kernel discards datagrams from any other source. The query bytes are
//! sent untouched and the first reply carrying the same transaction id is
//! returned verbatim.

use async_trait::async_trait;
use sinkhole_dns_application::ports::{UpstreamForwarder, UpstreamResponse};
use sinkhole_dns_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tracing::{debug, trace};

/// Receive buffer for upstream replies (EDNS(0) sized).
pub const MAX_UPSTREAM_RESPONSE_SIZE: usize = 4096;

pub struct UdpForwarder {
    server_addr: SocketAddr,
    timeout: Duration,
}

impl UdpForwarder {
    pub fn new(server_addr: SocketAddr, timeout: Duration) -> Self {
        Self {
            server_addr,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn unreachable(&self, e: impl std::fmt::Display) -> DomainError {
        DomainError::UpstreamUnreachable {
            server: self.server_addr.to_string(),
            reason: e.to_string(),
        }
    }

    fn timed_out(&self) -> DomainError {
        DomainError::UpstreamTimeout {
            server: self.server_addr.to_string(),
        }
    }

    async fn connect(&self) -> Result<UdpSocket, DomainError> {
        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| self.unreachable(e))?;
        socket
            .connect(self.server_addr)
            .await
            .map_err(|e| self.unreachable(e))?;
        Ok(socket)
    }
}

/// Elapsed time in whole milliseconds, rounded up so a completed round trip
/// never reports 0.
fn elapsed_ms_ceil(elapsed: Duration) -> u64 {
    let micros = elapsed.as_micros();
    let ms = micros.div_ceil(1000).max(1);
    ms.min(u64::MAX as u128) as u64
}

#[async_trait]
impl UpstreamForwarder for UdpForwarder {
    async fn forward(&self, query: &[u8]) -> Result<UpstreamResponse, DomainError> {
        let started = Instant::now();
        let deadline = tokio::time::Instant::now() + self.timeout;

        let socket = self.connect().await?;

        tokio::time::timeout_at(deadline, socket.send(query))
            .await
            .map_err(|_| self.timed_out())?
            .map_err(|e| self.unreachable(e))?;

        trace!(server = %self.server_addr, bytes_sent = query.len(), "UDP query sent");

        let query_id = query.get(..2);
        let mut recv_buf = vec![0u8; MAX_UPSTREAM_RESPONSE_SIZE];

        loop {
            let received = tokio::time::timeout_at(deadline, socket.recv(&mut recv_buf))
                .await
                .map_err(|_| self.timed_out())?
                .map_err(|e| self.unreachable(e))?;

            if query_id.is_some() && recv_buf.get(..2) != query_id {
                debug!(
                    server = %self.server_addr,
                    bytes_received = received,
                    "Ignoring upstream reply with mismatched transaction id"
                );
                continue;
            }

            recv_buf.truncate(received);
            let latency_ms = elapsed_ms_ceil(started.elapsed());

            trace!(
                server = %self.server_addr,
                bytes_received = received,
                latency_ms,
                "UDP response received"
            );

            return Ok(UpstreamResponse {
                bytes: recv_buf,
                latency_ms,
                server: self.server_addr,
            });
        }
    }

    fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }
}
