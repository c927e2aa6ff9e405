use crate::dns::codec::{encode_sinkhole_response, parse_query, MAX_UDP_MESSAGE_SIZE};
use sinkhole_dns_application::use_cases::{HandleDnsQueryUseCase, QueryOutcome};
use sinkhole_dns_domain::{DnsRequest, DomainError, SinkholeConfig};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Turns one inbound datagram into the bytes to send back, if any.
pub struct DnsServerHandler {
    use_case: Arc<HandleDnsQueryUseCase>,
    sinkhole: SinkholeConfig,
}

impl DnsServerHandler {
    pub fn new(use_case: Arc<HandleDnsQueryUseCase>, sinkhole: SinkholeConfig) -> Self {
        Self { use_case, sinkhole }
    }

    /// `None` means the client gets no reply: the datagram was malformed or
    /// the upstream did not answer.
    pub async fn handle_raw_udp(&self, raw: Arc<[u8]>, client_ip: IpAddr) -> Option<Vec<u8>> {
        let query = match parse_query(&raw) {
            Ok(query) => query,
            Err(e) => {
                debug!(error = %e, client = %client_ip, len = raw.len(), "Dropping malformed datagram");
                return None;
            }
        };

        let request = DnsRequest::new(query, client_ip, raw);
        match self.use_case.execute(&request).await {
            QueryOutcome::Blocked => {
                match encode_sinkhole_response(&request.raw, &request.query, &self.sinkhole) {
                    Ok(response) => Some(response),
                    Err(e) => {
                        debug!(error = %e, domain = %request.query.domain, "Failed to encode sinkhole response");
                        None
                    }
                }
            }
            QueryOutcome::Forwarded(response) => Some(response.bytes),
            QueryOutcome::Unanswered(_) => None,
        }
    }
}

/// UDP listener that handles every datagram in its own task.
///
/// At most `max_in_flight` datagrams are processed at once; once that many
/// are pending the receive loop waits, leaving further datagrams in the
/// kernel buffer.
pub struct UdpDnsServer {
    socket: Arc<UdpSocket>,
    max_in_flight: usize,
    shutdown_grace: Duration,
}

impl UdpDnsServer {
    /// Binds the listening socket. Must be called inside a Tokio runtime.
    pub fn bind(
        addr: SocketAddr,
        max_in_flight: usize,
        shutdown_grace: Duration,
    ) -> Result<Self, DomainError> {
        let socket = create_udp_socket(addr).map_err(|e| DomainError::BindFailure {
            addr: addr.to_string(),
            reason: describe_bind_error(&e, addr),
        })?;

        Ok(Self {
            socket: Arc::new(socket),
            max_in_flight: max_in_flight.max(1),
            shutdown_grace,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Runs the receive loop until `shutdown` fires, then gives in-flight
    /// handlers up to the grace period to finish.
    pub async fn serve(self, handler: Arc<DnsServerHandler>, shutdown: CancellationToken) {
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let tracker = TaskTracker::new();
        let mut recv_buf = [0u8; MAX_UDP_MESSAGE_SIZE];

        info!(
            bind_address = ?self.socket.local_addr().ok(),
            max_in_flight = self.max_in_flight,
            "DNS server ready"
        );

        loop {
            let permit = tokio::select! {
                _ = shutdown.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let (len, peer) = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.socket.recv_from(&mut recv_buf) => match received {
                    Ok(received) => received,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!(error = %e, "UDP recv error");
                        continue;
                    }
                },
            };

            let raw: Arc<[u8]> = Arc::from(&recv_buf[..len]);
            let handler = Arc::clone(&handler);
            let socket = Arc::clone(&self.socket);

            tracker.spawn(async move {
                let _permit = permit;
                if let Some(response) = handler.handle_raw_udp(raw, peer.ip()).await {
                    if let Err(e) = socket.send_to(&response, peer).await {
                        debug!(error = %e, client = %peer, "Failed to send DNS response");
                    }
                }
            });
        }

        tracker.close();
        info!(in_flight = tracker.len(), "DNS server stopping, draining in-flight queries");

        if tokio::time::timeout(self.shutdown_grace, tracker.wait())
            .await
            .is_err()
        {
            warn!(
                abandoned = tracker.len(),
                grace_ms = self.shutdown_grace.as_millis() as u64,
                "Shutdown grace period elapsed with queries still in flight"
            );
        } else {
            info!("DNS server stopped");
        }
    }
}

fn create_udp_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    if let Err(e) = socket.set_recv_buffer_size(512 * 1024) {
        debug!(error = %e, "Could not enlarge UDP receive buffer");
    }
    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}

fn describe_bind_error(e: &io::Error, addr: SocketAddr) -> String {
    match e.kind() {
        io::ErrorKind::PermissionDenied => format!(
            "{e} (port {} is privileged: run with elevated rights, grant CAP_NET_BIND_SERVICE, or pick a port above 1023)",
            addr.port()
        ),
        io::ErrorKind::AddrInUse => format!(
            "{e} (another process already listens on {addr}; stop it or choose a different port)"
        ),
        _ => e.to_string(),
    }
}
