use super::DnsQuery;
use std::net::IpAddr;
use std::sync::Arc;

/// One received datagram: the decoded question, who sent it, and the exact
/// bytes so an allowed query can be forwarded without re-encoding.
#[derive(Debug, Clone)]
pub struct DnsRequest {
    pub query: DnsQuery,
    pub client_ip: IpAddr,
    pub raw: Arc<[u8]>,
}

impl DnsRequest {
    pub fn new(query: DnsQuery, client_ip: IpAddr, raw: impl Into<Arc<[u8]>>) -> Self {
        Self {
            query,
            client_ip,
            raw: raw.into(),
        }
    }
}
