use super::RecordType;
use std::sync::Arc;

/// First question of an inbound DNS query, as decoded from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub id: u16,
    /// Question name without the trailing dot, in the client's original case.
    pub domain: Arc<str>,
    pub record_type: RecordType,
    pub qclass: u16,
    pub recursion_desired: bool,
}

impl DnsQuery {
    pub fn new(id: u16, domain: impl Into<Arc<str>>, record_type: RecordType) -> Self {
        Self {
            id,
            domain: domain.into(),
            record_type,
            qclass: 1,
            recursion_desired: true,
        }
    }
}
