use crate::dns_record::RecordType;
use chrono::{DateTime, Utc};
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryAction {
    Blocked,
    Allowed,
}

impl QueryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryAction::Blocked => "blocked",
            QueryAction::Allowed => "allowed",
        }
    }
}

impl fmt::Display for QueryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved query. Append-only: written once, never updated.
#[derive(Debug, Clone)]
pub struct QueryLog {
    pub timestamp: DateTime<Utc>,
    pub client_ip: IpAddr,
    pub domain: Arc<str>,
    pub record_type: RecordType,
    pub action: QueryAction,
    /// Upstream round trip; always 0 for blocked queries.
    pub response_time_ms: u64,
}

impl QueryLog {
    pub fn blocked(client_ip: IpAddr, domain: Arc<str>, record_type: RecordType) -> Self {
        Self {
            timestamp: Utc::now(),
            client_ip,
            domain,
            record_type,
            action: QueryAction::Blocked,
            response_time_ms: 0,
        }
    }

    pub fn allowed(
        client_ip: IpAddr,
        domain: Arc<str>,
        record_type: RecordType,
        response_time_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            client_ip,
            domain,
            record_type,
            action: QueryAction::Allowed,
            response_time_ms,
        }
    }
}
