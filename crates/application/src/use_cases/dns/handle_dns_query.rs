use crate::ports::{
    BlockFilterEnginePort, FilterDecision, QueryLogRepository, UpstreamForwarder, UpstreamResponse,
};
use sinkhole_dns_domain::{DnsRequest, DomainError, QueryLog};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the dispatcher should send back for one request.
#[derive(Debug)]
pub enum QueryOutcome {
    /// Domain is in the block-set; answer with a sinkhole response.
    Blocked,
    /// Relay the upstream reply verbatim.
    Forwarded(UpstreamResponse),
    /// Upstream gave nothing back; the client gets silence.
    Unanswered(DomainError),
}

pub struct HandleDnsQueryUseCase {
    block_filter: Arc<dyn BlockFilterEnginePort>,
    upstream: Arc<dyn UpstreamForwarder>,
    query_log: Arc<dyn QueryLogRepository>,
}

impl HandleDnsQueryUseCase {
    pub fn new(
        block_filter: Arc<dyn BlockFilterEnginePort>,
        upstream: Arc<dyn UpstreamForwarder>,
        query_log: Arc<dyn QueryLogRepository>,
    ) -> Self {
        Self {
            block_filter,
            upstream,
            query_log,
        }
    }

    /// Decide, then forward if allowed, then log. The entry is recorded
    /// before the outcome is returned so the reply always follows the log.
    pub async fn execute(&self, request: &DnsRequest) -> QueryOutcome {
        let query = &request.query;

        match self.block_filter.check(&query.domain).await {
            FilterDecision::Block => {
                info!(
                    client = %request.client_ip,
                    domain = %query.domain,
                    record_type = %query.record_type,
                    "BLOCKED"
                );
                self.record(QueryLog::blocked(
                    request.client_ip,
                    Arc::clone(&query.domain),
                    query.record_type,
                ))
                .await;
                QueryOutcome::Blocked
            }
            FilterDecision::Allow => match self.upstream.forward(&request.raw).await {
                Ok(response) => {
                    info!(
                        client = %request.client_ip,
                        domain = %query.domain,
                        record_type = %query.record_type,
                        latency_ms = response.latency_ms,
                        "ALLOWED"
                    );
                    self.record(QueryLog::allowed(
                        request.client_ip,
                        Arc::clone(&query.domain),
                        query.record_type,
                        response.latency_ms,
                    ))
                    .await;
                    QueryOutcome::Forwarded(response)
                }
                Err(e) => {
                    debug!(
                        error = %e,
                        client = %request.client_ip,
                        domain = %query.domain,
                        "No upstream answer, leaving query unanswered"
                    );
                    QueryOutcome::Unanswered(e)
                }
            },
        }
    }

    async fn record(&self, entry: QueryLog) {
        if let Err(e) = self.query_log.log_query(&entry).await {
            warn!(error = %e, domain = %entry.domain, "Failed to log query");
        }
    }
}
