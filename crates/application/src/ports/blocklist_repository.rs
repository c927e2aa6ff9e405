use async_trait::async_trait;
use sinkhole_dns_domain::DomainError;

/// Read side of the block-set. Populated out-of-band by the ingestion
/// pipeline with lowercase domains and no trailing dot.
#[async_trait]
pub trait BlocklistRepository: Send + Sync {
    /// True when at least one candidate is in the block-set, answered with a
    /// single store round trip.
    async fn contains_any(&self, candidates: &[String]) -> Result<bool, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}
