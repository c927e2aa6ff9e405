use super::decision_cache::{BlockDecisionCache, DecisionCacheStats};
use async_trait::async_trait;
use sinkhole_dns_application::ports::{BlockFilterEnginePort, BlocklistRepository, FilterDecision};
use sinkhole_dns_domain::{normalize_domain, suffix_candidates, StoreFailurePolicy};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Decides whether a question name is blocked.
///
/// A name is blocked when it or any parent domain is in the block-set. The
/// whole suffix chain is checked in one store round trip, and the result is
/// memoized per normalized name. Store failures resolve through the
/// configured [`StoreFailurePolicy`] and are not memoized.
pub struct BlockFilterEngine {
    blocklist: Arc<dyn BlocklistRepository>,
    decision_cache: BlockDecisionCache,
    on_store_error: StoreFailurePolicy,
}

impl BlockFilterEngine {
    pub fn new(
        blocklist: Arc<dyn BlocklistRepository>,
        cache_capacity: NonZeroUsize,
        on_store_error: StoreFailurePolicy,
    ) -> Self {
        Self {
            blocklist,
            decision_cache: BlockDecisionCache::new(cache_capacity),
            on_store_error,
        }
    }

    pub async fn is_blocked(&self, domain: &str) -> bool {
        let normalized = normalize_domain(domain);
        if normalized.is_empty() {
            return false;
        }

        if let Some(blocked) = self.decision_cache.get(&normalized) {
            return blocked;
        }

        let candidates = suffix_candidates(&normalized);
        match self.blocklist.contains_any(&candidates).await {
            Ok(blocked) => {
                debug!(domain = %normalized, blocked, "Block decision computed");
                self.decision_cache.insert(normalized, blocked);
                blocked
            }
            Err(e) => {
                let blocked = self.on_store_error == StoreFailurePolicy::Block;
                warn!(
                    error = %e,
                    domain = %normalized,
                    policy = self.on_store_error.as_str(),
                    "Block-set lookup failed, applying failure policy"
                );
                blocked
            }
        }
    }

    pub fn cache_stats(&self) -> DecisionCacheStats {
        self.decision_cache.stats()
    }

    /// True when a decision for `domain` is memoized.
    pub fn is_cached(&self, domain: &str) -> bool {
        self.decision_cache.contains(&normalize_domain(domain))
    }

    /// Drops every memoized decision, e.g. after the block-set was rebuilt.
    pub fn clear_cache(&self) {
        self.decision_cache.clear();
    }
}

#[async_trait]
impl BlockFilterEnginePort for BlockFilterEngine {
    async fn check(&self, domain: &str) -> FilterDecision {
        if self.is_blocked(domain).await {
            FilterDecision::Block
        } else {
            FilterDecision::Allow
        }
    }
}
