use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Block,
    Allow,
}

#[async_trait]
pub trait BlockFilterEnginePort: Send + Sync {
    /// Decide a question name. Infallible: store failures are folded into a
    /// decision by the engine's failure policy.
    async fn check(&self, domain: &str) -> FilterDecision;
}
