use serde::{Deserialize, Serialize};

/// What the decision engine answers when the block-set store errors.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreFailurePolicy {
    /// Fail open: keep resolving, a storage outage never denies DNS service.
    #[default]
    Allow,

    /// Fail closed: sinkhole everything until the store recovers.
    Block,
}

impl StoreFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Block => "block",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BlockingConfig {
    /// Maximum number of memoized decisions (least recently used is evicted).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default)]
    pub on_store_error: StoreFailurePolicy,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            on_store_error: StoreFailurePolicy::default(),
        }
    }
}

fn default_cache_capacity() -> usize {
    10_000
}
