pub mod decision_cache;
pub mod engine;

pub use decision_cache::{BlockDecisionCache, DecisionCacheStats};
pub use engine::BlockFilterEngine;
