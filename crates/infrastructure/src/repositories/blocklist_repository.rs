//! Read-only view of the `blocked` table. Rows are written by the ingestion
//! job; the resolver only asks membership questions.

use async_trait::async_trait;
use sinkhole_dns_application::ports::BlocklistRepository;
use sinkhole_dns_domain::DomainError;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

fn build_contains_sql(n: usize) -> String {
    debug_assert!(n > 0);
    const HEADER: &str = "SELECT 1 FROM blocked WHERE domain IN (";
    let mut sql = String::with_capacity(HEADER.len() + n * 2 + 10);
    sql.push_str(HEADER);
    for i in 0..n {
        if i > 0 {
            sql.push(',');
        }
        sql.push('?');
    }
    sql.push_str(") LIMIT 1");
    sql
}

pub struct SqliteBlocklistRepository {
    pool: SqlitePool,
}

impl SqliteBlocklistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlocklistRepository for SqliteBlocklistRepository {
    #[instrument(skip(self), level = "trace")]
    async fn contains_any(&self, candidates: &[String]) -> Result<bool, DomainError> {
        if candidates.is_empty() {
            return Ok(false);
        }

        let sql = build_contains_sql(candidates.len());
        let mut query = sqlx::query(&sql);
        for candidate in candidates {
            query = query.bind(candidate.as_str());
        }

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::StoreUnavailable(e.to_string()))?;

        Ok(row.is_some())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM blocked")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::StoreUnavailable(e.to_string()))?;

        let total: i64 = row.get("total");
        Ok(total.max(0) as u64)
    }
}
