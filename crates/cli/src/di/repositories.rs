use sinkhole_dns_application::ports::QueryLogRepository;
use sinkhole_dns_domain::DatabaseConfig;
use sinkhole_dns_infrastructure::repositories::{
    DisabledQueryLogRepository, SqliteBlocklistRepository, SqliteQueryLogRepository,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

pub struct Repositories {
    pub blocklist: Arc<SqliteBlocklistRepository>,
    pub query_log: Arc<dyn QueryLogRepository>,
    query_log_writer: Option<Arc<SqliteQueryLogRepository>>,
}

impl Repositories {
    pub fn new(pool: SqlitePool, cfg: &DatabaseConfig) -> Self {
        let (query_log, query_log_writer): (Arc<dyn QueryLogRepository>, _) = if cfg.log_queries {
            let writer = Arc::new(SqliteQueryLogRepository::new(pool.clone(), cfg));
            (writer.clone(), Some(writer))
        } else {
            info!("Query logging disabled");
            (Arc::new(DisabledQueryLogRepository), None)
        };

        Self {
            blocklist: Arc::new(SqliteBlocklistRepository::new(pool)),
            query_log,
            query_log_writer,
        }
    }

    pub fn query_logging_enabled(&self) -> bool {
        self.query_log_writer.is_some()
    }

    /// Flushes queued query log entries.
    pub async fn shutdown(&self) {
        if let Some(writer) = &self.query_log_writer {
            writer.shutdown().await;
        }
    }
}
