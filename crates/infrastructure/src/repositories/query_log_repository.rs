use async_trait::async_trait;
use sinkhole_dns_application::ports::QueryLogRepository;
use sinkhole_dns_domain::{DatabaseConfig, DomainError, QueryLog};
use sqlx::SqlitePool;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const COLS_PER_ROW: usize = 6;
const ROWS_PER_CHUNK: usize = 999 / COLS_PER_ROW;

fn build_multi_insert_sql(n: usize) -> String {
    debug_assert!(n > 0 && n <= ROWS_PER_CHUNK);
    const HEADER: &str = "INSERT INTO queries \
        (timestamp, client_ip, domain, query_type, action, response_time) \
        VALUES ";
    const PLACEHOLDER: &str = "(?,?,?,?,?,?)";
    let mut sql = String::with_capacity(HEADER.len() + n * (PLACEHOLDER.len() + 1));
    sql.push_str(HEADER);
    for i in 0..n {
        if i > 0 {
            sql.push(',');
        }
        sql.push_str(PLACEHOLDER);
    }
    sql
}

/// Row ready for insertion, rendered in the column formats the dashboard
/// reads.
struct QueryLogEntry {
    timestamp: String,
    client_ip: String,
    domain: String,
    query_type: String,
    action: &'static str,
    response_time: i64,
}

impl QueryLogEntry {
    fn from_query_log(q: &QueryLog) -> Self {
        Self {
            timestamp: q.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            client_ip: q.client_ip.to_string(),
            domain: q.domain.to_string(),
            query_type: q.record_type.to_string(),
            action: q.action.as_str(),
            response_time: q.response_time_ms.min(i64::MAX as u64) as i64,
        }
    }
}

/// Appends query log rows through a bounded channel drained by a background
/// writer, so the request path never waits on SQLite.
///
/// Entries are dropped with a warning when the channel is full.
pub struct SqliteQueryLogRepository {
    sender: mpsc::Sender<QueryLogEntry>,
    shutdown: CancellationToken,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl SqliteQueryLogRepository {
    /// Spawns the writer task. Must be called inside a Tokio runtime.
    pub fn new(pool: SqlitePool, cfg: &DatabaseConfig) -> Self {
        let channel_capacity = cfg.query_log_channel_capacity.max(1);
        let max_batch_size = cfg.query_log_max_batch_size.max(1);
        let flush_interval_ms = cfg.query_log_flush_interval_ms.max(1);

        let (sender, receiver) = mpsc::channel(channel_capacity);
        let shutdown = CancellationToken::new();

        let writer = tokio::spawn(Self::flush_loop(
            pool,
            receiver,
            max_batch_size,
            flush_interval_ms,
            shutdown.clone(),
        ));

        info!(
            channel_capacity,
            batch_size = max_batch_size,
            flush_interval_ms,
            "Query log batching enabled"
        );

        Self {
            sender,
            shutdown,
            writer: Mutex::new(Some(writer)),
        }
    }

    /// Stops accepting entries, writes whatever is still queued and waits for
    /// the writer to finish. Later calls return immediately.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handle = self
            .writer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Query log writer task failed");
            }
        }
    }

    async fn flush_loop(
        pool: SqlitePool,
        mut receiver: mpsc::Receiver<QueryLogEntry>,
        max_batch_size: usize,
        flush_interval_ms: u64,
        shutdown: CancellationToken,
    ) {
        let mut batch: Vec<QueryLogEntry> = Vec::with_capacity(max_batch_size);
        let mut flush_interval = tokio::time::interval(Duration::from_millis(flush_interval_ms));

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    receiver.close();
                    while let Some(entry) = receiver.recv().await {
                        batch.push(entry);
                        if batch.len() >= max_batch_size {
                            Self::flush_batch(&pool, &mut batch).await;
                        }
                    }
                    Self::flush_batch(&pool, &mut batch).await;
                    info!("Query log flush task shutting down");
                    return;
                }
                maybe_entry = receiver.recv() => {
                    match maybe_entry {
                        Some(entry) => {
                            batch.push(entry);
                            while batch.len() < max_batch_size {
                                match receiver.try_recv() {
                                    Ok(e) => batch.push(e),
                                    Err(_) => break,
                                }
                            }
                            if batch.len() >= max_batch_size {
                                Self::flush_batch(&pool, &mut batch).await;
                            }
                        }
                        None => {
                            Self::flush_batch(&pool, &mut batch).await;
                            info!("Query log flush task shutting down");
                            return;
                        }
                    }
                }
                _ = flush_interval.tick() => {
                    Self::flush_batch(&pool, &mut batch).await;
                }
            }
        }
    }

    async fn flush_batch(pool: &SqlitePool, batch: &mut Vec<QueryLogEntry>) {
        let count = batch.len();
        if count == 0 {
            return;
        }

        let start = std::time::Instant::now();

        let mut tx = match pool.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                error!(error = %e, count, "Failed to begin transaction for batch flush");
                batch.clear();
                return;
            }
        };

        let mut inserted = 0usize;
        let mut errors = 0usize;

        for chunk in batch.chunks(ROWS_PER_CHUNK) {
            let sql = build_multi_insert_sql(chunk.len());
            let mut q = sqlx::query(&sql);
            for entry in chunk {
                q = q
                    .bind(entry.timestamp.as_str())
                    .bind(entry.client_ip.as_str())
                    .bind(entry.domain.as_str())
                    .bind(entry.query_type.as_str())
                    .bind(entry.action)
                    .bind(entry.response_time);
            }
            match q.execute(&mut *tx).await {
                Ok(r) => inserted += r.rows_affected() as usize,
                Err(e) => {
                    errors += chunk.len();
                    warn!(error = %e, chunk_size = chunk.len(), "Failed to insert query log chunk");
                }
            }
        }

        match tx.commit().await {
            Ok(_) => {
                debug!(
                    count = inserted,
                    errors,
                    duration_ms = start.elapsed().as_millis(),
                    "Batch flushed"
                );
            }
            Err(e) => {
                error!(error = %e, count, "Failed to commit batch transaction");
            }
        }

        batch.clear();
    }
}

#[async_trait]
impl QueryLogRepository for SqliteQueryLogRepository {
    async fn log_query(&self, query: &QueryLog) -> Result<(), DomainError> {
        let entry = QueryLogEntry::from_query_log(query);
        match self.sender.try_send(entry) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Query log channel full, dropping entry");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Query log writer stopped, dropping entry");
                Ok(())
            }
        }
    }
}

/// Used when `database.log_queries` is off.
pub struct DisabledQueryLogRepository;

#[async_trait]
impl QueryLogRepository for DisabledQueryLogRepository {
    async fn log_query(&self, _query: &QueryLog) -> Result<(), DomainError> {
        Ok(())
    }
}
