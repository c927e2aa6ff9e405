#![allow(dead_code)]

use async_trait::async_trait;
use sinkhole_dns_application::ports::{
    BlockFilterEnginePort, FilterDecision, QueryLogRepository, UpstreamForwarder, UpstreamResponse,
};
use sinkhole_dns_domain::{DomainError, QueryLog};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

// ── MockBlockFilterEngine ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockBlockFilterEngine {
    blocked_domains: Arc<RwLock<HashSet<String>>>,
    checked: Arc<Mutex<Vec<String>>>,
}

impl MockBlockFilterEngine {
    pub fn new() -> Self {
        Self {
            blocked_domains: Arc::new(RwLock::new(HashSet::new())),
            checked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn block_domain(&self, domain: &str) {
        self.blocked_domains
            .write()
            .unwrap()
            .insert(domain.to_string());
    }

    pub fn checked_domains(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

impl Default for MockBlockFilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlockFilterEnginePort for MockBlockFilterEngine {
    async fn check(&self, domain: &str) -> FilterDecision {
        self.checked.lock().unwrap().push(domain.to_string());
        if self.blocked_domains.read().unwrap().contains(domain) {
            return FilterDecision::Block;
        }
        FilterDecision::Allow
    }
}

// ── MockUpstreamForwarder ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUpstreamForwarder {
    server: SocketAddr,
    reply: Arc<RwLock<Result<(Vec<u8>, u64), DomainError>>>,
    forwarded: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockUpstreamForwarder {
    pub fn new() -> Self {
        Self {
            server: "8.8.8.8:53".parse().unwrap(),
            reply: Arc::new(RwLock::new(Err(DomainError::UpstreamTimeout {
                server: "8.8.8.8:53".to_string(),
            }))),
            forwarded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn respond_with(&self, bytes: &[u8], latency_ms: u64) {
        *self.reply.write().unwrap() = Ok((bytes.to_vec(), latency_ms));
    }

    pub fn fail_with(&self, error: DomainError) {
        *self.reply.write().unwrap() = Err(error);
    }

    pub fn forwarded(&self) -> Vec<Vec<u8>> {
        self.forwarded.lock().unwrap().clone()
    }
}

impl Default for MockUpstreamForwarder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamForwarder for MockUpstreamForwarder {
    async fn forward(&self, query: &[u8]) -> Result<UpstreamResponse, DomainError> {
        self.forwarded.lock().unwrap().push(query.to_vec());
        let (bytes, latency_ms) = self.reply.read().unwrap().clone()?;
        Ok(UpstreamResponse {
            bytes,
            latency_ms,
            server: self.server,
        })
    }

    fn server_addr(&self) -> SocketAddr {
        self.server
    }
}

// ── MockQueryLogRepository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockQueryLogRepository {
    logs: Arc<Mutex<Vec<QueryLog>>>,
    should_fail: Arc<RwLock<bool>>,
    attempts: Arc<AtomicUsize>,
}

impl MockQueryLogRepository {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(RwLock::new(false)),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn get_logs(&self) -> Vec<QueryLog> {
        self.logs.lock().unwrap().clone()
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().unwrap() = fail;
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MockQueryLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryLogRepository for MockQueryLogRepository {
    async fn log_query(&self, query: &QueryLog) -> Result<(), DomainError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if *self.should_fail.read().unwrap() {
            return Err(DomainError::StoreUnavailable(
                "Mock log store offline".to_string(),
            ));
        }
        self.logs.lock().unwrap().push(query.clone());
        Ok(())
    }
}
