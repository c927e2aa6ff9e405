#![allow(dead_code)]
use async_trait::async_trait;
use sinkhole_dns_application::ports::BlocklistRepository;
use sinkhole_dns_domain::DomainError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Block-set store that records every lookup.
#[derive(Clone, Default)]
pub struct MockBlocklistRepository {
    domains: Arc<Mutex<HashSet<String>>>,
    lookups: Arc<Mutex<Vec<Vec<String>>>>,
    calls: Arc<AtomicUsize>,
    should_fail: Arc<AtomicBool>,
}

impl MockBlocklistRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domains(domains: &[&str]) -> Self {
        let repo = Self::new();
        for domain in domains {
            repo.add(domain);
        }
        repo
    }

    pub fn add(&self, domain: &str) {
        self.domains.lock().unwrap().insert(domain.to_string());
    }

    pub fn remove(&self, domain: &str) {
        self.domains.lock().unwrap().remove(domain);
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> Vec<Vec<String>> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlocklistRepository for MockBlocklistRepository {
    async fn contains_any(&self, candidates: &[String]) -> Result<bool, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lookups.lock().unwrap().push(candidates.to_vec());

        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::StoreUnavailable("database is locked".into()));
        }

        let domains = self.domains.lock().unwrap();
        Ok(candidates.iter().any(|c| domains.contains(c)))
    }

    async fn count(&self) -> Result<u64, DomainError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::StoreUnavailable("database is locked".into()));
        }
        Ok(self.domains.lock().unwrap().len() as u64)
    }
}
