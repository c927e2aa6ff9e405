#![allow(dead_code)]
use sinkhole_dns_infrastructure::database::run_migrations;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Builds raw DNS query datagrams.
pub struct QueryBuilder {
    id: u16,
    flags: u16,
    qdcount: u16,
    name: String,
    qtype: u16,
    qclass: u16,
}

impl QueryBuilder {
    pub fn new(name: &str, qtype: u16) -> Self {
        Self {
            id: 0x1234,
            flags: 0x0100,
            qdcount: 1,
            name: name.to_string(),
            qtype,
            qclass: 1,
        }
    }

    pub fn a(name: &str) -> Self {
        Self::new(name, 1)
    }

    pub fn aaaa(name: &str) -> Self {
        Self::new(name, 28)
    }

    pub fn id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn qdcount(mut self, qdcount: u16) -> Self {
        self.qdcount = qdcount;
        self
    }

    pub fn qclass(mut self, qclass: u16) -> Self {
        self.qclass = qclass;
        self
    }

    pub fn header(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(12);
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.extend_from_slice(&self.flags.to_be_bytes());
        buf.extend_from_slice(&self.qdcount.to_be_bytes());
        buf.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
        buf
    }

    pub fn encoded_name(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for label in self.name.trim_end_matches('.').split('.') {
            if label.is_empty() {
                continue;
            }
            buf.push(label.len() as u8);
            buf.extend_from_slice(label.as_bytes());
        }
        buf.push(0);
        buf
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = self.header();
        buf.extend_from_slice(&self.encoded_name());
        buf.extend_from_slice(&self.qtype.to_be_bytes());
        buf.extend_from_slice(&self.qclass.to_be_bytes());
        buf
    }
}

/// In-memory database with the production schema. Single connection so
/// every query sees the same database.
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    run_migrations(&pool).await.unwrap();
    pool
}

pub async fn seed_blocked(pool: &SqlitePool, domains: &[&str]) {
    for domain in domains {
        sqlx::query("INSERT INTO blocked (domain) VALUES (?)")
            .bind(*domain)
            .execute(pool)
            .await
            .unwrap();
    }
}
