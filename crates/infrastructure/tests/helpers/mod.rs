#![allow(dead_code)]

pub mod builders;
pub mod dns_server_mock;
pub mod mock_blocklist;

pub use builders::{create_test_db, seed_blocked, QueryBuilder};
pub use dns_server_mock::{MockDnsServer, MockUpstreamMode};
pub use mock_blocklist::MockBlocklistRepository;
