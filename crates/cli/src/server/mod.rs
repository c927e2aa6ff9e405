pub mod dns;

pub use dns::{spawn_signal_listener, start_dns_server};
