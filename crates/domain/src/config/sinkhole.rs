use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Addresses handed out for blocked A and AAAA questions.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct SinkholeConfig {
    #[serde(default = "default_ipv4")]
    pub ipv4: Ipv4Addr,

    #[serde(default = "default_ipv6")]
    pub ipv6: Ipv6Addr,
}

impl Default for SinkholeConfig {
    fn default() -> Self {
        Self {
            ipv4: default_ipv4(),
            ipv6: default_ipv6(),
        }
    }
}

fn default_ipv4() -> Ipv4Addr {
    Ipv4Addr::UNSPECIFIED
}

fn default_ipv6() -> Ipv6Addr {
    Ipv6Addr::UNSPECIFIED
}
