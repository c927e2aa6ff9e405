use super::Repositories;
use sinkhole_dns_application::ports::UpstreamForwarder;
use sinkhole_dns_application::use_cases::HandleDnsQueryUseCase;
use sinkhole_dns_domain::Config;
use sinkhole_dns_infrastructure::dns::{BlockFilterEngine, DnsServerHandler, UdpForwarder};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::info;

pub struct DnsServices {
    pub block_filter: Arc<BlockFilterEngine>,
    pub upstream: Arc<UdpForwarder>,
    pub handler: Arc<DnsServerHandler>,
}

impl DnsServices {
    pub fn new(config: &Config, repos: &Repositories) -> anyhow::Result<Self> {
        let cache_capacity = NonZeroUsize::new(config.blocking.cache_capacity)
            .ok_or_else(|| anyhow::anyhow!("blocking.cache_capacity must be at least 1"))?;

        let block_filter = Arc::new(BlockFilterEngine::new(
            repos.blocklist.clone(),
            cache_capacity,
            config.blocking.on_store_error,
        ));

        let upstream = Arc::new(UdpForwarder::new(
            config.upstream.socket_addr()?,
            config.upstream.timeout(),
        ));

        info!(
            upstream = %upstream.server_addr(),
            timeout_ms = config.upstream.timeout_ms,
            cache_capacity = cache_capacity.get(),
            on_store_error = config.blocking.on_store_error.as_str(),
            "DNS services initialized"
        );

        let use_case = Arc::new(HandleDnsQueryUseCase::new(
            block_filter.clone(),
            upstream.clone(),
            repos.query_log.clone(),
        ));
        let handler = Arc::new(DnsServerHandler::new(use_case, config.sinkhole));

        Ok(Self {
            block_filter,
            upstream,
            handler,
        })
    }
}
