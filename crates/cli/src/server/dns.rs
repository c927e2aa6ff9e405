use crate::di::{DnsServices, Repositories};
use sinkhole_dns_application::ports::{BlocklistRepository, UpstreamForwarder};
use sinkhole_dns_domain::Config;
use sinkhole_dns_infrastructure::dns::UdpDnsServer;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub async fn start_dns_server(
    config: &Config,
    repos: &Repositories,
    services: DnsServices,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listen_addr = config.server.listen_addr();
    let socket_addr: SocketAddr = listen_addr.parse()?;

    let server = UdpDnsServer::bind(
        socket_addr,
        config.server.max_in_flight,
        Duration::from_millis(config.server.shutdown_grace_ms),
    )
    .map_err(|e| {
        error!(error = %e, "Could not start DNS listener");
        anyhow::Error::new(e)
    })?;

    let blocked_domains = match repos.blocklist.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!(error = %e, "Could not count block-set entries");
            None
        }
    };

    info!(
        listen = %server.local_addr().unwrap_or(socket_addr),
        upstream = %services.upstream.server_addr(),
        sinkhole_ipv4 = %config.sinkhole.ipv4,
        sinkhole_ipv6 = %config.sinkhole.ipv6,
        database = %config.database.path,
        blocked_domains = ?blocked_domains,
        query_logging = repos.query_logging_enabled(),
        "DNS sinkhole listening"
    );

    server.serve(services.handler.clone(), shutdown).await;

    let stats = services.block_filter.cache_stats();
    info!(
        cache_hits = stats.hits,
        cache_misses = stats.misses,
        cache_entries = stats.entries,
        "Decision cache summary"
    );

    Ok(())
}

/// Cancels `shutdown` on Ctrl-C or SIGTERM.
pub fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown signal received");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!(error = %e, "Could not install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
