use clap::Parser;
use sinkhole_dns_domain::CliOverrides;
use tokio_util::sync::CancellationToken;
use tracing::info;

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "sinkhole-dns")]
#[command(version)]
#[command(about = "Sinkhole DNS - filtering DNS forwarder backed by a SQLite block-set")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", env = "SINKHOLE_DNS_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting Sinkhole DNS v{}", env!("CARGO_PKG_VERSION"));

    let pool = bootstrap::init_database(&config.database).await?;

    let repos = di::Repositories::new(pool, &config.database);
    let dns_services = di::DnsServices::new(&config, &repos)?;

    let shutdown = CancellationToken::new();
    server::spawn_signal_listener(shutdown.clone());

    let result = server::start_dns_server(&config, &repos, dns_services, shutdown).await;

    repos.shutdown().await;

    result?;
    info!("Server shutdown complete");
    Ok(())
}
