//! Faucet service binary

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use testnet_faucet::api::router;
use testnet_faucet::logging::init_logging;
use testnet_faucet::service::ClaimPolicy;
use testnet_faucet::{
    AdmissionController, EligibilityStore, FaucetConfig, FaucetMetrics, FaucetService, RpcChainClient,
};
use tokio::signal;
use tracing::{info, warn};

/// Faucet service CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server address
    #[arg(long)]
    server_addr: Option<String>,

    /// RPC URL
    #[arg(long)]
    rpc_url: Option<String>,

    /// Supported test network name
    #[arg(long)]
    test_net_name: Option<String>,

    /// Admission ceiling (requests per window)
    #[arg(long)]
    admission_limit: Option<u32>,

    /// Database path
    #[arg(long)]
    db_path: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = FaucetConfig::load(args.config.as_deref())?;

    // Override with CLI arguments
    if let Some(addr) = args.server_addr {
        config.server_addr = addr;
    }

    if let Some(rpc_url) = args.rpc_url {
        config.rpc_url = rpc_url;
    }

    if let Some(net) = args.test_net_name {
        config.test_net_name = net;
    }

    if let Some(limit) = args.admission_limit {
        config.admission_limit = limit;
    }

    if let Some(db_path) = args.db_path {
        config.db_path = db_path;
    }

    if args.debug {
        config.logging.level = "debug".to_string();
    }

    let _log_guard = init_logging(&config.logging)?;
    config.validate()?;

    info!("Starting testnet faucet v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Server address: {}", config.server_addr);
    info!("  RPC URL: {}", config.rpc_url);
    info!("  Test network: {}", config.test_net_name);
    info!("  Direct amount: {} wei, tweet amount: {} wei", config.amount, config.tweet_amount);
    info!("  Admission: {} requests / {}ms", config.admission_limit, config.admission_window_ms);
    info!("  Eligibility window: {}s", config.eligibility_window_secs);

    let store = EligibilityStore::open(
        &config.db_path,
        config.eligibility_window(),
        config.reservation_timeout(),
    )?;
    let stats = store.statistics().await?;
    info!(
        "Eligibility store at {}: {} committed, {} reserved, {} expired",
        config.db_path, stats.committed, stats.reserved, stats.expired
    );

    let chain = RpcChainClient::new(
        config.rpc_url.clone(),
        config.test_net_name.clone(),
        config.faucet_account.clone(),
        config.min_balance_wei()?,
        config.rpc_timeout(),
    )?;

    let metrics = Arc::new(FaucetMetrics::new()?);
    let service = FaucetService::new(
        ClaimPolicy::from_config(&config)?,
        store.clone(),
        Arc::new(chain),
        metrics,
    );
    let admission = Arc::new(AdmissionController::new(
        config.admission_limit,
        config.admission_window(),
    ));
    info!("Admission limit set to {}", admission.limit());

    let app = router(service, admission, config.cors_enabled);

    if config.purge_interval_secs > 0 {
        let store = store.clone();
        let period = Duration::from_secs(config.purge_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(e) = store.purge_expired().await {
                    warn!("Purge failed: {:?}", e);
                }
            }
        });
    }

    let addr: SocketAddr = config.server_addr.parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down gracefully");
    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
