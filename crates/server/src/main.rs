use std::sync::Arc;

use sqslite_core::Config;
use sqslite_queue::{Dispatcher, Store};
use sqslite_server::cli::{apply_cli_overrides, print_usage};
use sqslite_server::router::build_router;
use sqslite_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sqslite_core::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let config = apply_cli_overrides(Config::from_env(), &args);
    tracing::info!(host = %config.host, port = config.port, redis = %config.redis_addr, "starting sqslite-server");

    let store = Store::connect(&config.redis_url(), config.redis_pool_max_size)?;
    let dispatcher = Dispatcher::new(store);
    dispatcher.recover_and_start().await?;

    let state = Arc::new(AppState::new(dispatcher));
    let router = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
