use anyhow::{Context, Result};
use std::net::SocketAddr;

use weekfill::config::Config;
use weekfill::oracle::OracleServer;

/// Run the conflict oracle service until Ctrl+C
pub async fn serve(config: &Config, bind: Option<SocketAddr>) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(bind) = bind {
        server_config.bind_address = bind;
    }

    let server = OracleServer::new(server_config);
    println!("{}", server.info().display());

    server
        .start_with_shutdown(shutdown_signal())
        .await
        .context("Oracle server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
