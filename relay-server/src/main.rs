use anyhow::Result;
use relay_core::RelayConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RelayConfig::from_env();
    let addr = config.bind_addr();

    info!(
        public_base_url = %config.public_base_url,
        ttl_minutes = config.ttl_minutes(),
        max_file_mb = config.max_file_mb,
        "starting relay"
    );

    let ax = relay_server::build(config);
    let _reaper = relay_server::spawn_reaper(&ax.state);

    println!("[relay] listening on http://{addr}");

    ax.listen(addr).await?;

    Ok(())
}
