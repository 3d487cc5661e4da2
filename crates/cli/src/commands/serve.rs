//! `ragdock serve`: Start the HTTP API server.

use ragdock_config::AppConfig;

pub async fn run(mut config: AppConfig, port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("ragdock gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Backend:   {} ({})", config.backend.provider, config.backend.base_url);
    println!("   Storage:   {} in {}", config.store.backend, config.store.rag_dir.display());

    ragdock_gateway::start(config).await?;

    Ok(())
}
