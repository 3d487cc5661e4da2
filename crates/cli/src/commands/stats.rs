//! `ragdock stats`: Show collection counts and storage location.

use ragdock_config::AppConfig;

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let service = ragdock_gateway::build_service(&config).await?;
    let stats = service.stats().await?;

    println!("ragdock Stats");
    println!("=============");
    println!("  Documents:  {} ({})", stats.docs_count, config.store.docs_collection);
    println!("  Memories:   {} ({})", stats.mem_count, config.store.mem_collection);
    println!("  Storage:    {}", stats.path);
    println!("  Chat model: {}", config.backend.chat_model);
    println!("  Embeddings: {}", config.backend.embed_model);
    Ok(())
}
