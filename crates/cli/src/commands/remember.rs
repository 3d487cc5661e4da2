//! `ragdock remember`: Store a personal fact.

use ragdock_config::AppConfig;

pub async fn run(config: AppConfig, fact: String) -> Result<(), Box<dyn std::error::Error>> {
    let service = ragdock_gateway::build_service(&config).await?;
    let ids = service.remember(&fact).await?;
    println!("Remembered ({})", ids.join(", "));
    Ok(())
}
