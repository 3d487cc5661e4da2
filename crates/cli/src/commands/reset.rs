//! `ragdock reset`: Delete every document and memory.

use ragdock_config::AppConfig;

pub async fn run(config: AppConfig, confirm: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirm {
        return Err("Refusing to reset without --confirm".into());
    }

    let service = ragdock_gateway::build_service(&config).await?;
    let report = service.reset().await?;
    println!("Collections {} ({})", report.status, report.path);
    Ok(())
}
