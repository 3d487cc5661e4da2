//! `ragdock ingest`: Add a local file to the document collection.

use std::path::PathBuf;

use ragdock_config::AppConfig;

pub async fn run(
    config: AppConfig,
    path: PathBuf,
    source: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| format!("{} is not a file", path.display()))?;

    let service = ragdock_gateway::build_service(&config).await?;

    let ids = match source {
        Some(source) => {
            let text = ragdock_rag::extract_text(&filename, bytes).await?;
            service.ingest_text(&text, &source).await?.ids
        }
        None => service.ingest_file(Some(&filename), bytes).await?.ids,
    };

    println!("Ingested {filename}: {} chunk(s)", ids.len());
    Ok(())
}
