//! `ragdock config`: Print the effective configuration.

use std::path::Path;

use ragdock_config::AppConfig;

pub fn show(config: &AppConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let origin = if path.exists() { "file + environment" } else { "defaults + environment" };
    println!("# {} ({origin})", path.display());
    println!("{}", redacted(config).to_toml());
    Ok(())
}

/// A copy safe to print: the api key is masked.
fn redacted(config: &AppConfig) -> AppConfig {
    let mut copy = config.clone();
    if copy.backend.api_key.is_some() {
        copy.backend.api_key = Some("***".into());
    }
    copy
}
