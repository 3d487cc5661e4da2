//! Provider router: selects the configured embedding/chat backend.

use std::sync::Arc;
use std::time::Duration;

use ragdock_config::BackendConfig;
use ragdock_core::provider::Provider;

use crate::ollama::OllamaProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the backend named by the configuration.
///
/// `AppConfig::validate` rejects unknown provider names, so anything other
/// than `openai` is served by Ollama.
pub fn build_from_config(config: &BackendConfig) -> Arc<dyn Provider> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let provider: Arc<dyn Provider> = match config.provider.as_str() {
        "openai" => Arc::new(OpenAiCompatProvider::new(
            "openai",
            openai_base_url(&config.base_url),
            config.api_key.clone().unwrap_or_default(),
            timeout,
        )),
        _ => Arc::new(OllamaProvider::new(&config.base_url, timeout)),
    };

    tracing::debug!(provider = %config.provider, base_url = %config.base_url, "Backend configured");
    provider
}

/// OpenAI-compatible servers live under `/v1`; a bare host gets it appended.
fn openai_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/v1") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_from_default_config_uses_ollama() {
        let config = BackendConfig::default();
        let provider = build_from_config(&config);
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn build_openai_backend() {
        let config = BackendConfig {
            provider: "openai".into(),
            base_url: "http://localhost:8080".into(),
            api_key: Some("sk-test".into()),
            ..BackendConfig::default()
        };
        assert_eq!(build_from_config(&config).name(), "openai");
    }

    #[test]
    fn openai_base_url_appends_v1_once() {
        assert_eq!(openai_base_url("http://host:8080"), "http://host:8080/v1");
        assert_eq!(openai_base_url("http://host:8080/v1/"), "http://host:8080/v1");
    }
}
