//! Chat gateway: sends an assembled prompt and drains the streamed answer.

use std::sync::Arc;

use ragdock_core::error::{Error, Result};
use ragdock_core::message::Message;
use ragdock_core::provider::{Provider, ProviderRequest, collect_answer};
use tracing::debug;

#[derive(Clone)]
pub struct ChatClient {
    provider: Arc<dyn Provider>,
    model: String,
}

impl ChatClient {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `messages` and return the trimmed answer.
    pub async fn answer(&self, messages: Vec<Message>) -> Result<String> {
        debug!(model = %self.model, messages = messages.len(), "Requesting chat answer");
        let request = ProviderRequest::new(self.model.clone(), messages);

        let rx = self
            .provider
            .stream(request)
            .await
            .map_err(Error::ChatService)?;
        collect_answer(rx).await.map_err(Error::ChatService)
    }

    /// Health check against the backend; unreachable counts as unhealthy.
    pub async fn healthy(&self) -> bool {
        match self.provider.health_check().await {
            Ok(ok) => ok,
            Err(e) => {
                debug!(error = %e, "Backend health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockProvider;

    #[tokio::test]
    async fn answer_is_trimmed_concatenation() {
        let provider = Arc::new(MockProvider::new().with_answers(vec!["  Paris.  "]));
        let client = ChatClient::new(provider.clone(), "mistral:latest");
        let answer = client
            .answer(vec![Message::user("Capital of France?")])
            .await
            .unwrap();
        assert_eq!(answer, "Paris.");
        assert_eq!(provider.chat_requests().len(), 1);
        assert_eq!(provider.chat_requests()[0].model, "mistral:latest");
    }

    #[tokio::test]
    async fn backend_failure_is_chat_error() {
        let provider = Arc::new(MockProvider::new().failing_chat());
        let client = ChatClient::new(provider, "m");
        let err = client.answer(vec![Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::ChatService(_)));
    }
}
