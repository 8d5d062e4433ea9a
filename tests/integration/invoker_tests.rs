//! OpenAI-compatible invoker against a mock HTTP server

#[cfg(test)]
mod tests {
    use llm_batch_gateway::core::models::ModelConfig;
    use llm_batch_gateway::core::providers::{ModelInvoker, OpenAICompatibleInvoker, ProviderError};
    use llm_batch_gateway::core::types::{ChatMessage, GenerationParams};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn model_for(server: &MockServer) -> ModelConfig {
        let mut model = ModelConfig::new("local/llama", Some(format!("{}/v1", server.uri())));
        model.timeout = 2;
        model
    }

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are terse."),
            ChatMessage::user("Say hi"),
        ]
    }

    #[tokio::test]
    async fn test_successful_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer dummy-key"))
            .and(body_partial_json(json!({
                "model": "local/llama",
                "max_tokens": 512,
                "stream": false,
                "messages": [
                    {"role": "system", "content": "You are terse."},
                    {"role": "user", "content": "Say hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "hi"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let invoker = OpenAICompatibleInvoker::new();
        let completion = invoker
            .invoke("llama", &model_for(&server), &messages(), &GenerationParams::default())
            .await
            .unwrap();

        assert_eq!(completion.text, "hi");
        assert_eq!(completion.usage.prompt_tokens, 12);
        assert_eq!(completion.usage.total_tokens, 13);
    }

    #[tokio::test]
    async fn test_missing_usage_and_content_default_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": null}}]
            })))
            .mount(&server)
            .await;

        let completion = OpenAICompatibleInvoker::new()
            .invoke("llama", &model_for(&server), &messages(), &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(completion.text, "");
        assert_eq!(completion.usage.total_tokens, 0);
    }

    #[tokio::test]
    async fn test_error_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "slow down"}
            })))
            .mount(&server)
            .await;

        let err = OpenAICompatibleInvoker::new()
            .invoke("llama", &model_for(&server), &messages(), &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RateLimit { .. }));
        assert!(!err.is_unreachable());
    }

    #[tokio::test]
    async fn test_server_error_message_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"message": "model crashed"}
            })))
            .mount(&server)
            .await;

        let err = OpenAICompatibleInvoker::new()
            .invoke("llama", &model_for(&server), &messages(), &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model crashed"));
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_json(json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let mut model = model_for(&server);
        model.timeout = 1;
        let err = OpenAICompatibleInvoker::new()
            .invoke("llama-slow", &model, &messages(), &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        let model = ModelConfig::new("local/llama", Some("http://127.0.0.1:1/v1".to_string()));
        let err = OpenAICompatibleInvoker::new()
            .invoke("llama-down", &model, &messages(), &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(err.is_unreachable());
    }
}
