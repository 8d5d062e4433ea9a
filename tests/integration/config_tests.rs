//! Configuration and model registry loading tests

#[cfg(test)]
mod tests {
    use llm_batch_gateway::config::{Config, LogFormat, Validate};
    use llm_batch_gateway::core::models::{BackendType, ModelRegistry};
    use llm_batch_gateway::runtime::load_config;
    use llm_batch_gateway::GatewayError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_full_gateway_config_file() {
        let file = write_temp(
            r#"
storage:
  redis:
    url: redis://cache.internal:6380/2
    connection_timeout: 3
batch:
  retention_secs: 3600
  poll_interval_secs: 2
  worker_count: 4
  task_concurrency: 8
models:
  path: /etc/gateway/models.yaml
logging:
  level: debug
  format: json
"#,
        );

        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config.storage().redis.url, "redis://cache.internal:6380/2");
        assert_eq!(config.batch().worker_count, 4);
        assert_eq!(config.batch().task_concurrency, 8);
        assert_eq!(config.batch().retention_secs, 3600);
        // untouched keys keep their defaults
        assert_eq!(config.batch().queue_key, "batch_queue");
        assert_eq!(config.logging().format, LogFormat::Json);
        assert!(config.gateway.validate().is_ok());
    }

    #[tokio::test]
    async fn test_invalid_values_rejected_with_section() {
        let file = write_temp("batch:\n  worker_count: 0\n");
        let err = Config::from_file(file.path()).await.unwrap_err();
        match err {
            GatewayError::Config(message) => assert!(message.contains("Batch")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_config_file_means_defaults() {
        let file = write_temp("");
        let config = load_config(Some(file.path())).await.unwrap();
        assert_eq!(config.batch().poll_interval_secs, 5);
        assert_eq!(config.batch().default_max_tokens, 512);
    }

    #[tokio::test]
    async fn test_model_registry_file() {
        let file = write_temp(
            r#"
models:
  llama-7b:
    model_name: meta-llama/Llama-2-7b-chat-hf
    backend_type: openai_compatible
    base_url: http://localhost:8001/v1
    timeout: 90
  gpt-4-mini:
    model_name: gpt-4o-mini
    backend_type: openai
defaults:
  max_tokens: 256
"#,
        );

        let registry = ModelRegistry::from_file(file.path()).await.unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.is_valid_model("llama-7b"));
        assert!(!registry.is_valid_model("llama-13b"));

        let llama = registry.get_model("llama-7b").unwrap();
        assert_eq!(llama.timeout, 90);
        assert_eq!(llama.base_url.as_deref(), Some("http://localhost:8001/v1"));

        let gpt = registry.get_model("gpt-4-mini").unwrap();
        assert_eq!(gpt.backend_type, BackendType::Openai);
        assert_eq!(gpt.timeout, 60);

        let ids: Vec<_> = registry.list_models().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["gpt-4-mini", "llama-7b"]);
        assert_eq!(registry.get_default("max_tokens"), Some(&serde_json::json!(256)));
    }

    #[tokio::test]
    async fn test_missing_model_registry_is_config_error() {
        let err = ModelRegistry::from_file("/nonexistent/models.yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        let mut config = Config::default();
        config.gateway.batch.worker_count = 3;
        config.gateway.logging.level = "warn".to_string();

        let yaml = config.to_yaml().unwrap();
        let parsed = Config::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
