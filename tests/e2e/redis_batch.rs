//! Batch lifecycle on the durable backend

#[cfg(test)]
mod tests {
    use crate::common::assertions::JobAssertions;
    use crate::common::fixtures::{TaskFactory, TestHarness};
    use crate::common::providers::ScriptedInvoker;
    use crate::skip_without_env;
    use llm_batch_gateway::config::{BatchConfig, RedisConfig, StorageConfig};
    use llm_batch_gateway::core::batch::JobStatus;
    use llm_batch_gateway::storage::{BatchStorage, StorageMode};

    async fn redis_harness() -> Option<TestHarness> {
        let url = std::env::var("REDIS_URL").ok()?;
        let storage_config = StorageConfig {
            redis: RedisConfig {
                url,
                ..Default::default()
            },
        };
        let batch = BatchConfig {
            queue_key: format!("batch_queue_e2e_{}", uuid::Uuid::new_v4().simple()),
            ..Default::default()
        };
        let storage = BatchStorage::connect(&storage_config, &batch).await;
        assert_eq!(storage.mode(), StorageMode::Durable, "REDIS_URL not reachable");
        Some(TestHarness::with_storage(ScriptedInvoker::new(), batch, storage))
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server (REDIS_URL)"]
    async fn test_redis_submit_process_poll() {
        skip_without_env!("REDIS_URL");
        let Some(harness) = redis_harness().await else {
            return;
        };

        let job_id = harness
            .submit(vec![
                TaskFactory::task("a", "hello"),
                TaskFactory::task("b", "fail now"),
            ])
            .await;
        assert_eq!(
            harness.service.status(&job_id).await.unwrap().unwrap().status,
            JobStatus::Queued
        );

        harness.worker("e2e-worker").run_once().await.unwrap();

        let job = harness.service.status(&job_id).await.unwrap().unwrap();
        job.assert_completed_with(1, 1);
        job.assert_results_match_tasks();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server (REDIS_URL)"]
    async fn test_redis_claims_block_second_worker() {
        skip_without_env!("REDIS_URL");
        let Some(harness) = redis_harness().await else {
            return;
        };

        let job_id = harness.submit(vec![TaskFactory::task("a", "x")]).await;
        assert!(harness.service.claim(&job_id, "other").await.unwrap());
        assert!(!harness.service.claim(&job_id, "me").await.unwrap());
        harness.service.release(&job_id, "other").await.unwrap();
        assert!(harness.service.claim(&job_id, "me").await.unwrap());
        harness.service.release(&job_id, "me").await.unwrap();
    }
}
