//! Replicated worker loops and runtime lifecycle

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{TaskFactory, TestHarness, registry, test_config};
    use crate::common::providers::ScriptedInvoker;
    use crate::common::CapturingEventSink;
    use llm_batch_gateway::core::batch::{BatchEventKind, JobStatus, WorkerConfig, spawn_workers};
    use llm_batch_gateway::runtime::BatchRuntime;
    use llm_batch_gateway::storage::{BatchStorage, StorageMode};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    async fn wait_until_terminal(harness: &TestHarness, job_ids: &[String]) {
        for _ in 0..300 {
            let mut done = 0;
            for job_id in job_ids {
                let job = harness.service.status(job_id).await.unwrap().unwrap();
                if job.status.is_terminal() {
                    done += 1;
                }
            }
            if done == job_ids.len() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("jobs did not finish in time");
    }

    #[tokio::test]
    async fn test_each_job_processed_exactly_once_by_pool() {
        let harness = TestHarness::new(ScriptedInvoker::new());
        let mut job_ids = Vec::new();
        for i in 0..10 {
            job_ids.push(
                harness
                    .submit(vec![TaskFactory::task("a", &format!("slow job {}", i))])
                    .await,
            );
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handles = spawn_workers(
            3,
            harness.service.clone(),
            harness.executor.clone(),
            harness.events.clone(),
            WorkerConfig::new("pool", Duration::from_millis(10)),
            shutdown_rx,
        );
        assert_eq!(handles.len(), 3);

        wait_until_terminal(&harness, &job_ids).await;
        shutdown_tx.send(true).unwrap();
        for handle in handles {
            tokio::time::timeout(Duration::from_secs(2), handle)
                .await
                .unwrap()
                .unwrap();
        }

        assert_eq!(harness.invoker.calls(), 10);
        for job_id in &job_ids {
            let started = harness
                .events
                .kinds_for(job_id)
                .into_iter()
                .filter(|k| *k == BatchEventKind::Started)
                .count();
            assert_eq!(started, 1, "job {} started more than once", job_id);
        }
    }

    #[tokio::test]
    async fn test_runtime_without_redis_runs_in_process() {
        let config = test_config();
        let storage = BatchStorage::connect(config.storage(), config.batch()).await;
        assert_eq!(storage.mode(), StorageMode::InProcess);

        let events = Arc::new(CapturingEventSink::new());
        let runtime = BatchRuntime::with_parts(
            config,
            registry(),
            storage,
            Arc::new(ScriptedInvoker::new()),
            events.clone(),
        );
        let service = runtime.service();
        let job_id = service
            .submit_batch_job(
                crate::common::fixtures::TEST_MODEL,
                TaskFactory::many(2),
                None,
                None,
                None,
                None,
            )
            .await
            .unwrap();

        let probe = service.clone();
        let watched = job_id.clone();
        let signal = async move {
            loop {
                if let Ok(Some(job)) = probe.status(&watched).await {
                    if job.status.is_terminal() {
                        break;
                    }
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), runtime.run_until(2, signal))
            .await
            .unwrap()
            .unwrap();

        let job = service.status(&job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(
            events.kinds_for(&job_id),
            vec![
                BatchEventKind::Submitted,
                BatchEventKind::Started,
                BatchEventKind::Completed
            ]
        );
    }
}
