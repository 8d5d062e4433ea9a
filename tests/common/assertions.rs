//! Custom test assertions

use llm_batch_gateway::core::batch::{Job, JobStatus};

/// Assertions for batch jobs
pub trait JobAssertions {
    /// Assert the job completed with the given success / failure split
    fn assert_completed_with(&self, completed: usize, failed: usize);

    /// Assert the result list mirrors the task list
    fn assert_results_match_tasks(&self);
}

impl JobAssertions for Job {
    fn assert_completed_with(&self, completed: usize, failed: usize) {
        assert_eq!(self.status, JobStatus::Completed, "job {} not completed", self.job_id);
        assert_eq!(self.completed_count, completed, "completed_count");
        assert_eq!(self.failed_count, failed, "failed_count");
        assert_eq!(self.completed_count + self.failed_count, self.task_count);
        assert!(self.started_at.is_some());
        assert!(self.completed_at >= self.started_at);
        assert!(self.error.is_none());
    }

    fn assert_results_match_tasks(&self) {
        let results = self
            .results
            .as_ref()
            .unwrap_or_else(|| panic!("job {} has no results", self.job_id));
        assert_eq!(results.len(), self.task_count);
        for (task, result) in self.tasks.iter().zip(results) {
            assert_eq!(task.id, result.id);
            if result.error.is_some() {
                assert!(result.output.is_empty());
                assert_eq!(result.usage.total_tokens, 0);
            }
        }
    }
}
