//! Event capture

use llm_batch_gateway::core::batch::{BatchEvent, BatchEventKind, BatchEventSink};
use parking_lot::Mutex;

/// Keeps every recorded event in memory
#[derive(Debug, Default)]
pub struct CapturingEventSink {
    events: Mutex<Vec<BatchEvent>>,
}

impl CapturingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BatchEvent> {
        self.events.lock().clone()
    }

    /// Event kinds recorded for one job, in order
    pub fn kinds_for(&self, job_id: &str) -> Vec<BatchEventKind> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.job_id == job_id)
            .map(|e| e.event)
            .collect()
    }
}

impl BatchEventSink for CapturingEventSink {
    fn record(&self, event: BatchEvent) {
        self.events.lock().push(event);
    }
}
