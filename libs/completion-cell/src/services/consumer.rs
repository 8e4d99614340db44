use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use shared_messaging::MessageQueue;

use crate::error::CompletionError;
use crate::services::completion::AppointmentCompletionService;

/// Polls the completion channel and feeds confirmations to the service.
///
/// Unlike the country consumers, one bad confirmation never blocks the
/// rest of the batch: failures are logged per item and processing
/// continues.
pub struct CompletionConsumer {
    service: Arc<AppointmentCompletionService>,
    queue: Arc<dyn MessageQueue>,
    channel: String,
    batch_size: usize,
    poll_interval: Duration,
}

impl CompletionConsumer {
    pub fn new(
        service: Arc<AppointmentCompletionService>,
        queue: Arc<dyn MessageQueue>,
        channel: String,
        batch_size: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            service,
            queue,
            channel,
            batch_size,
            poll_interval,
        }
    }

    /// Drains up to one batch. Returns how many confirmations succeeded
    /// and how many failed.
    pub async fn process_batch(&self) -> Result<(usize, usize), CompletionError> {
        let batch = self
            .queue
            .pop_batch(&self.channel, self.batch_size)
            .await
            .map_err(|e| CompletionError::Queue(e.to_string()))?;

        let mut succeeded = 0;
        let mut failed = 0;
        for raw in &batch {
            match self.service.process_confirmation_envelope(raw).await {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    failed += 1;
                    error!(channel = %self.channel, error = %e, "Confirmation failed");
                }
            }
        }
        Ok((succeeded, failed))
    }

    pub async fn run(self) {
        info!(channel = %self.channel, "Completion consumer started");
        loop {
            match self.process_batch().await {
                Ok((0, 0)) => {}
                Ok((succeeded, failed)) => {
                    info!(
                        channel = %self.channel,
                        succeeded,
                        failed,
                        "Processed confirmation batch"
                    );
                }
                Err(e) => {
                    error!(channel = %self.channel, error = %e, "Could not poll confirmations");
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
