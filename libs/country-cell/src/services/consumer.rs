use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use shared_messaging::MessageQueue;

use crate::error::CountryProcessingError;
use crate::services::country::CountryAppointmentService;

/// Polls one country's queue channel and feeds messages to the service.
///
/// A batch is processed in order and aborts on the first failure so the
/// remaining messages stay queued for the next poll.
pub struct CountryConsumer {
    service: Arc<CountryAppointmentService>,
    queue: Arc<dyn MessageQueue>,
    channel: String,
    batch_size: usize,
    poll_interval: Duration,
}

impl CountryConsumer {
    pub fn new(
        service: Arc<CountryAppointmentService>,
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

    /// Drains up to one batch from the channel. Returns the number of
    /// messages successfully processed.
    pub async fn process_batch(&self) -> Result<usize, CountryProcessingError> {
        let batch = self
            .queue
            .pop_batch(&self.channel, self.batch_size)
            .await
            .map_err(|e| CountryProcessingError::Queue(e.to_string()))?;

        let mut processed = 0;
        for raw in &batch {
            self.service.process_message(raw).await?;
            processed += 1;
        }
        Ok(processed)
    }

    /// Runs the polling loop until the task is aborted.
    pub async fn run(self) {
        info!(channel = %self.channel, "Country consumer started");
        loop {
            match self.process_batch().await {
                Ok(0) => {}
                Ok(count) => {
                    info!(channel = %self.channel, count, "Processed appointment batch");
                }
                Err(e) => {
                    error!(channel = %self.channel, error = %e, "Batch processing failed");
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
