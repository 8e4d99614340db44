use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use appointment_cell::AppointmentService;
use completion_cell::{
    AppointmentCompletionService, CompletionConsumer, CompletionEventPublisher,
    CompletionMetrics, CompletionRulesDispatcher,
};
use country_cell::{
    CountryAppointmentService, CountryConsumer, CountryProcessor, CountryProfile,
    StandardBusinessRules,
};
use shared_config::AppConfig;
use shared_database::{InMemoryAppointmentRepository, InMemoryCountryDatabase};
use shared_messaging::{
    InMemoryMessageQueue, MessageQueue, QueueEventBus, QueueNotificationSender,
    RedisMessageQueue,
};
use shared_models::CountryIso;
use shared_utils::UuidIdGenerator;

/// Fully wired application: HTTP services plus the background consumers
/// that move appointments through the per-country pipeline.
pub struct App {
    pub appointment_service: Arc<AppointmentService>,
    pub completion_service: Arc<AppointmentCompletionService>,
    consumers: Vec<tokio::task::JoinHandle<()>>,
}

impl App {
    /// Builds the whole object graph and spawns the consumers. The queue
    /// transport is Redis when configured, otherwise the in-process queue
    /// so local mode runs the pipeline end to end without infrastructure.
    pub async fn start(config: &AppConfig) -> Result<Self, String> {
        let queue: Arc<dyn MessageQueue> = match &config.redis_url {
            Some(url) => {
                let redis = RedisMessageQueue::new(url)
                    .await
                    .map_err(|e| format!("Redis initialization failed: {}", e))?;
                info!("Using the Redis queue transport");
                Arc::new(redis)
            }
            None => {
                info!("Using the in-memory queue transport");
                Arc::new(InMemoryMessageQueue::new())
            }
        };

        let repository = Arc::new(InMemoryAppointmentRepository::new());
        let event_bus = Arc::new(QueueEventBus::new(queue.clone(), config));
        let notifications = Arc::new(QueueNotificationSender::new(queue.clone(), config));

        let appointment_service = Arc::new(AppointmentService::new(
            repository.clone(),
            notifications,
            event_bus.clone(),
            Arc::new(UuidIdGenerator),
        ));

        let completion_service = Arc::new(AppointmentCompletionService::new(
            repository.clone(),
            Arc::new(CompletionMetrics::new()),
            Arc::new(CompletionRulesDispatcher::default()),
            Arc::new(CompletionEventPublisher::new(event_bus.clone())),
        ));

        let poll_interval = Duration::from_millis(config.consumer_poll_interval_ms);
        let mut consumers = Vec::new();

        for (country, channel) in [
            (CountryIso::PE, config.peru_queue_channel.clone()),
            (CountryIso::CL, config.chile_queue_channel.clone()),
        ] {
            let profile = CountryProfile::for_country(country);
            let processor = Arc::new(CountryProcessor::new(
                country,
                Arc::new(InMemoryCountryDatabase::new(country)),
                event_bus.clone(),
            ));
            let rules = Arc::new(StandardBusinessRules::new(profile.clone()));
            let service = Arc::new(CountryAppointmentService::new(profile, rules, processor));
            let consumer = CountryConsumer::new(
                service,
                queue.clone(),
                channel,
                config.consumer_batch_size,
                poll_interval,
            );
            consumers.push(tokio::spawn(consumer.run()));
        }

        let completion_consumer = CompletionConsumer::new(
            completion_service.clone(),
            queue.clone(),
            config.completion_queue_channel.clone(),
            config.consumer_batch_size,
            poll_interval,
        );
        consumers.push(tokio::spawn(completion_consumer.run()));

        info!("Consumers started for PE, CL and completion channels");

        Ok(Self {
            appointment_service,
            completion_service,
            consumers,
        })
    }

    pub fn shutdown(&self) {
        for handle in &self.consumers {
            handle.abort();
        }
    }
}
