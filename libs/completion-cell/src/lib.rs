pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::{classify_failure, CompletionError};
pub use models::{AppointmentCompletionData, CompletionHealth, CompletionStats};
pub use router::create_completion_router;
pub use services::completion::AppointmentCompletionService;
pub use services::consumer::CompletionConsumer;
pub use services::metrics::CompletionMetrics;
pub use services::publisher::CompletionEventPublisher;
pub use services::rules::{
    ChileCompletionRules, CompletionRules, CompletionRulesDispatcher, PeruCompletionRules,
};
