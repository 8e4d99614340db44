pub mod error;
pub mod models;
pub mod services;

pub use error::CountryProcessingError;
pub use models::{AppointmentData, AppointmentMessage, CountryProfile, ProcessingStats};
pub use services::consumer::CountryConsumer;
pub use services::country::CountryAppointmentService;
pub use services::processor::CountryProcessor;
pub use services::rules::{CountryBusinessRules, StandardBusinessRules};
