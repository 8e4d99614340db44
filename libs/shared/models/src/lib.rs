pub mod appointment;
pub mod error;
pub mod events;

pub use appointment::{
    is_valid_insured_id, AppointmentEntity, AppointmentStatus, CountryIso, ScheduleId,
};
pub use error::AppError;
pub use events::{
    AppointmentConfirmation, DomainEvent, EventType, APPOINTMENT_EVENT_SOURCE,
    COMPLETION_EVENT_SOURCE,
};
