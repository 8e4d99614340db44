pub mod country;
pub mod repository;

pub use country::{
    AppointmentRow, CountryConnection, CountryDatabase, InMemoryCountryDatabase,
};
pub use repository::{AppointmentRepository, InMemoryAppointmentRepository, RepositoryError};
