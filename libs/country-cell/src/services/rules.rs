use async_trait::async_trait;
use chrono::{Datelike, Duration, Timelike, Utc, Weekday};
use tracing::{debug, info, warn};

use crate::error::CountryProcessingError;
use crate::models::{specialist_tier, AppointmentData, CountryProfile};

/// Country-specific checks applied before an appointment is persisted.
#[async_trait]
pub trait CountryBusinessRules: Send + Sync {
    async fn apply(&self, appointment: &AppointmentData) -> Result<(), CountryProcessingError>;
}

/// Default rule set shared by both countries, parameterized by profile.
///
/// Business-hour checks are advisory: appointments created outside the
/// configured window are logged but still processed, since the platform
/// accepts bookings around the clock.
pub struct StandardBusinessRules {
    profile: CountryProfile,
}

impl StandardBusinessRules {
    pub fn new(profile: CountryProfile) -> Self {
        Self { profile }
    }

    fn check_business_hours(&self) {
        let local_now = Utc::now() + Duration::hours(self.profile.utc_offset_hours);
        let hour = local_now.hour();

        let window = match local_now.weekday() {
            Weekday::Sun => {
                warn!(
                    country = %self.profile.country,
                    "Appointment processed on Sunday, outside business days"
                );
                return;
            }
            Weekday::Sat => self.profile.saturday_hours,
            _ => self.profile.weekday_hours,
        };

        if hour < window.0 || hour >= window.1 {
            warn!(
                country = %self.profile.country,
                hour,
                window_start = window.0,
                window_end = window.1,
                "Appointment processed outside business hours"
            );
        }
    }

    fn classify_insurance(&self, appointment: &AppointmentData) -> &'static str {
        let category = self.profile.insurance_category(&appointment.insured_id);
        info!(
            country = %self.profile.country,
            insured_id = %appointment.insured_id,
            category,
            "Classified insured into insurance category"
        );
        category
    }
}

#[async_trait]
impl CountryBusinessRules for StandardBusinessRules {
    async fn apply(&self, appointment: &AppointmentData) -> Result<(), CountryProcessingError> {
        self.check_business_hours();

        let category = self.classify_insurance(appointment);
        debug!(
            country = %self.profile.country,
            category,
            "Insurance category accepted for processing"
        );

        let tier = specialist_tier(appointment.schedule_id);
        info!(
            country = %self.profile.country,
            schedule_id = appointment.schedule_id,
            tier,
            "Schedule mapped to specialist tier"
        );

        Ok(())
    }
}
