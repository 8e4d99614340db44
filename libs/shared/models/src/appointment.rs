use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ISO country code of the two markets the platform operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountryIso {
    PE,
    CL,
}

impl CountryIso {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountryIso::PE => "PE",
            CountryIso::CL => "CL",
        }
    }
}

impl fmt::Display for CountryIso {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountryIso {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PE" => Ok(CountryIso::PE),
            "CL" => Ok(CountryIso::CL),
            other => Err(format!("country code must be PE or CL, got: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Completed,
    Cancelled,
    Error,
}

impl AppointmentStatus {
    /// Legal lifecycle transitions. Completed, cancelled and error are terminal.
    pub fn can_transition_to(&self, next: &AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (AppointmentStatus::Pending, AppointmentStatus::Completed)
                | (AppointmentStatus::Pending, AppointmentStatus::Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Pending)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Error => write!(f, "error"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "error" => Ok(AppointmentStatus::Error),
            other => Err(format!("unknown appointment status: {}", other)),
        }
    }
}

/// Schedule slot identifier as it appears on the wire, where senders may
/// use either `1001` or `"1001"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleId {
    Number(i64),
    Text(String),
}

impl ScheduleId {
    /// Coerces to a positive integer, if possible.
    pub fn as_positive(&self) -> Option<i64> {
        let value = match self {
            ScheduleId::Number(n) => Some(*n),
            ScheduleId::Text(raw) => raw.trim().parse().ok(),
        }?;
        (value > 0).then_some(value)
    }
}

/// An insured id is exactly five ASCII digits, leading zeros allowed.
pub fn is_valid_insured_id(insured_id: &str) -> bool {
    insured_id.len() == 5 && insured_id.bytes().all(|b| b.is_ascii_digit())
}

/// Immutable domain value for one medical appointment. Status changes
/// produce a new value via [`AppointmentEntity::with_status`], never a
/// mutation in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentEntity {
    pub id: String,
    pub insured_id: String,
    pub schedule_id: i64,
    #[serde(rename = "countryISO")]
    pub country_iso: CountryIso,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl AppointmentEntity {
    /// Creates a new appointment in the `pending` state, timestamped now.
    pub fn create_pending(
        id: String,
        insured_id: String,
        schedule_id: i64,
        country_iso: CountryIso,
    ) -> Self {
        Self {
            id,
            insured_id,
            schedule_id,
            country_iso,
            status: AppointmentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Returns a copy of the appointment with the given status. Callers are
    /// responsible for checking the transition with
    /// [`AppointmentStatus::can_transition_to`] first.
    pub fn with_status(&self, status: AppointmentStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == AppointmentStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == AppointmentStatus::Completed
    }

    pub fn is_peru(&self) -> bool {
        self.country_iso == CountryIso::PE
    }

    pub fn is_chile(&self) -> bool {
        self.country_iso == CountryIso::CL
    }
}
