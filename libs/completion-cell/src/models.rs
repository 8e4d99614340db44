use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CompletionError;

/// Wire envelope for completion confirmations as they arrive on the
/// completion channel.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationEnvelope {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "detail-type", default)]
    pub detail_type: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub detail: Option<Value>,
}

pub const CONFIRMATION_DETAIL_TYPE: &str = "appointment.completed";

/// Confirmation detail as found on the wire, before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfirmationDetail {
    #[serde(default)]
    pub appointment_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub processing_time: Option<i64>,
    #[serde(default, rename = "countryISO")]
    pub country_iso: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// A validated completion confirmation, consumed once per appointment.
#[derive(Debug, Clone)]
pub struct AppointmentCompletionData {
    pub appointment_id: String,
    pub status: String,
    pub completed_at: DateTime<Utc>,
    pub processing_time: Option<i64>,
    pub country_iso: Option<String>,
    pub metadata: Option<Value>,
}

impl AppointmentCompletionData {
    /// Validates the wire detail: the appointment id must be present, the
    /// status must be `completed` and the timestamp must parse.
    pub fn from_raw(raw: RawConfirmationDetail) -> Result<Self, CompletionError> {
        let appointment_id = raw
            .appointment_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                CompletionError::Validation("confirmation is missing appointmentId".to_string())
            })?;

        let status = raw.status.ok_or_else(|| {
            CompletionError::Validation("confirmation is missing status".to_string())
        })?;
        if status != "completed" {
            return Err(CompletionError::Validation(format!(
                "confirmation status must be 'completed', got '{status}'"
            )));
        }

        let completed_at = raw.completed_at.ok_or_else(|| {
            CompletionError::Validation("confirmation is missing completedAt".to_string())
        })?;

        Ok(Self {
            appointment_id,
            status,
            completed_at,
            processing_time: raw.processing_time,
            country_iso: raw.country_iso,
            metadata: raw.metadata,
        })
    }
}

/// Aggregated completion metrics. Constructed only through [`new`], which
/// rejects inconsistent combinations.
///
/// [`new`]: CompletionStats::new
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStats {
    pub total_completed: u64,
    pub completed_today: u64,
    pub average_completion_time_ms: i64,
    pub last_completion_at: Option<DateTime<Utc>>,
}

impl CompletionStats {
    pub fn new(
        total_completed: u64,
        completed_today: u64,
        average_completion_time_ms: i64,
        last_completion_at: Option<DateTime<Utc>>,
    ) -> Result<Self, CompletionError> {
        if completed_today > total_completed {
            return Err(CompletionError::Validation(format!(
                "completedToday ({completed_today}) exceeds totalCompleted ({total_completed})"
            )));
        }
        if average_completion_time_ms < 0 {
            return Err(CompletionError::Validation(
                "averageCompletionTimeMs must not be negative".to_string(),
            ));
        }
        Ok(Self {
            total_completed,
            completed_today,
            average_completion_time_ms,
            last_completion_at,
        })
    }

    pub fn empty() -> Self {
        Self {
            total_completed: 0,
            completed_today: 0,
            average_completion_time_ms: 0,
            last_completion_at: None,
        }
    }

    pub fn has_completions(&self) -> bool {
        self.total_completed > 0
    }

    pub fn average_completion_minutes(&self) -> f64 {
        self.average_completion_time_ms as f64 / 60_000.0
    }

    /// Average completion time as `"1h 5m"` style text.
    pub fn human_readable_average(&self) -> String {
        let total_minutes = self.average_completion_time_ms / 60_000;
        let hours = total_minutes / 60;
        let minutes = total_minutes % 60;
        if hours > 0 {
            format!("{hours}h {minutes}m")
        } else {
            format!("{minutes}m")
        }
    }

    /// Share of today's completions over the overall total, in percent.
    pub fn today_percentage(&self) -> f64 {
        if self.total_completed == 0 {
            return 0.0;
        }
        (self.completed_today as f64 / self.total_completed as f64) * 100.0
    }
}

/// Point-in-time health of the completion subsystem.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionHealth {
    pub healthy: bool,
    pub repository_reachable: bool,
    pub metrics_available: bool,
    pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn raw(appointment_id: Option<&str>, status: Option<&str>) -> RawConfirmationDetail {
        RawConfirmationDetail {
            appointment_id: appointment_id.map(str::to_string),
            status: status.map(str::to_string),
            completed_at: Some(Utc::now()),
            processing_time: None,
            country_iso: None,
            metadata: None,
        }
    }

    #[test]
    fn valid_detail_is_accepted() {
        let data = AppointmentCompletionData::from_raw(raw(Some("apt-1"), Some("completed")));
        assert_eq!(data.unwrap().appointment_id, "apt-1");
    }

    #[test]
    fn missing_appointment_id_is_rejected() {
        let result = AppointmentCompletionData::from_raw(raw(None, Some("completed")));
        assert_matches!(result, Err(CompletionError::Validation(_)));
    }

    #[test]
    fn non_completed_status_is_rejected() {
        let result = AppointmentCompletionData::from_raw(raw(Some("apt-1"), Some("pending")));
        assert_matches!(result, Err(CompletionError::Validation(_)));
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let mut detail = raw(Some("apt-1"), Some("completed"));
        detail.completed_at = None;
        let result = AppointmentCompletionData::from_raw(detail);
        assert_matches!(result, Err(CompletionError::Validation(_)));
    }

    #[test]
    fn stats_reject_inconsistent_counts() {
        let result = CompletionStats::new(2, 5, 100, None);
        assert_matches!(result, Err(CompletionError::Validation(_)));
    }

    #[test]
    fn stats_helpers_summarize_the_average() {
        let stats = CompletionStats::new(10, 4, 3_900_000, Some(Utc::now())).unwrap();
        assert!(stats.has_completions());
        assert_eq!(stats.human_readable_average(), "1h 5m");
        assert_eq!(stats.average_completion_minutes(), 65.0);
        assert_eq!(stats.today_percentage(), 40.0);
    }

    #[test]
    fn empty_stats_carry_zeroes() {
        let stats = CompletionStats::empty();
        assert!(!stats.has_completions());
        assert_eq!(stats.human_readable_average(), "0m");
        assert_eq!(stats.today_percentage(), 0.0);
    }
}
