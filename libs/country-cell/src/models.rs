use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_models::{CountryIso, ScheduleId};

/// Wire payload carried inside a notification envelope's `Message` field.
///
/// Every field is optional so presence checks happen in validation, where
/// they can produce a precise error, instead of failing inside serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub insured_id: Option<String>,
    #[serde(default)]
    pub schedule_id: Option<ScheduleId>,
    #[serde(default, rename = "countryISO")]
    pub country_iso: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A fully validated appointment ready for country-level processing.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentData {
    pub id: String,
    pub insured_id: String,
    pub schedule_id: i64,
    pub country_iso: CountryIso,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Static per-country configuration: timezone offset, business hours and
/// insurance categorization by the first digit of the insured id.
#[derive(Debug, Clone)]
pub struct CountryProfile {
    pub country: CountryIso,
    pub display_name: &'static str,
    /// Offset from UTC in hours, e.g. -5 for Peru.
    pub utc_offset_hours: i64,
    /// Inclusive start hour and exclusive end hour, Monday to Friday.
    pub weekday_hours: (u32, u32),
    /// Inclusive start hour and exclusive end hour on Saturday.
    pub saturday_hours: (u32, u32),
    /// First digit of the insured id mapped to an insurance category.
    pub insurance_prefixes: [(char, &'static str); 3],
    pub default_insurance: &'static str,
}

impl CountryProfile {
    pub fn peru() -> Self {
        Self {
            country: CountryIso::PE,
            display_name: "Peru",
            utc_offset_hours: -5,
            weekday_hours: (8, 18),
            saturday_hours: (8, 14),
            insurance_prefixes: [('1', "EsSalud"), ('2', "SIS"), ('3', "Privado")],
            default_insurance: "Otro",
        }
    }

    pub fn chile() -> Self {
        Self {
            country: CountryIso::CL,
            display_name: "Chile",
            utc_offset_hours: -4,
            weekday_hours: (8, 19),
            saturday_hours: (8, 13),
            insurance_prefixes: [('1', "FONASA"), ('2', "ISAPRE"), ('3', "Particular")],
            default_insurance: "Otro",
        }
    }

    pub fn for_country(country: CountryIso) -> Self {
        match country {
            CountryIso::PE => Self::peru(),
            CountryIso::CL => Self::chile(),
        }
    }

    /// Classifies an insured id into an insurance category by its first digit.
    pub fn insurance_category(&self, insured_id: &str) -> &'static str {
        let first = insured_id.chars().next().unwrap_or('0');
        self.insurance_prefixes
            .iter()
            .find(|(prefix, _)| *prefix == first)
            .map(|(_, category)| *category)
            .unwrap_or(self.default_insurance)
    }
}

/// Complexity tier for a schedule, derived from the schedule id range.
pub fn specialist_tier(schedule_id: i64) -> &'static str {
    match schedule_id {
        id if id >= 3000 => "high-complexity specialist",
        id if id >= 2000 => "senior specialist",
        id if id >= 1000 => "general specialist",
        _ => "standard consultation",
    }
}

/// Running counters for one country's processing loop.
#[derive(Debug, Clone, Default)]
pub struct ProcessingStats {
    pub processed_count: u64,
    pub last_processed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peru_insurance_categories_follow_first_digit() {
        let profile = CountryProfile::peru();
        assert_eq!(profile.insurance_category("12345"), "EsSalud");
        assert_eq!(profile.insurance_category("23456"), "SIS");
        assert_eq!(profile.insurance_category("34567"), "Privado");
        assert_eq!(profile.insurance_category("94567"), "Otro");
    }

    #[test]
    fn chile_insurance_categories_follow_first_digit() {
        let profile = CountryProfile::chile();
        assert_eq!(profile.insurance_category("10001"), "FONASA");
        assert_eq!(profile.insurance_category("20001"), "ISAPRE");
        assert_eq!(profile.insurance_category("30001"), "Particular");
        assert_eq!(profile.insurance_category("40001"), "Otro");
    }

    #[test]
    fn specialist_tiers_follow_schedule_ranges() {
        assert_eq!(specialist_tier(999), "standard consultation");
        assert_eq!(specialist_tier(1000), "general specialist");
        assert_eq!(specialist_tier(2500), "senior specialist");
        assert_eq!(specialist_tier(3000), "high-complexity specialist");
    }

    #[test]
    fn message_deserializes_with_missing_fields() {
        let message: AppointmentMessage = serde_json::from_str("{}").unwrap();
        assert!(message.id.is_none());
        assert!(message.country_iso.is_none());
    }

    #[test]
    fn message_accepts_numeric_and_string_schedule_ids() {
        let message: AppointmentMessage =
            serde_json::from_str(r#"{"scheduleId": 100}"#).unwrap();
        assert_eq!(message.schedule_id.unwrap().as_positive(), Some(100));

        let message: AppointmentMessage =
            serde_json::from_str(r#"{"scheduleId": "250"}"#).unwrap();
        assert_eq!(message.schedule_id.unwrap().as_positive(), Some(250));
    }
}
