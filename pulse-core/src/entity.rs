//! Program child entities as supplied by the data service
//!
//! Entities are read-only snapshots. Status and severity values stay as the raw
//! strings the data service sent; every nullable field resolves to a documented
//! default before any classification happens.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Severity assumed when a risk carries none
pub const DEFAULT_SEVERITY: &str = "medium";

/// Probability/impact assumed when a risk carries none (the "medium" point of the 1-4 scale)
pub const DEFAULT_LIKELIHOOD: f64 = 2.0;

/// A program risk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// One of low / medium / high / critical
    #[serde(default)]
    pub severity: Option<String>,
    /// Roughly 1-4
    #[serde(default)]
    pub probability: Option<f64>,
    /// Roughly 1-4
    #[serde(default)]
    pub impact: Option<f64>,
    /// One of identified / in_progress / mitigated / resolved
    #[serde(default)]
    pub status: Option<String>,
}

impl Risk {
    /// Risk with only a severity set
    pub fn with_severity(severity: &str) -> Self {
        Risk {
            severity: Some(severity.to_string()),
            ..Risk::default()
        }
    }

    /// Risk with only probability and impact set
    pub fn with_likelihood(probability: Option<f64>, impact: Option<f64>) -> Self {
        Risk {
            probability,
            impact,
            ..Risk::default()
        }
    }

    pub fn severity_or_default(&self) -> &str {
        self.severity.as_deref().unwrap_or(DEFAULT_SEVERITY)
    }

    pub fn probability_or_default(&self) -> f64 {
        self.probability.unwrap_or(DEFAULT_LIKELIHOOD)
    }

    pub fn impact_or_default(&self) -> f64 {
        self.impact.unwrap_or(DEFAULT_LIKELIHOOD)
    }

    /// Whether this risk counts toward the health score's critical-risk deduction.
    ///
    /// Case-sensitive: only the literal values "high" and "critical" match.
    pub fn is_critical(&self) -> bool {
        matches!(self.severity.as_deref(), Some("high") | Some("critical"))
    }
}

/// A program milestone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// RFC 3339 timestamp or plain `YYYY-MM-DD` date
    #[serde(default)]
    pub due_date: Option<String>,
    /// One of completed / in_progress / at_risk / delayed / ...
    #[serde(default)]
    pub status: Option<String>,
}

impl Milestone {
    pub fn new(due_date: Option<&str>, status: Option<&str>) -> Self {
        Milestone {
            due_date: due_date.map(str::to_string),
            status: status.map(str::to_string),
            ..Milestone::default()
        }
    }

    /// Parsed due instant, `None` when absent or unparseable
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_date.as_deref().and_then(parse_due_date)
    }

    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some("completed")
    }

    /// Overdue means: has a due date, is not completed, and the due instant is
    /// strictly earlier than `now`. Time-of-day is not truncated.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        if self.is_completed() {
            return false;
        }
        match self.due_at() {
            Some(due) => due < now,
            None => false,
        }
    }
}

/// A cross-team dependency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// One of blocked / at_risk / on_track / completed / ...
    #[serde(default)]
    pub status: Option<String>,
}

impl Dependency {
    pub fn with_status(status: &str) -> Self {
        Dependency {
            status: Some(status.to_string()),
            ..Dependency::default()
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.status.as_deref() == Some("blocked")
    }
}

/// A team adopting the program's deliverables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adopter {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 0-100
    #[serde(default)]
    pub readiness_score: Option<f64>,
    /// One of ready / in_progress / blocked / completed
    #[serde(default)]
    pub status: Option<String>,
}

/// Identifiers arrive as strings or numbers depending on the backing table
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(<D::Error as serde::de::Error>::custom(format!(
            "invalid identifier: {}",
            other
        ))),
    }
}

/// Parse a due date as sent by the data service.
///
/// Accepts RFC 3339 timestamps, zone-less `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC)
/// and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> DateTime<Utc> {
        parse_due_date(raw).unwrap()
    }

    #[test]
    fn test_parse_plain_date_is_midnight_utc() {
        assert_eq!(at("2020-01-01"), at("2020-01-01T00:00:00Z"));
    }

    #[test]
    fn test_parse_offset_timestamp() {
        assert_eq!(at("2024-03-01T10:00:00+02:00"), at("2024-03-01T08:00:00Z"));
    }

    #[test]
    fn test_parse_zoneless_timestamp() {
        assert_eq!(at("2024-03-01T08:00:00.250"), at("2024-03-01T08:00:00.250Z"));
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert!(parse_due_date("next tuesday").is_none());
        assert!(parse_due_date("").is_none());
    }

    #[test]
    fn test_risk_defaults() {
        let risk = Risk::default();
        assert_eq!(risk.severity_or_default(), "medium");
        assert_eq!(risk.probability_or_default(), 2.0);
        assert_eq!(risk.impact_or_default(), 2.0);
        assert!(!risk.is_critical());
    }

    #[test]
    fn test_critical_match_is_case_sensitive() {
        assert!(Risk::with_severity("high").is_critical());
        assert!(Risk::with_severity("critical").is_critical());
        assert!(!Risk::with_severity("High").is_critical());
        assert!(!Risk::with_severity("CRITICAL").is_critical());
        assert!(!Risk::with_severity("medium").is_critical());
    }

    #[test]
    fn test_overdue_requires_due_date() {
        let now = at("2024-06-01T12:00:00Z");
        assert!(!Milestone::new(None, Some("in_progress")).is_overdue_at(now));
        assert!(!Milestone::new(Some("soon"), Some("in_progress")).is_overdue_at(now));
    }

    #[test]
    fn test_completed_is_never_overdue() {
        let now = at("2024-06-01T12:00:00Z");
        assert!(!Milestone::new(Some("2000-01-01"), Some("completed")).is_overdue_at(now));
    }

    #[test]
    fn test_overdue_compares_instants_without_truncation() {
        let now = at("2024-06-01T12:00:00Z");
        // Due earlier the same day counts
        assert!(Milestone::new(Some("2024-06-01"), None).is_overdue_at(now));
        assert!(Milestone::new(Some("2024-06-01T11:59:59Z"), None).is_overdue_at(now));
        // Strictly earlier: due exactly now is not overdue
        assert!(!Milestone::new(Some("2024-06-01T12:00:00Z"), None).is_overdue_at(now));
        assert!(!Milestone::new(Some("2024-06-02"), None).is_overdue_at(now));
    }

    #[test]
    fn test_deserialize_camel_case_fields() {
        let milestone: Milestone =
            serde_json::from_str(r#"{"id": "m1", "dueDate": "2020-01-01", "status": null}"#)
                .unwrap();
        assert_eq!(milestone.due_date.as_deref(), Some("2020-01-01"));
        assert!(milestone.status.is_none());

        let adopter: Adopter =
            serde_json::from_str(r#"{"id": "a1", "readinessScore": 75, "extra": true}"#).unwrap();
        assert_eq!(adopter.readiness_score, Some(75.0));
    }

    #[test]
    fn test_numeric_and_missing_ids() {
        let risk: Risk = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(risk.id, "42");
        let risk: Risk = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(risk.id, "");
        assert!(serde_json::from_str::<Risk>(r#"{"id": [1]}"#).is_err());
    }

    #[test]
    fn test_blocked_match_is_exact() {
        assert!(Dependency::with_status("blocked").is_blocked());
        assert!(!Dependency::with_status("Blocked").is_blocked());
        assert!(!Dependency::with_status("at_risk").is_blocked());
        assert!(!Dependency::default().is_blocked());
    }
}
