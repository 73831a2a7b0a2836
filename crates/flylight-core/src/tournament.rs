//! # Tournament Types
//!
//! Tournaments, their per-category events, player registrations and brackets.

use crate::error::{FlylightError, FlylightResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_CAPACITY: i64 = 32;
pub const DEFAULT_STATUS: &str = "scheduled";

/// A tournament as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub venue: String,
    pub poster_url: Option<String>,
    pub gmaps_link: Option<String>,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
    pub price: f64,
    /// Free-text lifecycle status set by the organizer
    pub status: String,
    pub capacity: i64,
    pub created_by: Option<String>,
    pub accept_entries: bool,
    pub bracket_data: Option<serde_json::Value>,
    pub status_override: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Status shown to players.
    ///
    /// An explicit override wins; otherwise open entries mean `upcoming`,
    /// and closed entries mean `ongoing` until the organizer marks it `completed`.
    pub fn display_status(&self) -> &str {
        if let Some(status) = self.status_override.as_deref() {
            return status;
        }
        if self.accept_entries {
            "upcoming"
        } else if self.status == "completed" {
            "completed"
        } else {
            "ongoing"
        }
    }
}

/// Parse a `YYYY-MM-DD` form value
pub fn parse_date(field: &str, value: &str) -> FlylightResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| FlylightError::validation(format!("Invalid {}: expected YYYY-MM-DD", field)))
}

/// Parse an `HH:MM` form value (seconds are tolerated)
pub fn parse_time(field: &str, value: &str) -> FlylightResult<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| FlylightError::validation(format!("Invalid {}: expected HH:MM", field)))
}

/// Registration lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Confirmed => "confirmed",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RegistrationStatus::Pending),
            "confirmed" => Some(RegistrationStatus::Confirmed),
            "cancelled" => Some(RegistrationStatus::Cancelled),
            _ => None,
        }
    }
}

/// A player's entry into a tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub tournament_id: String,
    pub participant_name: String,
    pub phone: String,
    pub email: String,
    pub academy_name: Option<String>,
    pub selected_venue: Option<String>,
    pub payment_id: Option<String>,
    pub status: RegistrationStatus,
    pub joined_at: DateTime<Utc>,
}

impl Registration {
    /// New pending registration; name, email and phone are required
    pub fn pending(
        tournament_id: impl Into<String>,
        participant_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> FlylightResult<Self> {
        let participant_name = participant_name.into();
        let email = email.into();
        let phone = phone.into();

        if participant_name.trim().is_empty()
            || email.trim().is_empty()
            || phone.trim().is_empty()
        {
            return Err(FlylightError::validation("Name, email and phone are required"));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            tournament_id: tournament_id.into(),
            participant_name,
            phone,
            email,
            academy_name: None,
            selected_venue: None,
            payment_id: None,
            status: RegistrationStatus::Pending,
            joined_at: Utc::now(),
        })
    }
}

/// A category within a tournament (e.g. "Under-15 Singles")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentEvent {
    pub id: String,
    pub tournament_id: String,
    pub name: String,
    pub category: Option<String>,
    pub entry_fee: f64,
    pub max_participants: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Bracket state for a tournament; `matches` grows as results are reported
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bracket {
    pub id: String,
    pub tournament_id: String,
    pub bracket_data: Option<serde_json::Value>,
    pub matches: Vec<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bracket {
    pub fn new(tournament_id: impl Into<String>, bracket_data: Option<serde_json::Value>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tournament_id: tournament_id.into(),
            bracket_data,
            matches: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn record_match(&mut self, result: serde_json::Value) {
        self.matches.push(result);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tournament() -> Tournament {
        Tournament {
            id: "t1".into(),
            name: "City Open".into(),
            description: None,
            venue: "Arena".into(),
            poster_url: None,
            gmaps_link: None,
            start_date: parse_date("start_date", "2026-01-10").unwrap(),
            start_time: parse_time("start_time", "09:00").unwrap(),
            end_date: parse_date("end_date", "2026-01-11").unwrap(),
            end_time: parse_time("end_time", "18:30").unwrap(),
            price: 500.0,
            status: DEFAULT_STATUS.into(),
            capacity: DEFAULT_CAPACITY,
            created_by: None,
            accept_entries: true,
            bracket_data: None,
            status_override: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_status() {
        let mut t = tournament();
        assert_eq!(t.display_status(), "upcoming");

        t.accept_entries = false;
        assert_eq!(t.display_status(), "ongoing");

        t.status = "completed".into();
        assert_eq!(t.display_status(), "completed");

        t.status_override = Some("postponed".into());
        assert_eq!(t.display_status(), "postponed");
    }

    #[test]
    fn test_parse_date_and_time() {
        assert!(parse_date("start_date", "10/01/2026").is_err());
        assert_eq!(parse_time("t", "07:05:30").unwrap().to_string(), "07:05:30");
        assert!(parse_time("t", "7pm").is_err());
    }

    #[test]
    fn test_registration_requires_contact() {
        assert!(Registration::pending("t1", "Asha", "a@b.com", "").is_err());
        let reg = Registration::pending("t1", "Asha", "a@b.com", "98450").unwrap();
        assert_eq!(reg.status, RegistrationStatus::Pending);
        assert!(reg.payment_id.is_none());
    }

    #[test]
    fn test_bracket_record_match() {
        let mut bracket = Bracket::new("t1", None);
        bracket.record_match(serde_json::json!({"round": 1, "winner": "A"}));
        assert_eq!(bracket.matches.len(), 1);
        assert!(bracket.updated_at >= bracket.created_at);
    }
}
