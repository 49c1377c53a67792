use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HearingStatus {
    Scheduled,
    Completed,
    Postponed,
    Cancelled,
}

impl HearingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HearingStatus::Scheduled => "scheduled",
            HearingStatus::Completed => "completed",
            HearingStatus::Postponed => "postponed",
            HearingStatus::Cancelled => "cancelled",
        }
    }
}

/// A hearing row joined with the parent case's title
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Hearing {
    pub id: Uuid,
    pub user_id: Uuid,
    pub case_id: Uuid,
    pub case_title: Option<String>,
    pub hearing_date: DateTime<Utc>,
    pub court_room: Option<String>,
    pub hearing_type: String,
    pub status: String,
    pub notes: Option<String>,
    pub result: Option<String>,
    pub next_hearing_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HearingCreate {
    pub case_id: Uuid,
    pub hearing_date: DateTime<Utc>,
    pub court_room: Option<String>,
    #[serde(default = "default_hearing_type")]
    pub hearing_type: String,
    pub notes: Option<String>,
}

fn default_hearing_type() -> String {
    "hearing".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HearingUpdate {
    pub hearing_date: Option<DateTime<Utc>>,
    pub court_room: Option<String>,
    pub hearing_type: Option<String>,
    pub status: Option<HearingStatus>,
    pub notes: Option<String>,
    pub result: Option<String>,
    pub next_hearing_date: Option<DateTime<Utc>>,
}

impl HearingUpdate {
    pub fn is_empty(&self) -> bool {
        self.hearing_date.is_none()
            && self.court_room.is_none()
            && self.hearing_type.is_none()
            && self.status.is_none()
            && self.notes.is_none()
            && self.result.is_none()
            && self.next_hearing_date.is_none()
    }
}
