use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A calendar event joined with the referenced case's title
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub case_id: Option<Uuid>,
    pub case_title: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub reminder: bool,
    pub reminder_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventCreate {
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_event_type")]
    pub event_type: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    #[serde(default)]
    pub reminder: bool,
    #[serde(default = "default_reminder_minutes")]
    pub reminder_minutes: i32,
    pub case_id: Option<Uuid>,
}

fn default_event_type() -> String {
    "hearing".to_string()
}

fn default_reminder_minutes() -> i32 {
    60
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub reminder: Option<bool>,
    pub reminder_minutes: Option<i32>,
    pub case_id: Option<Uuid>,
}

impl EventUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.event_type.is_none()
            && self.starts_at.is_none()
            && self.ends_at.is_none()
            && self.location.is_none()
            && self.reminder.is_none()
            && self.reminder_minutes.is_none()
            && self.case_id.is_none()
    }
}
