use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Active,
    Pending,
    Closed,
    Archived,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Active => "active",
            CaseStatus::Pending => "pending",
            CaseStatus::Closed => "closed",
            CaseStatus::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasePriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl CasePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            CasePriority::Low => "low",
            CasePriority::Medium => "medium",
            CasePriority::High => "high",
            CasePriority::Urgent => "urgent",
        }
    }
}

/// A case row joined with the referenced client's name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Case {
    pub id: Uuid,
    pub user_id: Uuid,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub case_number: String,
    pub title: String,
    pub description: Option<String>,
    pub case_type: String,
    pub status: String,
    pub priority: String,
    pub court_name: Option<String>,
    pub judge_name: Option<String>,
    pub opposing_party: Option<String>,
    pub case_value: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaseCreate {
    pub case_number: String,
    pub title: String,
    pub description: Option<String>,
    pub case_type: String,
    pub client_id: Option<Uuid>,
    pub court_name: Option<String>,
    pub judge_name: Option<String>,
    pub opposing_party: Option<String>,
    pub case_value: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    #[serde(default = "default_priority")]
    pub priority: CasePriority,
    pub notes: Option<String>,
}

fn default_priority() -> CasePriority {
    CasePriority::Medium
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseUpdate {
    pub case_number: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub case_type: Option<String>,
    pub status: Option<CaseStatus>,
    pub client_id: Option<Uuid>,
    pub court_name: Option<String>,
    pub judge_name: Option<String>,
    pub opposing_party: Option<String>,
    pub case_value: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub priority: Option<CasePriority>,
    pub notes: Option<String>,
}

impl CaseUpdate {
    pub fn is_empty(&self) -> bool {
        self.case_number.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.case_type.is_none()
            && self.status.is_none()
            && self.client_id.is_none()
            && self.court_name.is_none()
            && self.judge_name.is_none()
            && self.opposing_party.is_none()
            && self.case_value.is_none()
            && self.start_date.is_none()
            && self.expected_end_date.is_none()
            && self.actual_end_date.is_none()
            && self.priority.is_none()
            && self.notes.is_none()
    }
}
