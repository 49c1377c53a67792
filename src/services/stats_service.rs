use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::ServiceError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AppointmentStats {
    pub total: i64,
    pub scheduled: i64,
    pub confirmed: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub upcoming: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_clients: i64,
    pub total_cases: i64,
    pub active_cases: i64,
    pub total_events: i64,
    pub upcoming_events: i64,
    pub appointments: AppointmentStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyStats {
    pub year: i32,
    pub month: u32,
    pub period: String,
    pub new_clients: i64,
    pub new_cases: i64,
    pub month_events: i64,
}

pub struct StatsService {
    pool: PgPool,
}

impl StatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn dashboard(&self, owner_id: Uuid) -> Result<DashboardStats, ServiceError> {
        let now = Utc::now();
        let week_later = now + Duration::days(7);

        let total_clients = self.count("clients", owner_id).await?;
        let total_cases = self.count("cases", owner_id).await?;
        let total_events = self.count("events", owner_id).await?;

        let active_cases: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cases WHERE user_id = $1 AND status = 'active'",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        let upcoming_events: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM events WHERE user_id = $1 AND starts_at >= $2 AND starts_at <= $3",
        )
        .bind(owner_id)
        .bind(now)
        .bind(week_later)
        .fetch_one(&self.pool)
        .await?;

        let appointments = sqlx::query_as::<_, AppointmentStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'scheduled') AS scheduled,
                COUNT(*) FILTER (WHERE status = 'confirmed') AS confirmed,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled,
                COUNT(*) FILTER (WHERE starts_at >= $2 AND status <> 'cancelled') AS upcoming
            FROM appointments WHERE user_id = $1
            "#,
        )
        .bind(owner_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_clients,
            total_cases,
            active_cases,
            total_events,
            upcoming_events,
            appointments,
        })
    }

    /// Counts for one calendar month; defaults to the current month.
    pub async fn monthly(
        &self,
        owner_id: Uuid,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<MonthlyStats, ServiceError> {
        let now = Utc::now();
        let year = year.unwrap_or_else(|| now.year());
        let month = month.unwrap_or_else(|| now.month());

        let (start, end) = month_bounds(year, month).ok_or_else(|| {
            ServiceError::InvalidInput(format!("Invalid year/month: {}-{}", year, month))
        })?;
        let start = to_utc(start);
        let end = to_utc(end);

        let new_clients: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM clients WHERE user_id = $1 AND created_at >= $2 AND created_at < $3",
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let new_cases: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cases WHERE user_id = $1 AND created_at >= $2 AND created_at < $3",
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        let month_events: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM events WHERE user_id = $1 AND starts_at >= $2 AND starts_at < $3",
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(MonthlyStats {
            year,
            month,
            period: format!("{}-{:02}", year, month),
            new_clients,
            new_cases,
            month_events,
        })
    }

    async fn count(&self, table: &str, owner_id: Uuid) -> Result<i64, ServiceError> {
        // Table names are fixed literals supplied by this module only
        let sql = format!("SELECT COUNT(*) FROM {} WHERE user_id = $1", table);
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Half-open bounds of a calendar month: `[first of month, first of next)`.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, end))
}

fn to_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_are_half_open() {
        let (start, end) = month_bounds(2024, 1).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn invalid_months_are_rejected() {
        assert!(month_bounds(2024, 0).is_none());
        assert!(month_bounds(2024, 13).is_none());
    }
}
