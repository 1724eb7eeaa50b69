use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Canceled,
}

impl JobStatus {
    pub fn to_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Accepted => "accepted",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Canceled)
    }

    /// Position along the forward path; `Canceled` is off the path.
    fn rank(&self) -> Option<u8> {
        match self {
            JobStatus::Pending => Some(0),
            JobStatus::Accepted => Some(1),
            JobStatus::InProgress => Some(2),
            JobStatus::Completed => Some(3),
            JobStatus::Canceled => None,
        }
    }

    /// Moves allowed through a status update. Leaving `Pending` only happens
    /// through a claim and cancelling has its own operation.
    pub fn can_advance_to(&self, target: JobStatus) -> bool {
        if *self == JobStatus::Pending || self.is_terminal() {
            return false;
        }
        match (self.rank(), target.rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }

    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            JobStatus::Pending | JobStatus::Accepted | JobStatus::InProgress
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub client_id: Uuid,
    pub worker_id: Option<Uuid>,
    pub service_id: Uuid,
    pub address: String,
    pub duration_hours: f64,
    pub scheduled_time: DateTime<Utc>,
    pub status: JobStatus,
    pub price: i64,
    pub payment_status: PaymentStatus,
    pub rating: Option<i32>,
    pub service_comments: Option<String>,
    pub confirmation_time: Option<DateTime<Utc>>,
    pub completion_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn is_unassigned(&self) -> bool {
        self.worker_id.is_none()
    }

    pub fn is_assigned_to(&self, worker_id: Uuid) -> bool {
        self.worker_id == Some(worker_id)
    }
}

/// Fields needed to insert a job row; price is already frozen.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub address: String,
    pub duration_hours: f64,
    pub scheduled_time: DateTime<Utc>,
    pub price: i64,
}

/// Rating submitted by the owning client for a completed job.
#[derive(Debug, Clone)]
pub struct JobRating {
    pub service_rating: i32,
    pub service_comment: Option<String>,
    pub worker_rating: i32,
    pub worker_comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_moves_only() {
        assert!(JobStatus::Accepted.can_advance_to(JobStatus::InProgress));
        assert!(JobStatus::Accepted.can_advance_to(JobStatus::Completed));
        assert!(JobStatus::InProgress.can_advance_to(JobStatus::Completed));

        assert!(!JobStatus::InProgress.can_advance_to(JobStatus::Accepted));
        assert!(!JobStatus::Accepted.can_advance_to(JobStatus::Accepted));
        assert!(!JobStatus::Accepted.can_advance_to(JobStatus::Pending));
    }

    #[test]
    fn pending_and_terminal_states_cannot_be_advanced() {
        assert!(!JobStatus::Pending.can_advance_to(JobStatus::Accepted));
        assert!(!JobStatus::Pending.can_advance_to(JobStatus::Completed));
        assert!(!JobStatus::Completed.can_advance_to(JobStatus::Canceled));
        assert!(!JobStatus::Canceled.can_advance_to(JobStatus::Completed));
        assert!(!JobStatus::InProgress.can_advance_to(JobStatus::Canceled));
    }

    #[test]
    fn cancel_only_from_open_states() {
        assert!(JobStatus::Pending.can_cancel());
        assert!(JobStatus::Accepted.can_cancel());
        assert!(JobStatus::InProgress.can_cancel());
        assert!(!JobStatus::Completed.can_cancel());
        assert!(!JobStatus::Canceled.can_cancel());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&JobStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let parsed: JobStatus = serde_json::from_str("\"canceled\"").unwrap();
        assert_eq!(parsed, JobStatus::Canceled);
    }
}
