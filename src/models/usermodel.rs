use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Client,
    Worker,
    Admin,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Client => "client",
            UserRole::Worker => "worker",
            UserRole::Admin => "admin",
        }
    }
}

/// Verification state of a worker account. Only `Approved` workers are
/// matched to jobs.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "worker_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Pending,
    Approved,
    Rejected,
    Blocked,
}

impl WorkerStatus {
    pub fn to_str(&self) -> &str {
        match self {
            WorkerStatus::Pending => "pending",
            WorkerStatus::Approved => "approved",
            WorkerStatus::Rejected => "rejected",
            WorkerStatus::Blocked => "blocked",
        }
    }
}

pub const DEFAULT_WORKER_RATING: f64 = 5.0;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub balance: i64,

    // Worker capability profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_number: Option<String>,
    pub services: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_status: Option<WorkerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_worker(&self) -> bool {
        self.role == UserRole::Worker
    }

    pub fn is_approved_worker(&self) -> bool {
        self.is_worker() && self.worker_status == Some(WorkerStatus::Approved)
    }

    pub fn can_perform(&self, service_id: Uuid) -> bool {
        self.services.contains(&service_id)
    }

    pub fn current_rating(&self) -> f64 {
        self.rating.unwrap_or(DEFAULT_WORKER_RATING)
    }
}

/// Fields needed to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub role: UserRole,
    pub identity_number: Option<String>,
    pub services: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct WorkerReview {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub job_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
