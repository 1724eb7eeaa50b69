use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: i32,
    pub total_revenue: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ServiceRevenue {
    pub service_id: Uuid,
    pub service_name: String,
    pub total_revenue: i64,
    pub job_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ServiceBookings {
    pub service_id: Uuid,
    pub service_name: String,
    pub job_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct WorkerRanking {
    pub worker_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub job_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ClientSpend {
    pub client_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub total_spent: i64,
    pub job_count: i64,
}

/// Completed-job count and income since a given instant for one worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, sqlx::FromRow)]
pub struct WorkerJobTotals {
    pub completed_jobs: i64,
    pub month_income: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct RatingCount {
    pub rating: i32,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerDashboard {
    pub completed_jobs: i64,
    pub month_income: i64,
    pub ratings: BTreeMap<i32, i64>,
    pub good_jobs: i64,
    pub average_jobs: i64,
}
