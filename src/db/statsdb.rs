// db/statsdb.rs
//
// Reporting aggregates, computed by Postgres. Month boundaries are taken in
// UTC so they agree with the timestamps the API returns.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::statsmodel::*;

#[async_trait]
pub trait StatsExt {
    /// Completed and paid jobs per (year, month) of completion, oldest first.
    async fn monthly_revenue(&self) -> Result<Vec<MonthlyRevenue>, Error>;

    async fn total_revenue(&self) -> Result<i64, Error>;

    async fn revenue_by_service(&self) -> Result<Vec<ServiceRevenue>, Error>;

    async fn most_booked_services(&self) -> Result<Vec<ServiceBookings>, Error>;

    async fn worker_rankings(&self) -> Result<Vec<WorkerRanking>, Error>;

    async fn top_clients(&self) -> Result<Vec<ClientSpend>, Error>;

    async fn worker_job_totals(
        &self,
        worker_id: Uuid,
        income_since: DateTime<Utc>,
    ) -> Result<WorkerJobTotals, Error>;

    async fn worker_rating_counts(&self, worker_id: Uuid) -> Result<Vec<RatingCount>, Error>;
}

#[async_trait]
impl StatsExt for DBClient {
    async fn monthly_revenue(&self) -> Result<Vec<MonthlyRevenue>, Error> {
        sqlx::query_as::<_, MonthlyRevenue>(
            r#"
            SELECT
                EXTRACT(YEAR FROM completion_time AT TIME ZONE 'UTC')::INT AS year,
                EXTRACT(MONTH FROM completion_time AT TIME ZONE 'UTC')::INT AS month,
                SUM(price)::BIGINT AS total_revenue,
                COUNT(*) AS count
            FROM jobs
            WHERE status = 'completed'::job_status
              AND payment_status = 'paid'::payment_status
              AND completion_time IS NOT NULL
            GROUP BY 1, 2
            ORDER BY 1, 2
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn total_revenue(&self) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(price), 0)::BIGINT
            FROM jobs
            WHERE payment_status = 'paid'::payment_status
            "#,
        )
        .fetch_one(&self.pool)
        .await
    }

    async fn revenue_by_service(&self) -> Result<Vec<ServiceRevenue>, Error> {
        sqlx::query_as::<_, ServiceRevenue>(
            r#"
            SELECT
                j.service_id,
                COALESCE(s.service_name, '') AS service_name,
                SUM(j.price)::BIGINT AS total_revenue,
                COUNT(*) AS job_count
            FROM jobs j
            LEFT JOIN services s ON s.id = j.service_id
            WHERE j.payment_status = 'paid'::payment_status
            GROUP BY j.service_id, s.service_name
            ORDER BY total_revenue DESC, j.service_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn most_booked_services(&self) -> Result<Vec<ServiceBookings>, Error> {
        sqlx::query_as::<_, ServiceBookings>(
            r#"
            SELECT
                j.service_id,
                COALESCE(s.service_name, '') AS service_name,
                COUNT(*) AS job_count
            FROM jobs j
            LEFT JOIN services s ON s.id = j.service_id
            GROUP BY j.service_id, s.service_name
            ORDER BY job_count DESC, j.service_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn worker_rankings(&self) -> Result<Vec<WorkerRanking>, Error> {
        sqlx::query_as::<_, WorkerRanking>(
            r#"
            SELECT
                j.worker_id,
                COALESCE(u.full_name, '') AS full_name,
                COALESCE(u.email, '') AS email,
                COUNT(*) AS job_count
            FROM jobs j
            LEFT JOIN users u ON u.id = j.worker_id
            WHERE j.worker_id IS NOT NULL
            GROUP BY j.worker_id, u.full_name, u.email
            ORDER BY job_count DESC, j.worker_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn top_clients(&self) -> Result<Vec<ClientSpend>, Error> {
        sqlx::query_as::<_, ClientSpend>(
            r#"
            SELECT
                j.client_id,
                COALESCE(u.full_name, '') AS full_name,
                COALESCE(u.email, '') AS email,
                SUM(j.price)::BIGINT AS total_spent,
                COUNT(*) AS job_count
            FROM jobs j
            LEFT JOIN users u ON u.id = j.client_id
            WHERE j.payment_status = 'paid'::payment_status
            GROUP BY j.client_id, u.full_name, u.email
            ORDER BY total_spent DESC, j.client_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn worker_job_totals(
        &self,
        worker_id: Uuid,
        income_since: DateTime<Utc>,
    ) -> Result<WorkerJobTotals, Error> {
        sqlx::query_as::<_, WorkerJobTotals>(
            r#"
            SELECT
                COUNT(*) AS completed_jobs,
                COALESCE(SUM(price) FILTER (WHERE completion_time >= $2), 0)::BIGINT AS month_income
            FROM jobs
            WHERE worker_id = $1 AND status = 'completed'::job_status
            "#,
        )
        .bind(worker_id)
        .bind(income_since)
        .fetch_one(&self.pool)
        .await
    }

    async fn worker_rating_counts(&self, worker_id: Uuid) -> Result<Vec<RatingCount>, Error> {
        sqlx::query_as::<_, RatingCount>(
            r#"
            SELECT rating, COUNT(*) AS count
            FROM jobs
            WHERE worker_id = $1 AND rating IS NOT NULL
            GROUP BY rating
            ORDER BY rating
            "#,
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await
    }
}
