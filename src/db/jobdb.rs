// db/jobdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Error, Postgres, QueryBuilder};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::*;

const JOB_COLUMNS: &str = "id, client_id, worker_id, service_id, address, duration_hours, \
    scheduled_time, status, price, payment_status, rating, service_comments, \
    confirmation_time, completion_time, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerFilter {
    #[default]
    Any,
    Unassigned,
    Assigned(Uuid),
}

/// Conjunction of optional predicates over job rows.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub statuses: Vec<JobStatus>,
    pub client_id: Option<Uuid>,
    pub worker: WorkerFilter,
    pub service_ids: Option<Vec<Uuid>>,
    pub completed_from: Option<DateTime<Utc>>,
    pub completed_to: Option<DateTime<Utc>>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&job.status) {
            return false;
        }
        if let Some(client_id) = self.client_id {
            if job.client_id != client_id {
                return false;
            }
        }
        match self.worker {
            WorkerFilter::Any => {}
            WorkerFilter::Unassigned => {
                if job.worker_id.is_some() {
                    return false;
                }
            }
            WorkerFilter::Assigned(worker_id) => {
                if job.worker_id != Some(worker_id) {
                    return false;
                }
            }
        }
        if let Some(service_ids) = &self.service_ids {
            if !service_ids.contains(&job.service_id) {
                return false;
            }
        }
        if self.completed_from.is_some() || self.completed_to.is_some() {
            let Some(completed_at) = job.completion_time else {
                return false;
            };
            if self.completed_from.is_some_and(|from| completed_at < from) {
                return false;
            }
            if self.completed_to.is_some_and(|to| completed_at > to) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A page of jobs ordered by scheduled time, ties broken by id.
#[derive(Debug, Clone)]
pub struct JobQuery {
    pub filter: JobFilter,
    pub order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait JobExt {
    async fn create_job(&self, new_job: NewJob) -> Result<Job, Error>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    /// One page of matching jobs plus the total number of matches.
    async fn query_jobs(&self, query: &JobQuery) -> Result<(Vec<Job>, i64), Error>;

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, Error>;

    /// Assigns the worker only if the job is still pending, unassigned and its
    /// service is one of `capabilities`. `None` means the condition failed.
    async fn claim_job(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        capabilities: &[Uuid],
    ) -> Result<Option<Job>, Error>;

    /// Compare-and-set on status. `None` when the job is not in `expected`.
    async fn update_job_status(
        &self,
        job_id: Uuid,
        expected: JobStatus,
        target: JobStatus,
    ) -> Result<Option<Job>, Error>;

    /// Marks the job completed and paid and credits the assigned worker, all
    /// in one transaction. `None` when the job is not in `expected`.
    async fn complete_job(&self, job_id: Uuid, expected: JobStatus) -> Result<Option<Job>, Error>;

    async fn cancel_job(&self, job_id: Uuid, expected: JobStatus) -> Result<Option<Job>, Error>;

    /// Stores the rating on a completed, unrated job, appends the worker
    /// review and folds the rating into the worker's rolling rating.
    async fn rate_job(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        rating: &JobRating,
    ) -> Result<Option<Job>, Error>;
}

fn push_job_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    builder.push(" WHERE TRUE");

    if !filter.statuses.is_empty() {
        let statuses: Vec<String> = filter
            .statuses
            .iter()
            .map(|status| status.to_str().to_string())
            .collect();
        builder.push(" AND status::text = ANY(").push_bind(statuses).push(")");
    }

    if let Some(client_id) = filter.client_id {
        builder.push(" AND client_id = ").push_bind(client_id);
    }

    match filter.worker {
        WorkerFilter::Any => {}
        WorkerFilter::Unassigned => {
            builder.push(" AND worker_id IS NULL");
        }
        WorkerFilter::Assigned(worker_id) => {
            builder.push(" AND worker_id = ").push_bind(worker_id);
        }
    }

    if let Some(service_ids) = &filter.service_ids {
        builder
            .push(" AND service_id = ANY(")
            .push_bind(service_ids.clone())
            .push(")");
    }

    if let Some(from) = filter.completed_from {
        builder.push(" AND completion_time >= ").push_bind(from);
    }

    if let Some(to) = filter.completed_to {
        builder.push(" AND completion_time <= ").push_bind(to);
    }
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(&self, new_job: NewJob) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs
            (client_id, service_id, address, duration_hours, scheduled_time, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(new_job.client_id)
        .bind(new_job.service_id)
        .bind(new_job.address)
        .bind(new_job.duration_hours)
        .bind(new_job.scheduled_time)
        .bind(new_job.price)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS))
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn query_jobs(&self, query: &JobQuery) -> Result<(Vec<Job>, i64), Error> {
        let mut count_builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs");
        push_job_filter(&mut count_builder, &query.filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM jobs", JOB_COLUMNS));
        push_job_filter(&mut builder, &query.filter);
        builder.push(format!(" ORDER BY scheduled_time {}, id ASC", query.order.as_sql()));
        builder
            .push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        let jobs = builder.build_query_as::<Job>().fetch_all(&self.pool).await?;

        Ok((jobs, total))
    }

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, Error> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM jobs", JOB_COLUMNS));
        push_job_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at ASC, id ASC");

        builder.build_query_as::<Job>().fetch_all(&self.pool).await
    }

    async fn claim_job(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        capabilities: &[Uuid],
    ) -> Result<Option<Job>, Error> {
        // Single conditional write: concurrent claimers race on the row lock
        // and all but one see zero rows.
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET worker_id = $2, status = 'accepted'::job_status,
                confirmation_time = NOW(), updated_at = NOW()
            WHERE id = $1
              AND status = 'pending'::job_status
              AND worker_id IS NULL
              AND service_id = ANY($3)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(worker_id)
        .bind(capabilities)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_job_status(
        &self,
        job_id: Uuid,
        expected: JobStatus,
        target: JobStatus,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(expected)
        .bind(target)
        .fetch_optional(&self.pool)
        .await
    }

    async fn complete_job(&self, job_id: Uuid, expected: JobStatus) -> Result<Option<Job>, Error> {
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'completed'::job_status,
                payment_status = 'paid'::payment_status,
                completion_time = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND status = $2 AND worker_id IS NOT NULL
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(expected)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(job) = job else {
            tx.rollback().await?;
            return Ok(None);
        };

        let credited = sqlx::query(
            r#"
            UPDATE users
            SET balance = balance + $2, updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(job.worker_id)
        .bind(job.price)
        .execute(&mut *tx)
        .await?;

        if credited.rows_affected() != 1 {
            tx.rollback().await?;
            return Err(Error::RowNotFound);
        }

        tx.commit().await?;
        Ok(Some(job))
    }

    async fn cancel_job(&self, job_id: Uuid, expected: JobStatus) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'canceled'::job_status, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await
    }

    async fn rate_job(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        rating: &JobRating,
    ) -> Result<Option<Job>, Error> {
        let mut tx = self.pool.begin().await?;

        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET rating = $2, service_comments = $3, updated_at = NOW()
            WHERE id = $1
              AND status = 'completed'::job_status
              AND rating IS NULL
              AND worker_id = $4
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(rating.service_rating)
        .bind(rating.service_comment.clone())
        .bind(worker_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(job) = job else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO worker_reviews (worker_id, job_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            "#
        )
        .bind(worker_id)
        .bind(job_id)
        .bind(rating.worker_rating)
        .bind(rating.worker_comment.clone())
        .execute(&mut *tx)
        .await?;

        // Two-term average of the previous rating and the new one.
        sqlx::query(
            r#"
            UPDATE users
            SET rating = (COALESCE(rating, 5) + $2) / 2.0, updated_at = NOW()
            WHERE id = $1
            "#
        )
        .bind(worker_id)
        .bind(rating.worker_rating as f64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(job))
    }
}
