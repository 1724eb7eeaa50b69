// service/job_service.rs
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    db::{
        db::MarketStore,
        jobdb::{JobFilter, JobQuery, SortOrder, WorkerFilter},
    },
    dtos::jobdtos::*,
    models::{jobmodel::*, usermodel::*},
    service::{error::ServiceError, matching_service, pricing::PricingEngine},
};

#[derive(Debug, Clone)]
pub struct JobService {
    db_client: Arc<dyn MarketStore>,
    pricing: PricingEngine,
    cancel_lead_hours: i64,
}

impl JobService {
    pub fn new(db_client: Arc<dyn MarketStore>, pricing: PricingEngine, cancel_lead_hours: i64) -> Self {
        Self {
            db_client,
            pricing,
            cancel_lead_hours,
        }
    }

    pub async fn create_job(&self, client: &User, job_data: CreateJobDto) -> Result<Job, ServiceError> {
        if client.role != UserRole::Client {
            return Err(ServiceError::Forbidden("Only clients can create jobs".to_string()));
        }

        let address = job_data.address.trim().to_string();
        if address.is_empty() {
            return Err(ServiceError::Validation("address is required".to_string()));
        }

        if !(MIN_JOB_HOURS..=MAX_JOB_HOURS).contains(&job_data.duration_hours) {
            return Err(ServiceError::Validation(format!(
                "duration_hours must be between {} and {}",
                MIN_JOB_HOURS, MAX_JOB_HOURS
            )));
        }

        if job_data.scheduled_time <= Utc::now() {
            return Err(ServiceError::Validation(
                "scheduled_time must be in the future".to_string(),
            ));
        }

        let service = self
            .db_client
            .get_service_by_id(job_data.service_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Validation(format!("service {} does not exist", job_data.service_id))
            })?;

        let price = self.pricing.quote(&service, job_data.duration_hours)?;

        let job = self
            .db_client
            .create_job(NewJob {
                client_id: client.id,
                service_id: service.id,
                address,
                duration_hours: job_data.duration_hours,
                scheduled_time: job_data.scheduled_time,
                price,
            })
            .await?;

        tracing::info!(
            "job {} created by client {} for service {} at price {}",
            job.id,
            client.id,
            service.code,
            job.price
        );

        Ok(job)
    }

    pub async fn client_jobs(&self, client_id: Uuid, paging: &PageQueryDto) -> Result<(Vec<Job>, i64), ServiceError> {
        let query = JobQuery {
            filter: JobFilter {
                client_id: Some(client_id),
                ..Default::default()
            },
            order: SortOrder::Desc,
            limit: paging.limit() as i64,
            offset: paging.offset(),
        };

        Ok(self.db_client.query_jobs(&query).await?)
    }

    pub async fn job_details(&self, viewer: &User, job_id: Uuid) -> Result<JobDetailsDto, ServiceError> {
        let job = self.get_job(job_id).await?;

        let visible = viewer.is_admin()
            || job.client_id == viewer.id
            || job.is_assigned_to(viewer.id)
            || matching_service::is_available_to(&job, viewer);
        if !visible {
            return Err(ServiceError::UnauthorizedJobAccess(viewer.id, job_id));
        }

        let service = self.db_client.get_service_by_id(job.service_id).await?;

        let mut user_ids = vec![job.client_id];
        if let Some(worker_id) = job.worker_id {
            user_ids.push(worker_id);
        }
        let users = self.db_client.get_users_by_ids(&user_ids).await?;

        let client_name = users
            .iter()
            .find(|u| u.id == job.client_id)
            .map(|u| u.full_name.clone());
        let worker = job.worker_id.and_then(|worker_id| {
            users.iter().find(|u| u.id == worker_id).map(|w| WorkerSummaryDto {
                id: w.id,
                full_name: w.full_name.clone(),
                phone_number: w.phone_number.clone(),
                rating: w.current_rating(),
            })
        });

        Ok(JobDetailsDto {
            job,
            service,
            client_name,
            worker,
        })
    }

    pub async fn claim_job(&self, worker: &User, job_id: Uuid) -> Result<Job, ServiceError> {
        if !worker.is_approved_worker() {
            return Err(ServiceError::WorkerNotApproved(worker.id));
        }

        let job = self.get_job(job_id).await?;
        matching_service::ensure_can_claim(worker, &job)?;

        match self
            .db_client
            .claim_job(job_id, worker.id, &worker.services)
            .await?
        {
            Some(job) => {
                tracing::info!("job {} claimed by worker {}", job_id, worker.id);
                Ok(job)
            }
            None => {
                tracing::warn!(
                    "worker {} lost claim on job {} (status {})",
                    worker.id,
                    job_id,
                    job.status
                );
                Err(ServiceError::JobAlreadyClaimed(job_id))
            }
        }
    }

    pub async fn advance_job(&self, actor: &User, job_id: Uuid, target: JobStatus) -> Result<Job, ServiceError> {
        let job = self.get_job(job_id).await?;

        match actor.role {
            UserRole::Admin => {}
            UserRole::Worker if job.is_assigned_to(actor.id) => {
                // A worker blocked after claiming keeps the assignment but
                // cannot move it on; an admin can still close the job out.
                if !actor.is_approved_worker() {
                    return Err(ServiceError::WorkerNotApproved(actor.id));
                }
            }
            _ => return Err(ServiceError::UnauthorizedJobAccess(actor.id, job_id)),
        }

        if !job.status.can_advance_to(target) {
            return Err(ServiceError::InvalidTransition {
                job_id,
                from: job.status,
                to: target,
            });
        }

        let updated = if target == JobStatus::Completed {
            self.db_client.complete_job(job_id, job.status).await?
        } else {
            self.db_client
                .update_job_status(job_id, job.status, target)
                .await?
        };

        let Some(updated) = updated else {
            tracing::warn!(
                "status update on job {} lost: expected {} before moving to {}",
                job_id,
                job.status,
                target
            );
            return Err(ServiceError::StaleJobState(job_id));
        };

        if target == JobStatus::Completed {
            tracing::info!(
                "job {} completed and paid, worker {:?} credited {}",
                job_id,
                updated.worker_id,
                updated.price
            );
        } else {
            tracing::info!("job {} moved from {} to {} by {}", job_id, job.status, target, actor.id);
        }

        Ok(updated)
    }

    pub async fn cancel_job(&self, actor: &User, job_id: Uuid) -> Result<Job, ServiceError> {
        let job = self.get_job(job_id).await?;

        if !actor.is_admin() && job.client_id != actor.id {
            return Err(ServiceError::UnauthorizedJobAccess(actor.id, job_id));
        }

        if !job.status.can_cancel() {
            return Err(ServiceError::InvalidTransition {
                job_id,
                from: job.status,
                to: JobStatus::Canceled,
            });
        }

        if !actor.is_admin() && job.scheduled_time - Utc::now() < Duration::hours(self.cancel_lead_hours) {
            return Err(ServiceError::CancellationWindow {
                job_id,
                lead_hours: self.cancel_lead_hours,
            });
        }

        let Some(canceled) = self.db_client.cancel_job(job_id, job.status).await? else {
            tracing::warn!("cancel of job {} lost: status changed from {}", job_id, job.status);
            return Err(ServiceError::StaleJobState(job_id));
        };

        tracing::info!("job {} cancelled by {}", job_id, actor.id);
        Ok(canceled)
    }

    pub async fn rate_job(&self, client: &User, job_id: Uuid, rating: JobRating) -> Result<Job, ServiceError> {
        for value in [rating.service_rating, rating.worker_rating] {
            if !(1..=5).contains(&value) {
                return Err(ServiceError::Validation("ratings must be between 1 and 5".to_string()));
            }
        }

        let job = self.get_job(job_id).await?;

        if job.client_id != client.id {
            return Err(ServiceError::UnauthorizedJobAccess(client.id, job_id));
        }
        if job.status != JobStatus::Completed {
            return Err(ServiceError::JobNotCompleted(job_id));
        }
        if job.rating.is_some() {
            return Err(ServiceError::AlreadyRated(job_id));
        }
        let Some(worker_id) = job.worker_id else {
            return Err(ServiceError::JobNotCompleted(job_id));
        };

        let Some(rated) = self.db_client.rate_job(job_id, worker_id, &rating).await? else {
            tracing::warn!("rating of job {} lost to a concurrent rating", job_id);
            return Err(ServiceError::AlreadyRated(job_id));
        };

        tracing::info!(
            "job {} rated {} by client {}, worker {} rated {}",
            job_id,
            rating.service_rating,
            client.id,
            worker_id,
            rating.worker_rating
        );

        Ok(rated)
    }

    pub async fn worker_jobs(
        &self,
        worker: &User,
        status: Option<JobStatus>,
        paging: &PageQueryDto,
    ) -> Result<(Vec<Job>, i64), ServiceError> {
        if !worker.is_approved_worker() {
            return Err(ServiceError::WorkerNotApproved(worker.id));
        }

        let Some(filter) = matching_service::worker_job_filter(worker, status) else {
            return Ok((Vec::new(), 0));
        };

        let query = JobQuery {
            filter,
            order: SortOrder::Asc,
            limit: paging.limit() as i64,
            offset: paging.offset(),
        };

        Ok(self.db_client.query_jobs(&query).await?)
    }

    pub async fn worker_history(&self, worker: &User, query: &HistoryQueryDto) -> Result<Vec<Job>, ServiceError> {
        let (completed_from, completed_to) = match (query.from, query.to) {
            (Some(from), Some(to)) => {
                if from > to {
                    return Err(ServiceError::Validation("from must not be after to".to_string()));
                }
                let (start, _) = unit_bounds(from, query.granularity)?;
                let (_, end) = unit_bounds(to, query.granularity)?;
                (Some(start), Some(end))
            }
            _ => (None, None),
        };

        let filter = JobFilter {
            statuses: vec![JobStatus::Completed],
            worker: WorkerFilter::Assigned(worker.id),
            completed_from,
            completed_to,
            ..Default::default()
        };

        let mut jobs = self.db_client.list_jobs(&filter).await?;
        jobs.sort_by(|a, b| b.completion_time.cmp(&a.completion_time).then(a.id.cmp(&b.id)));
        Ok(jobs)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Job, ServiceError> {
        self.db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))
    }
}

/// First and last instant of the day or month containing `date`.
pub fn unit_bounds(date: NaiveDate, granularity: Granularity) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
    let invalid = || ServiceError::Validation(format!("invalid date {}", date));

    let (start, next) = match granularity {
        Granularity::Day => (date, date.succ_opt().ok_or_else(invalid)?),
        Granularity::Month => {
            let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).ok_or_else(invalid)?;
            let next = if date.month() == 12 {
                NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
            }
            .ok_or_else(invalid)?;
            (start, next)
        }
    };

    let start = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).ok_or_else(invalid)?);
    let next = Utc.from_utc_datetime(&next.and_hms_opt(0, 0, 0).ok_or_else(invalid)?);
    Ok((start, next - Duration::microseconds(1)))
}
