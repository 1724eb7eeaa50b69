// service/matching_service.rs
//
// Which jobs a worker may see and take, decided purely from the worker's
// capability profile and the job row.
use uuid::Uuid;

use crate::{
    db::jobdb::{JobFilter, WorkerFilter},
    models::{
        jobmodel::{Job, JobStatus},
        usermodel::User,
    },
    service::error::ServiceError,
};

/// Statuses listed for a worker when no status is requested.
pub const WORKER_DEFAULT_STATUSES: [JobStatus; 3] = [
    JobStatus::Accepted,
    JobStatus::InProgress,
    JobStatus::Completed,
];

/// Store filter for a worker's job query. `status = pending` means the open
/// pool; any other status means jobs assigned to the worker. Returns `None`
/// when the capability set is empty, as nothing can match.
pub fn worker_job_filter(worker: &User, status: Option<JobStatus>) -> Option<JobFilter> {
    if worker.services.is_empty() {
        return None;
    }

    let (statuses, assignment) = match status {
        Some(JobStatus::Pending) => (vec![JobStatus::Pending], WorkerFilter::Unassigned),
        Some(other) => (vec![other], WorkerFilter::Assigned(worker.id)),
        None => (WORKER_DEFAULT_STATUSES.to_vec(), WorkerFilter::Assigned(worker.id)),
    };

    Some(JobFilter {
        statuses,
        worker: assignment,
        service_ids: Some(worker.services.clone()),
        ..Default::default()
    })
}

/// True when the job sits in the open pool and the worker could take it.
pub fn is_available_to(job: &Job, worker: &User) -> bool {
    worker.is_approved_worker()
        && job.status == JobStatus::Pending
        && job.is_unassigned()
        && worker.can_perform(job.service_id)
}

/// Checks the worker side of a claim before the conditional write runs.
pub fn ensure_can_claim(worker: &User, job: &Job) -> Result<(), ServiceError> {
    if !worker.is_approved_worker() {
        return Err(ServiceError::WorkerNotApproved(worker.id));
    }
    if !worker.can_perform(job.service_id) {
        return Err(ServiceError::ServiceNotInCapabilities {
            worker_id: worker.id,
            service_id: job.service_id,
        });
    }
    Ok(())
}

/// Drops service ids that are not in `known`, keeping order and removing
/// duplicates.
pub fn normalize_capabilities(requested: &[Uuid], known: &[Uuid]) -> Vec<Uuid> {
    let mut capabilities = Vec::with_capacity(requested.len());
    for id in requested {
        if known.contains(id) && !capabilities.contains(id) {
            capabilities.push(*id);
        }
    }
    capabilities
}
