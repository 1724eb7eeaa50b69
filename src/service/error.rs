use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{error::HttpError, models::jobmodel::JobStatus};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Worker {0} not found")]
    WorkerNotFound(Uuid),

    #[error("Service {0} not found")]
    ServiceNotFound(Uuid),

    #[error("Job {job_id} cannot move from {from} to {to}")]
    InvalidTransition {
        job_id: Uuid,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Job {0} has already been taken or is no longer pending")]
    JobAlreadyClaimed(Uuid),

    #[error("Job {0} was modified concurrently, reload and retry")]
    StaleJobState(Uuid),

    #[error("Job {job_id} cannot be cancelled less than {lead_hours} hours before it starts")]
    CancellationWindow { job_id: Uuid, lead_hours: i64 },

    #[error("Job {0} must be completed before it can be rated")]
    JobNotCompleted(Uuid),

    #[error("Job {0} has already been rated")]
    AlreadyRated(Uuid),

    #[error("User {0} is not authorized to perform this action on job {1}")]
    UnauthorizedJobAccess(Uuid, Uuid),

    #[error("Worker {0} is not approved")]
    WorkerNotApproved(Uuid),

    #[error("Worker {worker_id} does not offer service {service_id}")]
    ServiceNotInCapabilities { worker_id: Uuid, service_id: Uuid },

    #[error("Unknown service kind '{0}'")]
    UnknownServiceKind(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::WorkerNotFound(_)
            | ServiceError::ServiceNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidTransition { .. }
            | ServiceError::JobAlreadyClaimed(_)
            | ServiceError::StaleJobState(_)
            | ServiceError::CancellationWindow { .. }
            | ServiceError::JobNotCompleted(_)
            | ServiceError::AlreadyRated(_)
            | ServiceError::Conflict(_) => StatusCode::CONFLICT,

            ServiceError::UnauthorizedJobAccess(_, _)
            | ServiceError::WorkerNotApproved(_)
            | ServiceError::ServiceNotInCapabilities { .. }
            | ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,

            ServiceError::UnknownServiceKind(_) | ServiceError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error.status_code() {
            StatusCode::NOT_FOUND => HttpError::not_found(error.to_string()),
            StatusCode::CONFLICT => HttpError::conflict(error.to_string()),
            StatusCode::FORBIDDEN => HttpError::forbidden(error.to_string()),
            StatusCode::BAD_REQUEST => HttpError::bad_request(error.to_string()),
            _ => {
                tracing::error!("persistence failure: {}", error);
                HttpError::persistence_error("Something went wrong while accessing storage")
            }
        }
    }
}
