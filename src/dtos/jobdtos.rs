use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    jobmodel::{Job, JobRating, JobStatus},
    servicemodel::ServiceDefinition,
};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;
pub const MIN_JOB_HOURS: f64 = 0.5;
pub const MAX_JOB_HOURS: f64 = 24.0;

//Job Dto
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateJobDto {
    pub service_id: Uuid,

    #[validate(length(min = 1, max = 500, message = "Address must be between 1 and 500 characters"))]
    pub address: String,

    #[validate(range(min = 0.5, max = 24.0, message = "Duration must be between 0.5 and 24 hours"))]
    pub duration_hours: f64,

    pub scheduled_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdvanceJobDto {
    pub status: JobStatus,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RateJobDto {
    #[validate(range(min = 1, max = 5, message = "Service rating must be between 1 and 5"))]
    pub service_rating: i32,

    #[validate(range(min = 1, max = 5, message = "Worker rating must be between 1 and 5"))]
    pub worker_rating: i32,

    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub service_comment: Option<String>,

    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub worker_comment: Option<String>,
}

impl From<RateJobDto> for JobRating {
    fn from(dto: RateJobDto) -> Self {
        JobRating {
            service_rating: dto.service_rating,
            service_comment: dto.service_comment.filter(|c| !c.trim().is_empty()),
            worker_rating: dto.worker_rating,
            worker_comment: dto.worker_comment.filter(|c| !c.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct PageQueryDto {
    #[validate(range(min = 1, max = 100000))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl PageQueryDto {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
    }

    /// Row offset of the requested page, computed in i64 so it cannot wrap.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page()) - 1) * i64::from(self.limit())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct WorkerJobsQueryDto {
    pub status: Option<JobStatus>,
    #[validate(range(min = 1, max = 100000))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl WorkerJobsQueryDto {
    pub fn paging(&self) -> PageQueryDto {
        PageQueryDto {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    #[default]
    Month,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HistoryQueryDto {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub granularity: Granularity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSummaryDto {
    pub id: Uuid,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub rating: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetailsDto {
    pub job: Job,
    pub service: Option<ServiceDefinition>,
    pub client_name: Option<String>,
    pub worker: Option<WorkerSummaryDto>,
}

//Response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: u32, limit: u32) -> Self {
        let total_pages = ((total as f64) / (limit.max(1) as f64)).ceil() as u32;
        Self {
            success: true,
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }
}
