pub mod error;
pub mod job_service;
pub mod matching_service;
pub mod pricing;
pub mod stats_service;
pub mod worker_service;
