pub mod admin;
pub mod auth;
pub mod jobs;
pub mod stats;
pub mod users;
