// service/worker_service.rs
//
// User directory operations: registration, worker verification and the
// admin-managed service catalogue prices.
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::db::MarketStore,
    dtos::{admindtos::*, userdtos::*},
    error::ErrorMessage,
    models::{servicemodel::*, usermodel::*},
    service::{error::ServiceError, matching_service},
    utils::password,
};

#[derive(Debug, Clone)]
pub struct WorkerService {
    db_client: Arc<dyn MarketStore>,
}

impl WorkerService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    pub async fn register_client(&self, body: RegisterClientDto) -> Result<User, ServiceError> {
        self.ensure_email_free(&body.email).await?;

        let user = self
            .insert_user(NewUser {
                full_name: body.full_name,
                email: body.email,
                password: hash_password(&body.password)?,
                phone_number: body.phone_number,
                address: body.address,
                role: UserRole::Client,
                identity_number: None,
                services: Vec::new(),
            })
            .await?;

        tracing::info!("client {} registered", user.id);
        Ok(user)
    }

    pub async fn register_worker(&self, body: RegisterWorkerDto) -> Result<User, ServiceError> {
        if body.identity_number.trim().is_empty() {
            return Err(ServiceError::Validation("identity_number is required".to_string()));
        }

        let known: Vec<Uuid> = self
            .db_client
            .get_services()
            .await?
            .into_iter()
            .map(|service| service.id)
            .collect();
        let capabilities = matching_service::normalize_capabilities(&body.services, &known);
        if capabilities.is_empty() || capabilities.len() != dedup_len(&body.services) {
            return Err(ServiceError::Validation(
                "services must be a non-empty list of existing service ids".to_string(),
            ));
        }

        self.ensure_email_free(&body.email).await?;

        let user = self
            .insert_user(NewUser {
                full_name: body.full_name,
                email: body.email,
                password: hash_password(&body.password)?,
                phone_number: body.phone_number,
                address: body.address,
                role: UserRole::Worker,
                identity_number: Some(body.identity_number.trim().to_string()),
                services: capabilities,
            })
            .await?;

        tracing::info!("worker {} registered, awaiting review", user.id);
        Ok(user)
    }

    pub async fn pending_workers(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.db_client.get_workers_by_status(WorkerStatus::Pending).await?)
    }

    pub async fn review_worker(&self, worker_id: Uuid, review: ReviewWorkerDto) -> Result<User, ServiceError> {
        let (status, reason) = match review.action {
            ReviewAction::Approve => (WorkerStatus::Approved, None),
            ReviewAction::Reject => {
                let reason = review
                    .rejection_reason
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| {
                        ServiceError::Validation("rejection_reason is required when rejecting".to_string())
                    })?;
                (WorkerStatus::Rejected, Some(reason))
            }
        };

        let worker = self
            .db_client
            .update_worker_status(worker_id, status, reason)
            .await?
            .ok_or(ServiceError::WorkerNotFound(worker_id))?;

        tracing::info!("worker {} reviewed: {}", worker_id, status.to_str());
        Ok(worker)
    }

    pub async fn block_worker(&self, worker_id: Uuid) -> Result<User, ServiceError> {
        let worker = self
            .db_client
            .update_worker_status(worker_id, WorkerStatus::Blocked, None)
            .await?
            .ok_or(ServiceError::WorkerNotFound(worker_id))?;

        tracing::info!("worker {} blocked", worker_id);
        Ok(worker)
    }

    pub async fn worker_reviews(&self, worker_id: Uuid) -> Result<Vec<WorkerReview>, ServiceError> {
        let worker = self
            .db_client
            .get_user(worker_id)
            .await?
            .filter(|user| user.is_worker())
            .ok_or(ServiceError::WorkerNotFound(worker_id))?;

        Ok(self.db_client.get_worker_reviews(worker.id).await?)
    }

    pub async fn services(&self) -> Result<Vec<ServiceDefinition>, ServiceError> {
        Ok(self.db_client.get_services().await?)
    }

    /// Only the rates that belong to the service's pricing model may change.
    /// Jobs already created keep their price.
    pub async fn update_service_price(
        &self,
        service_id: Uuid,
        update: ServicePriceUpdate,
    ) -> Result<ServiceDefinition, ServiceError> {
        let service = self
            .db_client
            .get_service_by_id(service_id)
            .await?
            .ok_or(ServiceError::ServiceNotFound(service_id))?;

        validate_price_update(&service, &update)?;

        let updated = self
            .db_client
            .update_service_price(service_id, &update)
            .await?
            .ok_or(ServiceError::ServiceNotFound(service_id))?;

        tracing::info!("price of service {} updated: {:?}", updated.code, update);
        Ok(updated)
    }

    /// Creates the configured admin account when no user holds that email.
    pub async fn bootstrap_admin(&self, email: &str, admin_password: &str) -> Result<Option<User>, ServiceError> {
        if self.db_client.get_user_by_email(email).await?.is_some() {
            return Ok(None);
        }

        let admin = self
            .insert_user(NewUser {
                full_name: "Administrator".to_string(),
                email: email.to_string(),
                password: hash_password(admin_password)?,
                phone_number: None,
                address: None,
                role: UserRole::Admin,
                identity_number: None,
                services: Vec::new(),
            })
            .await?;

        tracing::info!("bootstrap admin {} created", admin.email);
        Ok(Some(admin))
    }

    /// Inserts the user, turning a lost race on the unique email index into
    /// the same conflict `ensure_email_free` reports.
    async fn insert_user(&self, new_user: NewUser) -> Result<User, ServiceError> {
        self.db_client.save_user(new_user).await.map_err(|err| {
            let duplicate = err
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation());
            if duplicate {
                tracing::warn!("user insert hit the unique email index");
                ServiceError::Conflict(ErrorMessage::EmailExist.to_string())
            } else {
                ServiceError::Database(err)
            }
        })
    }

    async fn ensure_email_free(&self, email: &str) -> Result<(), ServiceError> {
        if self.db_client.get_user_by_email(email).await?.is_some() {
            return Err(ServiceError::Conflict(ErrorMessage::EmailExist.to_string()));
        }
        Ok(())
    }
}

fn hash_password(raw: &str) -> Result<String, ServiceError> {
    password::hash(raw).map_err(|e| ServiceError::Validation(e.to_string()))
}

fn dedup_len(ids: &[Uuid]) -> usize {
    let mut seen: Vec<&Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen.len()
}

fn validate_price_update(service: &ServiceDefinition, update: &ServicePriceUpdate) -> Result<(), ServiceError> {
    if *update == ServicePriceUpdate::default() {
        return Err(ServiceError::Validation("no price fields supplied".to_string()));
    }

    let amounts = [
        update.base_price,
        update.price_per_hour,
        update.front_load,
        update.top_load,
    ];
    if amounts.iter().flatten().any(|amount| *amount < 0) {
        return Err(ServiceError::Validation("prices cannot be negative".to_string()));
    }

    let wrong_model = match service.pricing_model {
        PricingModel::Hourly => update.front_load.is_some() || update.top_load.is_some(),
        PricingModel::LoadTier => update.base_price.is_some() || update.price_per_hour.is_some(),
    };
    if wrong_model {
        return Err(ServiceError::Validation(format!(
            "service {} does not use these price fields",
            service.code
        )));
    }

    Ok(())
}
