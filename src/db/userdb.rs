// db/userdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::*;

#[async_trait]
pub trait UserExt {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error>;

    async fn get_users_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>, Error>;

    async fn save_user(&self, new_user: NewUser) -> Result<User, Error>;

    // Worker directory
    async fn get_workers_by_status(&self, status: WorkerStatus) -> Result<Vec<User>, Error>;

    async fn update_worker_status(
        &self,
        worker_id: Uuid,
        status: WorkerStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<User>, Error>;

    async fn get_worker_reviews(&self, worker_id: Uuid) -> Result<Vec<WorkerReview>, Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password, phone_number, address, role, balance,
            identity_number, services, worker_status, rating, rejection_reason,
            created_at, updated_at
            FROM users WHERE id = $1
            "#
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password, phone_number, address, role, balance,
            identity_number, services, worker_status, rating, rejection_reason,
            created_at, updated_at
            FROM users WHERE email = $1
            "#
        )
        .bind(email.to_lowercase())
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_users_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password, phone_number, address, role, balance,
            identity_number, services, worker_status, rating, rejection_reason,
            created_at, updated_at
            FROM users WHERE id = ANY($1)
            "#
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn save_user(&self, new_user: NewUser) -> Result<User, Error> {
        let (worker_status, rating) = if new_user.role == UserRole::Worker {
            (Some(WorkerStatus::Pending), Some(DEFAULT_WORKER_RATING))
        } else {
            (None, None)
        };

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
            (full_name, email, password, phone_number, address, role,
            identity_number, services, worker_status, rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, full_name, email, password, phone_number, address, role, balance,
            identity_number, services, worker_status, rating, rejection_reason,
            created_at, updated_at
            "#
        )
        .bind(new_user.full_name)
        .bind(new_user.email.to_lowercase())
        .bind(new_user.password)
        .bind(new_user.phone_number)
        .bind(new_user.address)
        .bind(new_user.role)
        .bind(new_user.identity_number)
        .bind(new_user.services)
        .bind(worker_status)
        .bind(rating)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_workers_by_status(&self, status: WorkerStatus) -> Result<Vec<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password, phone_number, address, role, balance,
            identity_number, services, worker_status, rating, rejection_reason,
            created_at, updated_at
            FROM users
            WHERE role = 'worker'::user_role AND worker_status = $1
            ORDER BY created_at ASC
            "#
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_worker_status(
        &self,
        worker_id: Uuid,
        status: WorkerStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET worker_status = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = $1 AND role = 'worker'::user_role
            RETURNING id, full_name, email, password, phone_number, address, role, balance,
            identity_number, services, worker_status, rating, rejection_reason,
            created_at, updated_at
            "#
        )
        .bind(worker_id)
        .bind(status)
        .bind(rejection_reason)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_worker_reviews(&self, worker_id: Uuid) -> Result<Vec<WorkerReview>, Error> {
        sqlx::query_as::<_, WorkerReview>(
            r#"
            SELECT id, worker_id, job_id, rating, comment, created_at
            FROM worker_reviews
            WHERE worker_id = $1
            ORDER BY created_at DESC
            "#
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await
    }
}
