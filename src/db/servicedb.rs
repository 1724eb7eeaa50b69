// db/servicedb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::servicemodel::*;

#[async_trait]
pub trait ServiceExt {
    async fn get_services(&self) -> Result<Vec<ServiceDefinition>, Error>;

    async fn get_service_by_id(&self, service_id: Uuid) -> Result<Option<ServiceDefinition>, Error>;

    async fn update_service_price(
        &self,
        service_id: Uuid,
        update: &ServicePriceUpdate,
    ) -> Result<Option<ServiceDefinition>, Error>;
}

#[async_trait]
impl ServiceExt for DBClient {
    async fn get_services(&self) -> Result<Vec<ServiceDefinition>, Error> {
        sqlx::query_as::<_, ServiceDefinition>(
            r#"
            SELECT id, code, service_name, description, pricing_model,
            base_price, price_per_hour, front_load, top_load, created_at, updated_at
            FROM services
            ORDER BY service_name ASC
            "#
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_service_by_id(&self, service_id: Uuid) -> Result<Option<ServiceDefinition>, Error> {
        sqlx::query_as::<_, ServiceDefinition>(
            r#"
            SELECT id, code, service_name, description, pricing_model,
            base_price, price_per_hour, front_load, top_load, created_at, updated_at
            FROM services WHERE id = $1
            "#
        )
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_service_price(
        &self,
        service_id: Uuid,
        update: &ServicePriceUpdate,
    ) -> Result<Option<ServiceDefinition>, Error> {
        sqlx::query_as::<_, ServiceDefinition>(
            r#"
            UPDATE services
            SET base_price = COALESCE($2, base_price),
                price_per_hour = COALESCE($3, price_per_hour),
                front_load = COALESCE($4, front_load),
                top_load = COALESCE($5, top_load),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, code, service_name, description, pricing_model,
            base_price, price_per_hour, front_load, top_load, created_at, updated_at
            "#
        )
        .bind(service_id)
        .bind(update.base_price)
        .bind(update.price_per_hour)
        .bind(update.front_load)
        .bind(update.top_load)
        .fetch_optional(&self.pool)
        .await
    }
}
