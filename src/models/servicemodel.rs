use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "pricing_model", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    Hourly,
    LoadTier,
}

/// Catalogue entry a job references by id.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceDefinition {
    pub id: Uuid,
    pub code: String,
    pub service_name: String,
    pub description: String,
    pub pricing_model: PricingModel,
    pub base_price: i64,
    pub price_per_hour: Option<i64>,
    pub front_load: Option<i64>,
    pub top_load: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServicePriceUpdate {
    pub base_price: Option<i64>,
    pub price_per_hour: Option<i64>,
    pub front_load: Option<i64>,
    pub top_load: Option<i64>,
}
