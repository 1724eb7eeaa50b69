use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::servicemodel::ServicePriceUpdate;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ReviewWorkerDto {
    pub action: ReviewAction,
    #[validate(length(max = 500, message = "Rejection reason must be at most 500 characters"))]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UpdateServicePriceDto {
    #[validate(range(min = 0, message = "Base price cannot be negative"))]
    pub base_price: Option<i64>,
    #[validate(range(min = 0, message = "Price per hour cannot be negative"))]
    pub price_per_hour: Option<i64>,
    #[validate(range(min = 0, message = "Front load price cannot be negative"))]
    pub front_load: Option<i64>,
    #[validate(range(min = 0, message = "Top load price cannot be negative"))]
    pub top_load: Option<i64>,
}

impl From<UpdateServicePriceDto> for ServicePriceUpdate {
    fn from(dto: UpdateServicePriceDto) -> Self {
        ServicePriceUpdate {
            base_price: dto.base_price,
            price_per_hour: dto.price_per_hour,
            front_load: dto.front_load,
            top_load: dto.top_load,
        }
    }
}
