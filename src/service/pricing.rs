// service/pricing.rs
//
// Amounts are whole VND held as i64; one unit is one dong.
use crate::{
    models::servicemodel::{PricingModel, ServiceDefinition},
    service::error::ServiceError,
};

/// Hourly rate per recognised service kind.
const RATE_TABLE: &[(&str, i64)] = &[
    ("cleaning", 100_000),
    ("deep_cleaning", 150_000),
    ("ac_cleaning", 200_000),
];

#[derive(Debug, Clone)]
pub struct PricingEngine {
    default_rate: i64,
    strict: bool,
}

impl PricingEngine {
    pub fn new(default_rate: i64, strict: bool) -> Self {
        Self { default_rate, strict }
    }

    /// Hourly rate for a kind. Unknown kinds use the default rate unless the
    /// engine is strict.
    pub fn rate_for(&self, service_kind: &str) -> Result<i64, ServiceError> {
        if let Some((_, rate)) = RATE_TABLE.iter().find(|(kind, _)| *kind == service_kind) {
            return Ok(*rate);
        }

        if self.strict {
            return Err(ServiceError::UnknownServiceKind(service_kind.to_string()));
        }

        tracing::warn!(
            "unknown service kind '{}', pricing at default rate {}",
            service_kind,
            self.default_rate
        );
        Ok(self.default_rate)
    }

    pub fn compute_price(&self, service_kind: &str, duration_hours: f64) -> Result<i64, ServiceError> {
        validate_duration(duration_hours)?;
        let rate = self.rate_for(service_kind)?;
        apply_rate(rate, duration_hours)
    }

    /// Price for a concrete catalogue entry. An admin-set hourly rate on an
    /// hourly service takes precedence over the rate table.
    pub fn quote(&self, service: &ServiceDefinition, duration_hours: f64) -> Result<i64, ServiceError> {
        match (service.pricing_model, service.price_per_hour) {
            (PricingModel::Hourly, Some(per_hour)) => {
                validate_duration(duration_hours)?;
                apply_rate(per_hour, duration_hours)
            }
            _ => self.compute_price(&service.code, duration_hours),
        }
    }
}

fn validate_duration(duration_hours: f64) -> Result<(), ServiceError> {
    if !duration_hours.is_finite() || duration_hours <= 0.0 {
        return Err(ServiceError::Validation(
            "duration_hours must be a positive number".to_string(),
        ));
    }
    Ok(())
}

fn apply_rate(rate: i64, duration_hours: f64) -> Result<i64, ServiceError> {
    let price = (rate as f64 * duration_hours).round();
    // i64::MAX is not exactly representable as f64; 2^63 is the first value
    // past the range.
    if !price.is_finite() || price < 0.0 || price >= i64::MAX as f64 {
        return Err(ServiceError::Validation(format!(
            "price for {} hours at {} per hour is out of range",
            duration_hours, rate
        )));
    }
    Ok(price as i64)
}
