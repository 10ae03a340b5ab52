use crate::types::{HarvestInput, StageUpdateInput};

/// Validation errors for product data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validates harvest data before a product is created
pub fn validate_harvest_input(data: &HarvestInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if data.crop.trim().is_empty() {
        errors.push(ValidationError::new("crop", "Crop name is required"));
    }

    if !data.quantity.is_finite() || data.quantity <= 0.0 {
        errors.push(ValidationError::new(
            "quantity",
            "Quantity must be a positive number",
        ));
    }

    if !data.price.is_finite() || data.price < 0.0 {
        errors.push(ValidationError::new(
            "price",
            "Price must be zero or a positive number",
        ));
    }

    if data.location.trim().is_empty() {
        errors.push(ValidationError::new("location", "Farm location is required"));
    }

    if data.harvest_date.trim().is_empty() {
        errors.push(ValidationError::new(
            "harvestDate",
            "Harvest date is required",
        ));
    }

    errors
}

/// Validates stage-advance data before a timeline append
pub fn validate_stage_input(data: &StageUpdateInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !data.price.is_finite() || data.price < 0.0 {
        errors.push(ValidationError::new(
            "price",
            "Price must be zero or a positive number",
        ));
    }

    if data.location.trim().is_empty() {
        errors.push(ValidationError::new("location", "Location is required"));
    }

    if data.date.trim().is_empty() {
        errors.push(ValidationError::new("date", "Date is required"));
    }

    errors
}
