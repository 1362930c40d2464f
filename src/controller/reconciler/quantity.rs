//! # Quantity Validation
//!
//! Checks that CPU and memory strings use the Kubernetes quantity format
//! before they are written into a Deployment.
//!
//! Values are only validated, never normalized: "1000m" and "1" stay distinct.

use crate::controller::reconciler::types::ReconcilerError;
use crate::crd::ResourceQuantities;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const CPU: &str = "cpu";
pub const MEMORY: &str = "memory";

// <signedNumber><suffix>, suffix being a binary SI, decimal SI or exponent suffix
static QUANTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+|Ki|Mi|Gi|Ti|Pi|Ei|n|u|m|k|M|G|T|P|E)?$",
    )
    .expect("Failed to compile quantity pattern - this should never happen")
});

/// Whether `value` parses as a Kubernetes quantity
#[must_use]
pub fn is_valid_quantity(value: &str) -> bool {
    QUANTITY_PATTERN.is_match(value)
}

/// Validate one quantity string and wrap it unchanged
///
/// # Errors
///
/// Returns [`ReconcilerError::InvalidQuantity`] naming `field` when the value is malformed.
pub fn parse_quantity(field: &'static str, value: &str) -> Result<Quantity, ReconcilerError> {
    if is_valid_quantity(value) {
        Ok(Quantity(value.to_string()))
    } else {
        Err(ReconcilerError::InvalidQuantity {
            field,
            value: value.to_string(),
        })
    }
}

/// Render CPU and memory as a resource list, validating both
///
/// `fields` names the (cpu, memory) paths used in error messages.
///
/// # Errors
///
/// Returns [`ReconcilerError::InvalidQuantity`] for the first malformed value.
pub fn resource_list(
    quantities: &ResourceQuantities,
    fields: (&'static str, &'static str),
) -> Result<BTreeMap<String, Quantity>, ReconcilerError> {
    Ok(BTreeMap::from([
        (CPU.to_string(), parse_quantity(fields.0, &quantities.cpu)?),
        (MEMORY.to_string(), parse_quantity(fields.1, &quantities.memory)?),
    ]))
}
