//! Input validation helpers
//!
//! Bridges `validator` derive output to the API error format. Violations are
//! collected across ALL fields of a payload and returned as one response, so
//! a client fixing a form sees every problem at once instead of one per
//! round-trip.

use validator::{Validate, ValidationErrors};

use crate::utils::error::{AppError, FieldError};

/// Validate a request payload, collecting every field violation.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|errors| AppError::Validation(collect_field_errors(errors)))
}

/// Flatten [`ValidationErrors`] into a sorted field list.
///
/// Field names are reported in wire format (camelCase) to match the JSON the
/// client actually sent.
fn collect_field_errors(errors: ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |err| FieldError {
                field: to_camel_case(&field),
                message: err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field)),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

fn to_camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
