/// Field-level validation reporting
///
/// Inputs derive [`validator::Validate`]; this module flattens the crate's
/// nested error map into a sorted list of `{field, message}` pairs that the
/// services return and the API serializes as-is.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// A single failed constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Runs the derived validations on `input`
///
/// Errors are ordered by field name, then by message, so callers and tests see
/// a stable order regardless of hash map iteration.
pub fn validate<T: Validate>(input: &T) -> Result<(), Vec<FieldError>> {
    input.validate().map_err(|e| flatten(&e))
}

/// Flattens `ValidationErrors` into a sorted list
pub fn flatten(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code)),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    details
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "too short"))]
        name: String,

        #[validate(length(max = 2))]
        code: String,
    }

    #[test]
    fn test_valid_input_passes() {
        let probe = Probe {
            name: "abc".to_string(),
            code: "ok".to_string(),
        };
        assert!(validate(&probe).is_ok());
    }

    #[test]
    fn test_errors_are_sorted_and_carry_messages() {
        let probe = Probe {
            name: "a".to_string(),
            code: "too long".to_string(),
        };

        let errors = validate(&probe).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "code");
        assert!(errors[0].message.contains("length"));
        assert_eq!(errors[1], FieldError::new("name", "too short"));
    }
}
