//! Lab value validation run before any submission.

use thiserror::Error;

use super::form::{parse_number, FieldId, PatientForm};

/// A lab field checked against a fixed inclusive range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabRange {
    pub field: FieldId,
    pub min: f64,
    pub max: f64,
}

/// Plausibility ranges for the validated lab fields.
pub const LAB_RANGES: [LabRange; 4] = [
    LabRange {
        field: FieldId::Glucose,
        min: 0.0,
        max: 1000.0,
    },
    LabRange {
        field: FieldId::SystolicBp,
        min: 0.0,
        max: 300.0,
    },
    LabRange {
        field: FieldId::DiastolicBp,
        min: 0.0,
        max: 200.0,
    },
    LabRange {
        field: FieldId::Cholesterol,
        min: 0.0,
        max: 1000.0,
    },
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{} is required", .0.label())]
    Empty(FieldId),

    #[error("{}: '{value}' is not a number", .field.label())]
    NotNumeric { field: FieldId, value: String },

    #[error("{}: {value} must be between {min} and {max}", .field.label())]
    OutOfRange {
        field: FieldId,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ValidationError {
    #[must_use]
    pub fn field(&self) -> FieldId {
        match self {
            Self::Empty(field) => *field,
            Self::NotNumeric { field, .. } | Self::OutOfRange { field, .. } => *field,
        }
    }
}

/// Check one raw value against its range.
///
/// # Errors
/// Returns why the value cannot be submitted.
pub fn validate_lab_value(range: &LabRange, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty(range.field));
    }

    let value = parse_number(trimmed).ok_or_else(|| ValidationError::NotNumeric {
        field: range.field,
        value: trimmed.to_string(),
    })?;

    if !(range.min..=range.max).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: range.field,
            value,
            min: range.min,
            max: range.max,
        });
    }

    Ok(value)
}

/// Validate the lab fields of a form.
///
/// # Errors
/// Returns one error per failing field, in form order.
pub fn validate_form(form: &PatientForm) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = LAB_RANGES
        .iter()
        .filter_map(|range| validate_lab_value(range, form.get(range.field)).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(glucose: &str, sys: &str, dia: &str, chol: &str) -> PatientForm {
        let mut form = PatientForm::default();
        form.set(FieldId::Glucose, glucose);
        form.set(FieldId::SystolicBp, sys);
        form.set(FieldId::DiastolicBp, dia);
        form.set(FieldId::Cholesterol, chol);
        form
    }

    #[test]
    fn test_valid_values_pass() {
        assert!(validate_form(&form_with("95", "120", "80", "190")).is_ok());
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(validate_form(&form_with("0", "0", "0", "0")).is_ok());
        assert!(validate_form(&form_with("1000", "300", "200", "1000")).is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let errors = validate_form(&form_with("1000.1", "301", "-1", "190")).expect_err("invalid");
        let fields: Vec<FieldId> = errors.iter().map(ValidationError::field).collect();
        assert_eq!(
            fields,
            vec![FieldId::Glucose, FieldId::SystolicBp, FieldId::DiastolicBp]
        );
        assert!(matches!(errors[1], ValidationError::OutOfRange { max, .. } if max == 300.0));
    }

    #[test]
    fn test_empty_and_non_numeric_rejected() {
        let errors = validate_form(&form_with("", "abc", "80", "NaN")).expect_err("invalid");
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0], ValidationError::Empty(FieldId::Glucose));
        assert!(matches!(
            &errors[1],
            ValidationError::NotNumeric { field: FieldId::SystolicBp, value } if value == "abc"
        ));
        assert_eq!(errors[2].field(), FieldId::Cholesterol);
    }

    #[test]
    fn test_every_lab_field_requires_a_value() {
        for range in LAB_RANGES {
            let mut form = form_with("95", "120", "80", "190");
            form.set(range.field, "");
            let errors = validate_form(&form).expect_err("empty field");
            assert_eq!(errors, vec![ValidationError::Empty(range.field)]);
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::Empty(FieldId::SystolicBp).to_string(),
            "Systolic BP is required"
        );
        let err = validate_lab_value(&LAB_RANGES[2], "250").expect_err("out of range");
        assert_eq!(err.to_string(), "Diastolic BP: 250 must be between 0 and 200");
    }
}
