//! Typed patient form.
//!
//! `FieldId` is the single mapping between the entry form and the data
//! model: the element ids of the original markup, display labels, input
//! kinds and the two CSV naming conventions all hang off it.

use serde_json::{Map, Value};
use zeroize::Zeroize;

use super::patient::{format_measurement, generate_patient_id, Gender, PatientRecord};

/// What characters a field accepts while typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text (patient identifier)
    Text,
    /// Digits only
    Integer,
    /// Digits, sign and decimal point
    Decimal,
    /// One of a fixed set of values
    Choice,
}

/// Form fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    PatientId,
    Age,
    Gender,
    Glucose,
    SystolicBp,
    DiastolicBp,
    Cholesterol,
    Bmi,
}

impl FieldId {
    pub const ALL: [FieldId; 8] = [
        FieldId::PatientId,
        FieldId::Age,
        FieldId::Gender,
        FieldId::Glucose,
        FieldId::SystolicBp,
        FieldId::DiastolicBp,
        FieldId::Cholesterol,
        FieldId::Bmi,
    ];

    /// Fields that must be present before a record can be built.
    pub const REQUIRED: [FieldId; 7] = [
        FieldId::Age,
        FieldId::Gender,
        FieldId::Glucose,
        FieldId::SystolicBp,
        FieldId::DiastolicBp,
        FieldId::Cholesterol,
        FieldId::Bmi,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Element id used by the web form this client mirrors.
    #[must_use]
    pub fn element_id(self) -> &'static str {
        match self {
            Self::PatientId => "patientId",
            Self::Age => "age",
            Self::Gender => "gender",
            Self::Glucose => "glucose",
            Self::SystolicBp => "systolicBp",
            Self::DiastolicBp => "diastolicBp",
            Self::Cholesterol => "cholesterol",
            Self::Bmi => "bmi",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::PatientId => "Patient ID",
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::Glucose => "Glucose",
            Self::SystolicBp => "Systolic BP",
            Self::DiastolicBp => "Diastolic BP",
            Self::Cholesterol => "Cholesterol",
            Self::Bmi => "BMI",
        }
    }

    #[must_use]
    pub fn hint(self) -> &'static str {
        match self {
            Self::PatientId => "optional, generated if blank",
            Self::Age => "years",
            Self::Gender => "←/→ to choose",
            Self::Glucose => "mg/dL (0-1000)",
            Self::SystolicBp => "mmHg (0-300)",
            Self::DiastolicBp => "mmHg (0-200)",
            Self::Cholesterol => "mg/dL (0-1000)",
            Self::Bmi => "kg/m²",
        }
    }

    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Self::PatientId => FieldKind::Text,
            Self::Age => FieldKind::Integer,
            Self::Gender => FieldKind::Choice,
            _ => FieldKind::Decimal,
        }
    }

    /// CSV column names: capitalised convention first, snake_case second.
    #[must_use]
    pub fn csv_keys(self) -> (&'static str, &'static str) {
        match self {
            Self::PatientId => ("Patient_ID", "patient_id"),
            Self::Age => ("Age", "age"),
            Self::Gender => ("Gender", "gender"),
            Self::Glucose => ("Glucose", "glucose"),
            Self::SystolicBp => ("Systolic_BP", "systolic_bp"),
            Self::DiastolicBp => ("Diastolic_BP", "diastolic_bp"),
            Self::Cholesterol => ("Cholesterol", "cholesterol"),
            Self::Bmi => ("BMI", "bmi"),
        }
    }

    /// Whether a typed character belongs in this field.
    #[must_use]
    pub fn accepts(self, c: char) -> bool {
        match self.kind() {
            FieldKind::Text => !c.is_control(),
            FieldKind::Integer => c.is_ascii_digit(),
            FieldKind::Decimal => c.is_ascii_digit() || c == '.' || c == '-',
            FieldKind::Choice => false,
        }
    }
}

/// Raw string buffers for every form field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientForm {
    values: [String; 8],
}

impl PatientForm {
    #[must_use]
    pub fn get(&self, field: FieldId) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: FieldId, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    /// Append a typed character if the field accepts it.
    pub fn push_char(&mut self, field: FieldId, c: char) -> bool {
        if field.accepts(c) {
            self.values[field.index()].push(c);
            true
        } else {
            false
        }
    }

    pub fn pop_char(&mut self, field: FieldId) {
        self.values[field.index()].pop();
    }

    pub fn clear_field(&mut self, field: FieldId) {
        self.values[field.index()].zeroize();
    }

    /// Step a choice field through its options (blank, Male, Female).
    pub fn cycle_choice(&mut self, field: FieldId, forward: bool) {
        if field.kind() != FieldKind::Choice {
            return;
        }

        let options: Vec<&str> = std::iter::once("")
            .chain(Gender::ALL.iter().map(Gender::as_str))
            .collect();
        let current = Gender::parse(self.get(field))
            .map(|g| g.as_str())
            .unwrap_or("");
        let pos = options.iter().position(|o| *o == current).unwrap_or(0);
        let next = if forward {
            (pos + 1) % options.len()
        } else {
            (pos + options.len() - 1) % options.len()
        };
        self.set(field, options[next]);
    }

    /// Wipe every buffer.
    pub fn clear(&mut self) {
        for value in self.values.iter_mut() {
            value.zeroize();
        }
    }

    /// Build a record from the buffers.
    ///
    /// A blank patient id is replaced by a generated one.
    ///
    /// # Errors
    /// Returns the required fields that are empty or do not parse; age must
    /// be a positive integer.
    pub fn to_record(&self) -> Result<PatientRecord, Vec<FieldId>> {
        let mut missing = Vec::new();

        let age = self
            .get(FieldId::Age)
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&a| a > 0);
        if age.is_none() {
            missing.push(FieldId::Age);
        }

        let gender = Gender::parse(self.get(FieldId::Gender));
        if gender.is_none() {
            missing.push(FieldId::Gender);
        }

        let mut measure = |field: FieldId| -> f64 {
            match parse_number(self.get(field)) {
                Some(v) => v,
                None => {
                    missing.push(field);
                    0.0
                }
            }
        };
        let glucose = measure(FieldId::Glucose);
        let systolic_bp = measure(FieldId::SystolicBp);
        let diastolic_bp = measure(FieldId::DiastolicBp);
        let cholesterol = measure(FieldId::Cholesterol);
        let bmi = measure(FieldId::Bmi);

        match (age, gender) {
            (Some(age), Some(gender)) if missing.is_empty() => {
                let id = self.get(FieldId::PatientId).trim();
                let patient_id = if id.is_empty() {
                    generate_patient_id()
                } else {
                    id.to_string()
                };

                Ok(PatientRecord {
                    patient_id,
                    age,
                    gender,
                    glucose,
                    systolic_bp,
                    diastolic_bp,
                    cholesterol,
                    bmi,
                })
            }
            _ => Err(missing),
        }
    }

    /// Fill every field from a generated or previously submitted record.
    pub fn populate_from_record(&mut self, record: &PatientRecord) {
        self.set(FieldId::PatientId, record.patient_id.clone());
        self.set(FieldId::Age, record.age.to_string());
        self.set(FieldId::Gender, record.gender.as_str());
        self.set(FieldId::Glucose, format_measurement(record.glucose));
        self.set(FieldId::SystolicBp, format_measurement(record.systolic_bp));
        self.set(FieldId::DiastolicBp, format_measurement(record.diastolic_bp));
        self.set(FieldId::Cholesterol, format_measurement(record.cholesterol));
        self.set(FieldId::Bmi, format_measurement(record.bmi));
    }

    /// Fill every field from an uploaded CSV row.
    ///
    /// Each field takes the capitalised column when it holds a usable value
    /// and falls back to the snake_case column otherwise. A field with
    /// neither is left empty.
    pub fn populate_from_csv_row(&mut self, row: &Map<String, Value>) {
        for field in FieldId::ALL {
            let (primary, fallback) = field.csv_keys();
            let value = [primary, fallback]
                .iter()
                .filter_map(|key| row.get(*key))
                .find(|v| is_present(v))
                .map(value_to_field)
                .unwrap_or_default();

            let value = if field == FieldId::Gender {
                Gender::parse(&value)
                    .map(|g| g.as_str().to_string())
                    .unwrap_or(value)
            } else {
                value
            };
            self.set(field, value);
        }
    }
}

/// Parse a finite decimal. `NaN` and `inf` spellings are rejected.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && v.is_finite()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_to_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(v) => format_measurement(v),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled_form() -> PatientForm {
        let mut form = PatientForm::default();
        form.set(FieldId::PatientId, "P-100");
        form.set(FieldId::Age, "52");
        form.set(FieldId::Gender, "Male");
        form.set(FieldId::Glucose, "130");
        form.set(FieldId::SystolicBp, "142");
        form.set(FieldId::DiastolicBp, "91");
        form.set(FieldId::Cholesterol, "245");
        form.set(FieldId::Bmi, "31.2");
        form
    }

    fn row(value: serde_json::Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn test_to_record() {
        let record = filled_form().to_record().expect("valid form");
        assert_eq!(record.patient_id, "P-100");
        assert_eq!(record.age, 52);
        assert_eq!(record.gender, Gender::Male);
        assert!((record.bmi - 31.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_id_is_generated() {
        let mut form = filled_form();
        form.set(FieldId::PatientId, "   ");
        let record = form.to_record().expect("valid form");
        assert!(record.patient_id.starts_with("PAT_"));
        assert_eq!(record.patient_id.len(), 13);
    }

    #[test]
    fn test_missing_fields_reported() {
        let mut form = filled_form();
        form.set(FieldId::Gender, "");
        form.set(FieldId::Bmi, "abc");
        form.set(FieldId::Age, "0");

        let missing = form.to_record().expect_err("should fail");
        assert_eq!(missing, vec![FieldId::Age, FieldId::Gender, FieldId::Bmi]);
    }

    #[test]
    fn test_typing_respects_field_kind() {
        let mut form = PatientForm::default();
        assert!(form.push_char(FieldId::Age, '4'));
        assert!(!form.push_char(FieldId::Age, '.'));
        assert!(form.push_char(FieldId::Bmi, '.'));
        assert!(!form.push_char(FieldId::Glucose, 'x'));
        assert!(form.push_char(FieldId::PatientId, 'x'));
        assert!(!form.push_char(FieldId::Gender, 'M'));
        assert_eq!(form.get(FieldId::Age), "4");
    }

    #[test]
    fn test_cycle_gender() {
        let mut form = PatientForm::default();
        form.cycle_choice(FieldId::Gender, true);
        assert_eq!(form.get(FieldId::Gender), "Male");
        form.cycle_choice(FieldId::Gender, true);
        assert_eq!(form.get(FieldId::Gender), "Female");
        form.cycle_choice(FieldId::Gender, true);
        assert_eq!(form.get(FieldId::Gender), "");
        form.cycle_choice(FieldId::Gender, false);
        assert_eq!(form.get(FieldId::Gender), "Female");
    }

    #[test]
    fn test_csv_row_capitalised() {
        let mut form = PatientForm::default();
        form.populate_from_csv_row(&row(json!({
            "Patient_ID": "CSV_1",
            "Age": 61,
            "Gender": "Female",
            "Glucose": 98.0,
            "Systolic_BP": 128,
            "Diastolic_BP": 84,
            "Cholesterol": 199,
            "BMI": 23.4
        })));

        assert_eq!(form.get(FieldId::PatientId), "CSV_1");
        assert_eq!(form.get(FieldId::Age), "61");
        assert_eq!(form.get(FieldId::Glucose), "98");
        assert_eq!(form.get(FieldId::Bmi), "23.4");
        assert!(form.to_record().is_ok());
    }

    #[test]
    fn test_csv_row_falls_back_per_field() {
        let mut form = PatientForm::default();
        form.populate_from_csv_row(&row(json!({
            "patient_id": "csv-2",
            "Age": null,
            "age": 40,
            "gender": "m",
            "Glucose": 0,
            "glucose": 101,
            "systolic_bp": 119,
            "Diastolic_BP": 79,
            "cholesterol": 180,
            "BMI": "",
            "bmi": 26.1
        })));

        assert_eq!(form.get(FieldId::PatientId), "csv-2");
        assert_eq!(form.get(FieldId::Age), "40");
        assert_eq!(form.get(FieldId::Gender), "Male");
        assert_eq!(form.get(FieldId::Glucose), "101");
        assert_eq!(form.get(FieldId::SystolicBp), "119");
        assert_eq!(form.get(FieldId::DiastolicBp), "79");
        assert_eq!(form.get(FieldId::Bmi), "26.1");
    }

    #[test]
    fn test_csv_row_missing_both_leaves_field_empty() {
        let mut form = filled_form();
        form.populate_from_csv_row(&row(json!({ "Age": 30 })));
        assert_eq!(form.get(FieldId::Age), "30");
        assert_eq!(form.get(FieldId::Glucose), "");
        assert_eq!(form.get(FieldId::PatientId), "");
    }

    #[test]
    fn test_populate_from_record_round_trips() {
        let record = filled_form().to_record().expect("valid");
        let mut form = PatientForm::default();
        form.populate_from_record(&record);
        assert_eq!(form, filled_form());
    }

    #[test]
    fn test_clear() {
        let mut form = filled_form();
        form.clear();
        assert_eq!(form, PatientForm::default());
    }

    #[test]
    fn test_parse_number_rejects_non_finite() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("1.2.3"), None);
        assert_eq!(parse_number(""), None);
    }
}
