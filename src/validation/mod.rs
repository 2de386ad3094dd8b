use crate::{message::Message, schema::Registry};
use serde::Serialize;
use tracing::instrument;

mod fields;
mod structure;
mod table_values;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    /// Makes the message invalid.
    Error,
    /// Reported, but the message is still processed.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    pub severity: Severity,
}

impl ValidationError {
    pub fn new(message: String, severity: Severity) -> Self {
        ValidationError {
            message,
            severity,
        }
    }
}

/// The outcome of checking a message against the registry and the family
/// rules. Errors are in rule order, then segment order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn invalid(error: String) -> Self {
        ValidationResult {
            valid: false,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }
}

impl FromIterator<ValidationError> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for finding in iter {
            match finding.severity {
                Severity::Error => errors.push(finding.message),
                Severity::Warning => warnings.push(finding.message),
            }
        }
        ValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

#[instrument(level = "debug", skip(message, registry), fields(message_type = %message.message_type))]
pub fn validate(message: &Message, registry: &Registry) -> ValidationResult {
    let mut findings = Vec::new();
    findings.extend(structure::validate_header(message));
    findings.extend(fields::validate_message(message, registry));
    findings.extend(structure::validate_family(message));
    findings.extend(structure::validate_segment_ids(message));
    findings.extend(table_values::validate_message(message, registry));

    let result: ValidationResult = findings.into_iter().collect();
    tracing::debug!(
        valid = result.valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated message"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const ADT: &str = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00001|P|2.5.1\r\
        EVN|A01|20240101120000\r\
        PID|1||12345^^^HOSP^MR||Doe^John^M||19800101|M\r\
        PV1|1|I|W^101^1";

    fn validate_text(text: &str) -> ValidationResult {
        let message = parse(text).expect("can parse message");
        validate(&message, &Registry::standard())
    }

    #[test]
    fn accepts_a_well_formed_admission() {
        let result = validate_text(ADT);
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn admission_requires_a_patient_segment() {
        let text = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00001|P|2.5.1\r\
            EVN|A01|20240101120000\r\
            PV1|1|I";
        let result = validate_text(text);
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["ADT: missing required segment PID"]);
    }

    #[test]
    fn reports_field_problems_with_position_and_name() {
        let text = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00001|P|2.5.1\r\
            PID|1||12345||Doe^John||1980|M\r\
            PV1|1";
        let result = validate_text(text);
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "PID: invalid date `1980` (field 7, Date/Time of Birth)",
                "PV1: missing required field (field 2, Patient Class)",
            ]
        );
    }

    #[test]
    fn checks_each_repetition() {
        let text = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00001|P|2.5.1\r\
            PID|1||12345~~67890||Doe^John\r\
            NK1|1|Doe^Jane||||||||||||||||||||||||||||||||||||\r\
            RXA|0|1|20240101120000|20240101120000|08^HepB^CVX|0.5||||||||||20250101000000~2025";
        let result = validate_text(text);
        assert_eq!(
            result.errors,
            vec!["RXA: invalid timestamp `2025` (field 16, Substance Expiration Date)"]
        );
    }

    #[test]
    fn table_values_are_warnings() {
        let text = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00001|P|2.5.1\r\
            PID|1||12345||Doe^John||19800101|Q\r\
            ZPV|local";
        let result = validate_text(text);
        assert!(result.valid, "{:?}", result.errors);
        assert_eq!(
            result.warnings,
            vec!["PID: value `Q` is not in table 0001 (field 8, Administrative Sex)"]
        );
    }

    #[test]
    fn flags_misplaced_headers_and_odd_segment_ids() {
        let text = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00001|P|2.5.1\r\
            PID|1||12345||Doe^John\r\
            MSH|^~\\&|EPIC\r\
            pv1|1|I";
        let result = validate_text(text);
        assert_eq!(
            result.errors,
            vec!["MSH: header segment must be first (segment 3)"]
        );
        assert_eq!(
            result.warnings,
            vec!["segment identifier `pv1` is not three upper-case letters or digits (segment 4)"]
        );
    }

    #[test]
    fn is_deterministic() {
        let text = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|2024||ADT^A01||P|2.5.1\rPV1";
        assert_eq!(validate_text(text), validate_text(text));
    }
}
