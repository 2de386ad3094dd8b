use crate::{
    ack::{AckCode, Acknowledger},
    config::Config,
    handlers::handler_for,
    mapping::MappedResource,
    parser::{parse, ParseError},
    schema::{Registry, RegistryError},
    validation::{validate, ValidationResult},
};
use serde::Serialize;
use std::{fmt, sync::Arc};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Accepted,
    Rejected,
    Unsupported,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Accepted => "accepted",
            Status::Rejected => "rejected",
            Status::Unsupported => "unsupported",
            Status::Error => "error",
        })
    }
}

/// Everything one pass through the pipeline produced for a message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    pub status: Status,
    pub message_type: String,
    pub control_id: Option<String>,
    pub event: Option<String>,
    pub event_description: Option<&'static str>,
    pub mapped_resources: Vec<MappedResource>,
    /// The acknowledgment wire message.
    pub acknowledgment_wire: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub source: String,
}

/// The message pipeline. Holds only read-only state, so one engine can be
/// cloned or shared across threads and used for any number of messages.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    acknowledger: Acknowledger,
    max_reject_errors: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Registry::standard())
    }
}

impl Engine {
    pub fn new(registry: Registry) -> Self {
        let defaults = Config::default();
        Engine {
            registry: Arc::new(registry),
            acknowledger: Acknowledger::new(defaults.acknowledgment),
            max_reject_errors: defaults.max_reject_errors,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        Ok(Engine {
            registry: Arc::new(config.registry()?),
            acknowledger: Acknowledger::new(config.acknowledgment.clone()),
            max_reject_errors: config.max_reject_errors,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn acknowledger(&self) -> &Acknowledger {
        &self.acknowledger
    }

    /// Parse, validate, dispatch and acknowledge one message.
    ///
    /// Only an unreadable envelope is an `Err`; rejection, unsupported types
    /// and mapping failures are all reported through the result's status.
    #[instrument(level = "debug", skip(self, raw))]
    pub fn process(&self, raw: &str, source: &str) -> Result<ProcessingResult, ParseError> {
        let message = parse(raw)?;
        let validation = validate(&message, &self.registry);

        let mut result = ProcessingResult {
            status: Status::Accepted,
            message_type: message.message_type.raw.clone(),
            control_id: message.header.control_id.clone(),
            event: message.message_type.event.clone(),
            event_description: None,
            mapped_resources: Vec::new(),
            acknowledgment_wire: String::new(),
            errors: Vec::new(),
            warnings: validation.warnings,
            source: source.to_string(),
        };

        if !validation.valid {
            let text = validation
                .errors
                .iter()
                .take(self.max_reject_errors)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            debug!(errors = validation.errors.len(), "rejecting invalid message");
            result.status = Status::Rejected;
            result.acknowledgment_wire = self.acknowledger.build(&message, AckCode::Reject, &text);
            result.errors = validation.errors;
            return Ok(result);
        }

        let Some(handler) = handler_for(&message.message_type.family) else {
            let text = format!("Unsupported message type: {}", message.message_type);
            warn!(message_type = %message.message_type, source, "unsupported message type");
            result.status = Status::Unsupported;
            result.acknowledgment_wire = self.acknowledger.build(&message, AckCode::Reject, &text);
            result.errors.push(text);
            return Ok(result);
        };

        match handler(&message) {
            Ok(output) => {
                for warning in &output.warnings {
                    warn!(source, control_id = ?result.control_id, "{warning}");
                }
                result.event = output.event;
                result.event_description = output.description;
                result.mapped_resources = output.resources;
                result.warnings.extend(output.warnings);
                result.acknowledgment_wire = self.acknowledger.build(&message, AckCode::Accept, "");
            }
            Err(err) => {
                let text = err.to_string();
                warn!(source, control_id = ?result.control_id, "failed to map message: {text}");
                result.status = Status::Error;
                result.acknowledgment_wire =
                    self.acknowledger
                        .build(&message, AckCode::ApplicationError, &text);
                result.errors.push(text);
            }
        }

        debug!(
            status = ?result.status,
            resources = result.mapped_resources.len(),
            "processed message"
        );
        Ok(result)
    }

    /// Parse and validate without mapping. A parse failure is reported as an
    /// invalid result.
    #[instrument(level = "debug", skip(self, raw))]
    pub fn validate_only(&self, raw: &str) -> ValidationResult {
        match parse(raw) {
            Ok(message) => validate(&message, &self.registry),
            Err(err) => ValidationResult::invalid(format!("parse error: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mapping::ResourceKind, message::SegmentType};
    use serde_json::json;

    const ADT: &str = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00001|P|2.5.1\r\
                       EVN|A01|20240101120000\r\
                       PID|1||12345^^^HOSP^MR||Doe^John^M||19800101|M\r\
                       PV1|1|I|W^101^1";

    fn msa(result: &ProcessingResult) -> Vec<String> {
        let ack = parse(&result.acknowledgment_wire).expect("can parse acknowledgment");
        let msa = ack.first(&SegmentType::Msa).expect("has MSA");
        (1..=3)
            .map(|p| msa.field(p).unwrap_or_default().to_string())
            .collect()
    }

    fn results(count: usize) -> String {
        let mut text = "MSH|^~\\&|LAB|LABFAC|EPIC|HOSP|20240101120000||ORU^R01|R-1|P|2.5.1\r\
                        PID|1||12345||Doe^John\r\
                        OBR|1|ORD-1||CBC"
            .to_string();
        for i in 1..=count {
            text.push_str(&format!("\rOBX|{i}|NM|{i}^Result {i}||{i}.5|mg|||||F"));
        }
        text
    }

    #[test]
    fn maps_an_admission() {
        let result = Engine::default().process(ADT, "test").expect("can process");
        assert_eq!(result.status, Status::Accepted);
        assert_eq!(result.message_type, "ADT^A01");
        assert_eq!(result.event.as_deref(), Some("A01"));
        assert_eq!(result.event_description, Some("admit/visit notification"));
        assert_eq!(result.source, "test");

        let patient = &result.mapped_resources[0];
        assert_eq!(patient.kind, ResourceKind::Patient);
        assert_eq!(patient.get("name"), Some(&json!([{ "family": "Doe", "given": ["John"] }])));
        assert_eq!(patient.get("gender"), Some(&json!("male")));
        assert_eq!(patient.get("birthDate"), Some(&json!("1980-01-01")));
        assert_eq!(result.mapped_resources[1].kind, ResourceKind::Encounter);
    }

    #[test]
    fn results_serialize_with_the_wire_acknowledgment() {
        let result = Engine::default().process(ADT, "test").expect("can process");
        let value = serde_json::to_value(&result).expect("can serialize result");
        assert_eq!(value["status"], json!("accepted"));
        assert_eq!(value["acknowledgment_wire"], json!(result.acknowledgment_wire));
        assert_eq!(value["mapped_resources"][0]["kind"], json!("patient"));
        assert_eq!(value["mapped_resources"][0]["gender"], json!("male"));
    }

    #[test]
    fn accepted_messages_echo_the_control_id() {
        let result = Engine::default().process(ADT, "test").expect("can process");
        assert_eq!(result.control_id.as_deref(), Some("MSG00001"));
        assert_eq!(msa(&result), vec!["AA", "MSG00001", ""]);
    }

    #[test]
    fn unreadable_envelopes_are_parse_errors() {
        let engine = Engine::default();
        assert_eq!(
            engine.process("PID|1||12345", "test"),
            Err(ParseError::MissingHeader)
        );
        assert_eq!(engine.process("  \r\n", "test"), Err(ParseError::Empty));
    }

    #[test]
    fn maps_numeric_results() {
        let text = "MSH|^~\\&|LAB|LABFAC|EPIC|HOSP|20240101120000||ORU^R01|R-1|P|2.5.1\r\
                    OBX|1|NM|HGB||7.5|g/dL|||||F\r\
                    OBX|2|NM|WBC||4.2|10*9/L|||||F";
        let result = Engine::default().process(text, "test").expect("can process");
        assert_eq!(result.status, Status::Accepted, "{:?}", result.errors);
        let values: Vec<_> = result
            .mapped_resources
            .iter()
            .filter(|r| r.kind == ResourceKind::Observation)
            .map(|r| r.get("valueQuantity").map(|q| q["value"].clone()))
            .collect();
        assert_eq!(values, vec![Some(json!(7.5)), Some(json!(4.2))]);
    }

    #[test]
    fn admissions_without_a_patient_are_rejected() {
        let text = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00002|P|2.5.1\r\
                    PV1|1|I";
        let engine = Engine::default();

        let validation = engine.validate_only(text);
        assert!(!validation.valid);
        assert!(validation
            .errors
            .contains(&"ADT: missing required segment PID".to_string()));

        let result = engine.process(text, "test").expect("can process");
        assert_eq!(result.status, Status::Rejected);
        assert!(result.mapped_resources.is_empty());
        let msa = msa(&result);
        assert_eq!(msa[0], "AR");
        assert_eq!(msa[1], "MSG00002");
        assert!(msa[2].contains("missing required segment PID"));
    }

    #[test]
    fn reject_text_quotes_the_first_few_errors() {
        let text = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00003|P|2.5.1\r\
                    PID|1||||||1980|||||||||||||||||||||2024";
        let config = Config {
            max_reject_errors: 2,
            ..Config::default()
        };
        let engine = Engine::from_config(&config).expect("can build engine");
        let result = engine.process(text, "test").expect("can process");
        assert_eq!(result.status, Status::Rejected);
        assert!(result.errors.len() > 2, "{:?}", result.errors);
        assert_eq!(msa(&result)[2].matches("; ").count(), 1);
    }

    #[test]
    fn unknown_types_are_unsupported() {
        let text = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ZZZ^Z01|MSG00004|P|2.5.1";
        let result = Engine::default().process(text, "test").expect("can process");
        assert_eq!(result.status, Status::Unsupported);
        assert_eq!(result.errors, vec!["Unsupported message type: ZZZ^Z01"]);
        assert_eq!(
            msa(&result),
            vec!["AR", "MSG00004", "Unsupported message type: ZZZ\\S\\Z01"]
        );
    }

    #[test]
    fn mapping_failures_are_application_errors() {
        let text = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ORM^O01|MSG00005|P|2.5.1\r\
                    OBR|1|||CBC\r\
                    ORC|NW|A1";
        let result = Engine::default().process(text, "test").expect("can process");
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.errors, vec!["OBR segment 1 has no preceding ORC"]);
        assert_eq!(msa(&result)[0], "AE");
        assert_eq!(msa(&result)[1], "MSG00005");
    }

    #[test]
    fn soft_warnings_are_collected() {
        let text = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00006|P|2.5.1\r\
                    PID|1||12345||Doe||19800101|Q";
        let result = Engine::default().process(text, "test").expect("can process");
        assert_eq!(result.status, Status::Accepted);
        assert_eq!(
            result.warnings,
            vec!["PID: value `Q` is not in table 0001 (field 8, Administrative Sex)"]
        );
    }

    #[test]
    fn large_result_batches_keep_segment_order() {
        let result = Engine::default()
            .process(&results(100), "test")
            .expect("can process");
        assert_eq!(result.status, Status::Accepted, "{:?}", result.errors);
        assert_eq!(result.mapped_resources.len(), 100);
        for (i, resource) in result.mapped_resources.iter().enumerate() {
            assert_eq!(resource.kind, ResourceKind::Observation);
            assert_eq!(
                resource.get("code").map(|c| &c["coding"][0]["code"]),
                Some(&json!((i + 1).to_string()))
            );
        }
    }

    #[test]
    fn validate_only_is_deterministic() {
        let engine = Engine::default();
        let first = engine.validate_only(ADT);
        assert!(first.valid, "{:?}", first.errors);
        assert_eq!(engine.validate_only(ADT), first);
        assert_eq!(
            engine.validate_only("garbage"),
            ValidationResult::invalid("parse error: message must begin with an MSH segment".to_string())
        );
    }

    #[test]
    fn concurrent_processing_matches_sequential() {
        let engine = Engine::default();
        let inputs: Vec<String> = (1..=8).map(results).chain([ADT.to_string()]).collect();
        let summarise = |result: ProcessingResult| {
            let msa = msa(&result);
            (result.status, result.mapped_resources, result.errors, result.warnings, msa)
        };

        let sequential: Vec<_> = inputs
            .iter()
            .map(|raw| summarise(engine.process(raw, "seq").expect("can process")))
            .collect();
        assert!(
            sequential.iter().all(|(status, ..)| *status == Status::Accepted),
            "{sequential:?}"
        );
        let concurrent: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|raw| {
                    let engine = engine.clone();
                    scope.spawn(move || engine.process(raw, "par").expect("can process"))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| summarise(h.join().expect("worker finished")))
                .collect()
        });
        assert_eq!(sequential, concurrent);
    }
}
