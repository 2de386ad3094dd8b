use super::{event_code, require, HandlerOutput, MappingError};
use crate::{
    mapping::{encounter, patient, patient_reference, MapContext},
    message::{Message, SegmentType},
};
use tracing::{debug, instrument};

/// Events that legitimately carry more than one patient.
const MULTI_PATIENT_EVENTS: &[&str] = &[
    "A18", "A24", "A30", "A34", "A35", "A36", "A37", "A39", "A40", "A41", "A42",
];

pub(super) fn describe(event: &str) -> Option<&'static str> {
    let description = match event {
        "A01" => "admit/visit notification",
        "A02" => "transfer a patient",
        "A03" => "discharge/end visit",
        "A04" => "register a patient",
        "A05" => "pre-admit a patient",
        "A06" => "change an outpatient to an inpatient",
        "A07" => "change an inpatient to an outpatient",
        "A08" => "update patient information",
        "A11" => "cancel admit/visit notification",
        "A12" => "cancel transfer",
        "A13" => "cancel discharge/end visit",
        "A18" => "merge patient information",
        "A24" => "link patient information",
        "A28" => "add person information",
        "A31" => "update person information",
        "A37" => "unlink patient information",
        "A40" => "merge patient - patient identifier list",
        _ => return None,
    };
    Some(description)
}

/// `PID` → patient, and `PV1` (when present) → encounter with the encounter
/// status refined by the event.
#[instrument(level = "debug", skip(message), fields(control_id = ?message.header.control_id))]
pub(super) fn handle(message: &Message) -> Result<HandlerOutput, MappingError> {
    let mut ctx = MapContext::new(&message.separators);
    let event = event_code(message, &ctx);

    let pid = require(message, SegmentType::Pid)?;
    let patients: Vec<_> = message.segments_of(&SegmentType::Pid).collect();
    let multi_patient = event
        .as_deref()
        .is_some_and(|e| MULTI_PATIENT_EVENTS.contains(&e));
    if patients.len() > 1 && !multi_patient {
        return Err(MappingError::UnexpectedRepeat {
            segment: SegmentType::Pid,
        });
    }

    let mut resources: Vec<_> = patients
        .into_iter()
        .map(|pid| patient(pid, &mut ctx))
        .collect();

    if let Some(pv1) = message.first(&SegmentType::Pv1) {
        let mut visit = encounter(pv1, &mut ctx);
        if let Some(subject) = patient_reference(pid, &ctx) {
            visit.set("subject", subject);
        }
        let finished = visit.get("status").and_then(|s| s.as_str()) == Some("finished");
        match event.as_deref() {
            Some("A05") if !finished => visit.set("status", "planned"),
            Some("A11") if !finished => visit.set("status", "cancelled"),
            _ => {}
        }
        resources.push(visit);
    }

    debug!(resources = resources.len(), ?event, "mapped admission message");
    Ok(HandlerOutput {
        description: event.as_deref().and_then(describe),
        event,
        resources,
        warnings: ctx.into_warnings(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mapping::ResourceKind, parser::parse};
    use serde_json::json;

    const HEADER: &str = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||";

    fn run(message_type: &str, body: &str) -> Result<HandlerOutput, MappingError> {
        let text = format!("{HEADER}{message_type}|MSG00001|P|2.5.1\r{body}");
        handle(&parse(&text).expect("can parse message"))
    }

    #[test]
    fn maps_patient_and_encounter() {
        let output = run(
            "ADT^A01",
            "EVN|A01|20240101120000\rPID|1||12345^^^HOSP^MR||Doe^John^M||19800101|M\rPV1|1|I|W^101^1",
        )
        .expect("can map admission");
        assert_eq!(output.event.as_deref(), Some("A01"));
        assert_eq!(output.description, Some("admit/visit notification"));
        let kinds: Vec<_> = output.resources.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ResourceKind::Patient, ResourceKind::Encounter]);
        assert_eq!(
            output.resources[1].get("subject"),
            Some(&json!({ "identifier": { "value": "12345" } }))
        );
        assert_eq!(output.resources[1].get("status"), Some(&json!("in-progress")));
    }

    #[test]
    fn pre_admits_and_cancellations_refine_status() {
        let output = run("ADT^A05", "PID|1||1||Doe\rPV1|1|P").expect("can map pre-admit");
        assert_eq!(output.resources[1].get("status"), Some(&json!("planned")));
        let output = run("ADT^A11", "PID|1||1||Doe\rPV1|1|I").expect("can map cancel");
        assert_eq!(output.resources[1].get("status"), Some(&json!("cancelled")));
    }

    #[test]
    fn repeated_patients_only_for_link_and_merge_events() {
        let body = "PID|1||1||Doe\rPID|2||2||Roe";
        assert_eq!(
            run("ADT^A01", body),
            Err(MappingError::UnexpectedRepeat {
                segment: SegmentType::Pid
            })
        );
        let output = run("ADT^A40", body).expect("can map merge");
        assert_eq!(output.resources.len(), 2);
    }

    #[test]
    fn missing_patient_is_a_mapping_error() {
        assert!(matches!(
            run("ADT^A01", "PV1|1|I"),
            Err(MappingError::MissingSegment { .. })
        ));
    }
}
