use super::{event_code, require, subject, HandlerOutput, MappingError};
use crate::{
    mapping::{observation, MapContext, MappedResource},
    message::{Message, SegmentType},
};
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// Every `OBX` → observation, in segment order. Observations point at the
/// request (`OBR`) they follow, and `NTE` comments after an `OBX` become
/// notes on it. Comments between an `OBR` and its first `OBX` belong to the
/// request and are not mapped.
#[instrument(level = "debug", skip(message), fields(control_id = ?message.header.control_id))]
pub(super) fn handle(message: &Message) -> Result<HandlerOutput, MappingError> {
    let mut ctx = MapContext::new(&message.separators);
    let event = event_code(message, &ctx);
    require(message, SegmentType::Obx)?;
    let subject = subject(message, &ctx);

    let mut resources: Vec<MappedResource> = Vec::new();
    let mut request: Option<Value> = None;
    // index of the observation that trailing NTEs annotate
    let mut annotated: Option<usize> = None;
    for segment in message.segments() {
        match segment.segment_type {
            SegmentType::Obr => {
                request = ctx
                    .component(segment, 2, 1)
                    .or_else(|| ctx.component(segment, 3, 1))
                    .map(|id| json!([{ "identifier": { "value": id } }]));
                annotated = None;
            }
            SegmentType::Obx => {
                let mut resource = observation(segment, &mut ctx);
                if let Some(subject) = &subject {
                    resource.set("subject", subject.clone());
                }
                if let Some(request) = &request {
                    resource.set("basedOn", request.clone());
                }
                annotated = Some(resources.len());
                resources.push(resource);
            }
            SegmentType::Nte => {
                let resource = annotated.and_then(|i| resources.get_mut(i));
                let (Some(resource), Some(comment)) = (resource, ctx.text(segment, 3)) else {
                    continue;
                };
                match resource.resource.get_mut("note").and_then(Value::as_array_mut) {
                    Some(notes) => notes.push(json!({ "text": comment })),
                    None => resource.set("note", json!([{ "text": comment }])),
                }
            }
            _ => {}
        }
    }

    debug!(observations = resources.len(), "mapped result message");
    Ok(HandlerOutput {
        description: match event.as_deref() {
            Some("R01") => Some("unsolicited observation result"),
            Some("R30") => Some("unsolicited point-of-care observation"),
            _ => None,
        },
        event,
        resources,
        warnings: ctx.into_warnings(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mapping::ResourceKind, parser::parse};

    fn run(body: &str) -> Result<HandlerOutput, MappingError> {
        let text = format!("MSH|^~\\&|LAB|LABFAC|EPIC|HOSP|20240101120000||ORU^R01|1|P|2.5.1\r{body}");
        handle(&parse(&text).expect("can parse message"))
    }

    #[test]
    fn maps_each_result_in_order() {
        let output = run(
            "PID|1||12345\rOBR|1|ORD-1||CBC\rOBX|1|NM|HGB||7.5|g/dL|||||F\rNTE|1||haemolysed\rNTE|2||repeat advised\rOBX|2|NM|WBC||4.2|10*9/L|||||F",
        )
        .expect("can map results");
        assert_eq!(output.description, Some("unsolicited observation result"));
        assert_eq!(output.resources.len(), 2);
        assert!(output.resources.iter().all(|r| r.kind == ResourceKind::Observation));
        assert_eq!(
            output.resources[0].get("valueQuantity").map(|v| &v["value"]),
            Some(&json!(7.5))
        );
        assert_eq!(
            output.resources[1].get("valueQuantity").map(|v| &v["value"]),
            Some(&json!(4.2))
        );
        assert_eq!(
            output.resources[0].get("note"),
            Some(&json!([{ "text": "haemolysed" }, { "text": "repeat advised" }]))
        );
        assert_eq!(output.resources[1].get("note"), None);
        assert_eq!(
            output.resources[1].get("basedOn"),
            Some(&json!([{ "identifier": { "value": "ORD-1" } }]))
        );
        assert_eq!(
            output.resources[1].get("subject"),
            Some(&json!({ "identifier": { "value": "12345" } }))
        );
    }

    #[test]
    fn bad_numbers_do_not_fail_the_message() {
        let output = run("OBX|1|NM|HGB||high||||||F\rOBX|2|NM|WBC||4.2||||||F")
            .expect("can map results");
        assert_eq!(output.resources.len(), 2);
        assert_eq!(output.resources[0].get("valueString"), Some(&json!("high")));
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn request_comments_are_not_attached_to_earlier_results() {
        let output = run(
            "OBR|1|ORD-1||CBC\rOBX|1|NM|HGB||7.5|g/dL|||||F\rOBR|2|ORD-2||BMP\rNTE|1||specimen haemolysed\rOBX|1|NM|NA||140|mmol/L|||||F\rNTE|2||confirmed",
        )
        .expect("can map results");
        assert_eq!(output.resources.len(), 2);
        assert_eq!(output.resources[0].get("note"), None);
        assert_eq!(
            output.resources[1].get("note"),
            Some(&json!([{ "text": "confirmed" }]))
        );
        assert_eq!(
            output.resources[1].get("basedOn"),
            Some(&json!([{ "identifier": { "value": "ORD-2" } }]))
        );
    }
}
