use super::{identifier, insert_some, MapContext, MappedResource, ResourceKind};
use crate::message::Segment;
use serde_json::{json, Map, Value};

const ACT_CODE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";

/// Patient class → encounter class code and display. Anything unrecognised
/// is treated as ambulatory.
fn encounter_class(patient_class: Option<&str>) -> (&'static str, &'static str) {
    match patient_class {
        Some("E") => ("EMER", "emergency"),
        Some("I") => ("IMP", "inpatient encounter"),
        Some("P") => ("PRENC", "pre-admission"),
        _ => ("AMB", "ambulatory"),
    }
}

/// `PV1` → encounter.
pub fn encounter(pv1: &Segment, ctx: &mut MapContext) -> MappedResource {
    let mut resource = Map::new();

    let discharged = ctx.raw(pv1, 45).is_some();
    let status = if discharged { "finished" } else { "in-progress" };
    resource.insert("status".to_string(), Value::String(status.to_string()));

    let patient_class = ctx.component(pv1, 2, 1);
    let (code, display) = encounter_class(patient_class.as_deref());
    resource.insert(
        "class".to_string(),
        json!({ "system": ACT_CODE_SYSTEM, "code": code, "display": display }),
    );

    insert_some(
        &mut resource,
        "identifier",
        ctx.component(pv1, 19, 1).map(identifier),
    );

    let start = ctx.timestamp(pv1, 44);
    let end = ctx.timestamp(pv1, 45);
    if start.is_some() || end.is_some() {
        let mut period = Map::new();
        insert_some(&mut period, "start", start.map(|t| t.to_string()));
        insert_some(&mut period, "end", end.map(|t| t.to_string()));
        resource.insert("period".to_string(), Value::Object(period));
    }

    // point of care^room^bed
    let location: Vec<String> = (1..=3)
        .filter_map(|i| ctx.component(pv1, 3, i))
        .collect();
    if !location.is_empty() {
        resource.insert(
            "location".to_string(),
            json!([{ "location": { "display": location.join(" ") } }]),
        );
    }

    if let Some(attending) = ctx.repetitions(pv1, 7).next() {
        let name: Vec<String> = [3, 2]
            .into_iter()
            .filter_map(|i| ctx.component_of(attending, i))
            .collect();
        let mut individual = Map::new();
        insert_some(
            &mut individual,
            "identifier",
            ctx.component_of(attending, 1).map(|id| json!({ "value": id })),
        );
        if !name.is_empty() {
            individual.insert("display".to_string(), Value::String(name.join(" ")));
        }
        if !individual.is_empty() {
            resource.insert(
                "participant".to_string(),
                json!([{ "type": [{ "text": "attending" }], "individual": individual }]),
            );
        }
    }

    if let Some(disposition) = ctx.component(pv1, 36, 1) {
        resource.insert(
            "hospitalization".to_string(),
            json!({ "dischargeDisposition": { "coding": [{ "code": disposition }] } }),
        );
    }

    MappedResource::new(ResourceKind::Encounter, resource)
}
