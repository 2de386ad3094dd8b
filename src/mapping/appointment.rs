use super::{insert_some, MapContext, MappedResource, ResourceKind};
use crate::message::Segment;
use serde_json::{json, Map, Value};

/// Filler status (`SCH-25`) → appointment status. Booked when absent.
fn status(code: Option<&str>) -> &'static str {
    match code {
        Some("Pending") => "pending",
        Some("Cancelled" | "Deleted" | "Dc") => "cancelled",
        Some("Complete") => "fulfilled",
        Some("Noshow") => "noshow",
        Some("Started") => "arrived",
        Some("Waitlist") => "waitlist",
        _ => "booked",
    }
}

/// Duration in minutes from `SCH-9` and its units in `SCH-10`.
fn minutes(duration: &str, units: Option<&str>) -> Option<u64> {
    let duration: u64 = duration.trim().parse().ok()?;
    match units {
        None | Some("M" | "MIN" | "min") => Some(duration),
        Some("H" | "HR" | "h") => duration.checked_mul(60),
        Some("S" | "s") => Some(duration / 60),
        Some(_) => None,
    }
}

/// `SCH` plus the first `AIS` → appointment.
pub fn appointment(sch: &Segment, ais: Option<&Segment>, ctx: &mut MapContext) -> MappedResource {
    let mut resource = Map::new();

    let identifiers: Vec<Value> = [(1, "placer"), (2, "filler")]
        .into_iter()
        .filter_map(|(position, kind)| {
            ctx.component(sch, position, 1)
                .map(|id| json!({ "value": id, "type": { "text": kind } }))
        })
        .collect();
    if !identifiers.is_empty() {
        resource.insert("identifier".to_string(), Value::Array(identifiers));
    }

    let status = status(ctx.component(sch, 25, 1).as_deref());
    resource.insert("status".to_string(), Value::String(status.to_string()));

    // timing quantity: ^^^start^end
    let start = ctx
        .timestamp_component(sch, 11, 4)
        .or_else(|| ais.and_then(|ais| ctx.timestamp(ais, 4)));
    let end = ctx.timestamp_component(sch, 11, 5);
    insert_some(&mut resource, "start", start.map(|t| t.to_string()));
    insert_some(&mut resource, "end", end.map(|t| t.to_string()));

    let units = ctx.component(sch, 10, 1);
    insert_some(
        &mut resource,
        "minutesDuration",
        ctx.component(sch, 9, 1)
            .and_then(|duration| minutes(&duration, units.as_deref())),
    );

    if let Some(reason) = ctx.codeable_concept(sch, 7) {
        resource.insert("reasonCode".to_string(), json!([reason]));
    }
    insert_some(&mut resource, "appointmentType", ctx.codeable_concept(sch, 8));
    if let Some(service) = ais.and_then(|ais| ctx.codeable_concept(ais, 3)) {
        resource.insert("serviceType".to_string(), json!([service]));
    }

    MappedResource::new(ResourceKind::Appointment, resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{message::SegmentType, parser::parse};

    fn map_schedule(body: &str) -> (MappedResource, Vec<String>) {
        let text = format!("MSH|^~\\&|A|B|C|D|20240101120000||SIU^S12|1|P|2.5.1\r{body}");
        let message = parse(&text).expect("can parse message");
        let sch = message.first(&SegmentType::Sch).expect("has SCH");
        let ais = message.first(&SegmentType::Ais);
        let mut ctx = MapContext::new(&message.separators);
        let resource = appointment(sch, ais, &mut ctx);
        (resource, ctx.into_warnings())
    }

    #[test]
    fn maps_a_booked_appointment() {
        let (resource, warnings) = map_schedule(
            "SCH|P-1|F-1||||ROUTINE|CHK^Checkup|NORMAL|30|MIN|^^^20240301090000^20240301093000||||||||||||||Booked",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(resource.get("status"), Some(&json!("booked")));
        assert_eq!(resource.get("start"), Some(&json!("2024-03-01T09:00:00")));
        assert_eq!(resource.get("end"), Some(&json!("2024-03-01T09:30:00")));
        assert_eq!(resource.get("minutesDuration"), Some(&json!(30)));
        assert_eq!(
            resource.get("identifier"),
            Some(&json!([
                { "value": "P-1", "type": { "text": "placer" } },
                { "value": "F-1", "type": { "text": "filler" } },
            ]))
        );
        assert_eq!(
            resource.get("reasonCode"),
            Some(&json!([{ "coding": [{ "code": "CHK", "display": "Checkup" }], "text": "Checkup" }]))
        );
    }

    #[test]
    fn start_falls_back_to_the_resource_segment() {
        let (resource, _) = map_schedule(
            "SCH|P-1||||||||1|H|||||||||||||||Pending\rAIS|1||XRAY^Chest X-ray|20240302140000",
        );
        assert_eq!(resource.get("status"), Some(&json!("pending")));
        assert_eq!(resource.get("start"), Some(&json!("2024-03-02T14:00:00")));
        assert_eq!(resource.get("end"), None);
        assert_eq!(resource.get("minutesDuration"), Some(&json!(60)));
        assert_eq!(
            resource.get("serviceType").map(|s| &s[0]["text"]),
            Some(&json!("Chest X-ray"))
        );
    }

    #[test]
    fn cancelled_statuses_and_bad_timing() {
        let (resource, warnings) = map_schedule("SCH|P-1||||||||||^^^2024||||||||||||||Deleted");
        assert_eq!(resource.get("status"), Some(&json!("cancelled")));
        assert_eq!(resource.get("start"), None);
        assert_eq!(warnings, vec!["SCH.11.4: unparseable timestamp `2024`"]);
    }
}
