use super::{insert_some, MapContext, MappedResource, ResourceKind};
use crate::message::Segment;
use serde_json::{json, Map, Value};

/// Order control code → request status.
fn status(order_control: Option<&str>) -> &'static str {
    match order_control {
        Some("CA" | "OC" | "CR" | "DC" | "OD" | "DR") => "revoked",
        Some("HD" | "OH") => "on-hold",
        _ => "active",
    }
}

/// `ORC` plus its optional `OBR` → order.
///
/// The placer order number is carried verbatim, falling back to the request's
/// own placer number and then to the filler number.
pub fn order(orc: &Segment, obr: Option<&Segment>, ctx: &mut MapContext) -> MappedResource {
    let mut resource = Map::new();

    resource.insert(
        "status".to_string(),
        Value::String(status(ctx.raw(orc, 1)).to_string()),
    );
    resource.insert("intent".to_string(), Value::String("order".to_string()));

    let placer = ctx
        .raw(orc, 2)
        .or_else(|| obr.and_then(|obr| ctx.raw(obr, 2)))
        .map(|id| ("placer", id));
    let filler = ctx.raw(orc, 3).map(|id| ("filler", id));
    if let Some((kind, id)) = placer.or(filler) {
        resource.insert(
            "identifier".to_string(),
            json!([{ "value": id, "type": { "text": kind } }]),
        );
    }

    if let Some(obr) = obr {
        insert_some(&mut resource, "code", ctx.codeable_concept(obr, 4));
        insert_some(
            &mut resource,
            "occurrenceDateTime",
            ctx.timestamp(obr, 6).map(|t| t.to_string()),
        );
    }

    insert_some(
        &mut resource,
        "authoredOn",
        ctx.timestamp(orc, 9).map(|t| t.to_string()),
    );

    let requester = ctx.repetitions(orc, 12).next().and_then(|provider| {
        let mut reference = Map::new();
        insert_some(
            &mut reference,
            "identifier",
            ctx.component_of(provider, 1).map(|id| json!({ "value": id })),
        );
        let name: Vec<String> = [3, 2]
            .into_iter()
            .filter_map(|i| ctx.component_of(provider, i))
            .collect();
        if !name.is_empty() {
            reference.insert("display".to_string(), Value::String(name.join(" ")));
        }
        (!reference.is_empty()).then_some(Value::Object(reference))
    });
    insert_some(&mut resource, "requester", requester);

    MappedResource::new(ResourceKind::Order, resource)
}
