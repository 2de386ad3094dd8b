use super::{insert_some, MapContext, MappedResource, ResourceKind};
use crate::{message::Segment, schema::is_signed_decimal};
use serde_json::{json, Map, Number, Value};

/// Result status (`OBX-11`) → observation status.
fn status(code: Option<&str>) -> &'static str {
    match code {
        Some("F") => "final",
        Some("C") => "corrected",
        Some("P" | "S" | "R") => "preliminary",
        Some("I") => "registered",
        Some("X") => "cancelled",
        Some("D" | "W") => "entered-in-error",
        _ => "unknown",
    }
}

/// `OBX` → observation.
///
/// The value is shaped by the value type in `OBX-2`. Numbers that do not
/// parse are kept as text with a warning rather than dropped.
pub fn observation(obx: &Segment, ctx: &mut MapContext) -> MappedResource {
    let mut resource = Map::new();

    let status = status(ctx.component(obx, 11, 1).as_deref());
    resource.insert("status".to_string(), Value::String(status.to_string()));
    insert_some(&mut resource, "code", ctx.codeable_concept(obx, 3));

    let value_type = ctx.component(obx, 2, 1).unwrap_or_default();
    match value_type.as_str() {
        "NM" | "SN" => insert_number(obx, &mut resource, ctx),
        "CE" | "CWE" | "CNE" => {
            insert_some(&mut resource, "valueCodeableConcept", ctx.codeable_concept(obx, 5));
        }
        "DT" | "TS" | "DTM" => {
            insert_some(
                &mut resource,
                "valueDateTime",
                ctx.timestamp(obx, 5).map(|t| t.to_string()),
            );
        }
        _ => {
            let text: Vec<String> = ctx
                .repetitions(obx, 5)
                .map(|r| ctx.decode(r))
                .collect();
            if !text.is_empty() {
                resource.insert("valueString".to_string(), Value::String(text.join("\n")));
            }
        }
    }

    insert_some(
        &mut resource,
        "effectiveDateTime",
        ctx.timestamp(obx, 14).map(|t| t.to_string()),
    );
    if let Some(range) = ctx.text(obx, 7) {
        resource.insert("referenceRange".to_string(), json!([{ "text": range }]));
    }
    if let Some(flag) = ctx.codeable_concept(obx, 8) {
        resource.insert("interpretation".to_string(), json!([flag]));
    }

    MappedResource::new(ResourceKind::Observation, resource)
}

fn insert_number(obx: &Segment, resource: &mut Map<String, Value>, ctx: &mut MapContext) {
    let Some(raw) = ctx.text(obx, 5) else {
        return;
    };
    let trimmed = raw.trim();
    let number = is_signed_decimal(trimmed)
        .then(|| trimmed.parse::<f64>().ok())
        .flatten()
        .and_then(Number::from_f64);

    match number {
        Some(value) => {
            let mut quantity = Map::new();
            quantity.insert("value".to_string(), Value::Number(value));
            insert_some(&mut quantity, "unit", ctx.component(obx, 6, 1));
            resource.insert("valueQuantity".to_string(), Value::Object(quantity));
        }
        None => {
            ctx.warn(format!("OBX.5: non-numeric value `{raw}` kept as text"));
            resource.insert("valueString".to_string(), Value::String(raw));
        }
    }
}
