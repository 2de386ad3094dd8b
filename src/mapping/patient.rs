use super::{insert_some, MapContext, MappedResource, ResourceKind};
use crate::message::Segment;
use serde_json::{json, Map, Value};

fn gender(code: &str) -> &'static str {
    match code {
        "M" => "male",
        "F" => "female",
        "O" => "other",
        _ => "unknown",
    }
}

/// `PID` → patient.
pub fn patient(pid: &Segment, ctx: &mut MapContext) -> MappedResource {
    let mut resource = Map::new();

    if let Some(id) = ctx.component(pid, 3, 1) {
        let mut value = Map::new();
        value.insert("value".to_string(), Value::String(id));
        if let Some(authority) = ctx.component(pid, 3, 4) {
            value.insert("assigner".to_string(), json!({ "display": authority }));
        }
        resource.insert("identifier".to_string(), json!([value]));
    }

    let family = ctx.component(pid, 5, 1);
    let given = ctx.component(pid, 5, 2);
    if family.is_some() || given.is_some() {
        let mut name = Map::new();
        insert_some(&mut name, "family", family);
        insert_some(&mut name, "given", given.map(|g| vec![g]));
        resource.insert("name".to_string(), json!([name]));
    }

    insert_some(
        &mut resource,
        "gender",
        ctx.component(pid, 8, 1).map(|code| gender(&code)),
    );
    insert_some(
        &mut resource,
        "birthDate",
        ctx.timestamp(pid, 7).map(|t| t.date().format("%Y-%m-%d").to_string()),
    );

    let view: &MapContext = ctx;
    let addresses: Vec<Value> = view
        .repetitions(pid, 11)
        .filter_map(|repetition| address(repetition, "home", view))
        .collect();
    if !addresses.is_empty() {
        resource.insert("address".to_string(), Value::Array(addresses));
    }

    let telecom: Vec<Value> = [(13, "home"), (14, "work")]
        .into_iter()
        .flat_map(|(position, use_)| {
            view.repetitions(pid, position)
                .filter_map(move |repetition| contact_point(repetition, use_, view))
        })
        .collect();
    if !telecom.is_empty() {
        resource.insert("telecom".to_string(), Value::Array(telecom));
    }

    if let Some(died) = ctx.timestamp(pid, 29) {
        resource.insert("deceasedDateTime".to_string(), Value::String(died.to_string()));
    } else if ctx.component(pid, 30, 1).as_deref() == Some("Y") {
        resource.insert("deceasedBoolean".to_string(), Value::Bool(true));
    }

    MappedResource::new(ResourceKind::Patient, resource)
}

/// `street^other^city^state^zip^country`
fn address(repetition: &str, use_: &str, ctx: &MapContext) -> Option<Value> {
    let lines: Vec<String> = [1, 2]
        .into_iter()
        .filter_map(|i| ctx.component_of(repetition, i))
        .collect();
    let mut address = Map::new();
    if !lines.is_empty() {
        address.insert("line".to_string(), json!(lines));
    }
    insert_some(&mut address, "city", ctx.component_of(repetition, 3));
    insert_some(&mut address, "state", ctx.component_of(repetition, 4));
    insert_some(&mut address, "postalCode", ctx.component_of(repetition, 5));
    insert_some(&mut address, "country", ctx.component_of(repetition, 6));
    if address.is_empty() {
        return None;
    }
    address.insert("use".to_string(), Value::String(use_.to_string()));
    Some(Value::Object(address))
}

/// Either the legacy unformatted number in component 1, an email address in
/// component 4 for `NET` entries, or area code and local number from
/// components 6 and 7.
fn contact_point(repetition: &str, use_: &str, ctx: &MapContext) -> Option<Value> {
    let is_email = ctx.component_of(repetition, 2).as_deref() == Some("NET");
    let (system, value) = if is_email {
        ("email", ctx.component_of(repetition, 4))
    } else {
        let value = ctx.component_of(repetition, 1).or_else(|| {
            let local = ctx.component_of(repetition, 7)?;
            Some(match ctx.component_of(repetition, 6) {
                Some(area) => format!("({area}) {local}"),
                None => local,
            })
        });
        ("phone", value)
    };
    value.map(|value| json!({ "system": system, "value": value, "use": use_ }))
}

/// A reference to the message's patient by identifier, for resources that
/// point back at their subject.
pub fn patient_reference(pid: &Segment, ctx: &MapContext) -> Option<Value> {
    ctx.component(pid, 3, 1)
        .map(|id| json!({ "identifier": { "value": id } }))
}
