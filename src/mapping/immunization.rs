use super::{insert_some, MapContext, MappedResource, ResourceKind};
use crate::{message::Segment, schema::is_signed_decimal};
use serde_json::{json, Map, Number, Value};

/// Amount sent when the administered dose is not known.
const UNKNOWN_AMOUNT: &str = "999";

fn status(completion: Option<&str>, action: Option<&str>) -> &'static str {
    if action == Some("D") {
        return "entered-in-error";
    }
    match completion {
        Some("NA" | "RE") => "not-done",
        _ => "completed",
    }
}

/// `RXA` plus an optional `RXR` → immunization.
pub fn immunization(rxa: &Segment, rxr: Option<&Segment>, ctx: &mut MapContext) -> MappedResource {
    let mut resource = Map::new();

    let status = status(
        ctx.component(rxa, 20, 1).as_deref(),
        ctx.component(rxa, 21, 1).as_deref(),
    );
    resource.insert("status".to_string(), Value::String(status.to_string()));

    insert_some(&mut resource, "vaccineCode", ctx.codeable_concept(rxa, 5));
    insert_some(
        &mut resource,
        "occurrenceDateTime",
        ctx.timestamp(rxa, 3).map(|t| t.to_string()),
    );

    let amount = ctx
        .component(rxa, 6, 1)
        .filter(|amount| amount != UNKNOWN_AMOUNT && is_signed_decimal(amount))
        .and_then(|amount| amount.parse::<f64>().ok())
        .and_then(Number::from_f64);
    if let Some(amount) = amount {
        let mut dose = Map::new();
        dose.insert("value".to_string(), Value::Number(amount));
        insert_some(&mut dose, "unit", ctx.component(rxa, 7, 1));
        resource.insert("doseQuantity".to_string(), Value::Object(dose));
    }

    insert_some(&mut resource, "lotNumber", ctx.text(rxa, 15));
    insert_some(
        &mut resource,
        "expirationDate",
        ctx.timestamp(rxa, 16)
            .map(|t| t.date().format("%Y-%m-%d").to_string()),
    );
    if let Some(manufacturer) = ctx.component(rxa, 17, 2).or_else(|| ctx.component(rxa, 17, 1)) {
        resource.insert(
            "manufacturer".to_string(),
            json!({ "display": manufacturer }),
        );
    }

    if let Some(route) = rxr.and_then(|rxr| ctx.codeable_concept(rxr, 1)) {
        resource.insert("route".to_string(), route);
    }
    if let Some(site) = rxr.and_then(|rxr| ctx.codeable_concept(rxr, 2)) {
        resource.insert("site".to_string(), site);
    }

    MappedResource::new(ResourceKind::Immunization, resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{message::SegmentType, parser::parse};

    fn map_vaccination(body: &str) -> MappedResource {
        let text = format!("MSH|^~\\&|A|B|C|D|20240101120000||VXU^V04|1|P|2.5.1\r{body}");
        let message = parse(&text).expect("can parse message");
        let rxa = message.first(&SegmentType::Rxa).expect("has RXA");
        let rxr = message.first(&SegmentType::Rxr);
        let mut ctx = MapContext::new(&message.separators);
        immunization(rxa, rxr, &mut ctx)
    }

    #[test]
    fn maps_an_administered_dose() {
        let resource = map_vaccination(
            "RXA|0|1|20240115103000|20240115103000|08^Hep B, adolescent or pediatric^CVX|0.5|mL||||||||LOT123|20250630|MSD^Merck^MVX|||CP|A\r\
             RXR|IM^Intramuscular^HL70162|LA^Left Arm^HL70163",
        );
        assert_eq!(resource.get("status"), Some(&json!("completed")));
        assert_eq!(
            resource.get("vaccineCode"),
            Some(&json!({
                "coding": [{
                    "system": "http://hl7.org/fhir/sid/cvx",
                    "code": "08",
                    "display": "Hep B, adolescent or pediatric",
                }],
                "text": "Hep B, adolescent or pediatric",
            }))
        );
        assert_eq!(
            resource.get("occurrenceDateTime"),
            Some(&json!("2024-01-15T10:30:00"))
        );
        assert_eq!(
            resource.get("doseQuantity"),
            Some(&json!({ "value": 0.5, "unit": "mL" }))
        );
        assert_eq!(resource.get("lotNumber"), Some(&json!("LOT123")));
        assert_eq!(resource.get("expirationDate"), Some(&json!("2025-06-30")));
        assert_eq!(resource.get("manufacturer"), Some(&json!({ "display": "Merck" })));
        assert_eq!(
            resource.get("route").map(|r| &r["coding"][0]["code"]),
            Some(&json!("IM"))
        );
        assert_eq!(resource.get("site").map(|s| &s["text"]), Some(&json!("Left Arm")));
    }

    #[test]
    fn refusals_and_deletions() {
        let refused = map_vaccination("RXA|0|1|20240115|20240115|998^No vaccine administered^CVX|999||||||||||||||RE");
        assert_eq!(refused.get("status"), Some(&json!("not-done")));
        assert_eq!(refused.get("doseQuantity"), None);
        assert_eq!(refused.get("occurrenceDateTime"), Some(&json!("2024-01-15")));

        let deleted = map_vaccination("RXA|0|1|20240115|20240115|08^HepB^CVX|0.5||||||||||||||CP|D");
        assert_eq!(deleted.get("status"), Some(&json!("entered-in-error")));
    }
}
