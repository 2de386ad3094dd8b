use crate::message::{Segment, Separators};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;

mod appointment;
mod encounter;
mod immunization;
mod observation;
mod order;
mod patient;
pub mod timestamps;

pub use appointment::appointment;
pub use encounter::encounter;
pub use immunization::immunization;
pub use observation::observation;
pub use order::order;
pub use patient::{patient, patient_reference};
pub use timestamps::{parse_timestamp, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Patient,
    Encounter,
    Observation,
    Order,
    Appointment,
    Immunization,
}

impl ResourceKind {
    /// The `resourceType` the downstream resource library expects.
    pub fn resource_type(&self) -> &'static str {
        match self {
            ResourceKind::Patient => "Patient",
            ResourceKind::Encounter => "Encounter",
            ResourceKind::Observation => "Observation",
            ResourceKind::Order => "ServiceRequest",
            ResourceKind::Appointment => "Appointment",
            ResourceKind::Immunization => "Immunization",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_type())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedResource {
    pub kind: ResourceKind,
    #[serde(flatten)]
    pub resource: Map<String, Value>,
}

impl MappedResource {
    pub fn new(kind: ResourceKind, mut resource: Map<String, Value>) -> Self {
        resource.insert(
            "resourceType".to_string(),
            Value::String(kind.resource_type().to_string()),
        );
        MappedResource { kind, resource }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.resource.get(key)
    }

    pub fn set<V: Into<Value>>(&mut self, key: &str, value: V) {
        self.resource.insert(key.to_string(), value.into());
    }
}

/// Per-message state shared by the mapping functions: the message's
/// delimiters, and the soft warnings raised so far.
#[derive(Debug)]
pub struct MapContext<'m> {
    separators: &'m Separators,
    warnings: Vec<String>,
}

impl<'m> MapContext<'m> {
    pub fn new(separators: &'m Separators) -> Self {
        MapContext {
            separators,
            warnings: Vec::new(),
        }
    }

    pub fn warn<S: Into<String>>(&mut self, warning: S) {
        self.warnings.push(warning.into());
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    /// Non-empty repetitions of a field, raw.
    pub fn repetitions<'s>(
        &self,
        segment: &'s Segment,
        position: usize,
    ) -> impl Iterator<Item = &'s str> {
        let repetition = self.separators.repetition;
        segment
            .field(position)
            .unwrap_or_default()
            .split(repetition)
            .filter(|r| !r.is_empty())
    }

    /// Component `index` (1-based) of a single repetition, unescaped.
    pub fn component_of(&self, repetition: &str, index: usize) -> Option<String> {
        if index == 0 {
            return None;
        }
        repetition
            .split(self.separators.component)
            .nth(index - 1)
            .map(|c| {
                c.split(self.separators.subcomponent)
                    .next()
                    .unwrap_or_default()
            })
            .filter(|c| !c.is_empty())
            .map(|c| self.separators.decode(c))
    }

    /// Component `index` (1-based) of the first repetition of a field.
    pub fn component(&self, segment: &Segment, position: usize, index: usize) -> Option<String> {
        self.repetitions(segment, position)
            .next()
            .and_then(|r| self.component_of(r, index))
    }

    /// The first repetition of a field as plain text.
    pub fn text(&self, segment: &Segment, position: usize) -> Option<String> {
        self.repetitions(segment, position)
            .next()
            .map(|r| self.separators.decode(r))
    }

    /// Undo escape sequences in a raw value.
    pub fn decode(&self, raw: &str) -> String {
        self.separators.decode(raw)
    }

    /// The field value exactly as received, if non-empty.
    pub fn raw<'s>(&self, segment: &'s Segment, position: usize) -> Option<&'s str> {
        segment.field(position).filter(|v| !v.is_empty())
    }

    /// Parse a timestamp field, warning when a value is present but unusable.
    pub fn timestamp(&mut self, segment: &Segment, position: usize) -> Option<Timestamp> {
        self.timestamp_component(segment, position, 1)
    }

    /// As [`MapContext::timestamp`], for a timestamp nested in a composite.
    pub fn timestamp_component(
        &mut self,
        segment: &Segment,
        position: usize,
        index: usize,
    ) -> Option<Timestamp> {
        let raw = self.component(segment, position, index)?;
        let parsed = parse_timestamp(&raw);
        if parsed.is_none() {
            let location = match index {
                1 => format!("{}.{position}", segment.segment_type),
                _ => format!("{}.{position}.{index}", segment.segment_type),
            };
            self.warn(format!("{location}: unparseable timestamp `{raw}`"));
        }
        parsed
    }

    /// A coded element (`code^display^system`, optionally followed by an
    /// alternate triplet) as a codeable concept.
    pub fn codeable_concept(&self, segment: &Segment, position: usize) -> Option<Value> {
        let repetition = self.repetitions(segment, position).next()?;
        let primary = self.coding(repetition, 1);
        let display = self.component_of(repetition, 2);
        let mut codings: Vec<Value> = primary.into_iter().collect();
        codings.extend(self.coding(repetition, 4));
        if codings.is_empty() {
            return None;
        }

        let mut concept = Map::new();
        concept.insert("coding".to_string(), Value::Array(codings));
        if let Some(display) = display {
            concept.insert("text".to_string(), Value::String(display));
        }
        Some(Value::Object(concept))
    }

    /// A single coding from the triplet starting at component `first`.
    fn coding(&self, repetition: &str, first: usize) -> Option<Value> {
        let code = self.component_of(repetition, first);
        let display = self.component_of(repetition, first + 1);
        if code.is_none() && display.is_none() {
            return None;
        }
        let system = self
            .component_of(repetition, first + 2)
            .map(|s| coding_system(&s));

        let mut coding = Map::new();
        insert_some(&mut coding, "system", system);
        insert_some(&mut coding, "code", code);
        insert_some(&mut coding, "display", display);
        Some(Value::Object(coding))
    }
}

/// Well-known legacy coding-system names and their canonical URIs.
fn coding_system(name: &str) -> String {
    match name {
        "LN" => "http://loinc.org",
        "SCT" | "SNM" => "http://snomed.info/sct",
        "CVX" => "http://hl7.org/fhir/sid/cvx",
        "MVX" => "http://hl7.org/fhir/sid/mvx",
        "I10" | "I10C" => "http://hl7.org/fhir/sid/icd-10",
        "I9" | "I9C" => "http://hl7.org/fhir/sid/icd-9-cm",
        "UCUM" => "http://unitsofmeasure.org",
        "NDC" => "http://hl7.org/fhir/sid/ndc",
        other => other,
    }
    .to_string()
}

pub(crate) fn insert_some<V: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<V>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

pub(crate) fn identifier(value: String) -> Value {
    json!([{ "value": value }])
}
