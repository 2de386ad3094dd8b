use crate::message::SegmentType;
use serde::Serialize;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{collections::HashMap, fmt, str::FromStr};
use thiserror::Error;

mod segments;
mod tables;

pub use tables::table_values;

/// The value shapes the validator and the describe command understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum DataType {
    String,
    Text,
    Numeric,
    SequenceId,
    Coded,
    CodedElement,
    Date,
    Time,
    Timestamp,
    PersonName,
    Address,
    ExtendedId,
    Phone,
    Composite,
    /// Type decided by another field, e.g. `OBX-5` by `OBX-2`.
    Varies,
}

impl DataType {
    pub fn code(&self) -> &'static str {
        match self {
            DataType::String => "ST",
            DataType::Text => "TX",
            DataType::Numeric => "NM",
            DataType::SequenceId => "SI",
            DataType::Coded => "ID",
            DataType::CodedElement => "CWE",
            DataType::Date => "DT",
            DataType::Time => "TM",
            DataType::Timestamp => "TS",
            DataType::PersonName => "XPN",
            DataType::Address => "XAD",
            DataType::ExtendedId => "CX",
            DataType::Phone => "XTN",
            DataType::Composite => "CM",
            DataType::Varies => "VARIES",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DataType::String => "String Data",
            DataType::Text => "Text Data",
            DataType::Numeric => "Numeric",
            DataType::SequenceId => "Sequence ID",
            DataType::Coded => "Coded Value",
            DataType::CodedElement => "Coded With Exceptions",
            DataType::Date => "Date",
            DataType::Time => "Time",
            DataType::Timestamp => "Time Stamp",
            DataType::PersonName => "Extended Person Name",
            DataType::Address => "Extended Address",
            DataType::ExtendedId => "Extended Composite ID",
            DataType::Phone => "Extended Telecommunication Number",
            DataType::Composite => "Composite",
            DataType::Varies => "Varies",
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            DataType::CodedElement
                | DataType::PersonName
                | DataType::Address
                | DataType::ExtendedId
                | DataType::Phone
                | DataType::Composite
        )
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let datatype = match s.to_ascii_uppercase().as_str() {
            "ST" => DataType::String,
            "TX" | "FT" => DataType::Text,
            "NM" => DataType::Numeric,
            "SI" => DataType::SequenceId,
            "ID" | "IS" => DataType::Coded,
            "CE" | "CWE" | "CNE" => DataType::CodedElement,
            "DT" => DataType::Date,
            "TM" => DataType::Time,
            "TS" | "DTM" => DataType::Timestamp,
            "XPN" => DataType::PersonName,
            "XAD" => DataType::Address,
            "CX" => DataType::ExtendedId,
            "XTN" => DataType::Phone,
            "CM" | "HD" | "EI" | "PL" | "XCN" | "XON" | "MSG" | "PT" | "VID" | "TQ" | "CQ"
            | "ELD" | "ERL" => DataType::Composite,
            "VARIES" | "*" => DataType::Varies,
            other => return Err(format!("unknown data type `{other}`")),
        };
        Ok(datatype)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub position: usize,
    pub name: String,
    pub datatype: DataType,
    pub max_length: Option<usize>,
    pub required: bool,
    pub repeats: bool,
    pub table: Option<u16>,
}

impl FieldDefinition {
    pub fn new<S: Into<String>>(position: usize, name: S, datatype: DataType) -> Self {
        FieldDefinition {
            position,
            name: name.into(),
            datatype,
            max_length: None,
            required: false,
            repeats: false,
            table: None,
        }
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn repeating(mut self) -> Self {
        self.repeats = true;
        self
    }

    pub fn table(mut self, table: u16) -> Self {
        self.table = Some(table);
        self
    }
}

/// Why a single value failed [`check_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueProblem {
    Missing,
    TooLong { max: usize, actual: usize },
    InvalidFormat { expected: &'static str, value: String },
}

impl fmt::Display for ValueProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueProblem::Missing => write!(f, "missing required field"),
            ValueProblem::TooLong { max, actual } => {
                write!(f, "value too long ({actual} > {max})")
            }
            ValueProblem::InvalidFormat { expected, value } => {
                write!(f, "invalid {expected} `{value}`")
            }
        }
    }
}

/// Check one raw value (a single repetition) against its definition.
///
/// Empty values pass unless the field is required. Composite values are only
/// length-checked; their components are not typed.
pub fn check_value(definition: &FieldDefinition, raw: &str) -> Result<(), ValueProblem> {
    if raw.is_empty() {
        return if definition.required {
            Err(ValueProblem::Missing)
        } else {
            Ok(())
        };
    }

    if let Some(max) = definition.max_length {
        let actual = raw.chars().count();
        if actual > max {
            return Err(ValueProblem::TooLong { max, actual });
        }
    }

    if definition.datatype.is_composite() {
        return Ok(());
    }

    let expected = match definition.datatype {
        DataType::Numeric if !is_signed_decimal(raw) => "number",
        DataType::SequenceId if !is_digits(raw, None) => "sequence id",
        DataType::Date if !is_digits(raw, Some(8)) => "date",
        DataType::Time if !is_digits(raw, Some(6)) => "time",
        DataType::Timestamp if !is_digits(raw, Some(14)) => "timestamp",
        _ => return Ok(()),
    };
    Err(ValueProblem::InvalidFormat {
        expected,
        value: raw.to_string(),
    })
}

pub fn validate_value(definition: &FieldDefinition, raw: &str) -> bool {
    check_value(definition, raw).is_ok()
}

fn is_digits(value: &str, len: Option<usize>) -> bool {
    !value.is_empty()
        && len.map(|len| value.len() == len).unwrap_or(true)
        && value.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn is_signed_decimal(value: &str) -> bool {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    (!whole.is_empty() || !fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{segment}: field position 0 is reserved for the segment identifier")]
    ReservedPosition { segment: SegmentType },

    #[error("{segment}: field position {position} is defined more than once")]
    DuplicatePosition {
        segment: SegmentType,
        position: usize,
    },
}

/// The field layout of one segment type, ordered by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSchema {
    pub segment_type: SegmentType,
    pub description: String,
    fields: Vec<FieldDefinition>,
}

impl SegmentSchema {
    /// Build a schema, rejecting position 0 and duplicated positions.
    pub fn try_new<S: Into<String>>(
        segment_type: SegmentType,
        description: S,
        mut fields: Vec<FieldDefinition>,
    ) -> Result<Self, RegistryError> {
        fields.sort_by_key(|f| f.position);
        if fields.first().is_some_and(|f| f.position == 0) {
            return Err(RegistryError::ReservedPosition {
                segment: segment_type,
            });
        }
        if let Some(pair) = fields.windows(2).find(|w| w[0].position == w[1].position) {
            return Err(RegistryError::DuplicatePosition {
                position: pair[0].position,
                segment: segment_type,
            });
        }
        Ok(SegmentSchema {
            segment_type,
            description: description.into(),
            fields,
        })
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn field(&self, position: usize) -> Option<&FieldDefinition> {
        self.fields
            .binary_search_by_key(&position, |f| f.position)
            .ok()
            .map(|i| &self.fields[i])
    }
}

/// Per-segment field schemas. Built once, then only read.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    schemas: HashMap<SegmentType, SegmentSchema>,
}

impl Registry {
    /// The built-in schemas for every segment the engine maps or routinely
    /// sees alongside them.
    pub fn standard() -> Self {
        segments::standard()
            .into_iter()
            .fold(Registry::default(), Registry::with_schema)
    }

    /// Add a schema, replacing any existing schema for the same segment type.
    pub fn with_schema(mut self, schema: SegmentSchema) -> Self {
        self.schemas.insert(schema.segment_type.clone(), schema);
        self
    }

    /// The field definitions for a segment type, empty when there is no
    /// schema for it.
    pub fn lookup(&self, segment_type: &SegmentType) -> &[FieldDefinition] {
        self.schemas
            .get(segment_type)
            .map(|s| s.fields())
            .unwrap_or_default()
    }

    pub fn schema(&self, segment_type: &SegmentType) -> Option<&SegmentSchema> {
        self.schemas.get(segment_type)
    }

    pub fn segment_description(&self, segment_type: &SegmentType) -> String {
        self.schema(segment_type)
            .map(|s| s.description.clone())
            .unwrap_or_else(|| "Unknown segment".to_string())
    }

    pub fn describe_field(&self, segment_type: &SegmentType, position: usize) -> String {
        let Some(schema) = self.schema(segment_type) else {
            return "Unknown segment".to_string();
        };
        let Some(f) = schema.field(position) else {
            return "Unknown field".to_string();
        };

        let repeat = if f.repeats { "∞" } else { "1" };
        let optional = if f.required {
            "*required*"
        } else {
            "*optional*"
        };
        let table = f
            .table
            .and_then(|t| {
                table_values(t).map(|values| {
                    let mut values = values
                        .iter()
                        .map(|(code, description)| format!("    `{code}` ({description})"))
                        .collect::<Vec<String>>();
                    values.sort();
                    format!("\n  Table {t:04} values:\n{}", values.join("\n"))
                })
            })
            .unwrap_or_default();

        format!(
            "{name}, len: {len} ({datatype}) [{optional}/{repeat}]{table}",
            name = f.name,
            len = f
                .max_length
                .map(|l| l.to_string())
                .unwrap_or_else(|| "∞".to_string()),
            datatype = f.datatype.description(),
        )
    }
}
