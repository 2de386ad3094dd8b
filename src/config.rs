use crate::{
    message::SegmentType,
    schema::{DataType, FieldDefinition, Registry, RegistryError, SegmentSchema},
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, instrument, trace};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    #[error("invalid custom segment schema")]
    Registry(#[from] RegistryError),
}

/// How the engine identifies itself in acknowledgments it originates, and
/// the header values it falls back on when the original lacks them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AcknowledgmentConfig {
    pub application: String,
    pub facility: String,
    pub processing_id: String,
    pub version: String,
}

impl Default for AcknowledgmentConfig {
    fn default() -> Self {
        AcknowledgmentConfig {
            application: "HL7-BRIDGE".to_string(),
            facility: String::new(),
            processing_id: "P".to_string(),
            version: "2.5.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub acknowledgment: AcknowledgmentConfig,

    /// How many validation errors a reject acknowledgment quotes.
    pub max_reject_errors: usize,

    /// Custom segment schemas. These replace built-in schemas of the same
    /// segment type.
    pub segments: Vec<SegmentSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            acknowledgment: AcknowledgmentConfig::default(),
            max_reject_errors: 3,
            segments: Vec::new(),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SegmentSpec {
    pub name: SegmentType,
    pub description: Option<String>,
    #[serde_as(as = "HashMap<DisplayFromStr, _>")]
    #[serde(default)]
    pub fields: HashMap<usize, FieldSpec>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub datatype: Option<DataType>,
    pub max_length: Option<usize>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub repeats: bool,
    pub table: Option<u16>,
}

impl SegmentSpec {
    fn schema(&self) -> Result<SegmentSchema, RegistryError> {
        let fields = self
            .fields
            .iter()
            .map(|(&position, spec)| FieldDefinition {
                position,
                name: spec.name.clone(),
                datatype: spec.datatype.unwrap_or(DataType::String),
                max_length: spec.max_length,
                required: spec.required,
                repeats: spec.repeats,
                table: spec.table,
            })
            .collect();
        SegmentSchema::try_new(
            self.name.clone(),
            self.description.clone().unwrap_or_default(),
            fields,
        )
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        trace!(?config, "parsed config");
        Ok(config)
    }

    #[instrument(level = "debug")]
    pub fn load<P: AsRef<Path> + std::fmt::Debug>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Config::parse(&text)
    }

    /// The built-in registry with this config's custom schemas merged in.
    pub fn registry(&self) -> Result<Registry, RegistryError> {
        self.segments.iter().try_fold(Registry::standard(), |registry, spec| {
            debug!(segment = %spec.name, fields = spec.fields.len(), "adding custom segment schema");
            Ok(registry.with_schema(spec.schema()?))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_an_empty_file() {
        let config = Config::parse("").expect("can parse empty config");
        assert_eq!(config, Config::default());
        assert_eq!(config.max_reject_errors, 3);
        assert_eq!(config.acknowledgment.application, "HL7-BRIDGE");
        assert_eq!(config.acknowledgment.processing_id, "P");
    }

    #[test]
    fn custom_segments_extend_the_registry() {
        let config = Config::parse(
            r#"
            max_reject_errors = 5

            [acknowledgment]
            facility = "MAIN"

            [[segments]]
            name = "ZPI"
            description = "Local patient extras"

            [segments.fields.1]
            name = "Set ID"
            datatype = "SI"
            required = true

            [segments.fields.2]
            name = "Pet Name"
            max_length = 20
            repeats = true
            "#,
        )
        .expect("can parse config");
        assert_eq!(config.max_reject_errors, 5);
        assert_eq!(config.acknowledgment.facility, "MAIN");
        assert_eq!(config.acknowledgment.application, "HL7-BRIDGE");

        let registry = config.registry().expect("can build registry");
        let zpi = SegmentType::from("ZPI");
        let fields = registry.lookup(&zpi);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].datatype, DataType::SequenceId);
        assert!(fields[0].required);
        assert_eq!(fields[1].datatype, DataType::String);
        assert_eq!(fields[1].max_length, Some(20));
        assert!(fields[1].repeats);
        assert_eq!(registry.segment_description(&zpi), "Local patient extras");
        assert!(!registry.lookup(&SegmentType::Pid).is_empty());
    }

    #[test]
    fn custom_segments_replace_built_in_ones() {
        let config = Config::parse(
            r#"
            [[segments]]
            name = "PID"
            [segments.fields.3]
            name = "Local MRN"
            "#,
        )
        .expect("can parse config");
        let registry = config.registry().expect("can build registry");
        assert_eq!(registry.lookup(&SegmentType::Pid).len(), 1);
    }

    #[test]
    fn rejects_position_zero_and_bad_types() {
        let config = Config::parse(
            r#"
            [[segments]]
            name = "ZZZ"
            [segments.fields.0]
            name = "Nope"
            "#,
        )
        .expect("can parse config");
        assert_eq!(
            config.registry().map(|_| ()),
            Err(RegistryError::ReservedPosition {
                segment: SegmentType::from("ZZZ")
            })
        );

        let bad = Config::parse(
            r#"
            [[segments]]
            name = "ZZZ"
            [segments.fields.1]
            name = "Bad"
            datatype = "NOPE"
            "#,
        );
        assert!(matches!(bad, Err(ConfigError::Parse(_))));
    }
}
