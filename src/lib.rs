pub mod ack;
pub mod batch;
pub mod config;
pub mod engine;
pub mod handlers;
pub mod mapping;
pub mod message;
pub mod parser;
pub mod schema;
pub mod validation;

pub use ack::{AckCode, Acknowledger};
pub use config::{Config, ConfigError};
pub use engine::{Engine, ProcessingResult, Status};
pub use handlers::MappingError;
pub use mapping::{MappedResource, ResourceKind};
pub use message::{Message, MessageFamily, MessageType, Segment, SegmentType, Separators};
pub use parser::{parse, ParseError};
pub use schema::{validate_value, FieldDefinition, Registry, RegistryError};
pub use validation::{validate, ValidationResult};
