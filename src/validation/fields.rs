use super::{Severity, ValidationError};
use crate::{
    message::{Message, SegmentType},
    schema::{check_value, Registry, ValueProblem},
};
use tracing::instrument;

/// Required-field, length and data type checks for every segment that has a
/// schema. Repeating fields are checked one repetition at a time.
#[instrument(level = "debug", skip(message, registry))]
pub fn validate_message(message: &Message, registry: &Registry) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (si, segment) in message.segments().enumerate() {
        let is_header = segment.segment_type == SegmentType::Msh;
        if is_header && si > 0 {
            // reported by the structure rules
            continue;
        }

        for definition in registry.lookup(&segment.segment_type) {
            if is_header && definition.position <= 2 {
                continue;
            }

            let raw = segment.field(definition.position).unwrap_or_default();
            let problems: Vec<ValueProblem> = if raw.is_empty() {
                check_value(definition, raw).err().into_iter().collect()
            } else if definition.repeats {
                raw.split(message.separators.repetition)
                    .filter(|repeat| !repeat.is_empty())
                    .filter_map(|repeat| check_value(definition, repeat).err())
                    .collect()
            } else {
                check_value(definition, raw).err().into_iter().collect()
            };

            for problem in problems {
                errors.push(ValidationError::new(
                    format!(
                        "{segment}: {problem} (field {position}, {name})",
                        segment = segment.segment_type,
                        position = definition.position,
                        name = definition.name,
                    ),
                    Severity::Error,
                ));
            }
        }
    }

    errors
}
