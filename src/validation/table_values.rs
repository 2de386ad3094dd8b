use super::{Severity, ValidationError};
use crate::{
    message::{Message, SegmentType},
    schema::{table_values, Registry},
};
use tracing::instrument;

/// Values outside a field's control table. Sites routinely extend the
/// standard tables with local codes, so these are only warnings.
#[instrument(level = "debug", skip(message, registry))]
pub fn validate_message(message: &Message, registry: &Registry) -> Vec<ValidationError> {
    let mut warnings = Vec::new();
    let separators = &message.separators;

    for (si, segment) in message.segments().enumerate() {
        if segment.segment_type == SegmentType::Msh && si > 0 {
            continue;
        }

        for definition in registry.lookup(&segment.segment_type) {
            let Some(values) = definition.table.and_then(table_values) else {
                continue;
            };
            let Some(raw) = segment.field(definition.position).filter(|v| !v.is_empty()) else {
                continue;
            };

            for repeat in raw.split(separators.repetition) {
                let code = repeat.split(separators.component).next().unwrap_or_default();
                if code.is_empty() || values.iter().any(|v| v.0 == code) {
                    continue;
                }
                warnings.push(ValidationError::new(
                    format!(
                        "{segment}: value `{code}` is not in table {table:04} (field {position}, {name})",
                        segment = segment.segment_type,
                        table = definition.table.unwrap_or_default(),
                        position = definition.position,
                        name = definition.name,
                    ),
                    Severity::Warning,
                ));
            }
        }
    }

    warnings
}
