use super::{Severity, ValidationError};
use crate::message::{Message, MessageFamily, SegmentType};
use tracing::instrument;

/// Segments a message family can't be processed without.
pub fn required_segments(family: &MessageFamily) -> Vec<SegmentType> {
    match family {
        MessageFamily::Admission => vec![SegmentType::Pid],
        MessageFamily::Order => vec![SegmentType::Orc],
        MessageFamily::Result => vec![SegmentType::Obx],
        MessageFamily::Scheduling => vec![SegmentType::Sch],
        MessageFamily::Immunization => vec![SegmentType::Rxa],
        MessageFamily::Acknowledgment | MessageFamily::Unknown(_) => Vec::new(),
    }
}

#[instrument(level = "debug", skip(message))]
pub fn validate_header(message: &Message) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if message.header_segment().is_none() {
        errors.push(ValidationError::new(
            "MSH: missing required segment (message header)".to_string(),
            Severity::Error,
        ));
    }

    for (si, segment) in message.segments().enumerate().skip(1) {
        if segment.segment_type == SegmentType::Msh {
            errors.push(ValidationError::new(
                format!("MSH: header segment must be first (segment {})", si + 1),
                Severity::Error,
            ));
        }
    }
    errors
}

#[instrument(level = "debug", skip(message))]
pub fn validate_family(message: &Message) -> Vec<ValidationError> {
    let family = &message.message_type.family;
    required_segments(family)
        .into_iter()
        .filter(|segment_type| !message.has_segment(segment_type))
        .map(|segment_type| {
            ValidationError::new(
                format!("{family}: missing required segment {segment_type}"),
                Severity::Error,
            )
        })
        .collect()
}

pub fn validate_segment_ids(message: &Message) -> Vec<ValidationError> {
    message
        .segments()
        .enumerate()
        .filter(|(_, segment)| !segment.segment_type.is_well_formed())
        .map(|(si, segment)| {
            ValidationError::new(
                format!(
                    "segment identifier `{}` is not three upper-case letters or digits (segment {})",
                    segment.segment_type,
                    si + 1
                ),
                Severity::Warning,
            )
        })
        .collect()
}
