use crate::{
    mapping::{patient_reference, MapContext, MappedResource},
    message::{Message, MessageFamily, Segment, SegmentType},
};
use serde_json::Value;
use thiserror::Error;

mod admission;
mod immunization;
mod order;
mod result;
mod scheduling;

/// Failures local to one message's mapping. These never abort processing of
/// other messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{segment} segment {index} has no preceding ORC")]
    OrphanSegment { segment: SegmentType, index: usize },
    #[error("{family}: message has no {segment} segment to map")]
    MissingSegment {
        family: MessageFamily,
        segment: SegmentType,
    },
    #[error("unexpected repeated {segment} segment")]
    UnexpectedRepeat { segment: SegmentType },
}

/// What a handler produced for one message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerOutput {
    pub event: Option<String>,
    pub description: Option<&'static str>,
    pub resources: Vec<MappedResource>,
    pub warnings: Vec<String>,
}

pub type Handler = fn(&Message) -> Result<HandlerOutput, MappingError>;

/// The handler for a message family, if one is registered.
pub fn handler_for(family: &MessageFamily) -> Option<Handler> {
    match family {
        MessageFamily::Admission => Some(admission::handle as Handler),
        MessageFamily::Order => Some(order::handle as Handler),
        MessageFamily::Result => Some(result::handle as Handler),
        MessageFamily::Scheduling => Some(scheduling::handle as Handler),
        MessageFamily::Immunization => Some(immunization::handle as Handler),
        MessageFamily::Acknowledgment | MessageFamily::Unknown(_) => None,
    }
}

/// The message's event code, from the message type or else `EVN-1`.
fn event_code(message: &Message, ctx: &MapContext) -> Option<String> {
    message.message_type.event.clone().or_else(|| {
        message
            .first(&SegmentType::Evn)
            .and_then(|evn| ctx.component(evn, 1, 1))
    })
}

/// The subject reference shared by every resource in a message.
fn subject(message: &Message, ctx: &MapContext) -> Option<Value> {
    message
        .first(&SegmentType::Pid)
        .and_then(|pid| patient_reference(pid, ctx))
}

/// The first segment of a type the handler cannot work without.
fn require(message: &Message, segment: SegmentType) -> Result<&Segment, MappingError> {
    message
        .first(&segment)
        .ok_or_else(|| MappingError::MissingSegment {
            family: message.message_type.family.clone(),
            segment,
        })
}
