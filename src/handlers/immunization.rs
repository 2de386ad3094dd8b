use super::{event_code, require, subject, HandlerOutput, MappingError};
use crate::{
    mapping::{immunization, MapContext},
    message::{Message, SegmentType},
};
use tracing::{debug, instrument};

/// Every `RXA` → immunization. A route segment applies to the `RXA` it follows.
#[instrument(level = "debug", skip(message), fields(control_id = ?message.header.control_id))]
pub(super) fn handle(message: &Message) -> Result<HandlerOutput, MappingError> {
    let mut ctx = MapContext::new(&message.separators);
    let event = event_code(message, &ctx);
    require(message, SegmentType::Rxa)?;
    let patient = subject(message, &ctx);

    let segments: Vec<_> = message.segments().collect();
    let mut resources = Vec::new();
    for (index, rxa) in segments.iter().enumerate() {
        if rxa.segment_type != SegmentType::Rxa {
            continue;
        }
        let rxr = segments
            .get(index + 1)
            .copied()
            .filter(|s| s.segment_type == SegmentType::Rxr);
        let mut resource = immunization(rxa, rxr, &mut ctx);
        if let Some(patient) = &patient {
            resource.set("patient", patient.clone());
        }
        resources.push(resource);
    }

    debug!(immunizations = resources.len(), "mapped immunization message");
    Ok(HandlerOutput {
        description: match event.as_deref() {
            Some("V04") => Some("unsolicited vaccination record update"),
            _ => None,
        },
        event,
        resources,
        warnings: ctx.into_warnings(),
    })
}
