use super::{event_code, require, subject, HandlerOutput, MappingError};
use crate::{
    mapping::{order, MapContext},
    message::{Message, Segment, SegmentType},
};
use tracing::{debug, instrument};

/// Pairs each `OBR` with the `ORC` before it. An `ORC` with no request of its
/// own still yields an order.
#[instrument(level = "debug", skip(message), fields(control_id = ?message.header.control_id))]
pub(super) fn handle(message: &Message) -> Result<HandlerOutput, MappingError> {
    let mut ctx = MapContext::new(&message.separators);
    let event = event_code(message, &ctx);
    require(message, SegmentType::Orc)?;
    let subject = subject(message, &ctx);

    let mut resources = Vec::new();
    let mut current: Option<&Segment> = None;
    let mut unpaired: Option<&Segment> = None;
    for (index, segment) in message.segments().enumerate() {
        match segment.segment_type {
            SegmentType::Orc => {
                if let Some(orc) = unpaired.take() {
                    resources.push(order(orc, None, &mut ctx));
                }
                current = Some(segment);
                unpaired = Some(segment);
            }
            SegmentType::Obr => {
                let orc = current.ok_or(MappingError::OrphanSegment {
                    segment: SegmentType::Obr,
                    index,
                })?;
                unpaired = None;
                resources.push(order(orc, Some(segment), &mut ctx));
            }
            _ => {}
        }
    }
    if let Some(orc) = unpaired {
        resources.push(order(orc, None, &mut ctx));
    }

    if let Some(subject) = subject {
        for resource in &mut resources {
            resource.set("subject", subject.clone());
        }
    }

    debug!(orders = resources.len(), "mapped order message");
    Ok(HandlerOutput {
        description: event.as_deref().and_then(describe),
        event,
        resources,
        warnings: ctx.into_warnings(),
    })
}

fn describe(event: &str) -> Option<&'static str> {
    match event {
        "O01" => Some("general order message"),
        "O21" => Some("laboratory order"),
        _ => None,
    }
}
