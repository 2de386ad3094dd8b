use super::{event_code, require, subject, HandlerOutput, MappingError};
use crate::{
    mapping::{appointment, MapContext},
    message::{Message, SegmentType},
};
use serde_json::json;
use tracing::{debug, instrument};

fn describe(event: &str) -> Option<&'static str> {
    let description = match event {
        "S12" => "notification of new appointment booking",
        "S13" => "notification of appointment rescheduling",
        "S14" => "notification of appointment modification",
        "S15" => "notification of appointment cancellation",
        "S17" => "notification of appointment deletion",
        "S26" => "notification that patient did not show up",
        _ => return None,
    };
    Some(description)
}

/// `SCH` with its first `AIS` → appointment. Cancellations and deletions
/// override whatever status the filler sent.
#[instrument(level = "debug", skip(message), fields(control_id = ?message.header.control_id))]
pub(super) fn handle(message: &Message) -> Result<HandlerOutput, MappingError> {
    let mut ctx = MapContext::new(&message.separators);
    let event = event_code(message, &ctx);
    let sch = require(message, SegmentType::Sch)?;
    let ais = message.first(&SegmentType::Ais);

    let mut booking = appointment(sch, ais, &mut ctx);
    match event.as_deref() {
        Some("S15" | "S17") => booking.set("status", "cancelled"),
        Some("S26") => booking.set("status", "noshow"),
        _ => {}
    }
    if let Some(patient) = subject(message, &ctx) {
        booking.set(
            "participant",
            json!([{ "actor": patient, "status": "accepted" }]),
        );
    }

    debug!(?event, "mapped scheduling message");
    Ok(HandlerOutput {
        description: event.as_deref().and_then(describe),
        event,
        resources: vec![booking],
        warnings: ctx.into_warnings(),
    })
}
