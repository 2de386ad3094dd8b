use crate::{
    config::AcknowledgmentConfig,
    message::{Message, Segment, SegmentType, Separators},
};
use rand::distributions::{Alphanumeric, DistString};
use serde_with::SerializeDisplay;
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay)]
pub enum AckCode {
    Accept,
    ApplicationError,
    Reject,
}

impl AckCode {
    pub fn code(&self) -> &'static str {
        match self {
            AckCode::Accept => "AA",
            AckCode::ApplicationError => "AE",
            AckCode::Reject => "AR",
        }
    }
}

impl fmt::Display for AckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A fresh control id for an outgoing message.
pub fn generate_control_id() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), 20)
}

fn now() -> String {
    chrono::Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// Builds acknowledgment wire messages on behalf of this engine.
#[derive(Debug, Clone, Default)]
pub struct Acknowledger {
    identity: AcknowledgmentConfig,
}

impl Acknowledger {
    pub fn new(identity: AcknowledgmentConfig) -> Self {
        Acknowledger { identity }
    }

    /// Answer `original`: sender and receiver swap places, the acknowledgment
    /// gets its own control id, and `MSA-2` echoes the original's control id.
    ///
    /// A message without a control id cannot be correlated, so it gets the
    /// [`Acknowledger::fallback`] instead.
    pub fn build(&self, original: &Message, code: AckCode, text: &str) -> String {
        let header = &original.header;
        let Some(control_id) = header.control_id.as_deref() else {
            return self.fallback(text);
        };
        let separators = original.separators;

        let message_type = match &original.message_type.event {
            Some(event) => format!(
                "ACK{c}{event}{c}ACK",
                c = separators.component
            ),
            None => "ACK".to_string(),
        };

        let mut msh = Segment::new(SegmentType::Msh);
        msh.set_field(
            3,
            header
                .receiving_application
                .clone()
                .unwrap_or_else(|| separators.encode(&self.identity.application)),
        );
        msh.set_field(
            4,
            header
                .receiving_facility
                .clone()
                .unwrap_or_else(|| separators.encode(&self.identity.facility)),
        );
        msh.set_field(5, header.sending_application.clone().unwrap_or_default());
        msh.set_field(6, header.sending_facility.clone().unwrap_or_default());
        msh.set_field(7, now());
        msh.set_field(9, message_type);
        msh.set_field(10, generate_control_id());
        msh.set_field(
            11,
            header
                .processing_id
                .clone()
                .unwrap_or_else(|| self.identity.processing_id.clone()),
        );
        msh.set_field(
            12,
            header
                .version
                .clone()
                .unwrap_or_else(|| self.identity.version.clone()),
        );

        let msa = acknowledgment_segment(&separators, code, control_id, text);
        trace!(%code, control_id, "built acknowledgment");
        Message::new(separators, vec![msh, msa]).to_string()
    }

    /// An application-error acknowledgment for input that could not be read
    /// far enough to correlate. Never fails.
    pub fn fallback(&self, text: &str) -> String {
        let separators = Separators::default();
        let mut msh = Segment::new(SegmentType::Msh);
        msh.set_field(3, separators.encode(&self.identity.application));
        msh.set_field(4, separators.encode(&self.identity.facility));
        msh.set_field(7, now());
        msh.set_field(9, "ACK");
        msh.set_field(10, generate_control_id());
        msh.set_field(11, separators.encode(&self.identity.processing_id));
        msh.set_field(12, separators.encode(&self.identity.version));

        let msa = acknowledgment_segment(&separators, AckCode::ApplicationError, "", text);
        Message::new(separators, vec![msh, msa]).to_string()
    }
}

fn acknowledgment_segment(
    separators: &Separators,
    code: AckCode,
    control_id: &str,
    text: &str,
) -> Segment {
    let mut msa = Segment::new(SegmentType::Msa);
    msa.set_field(1, code.code());
    msa.set_field(2, control_id);
    if !text.is_empty() {
        msa.set_field(3, separators.encode(text));
    }
    msa
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const ADT: &str = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00001|P|2.5.1\r\
                       PID|1||12345";

    fn field(message: &Message, segment: SegmentType, position: usize) -> Option<String> {
        message
            .first(&segment)
            .and_then(|s| s.field(position))
            .map(str::to_string)
    }

    #[test]
    fn swaps_sender_and_receiver() {
        let original = parse(ADT).expect("can parse message");
        let ack = Acknowledger::default().build(&original, AckCode::Accept, "");
        let ack = parse(&ack).expect("can parse acknowledgment");

        assert_eq!(ack.header.sending_application.as_deref(), Some("LAB"));
        assert_eq!(ack.header.sending_facility.as_deref(), Some("LABFAC"));
        assert_eq!(ack.header.receiving_application.as_deref(), Some("EPIC"));
        assert_eq!(ack.header.receiving_facility.as_deref(), Some("HOSP"));
        assert_eq!(ack.message_type.raw, "ACK^A01^ACK");
        assert_eq!(ack.header.processing_id.as_deref(), Some("P"));
        assert_eq!(ack.header.version.as_deref(), Some("2.5.1"));

        let control_id = ack.header.control_id.expect("has a control id");
        assert_eq!(control_id.len(), 20);
        assert_ne!(control_id, "MSG00001");
        assert_eq!(ack.header.timestamp.map(|t| t.len()), Some(14));
    }

    #[test]
    fn echoes_the_original_control_id() {
        let original = parse(ADT).expect("can parse message");
        let ack = Acknowledger::default().build(&original, AckCode::Reject, "bad | text");
        assert!(ack.split('\r').nth(1).is_some_and(|msa| msa.starts_with("MSA|AR|MSG00001|")));

        let ack = parse(&ack).expect("can parse acknowledgment");
        assert_eq!(field(&ack, SegmentType::Msa, 2).as_deref(), Some("MSG00001"));
        assert_eq!(field(&ack, SegmentType::Msa, 3).as_deref(), Some(r"bad \F\ text"));
    }

    #[test]
    fn keeps_the_original_delimiters() {
        let original = parse("MSH#*@!%#A#B#C#D#20240101120000##ADT*A08#42#T#2.3")
            .expect("can parse message");
        let ack = Acknowledger::default().build(&original, AckCode::Accept, "");
        assert!(ack.starts_with("MSH#*@!%#C#D#A#B#"));
        assert!(ack.contains("#ACK*A08*ACK#"));
        assert!(ack.ends_with("\rMSA#AA#42"));
    }

    #[test]
    fn uncorrelated_messages_fall_back() {
        let original = parse("MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01")
            .expect("can parse message");
        let acknowledger = Acknowledger::new(AcknowledgmentConfig {
            application: "BRIDGE".to_string(),
            facility: "MAIN".to_string(),
            ..AcknowledgmentConfig::default()
        });
        let ack = acknowledger.build(&original, AckCode::Accept, "no control id");
        let ack = parse(&ack).expect("can parse fallback");
        assert_eq!(ack.message_type.raw, "ACK");
        assert_eq!(ack.header.sending_application.as_deref(), Some("BRIDGE"));
        assert_eq!(ack.header.sending_facility.as_deref(), Some("MAIN"));
        assert_eq!(field(&ack, SegmentType::Msa, 1).as_deref(), Some("AE"));
        assert_eq!(field(&ack, SegmentType::Msa, 2).as_deref(), Some(""));
        assert_eq!(field(&ack, SegmentType::Msa, 3).as_deref(), Some("no control id"));
    }

    #[test]
    fn fallback_tolerates_any_text() {
        let acknowledger = Acknowledger::default();
        for text in ["", "|^~\\&\r\n", "ünïcødé"] {
            let ack = acknowledger.fallback(text);
            assert!(ack.starts_with("MSH|^~\\&|HL7-BRIDGE|"));
            assert!(parse(&ack).is_ok());
        }
    }
}
