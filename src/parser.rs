use crate::message::{Message, Segment, SegmentType, Separators};
use thiserror::Error;
use tracing::instrument;

const HEADER: &str = "MSH";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("message is empty")]
    Empty,

    #[error("message must begin with an MSH segment")]
    MissingHeader,

    #[error("unreadable encoding characters: {0}")]
    InvalidEncodingCharacters(String),
}

/// Tokenize a raw message into segments and fields.
///
/// Segments may be terminated by `\r`, `\r\n` or `\n`; blank lines are
/// skipped. The delimiters are read from the header itself before anything
/// else is split. Field values are left raw: component splitting and escape
/// decoding happen later, where the meaning of each field is known.
#[instrument(level = "debug", skip(raw), fields(len = raw.len()))]
pub fn parse(raw: &str) -> Result<Message, ParseError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }
    if !text.starts_with(HEADER) {
        return Err(ParseError::MissingHeader);
    }

    let mut lines = text
        .split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty());
    let header_line = lines.next().ok_or(ParseError::MissingHeader)?;
    let separators = read_separators(header_line)?;

    let mut segments = vec![parse_header(header_line, &separators)];
    segments.extend(lines.map(|line| parse_segment(line, &separators)));
    tracing::trace!(segments = segments.len(), ?separators, "tokenized message");

    Ok(Message::new(separators, segments))
}

fn read_separators(header_line: &str) -> Result<Separators, ParseError> {
    let mut chars = header_line[HEADER.len()..].chars();
    let field = chars.next().ok_or_else(|| {
        ParseError::InvalidEncodingCharacters("missing field separator".to_string())
    })?;
    if field.is_alphanumeric() || field.is_whitespace() {
        return Err(ParseError::InvalidEncodingCharacters(format!(
            "`{field}` cannot be used as a field separator"
        )));
    }

    let block: Vec<char> = chars.take_while(|c| *c != field).collect();
    let &[component, repetition, escape, subcomponent] = block.as_slice() else {
        return Err(ParseError::InvalidEncodingCharacters(format!(
            "expected 4 encoding characters, found {}",
            block.len()
        )));
    };

    let all = [field, component, repetition, escape, subcomponent];
    for (i, c) in all.iter().enumerate() {
        if c.is_alphanumeric() || c.is_whitespace() || all[i + 1..].contains(c) {
            return Err(ParseError::InvalidEncodingCharacters(format!(
                "`{c}` is not a usable delimiter"
            )));
        }
    }

    Ok(Separators {
        field,
        component,
        repetition,
        escape,
        subcomponent,
    })
}

/// Split a line on the field separator, dropping empty trailing fields.
fn split_fields(line: &str, separators: &Separators) -> Vec<String> {
    let mut pieces: Vec<String> = line.split(separators.field).map(str::to_string).collect();
    while pieces.len() > 1 && pieces.last().is_some_and(|p| p.is_empty()) {
        pieces.pop();
    }
    pieces
}

/// `MSH-1` and `MSH-2` are the delimiters themselves, so data starts at
/// position 3.
fn parse_header(line: &str, separators: &Separators) -> Segment {
    let mut segment = Segment::new(SegmentType::Msh);
    for (i, value) in split_fields(line, separators).into_iter().enumerate().skip(2) {
        segment.set_field(i + 1, value);
    }
    segment
}

fn parse_segment(line: &str, separators: &Separators) -> Segment {
    let mut pieces = split_fields(line, separators).into_iter();
    let segment_type = SegmentType::from(pieces.next().unwrap_or_default().as_str());
    let mut segment = Segment::new(segment_type);
    for (i, value) in pieces.enumerate() {
        segment.set_field(i + 1, value);
    }
    segment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageFamily;

    const ADT: &str = "MSH|^~\\&|EPIC|HOSP|LAB|LABFAC|20240101120000||ADT^A01|MSG00001|P|2.5.1\r\
        EVN|A01|20240101120000\r\
        PID|1||12345^^^HOSP^MR||Doe^John^M||19800101|M\r\
        PV1|1|I|W^101^1";

    #[test]
    fn can_parse_header_metadata() {
        let message = parse(ADT).expect("can parse message");
        assert_eq!(message.segment_count(), 4);
        assert_eq!(message.message_type.family, MessageFamily::Admission);
        assert_eq!(message.message_type.event.as_deref(), Some("A01"));
        assert_eq!(message.header.control_id.as_deref(), Some("MSG00001"));
        assert_eq!(message.header.sending_application.as_deref(), Some("EPIC"));
        assert_eq!(message.header.receiving_facility.as_deref(), Some("LABFAC"));
        assert_eq!(message.header.version.as_deref(), Some("2.5.1"));
    }

    #[test]
    fn header_fields_start_at_position_three() {
        let message = parse(ADT).expect("can parse message");
        let msh = message.header_segment().expect("has header");
        assert_eq!(msh.field(1), None);
        assert_eq!(msh.field(2), None);
        assert_eq!(msh.field(3), Some("EPIC"));
        assert_eq!(msh.field(9), Some("ADT^A01"));
    }

    #[test]
    fn other_segments_start_at_position_one() {
        let message = parse(ADT).expect("can parse message");
        let pid = message.first(&SegmentType::Pid).expect("has PID");
        assert_eq!(pid.field(1), Some("1"));
        assert_eq!(pid.field(2), Some(""));
        assert_eq!(pid.field(3), Some("12345^^^HOSP^MR"));
        assert_eq!(pid.field(5), Some("Doe^John^M"));
        assert_eq!(pid.field(9), None);
    }

    #[test]
    fn trailing_empty_fields_are_skipped() {
        let message = parse("MSH|^~\\&|A|B|||||||\rPID|1||||").expect("can parse message");
        assert_eq!(message.header_segment().map(|s| s.last_position()), Some(4));
        let pid = message.first(&SegmentType::Pid).expect("has PID");
        assert_eq!(pid.last_position(), 1);
    }

    #[test]
    fn fails_without_header() {
        assert_eq!(parse("PID|1||12345"), Err(ParseError::MissingHeader));
        assert_eq!(parse("   \r\n "), Err(ParseError::Empty));
        assert_eq!(parse(""), Err(ParseError::Empty));
    }

    #[test]
    fn fails_on_bad_encoding_characters() {
        assert!(matches!(
            parse("MSH|^~|A"),
            Err(ParseError::InvalidEncodingCharacters(_))
        ));
        assert!(matches!(
            parse("MSH|^^\\&|A"),
            Err(ParseError::InvalidEncodingCharacters(_))
        ));
        assert!(matches!(
            parse("MSH"),
            Err(ParseError::InvalidEncodingCharacters(_))
        ));
        assert!(matches!(
            parse("MSHA^~\\&"),
            Err(ParseError::InvalidEncodingCharacters(_))
        ));
    }

    #[test]
    fn honours_declared_delimiters() {
        let message =
            parse("MSH#$*@!#APP#FAC#####ADT$A04#1#P#2.5\rPID#1##99$$$X##Roe$Jane").expect("can parse");
        assert_eq!(message.separators.field, '#');
        assert_eq!(message.separators.component, '$');
        assert_eq!(message.separators.escape, '@');
        assert_eq!(message.message_type.event.as_deref(), Some("A04"));
        let pid = message.first(&SegmentType::Pid).expect("has PID");
        assert_eq!(pid.field(5), Some("Roe$Jane"));
    }

    #[test]
    fn accepts_lenient_newlines() {
        let crlf = ADT.replace('\r', "\r\n");
        let lf = ADT.replace('\r', "\n\n");
        let expected = parse(ADT).expect("can parse");
        assert_eq!(parse(&crlf).expect("can parse crlf"), expected);
        assert_eq!(parse(&lf).expect("can parse lf"), expected);
    }

    #[test]
    fn unknown_message_types_are_retained() {
        let message = parse("MSH|^~\\&|A|B|C|D|20240101120000||QRY^Q01|7|P|2.3")
            .expect("can parse message");
        assert_eq!(
            message.message_type.family,
            MessageFamily::Unknown("QRY".to_string())
        );
        assert_eq!(message.message_type.raw, "QRY^Q01");
    }

    #[test]
    fn round_trips_through_display() {
        let first = parse(ADT).expect("can parse");
        let wire = first.to_string();
        let second = parse(&wire).expect("can reparse");
        assert_eq!(first, second);
        assert_eq!(wire, ADT);
    }
}
