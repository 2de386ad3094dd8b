use serde::Serialize;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{convert::Infallible, fmt, str::FromStr};

/// The segment identifiers this engine knows about. Anything else (including
/// site-specific `Z` segments) is carried verbatim as [`SegmentType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum SegmentType {
    Msh,
    Evn,
    Pid,
    Pd1,
    Nk1,
    Pv1,
    Pv2,
    Al1,
    Dg1,
    Orc,
    Obr,
    Obx,
    Nte,
    Sch,
    Ais,
    Rxa,
    Rxr,
    Msa,
    Err,
    Other(String),
}

impl SegmentType {
    pub fn as_str(&self) -> &str {
        match self {
            SegmentType::Msh => "MSH",
            SegmentType::Evn => "EVN",
            SegmentType::Pid => "PID",
            SegmentType::Pd1 => "PD1",
            SegmentType::Nk1 => "NK1",
            SegmentType::Pv1 => "PV1",
            SegmentType::Pv2 => "PV2",
            SegmentType::Al1 => "AL1",
            SegmentType::Dg1 => "DG1",
            SegmentType::Orc => "ORC",
            SegmentType::Obr => "OBR",
            SegmentType::Obx => "OBX",
            SegmentType::Nte => "NTE",
            SegmentType::Sch => "SCH",
            SegmentType::Ais => "AIS",
            SegmentType::Rxa => "RXA",
            SegmentType::Rxr => "RXR",
            SegmentType::Msa => "MSA",
            SegmentType::Err => "ERR",
            SegmentType::Other(name) => name.as_str(),
        }
    }

    /// Whether the identifier looks like a real segment id: three upper-case
    /// ASCII letters or digits.
    pub fn is_well_formed(&self) -> bool {
        let name = self.as_str();
        name.len() == 3
            && name
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }
}

impl From<&str> for SegmentType {
    fn from(value: &str) -> Self {
        match value {
            "MSH" => SegmentType::Msh,
            "EVN" => SegmentType::Evn,
            "PID" => SegmentType::Pid,
            "PD1" => SegmentType::Pd1,
            "NK1" => SegmentType::Nk1,
            "PV1" => SegmentType::Pv1,
            "PV2" => SegmentType::Pv2,
            "AL1" => SegmentType::Al1,
            "DG1" => SegmentType::Dg1,
            "ORC" => SegmentType::Orc,
            "OBR" => SegmentType::Obr,
            "OBX" => SegmentType::Obx,
            "NTE" => SegmentType::Nte,
            "SCH" => SegmentType::Sch,
            "AIS" => SegmentType::Ais,
            "RXA" => SegmentType::Rxa,
            "RXR" => SegmentType::Rxr,
            "MSA" => SegmentType::Msa,
            "ERR" => SegmentType::Err,
            other => SegmentType::Other(other.to_string()),
        }
    }
}

impl FromStr for SegmentType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        Ok(s.into())
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The delimiter set declared by a message in `MSH-1` and `MSH-2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Separators {
    pub field: char,
    pub component: char,
    pub repetition: char,
    pub escape: char,
    pub subcomponent: char,
}

impl Default for Separators {
    fn default() -> Self {
        Separators {
            field: '|',
            component: '^',
            repetition: '~',
            escape: '\\',
            subcomponent: '&',
        }
    }
}

impl Separators {
    /// The `MSH-2` block, in wire order.
    pub fn encoding_characters(&self) -> String {
        [self.component, self.repetition, self.escape, self.subcomponent]
            .iter()
            .collect()
    }

    /// Escape any delimiter characters in `text` so it can be placed inside a
    /// single field. Line breaks are escaped too, since a bare carriage
    /// return would end the segment.
    pub fn encode(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            let code = if c == self.escape {
                "E"
            } else if c == self.field {
                "F"
            } else if c == self.component {
                "S"
            } else if c == self.subcomponent {
                "T"
            } else if c == self.repetition {
                "R"
            } else if c == '\n' {
                ".br"
            } else if c == '\r' {
                "X0D"
            } else {
                out.push(c);
                continue;
            };
            out.push(self.escape);
            out.push_str(code);
            out.push(self.escape);
        }
        out
    }

    /// Resolve escape sequences. Sequences that aren't understood, and
    /// unterminated ones, are left as-is.
    pub fn decode(&self, text: &str) -> String {
        if !text.contains(self.escape) {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(self.escape) {
            out.push_str(&rest[..start]);
            let after = &rest[start + self.escape.len_utf8()..];
            let Some(end) = after.find(self.escape) else {
                out.push_str(&rest[start..]);
                return out;
            };
            let sequence = &after[..end];
            match sequence {
                "F" => out.push(self.field),
                "S" => out.push(self.component),
                "T" => out.push(self.subcomponent),
                "R" => out.push(self.repetition),
                "E" => out.push(self.escape),
                ".br" => out.push('\n'),
                _ => match sequence.strip_prefix('X').and_then(hex_text) {
                    Some(text) => out.push_str(&text),
                    None => {
                        out.push(self.escape);
                        out.push_str(sequence);
                        out.push(self.escape);
                    }
                },
            }
            rest = &after[end + self.escape.len_utf8()..];
        }
        out.push_str(rest);
        out
    }
}

/// The text of a `\Xhh..\` escape, when it spells valid UTF-8.
fn hex_text(hex: &str) -> Option<String> {
    if hex.is_empty() || hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }
    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

/// One line of a message. Field values are stored raw (no component
/// splitting, no unescaping) and indexed by their 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub segment_type: SegmentType,
    fields: Vec<Option<String>>,
}

impl Segment {
    pub fn new(segment_type: SegmentType) -> Self {
        Segment {
            segment_type,
            fields: Vec::new(),
        }
    }

    /// The raw value at `position`, if one was set. Position 0 is the segment
    /// identifier and never holds data.
    pub fn field(&self, position: usize) -> Option<&str> {
        if position == 0 {
            return None;
        }
        self.fields
            .get(position - 1)
            .and_then(|f| f.as_deref())
    }

    /// Set the raw value at `position`. Position 0 is ignored.
    pub fn set_field<S: Into<String>>(&mut self, position: usize, value: S) {
        if position == 0 {
            return;
        }
        if self.fields.len() < position {
            self.fields.resize(position, None);
        }
        self.fields[position - 1] = Some(value.into());
    }

    /// The highest position holding a value, or 0 for an empty segment.
    pub fn last_position(&self) -> usize {
        self.fields
            .iter()
            .rposition(|f| f.is_some())
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Every set field as `(position, raw value)`, in position order.
    pub fn fields(&self) -> impl Iterator<Item = (usize, &str)> {
        self.fields
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.as_deref().map(|f| (i + 1, f)))
    }
}

/// The broad purpose of a message, from the first component of `MSH-9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageFamily {
    Admission,
    Order,
    Result,
    Scheduling,
    Immunization,
    Acknowledgment,
    /// A type code this engine doesn't recognise, kept verbatim.
    Unknown(String),
}

impl MessageFamily {
    pub fn from_code(code: &str) -> Self {
        match code {
            "ADT" => MessageFamily::Admission,
            "ORM" | "OML" => MessageFamily::Order,
            "ORU" => MessageFamily::Result,
            "SIU" => MessageFamily::Scheduling,
            "VXU" => MessageFamily::Immunization,
            "ACK" => MessageFamily::Acknowledgment,
            other => MessageFamily::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for MessageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageFamily::Admission => write!(f, "ADT"),
            MessageFamily::Order => write!(f, "ORM"),
            MessageFamily::Result => write!(f, "ORU"),
            MessageFamily::Scheduling => write!(f, "SIU"),
            MessageFamily::Immunization => write!(f, "VXU"),
            MessageFamily::Acknowledgment => write!(f, "ACK"),
            MessageFamily::Unknown(code) => write!(f, "{code}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageType {
    pub family: MessageFamily,
    pub event: Option<String>,
    /// `MSH-9` exactly as received.
    pub raw: String,
}

impl MessageType {
    pub fn parse(raw: &str, separators: &Separators) -> Self {
        let mut components = raw.split(separators.component);
        let family = MessageFamily::from_code(components.next().unwrap_or_default());
        let event = components
            .next()
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        MessageType {
            family,
            event,
            raw: raw.to_string(),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Routing and correlation values read from fixed `MSH` positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Header {
    pub sending_application: Option<String>,
    pub sending_facility: Option<String>,
    pub receiving_application: Option<String>,
    pub receiving_facility: Option<String>,
    pub timestamp: Option<String>,
    pub control_id: Option<String>,
    pub processing_id: Option<String>,
    pub version: Option<String>,
}

impl Header {
    fn from_segment(msh: &Segment) -> Self {
        let read = |position| {
            msh.field(position)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Header {
            sending_application: read(3),
            sending_facility: read(4),
            receiving_application: read(5),
            receiving_facility: read(6),
            timestamp: read(7),
            control_id: read(10),
            processing_id: read(11),
            version: read(12),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub separators: Separators,
    pub message_type: MessageType,
    pub header: Header,
    segments: Vec<Segment>,
}

impl Message {
    /// Assemble a message, reading the type and header metadata from the
    /// first segment when it is an `MSH`.
    pub fn new(separators: Separators, segments: Vec<Segment>) -> Self {
        let msh = segments
            .first()
            .filter(|s| s.segment_type == SegmentType::Msh);
        let header = msh.map(Header::from_segment).unwrap_or_default();
        let message_type = MessageType::parse(
            msh.and_then(|s| s.field(9)).unwrap_or_default(),
            &separators,
        );
        Message {
            separators,
            message_type,
            header,
            segments,
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// All segments of one type, in message order.
    pub fn segments_of<'m>(
        &'m self,
        segment_type: &'m SegmentType,
    ) -> impl Iterator<Item = &'m Segment> {
        self.segments
            .iter()
            .filter(move |s| &s.segment_type == segment_type)
    }

    pub fn first(&self, segment_type: &SegmentType) -> Option<&Segment> {
        self.segments.iter().find(|s| &s.segment_type == segment_type)
    }

    pub fn has_segment(&self, segment_type: &SegmentType) -> bool {
        self.first(segment_type).is_some()
    }

    pub fn header_segment(&self) -> Option<&Segment> {
        self.segments
            .first()
            .filter(|s| s.segment_type == SegmentType::Msh)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fs = self.separators.field;
        for (si, segment) in self.segments.iter().enumerate() {
            if si > 0 {
                f.write_str("\r")?;
            }
            write!(f, "{}", segment.segment_type)?;
            let is_header = si == 0 && segment.segment_type == SegmentType::Msh;
            let first_position = if is_header {
                write!(f, "{fs}{}", self.separators.encoding_characters())?;
                3
            } else {
                1
            };
            for position in first_position..=segment.last_position() {
                write!(f, "{fs}{}", segment.field(position).unwrap_or_default())?;
            }
        }
        Ok(())
    }
}
