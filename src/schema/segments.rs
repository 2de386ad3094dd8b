use super::{DataType as T, FieldDefinition as F, SegmentSchema};
use crate::message::SegmentType;

fn schema(segment_type: SegmentType, description: &str, mut fields: Vec<F>) -> SegmentSchema {
    fields.sort_by_key(|f| f.position);
    SegmentSchema {
        segment_type,
        description: description.to_string(),
        fields,
    }
}

pub(super) fn standard() -> Vec<SegmentSchema> {
    vec![
        msh(),
        evn(),
        pid(),
        pv1(),
        pv2(),
        nk1(),
        al1(),
        dg1(),
        orc(),
        obr(),
        obx(),
        nte(),
        sch(),
        ais(),
        rxa(),
        rxr(),
        msa(),
        err(),
    ]
}

fn msh() -> SegmentSchema {
    schema(
        SegmentType::Msh,
        "Message Header",
        vec![
            F::new(1, "Field Separator", T::String).max_length(1).required(),
            F::new(2, "Encoding Characters", T::String).max_length(4).required(),
            F::new(3, "Sending Application", T::Composite).max_length(227),
            F::new(4, "Sending Facility", T::Composite).max_length(227),
            F::new(5, "Receiving Application", T::Composite).max_length(227),
            F::new(6, "Receiving Facility", T::Composite).max_length(227),
            F::new(7, "Date/Time of Message", T::Timestamp).max_length(26).required(),
            F::new(8, "Security", T::String).max_length(40),
            F::new(9, "Message Type", T::Composite).max_length(15).required(),
            F::new(10, "Message Control ID", T::String).max_length(20).required(),
            F::new(11, "Processing ID", T::Composite).max_length(3).required().table(103),
            F::new(12, "Version ID", T::Composite).max_length(60).required(),
            F::new(13, "Sequence Number", T::Numeric).max_length(15),
            F::new(14, "Continuation Pointer", T::String).max_length(180),
            F::new(15, "Accept Acknowledgment Type", T::Coded).max_length(2).table(155),
            F::new(16, "Application Acknowledgment Type", T::Coded).max_length(2).table(155),
            F::new(17, "Country Code", T::Coded).max_length(3),
            F::new(18, "Character Set", T::Coded).max_length(16).repeating(),
            F::new(19, "Principal Language Of Message", T::CodedElement).max_length(250),
        ],
    )
}

fn evn() -> SegmentSchema {
    schema(
        SegmentType::Evn,
        "Event Type",
        vec![
            F::new(1, "Event Type Code", T::Coded).max_length(3),
            F::new(2, "Recorded Date/Time", T::Timestamp).max_length(26).required(),
            F::new(3, "Date/Time Planned Event", T::Timestamp).max_length(26),
            F::new(4, "Event Reason Code", T::Coded).max_length(3),
            F::new(5, "Operator ID", T::Composite).max_length(250).repeating(),
            F::new(6, "Event Occurred", T::Timestamp).max_length(26),
            F::new(7, "Event Facility", T::Composite).max_length(241),
        ],
    )
}

fn pid() -> SegmentSchema {
    schema(
        SegmentType::Pid,
        "Patient Identification",
        vec![
            F::new(1, "Set ID - PID", T::SequenceId).max_length(4),
            F::new(2, "Patient ID", T::ExtendedId).max_length(20),
            F::new(3, "Patient Identifier List", T::ExtendedId)
                .max_length(250)
                .required()
                .repeating(),
            F::new(4, "Alternate Patient ID - PID", T::ExtendedId).max_length(20).repeating(),
            F::new(5, "Patient Name", T::PersonName).max_length(250).required().repeating(),
            F::new(6, "Mother's Maiden Name", T::PersonName).max_length(250).repeating(),
            F::new(7, "Date/Time of Birth", T::Date).max_length(8),
            F::new(8, "Administrative Sex", T::Coded).max_length(1).table(1),
            F::new(9, "Patient Alias", T::PersonName).max_length(250).repeating(),
            F::new(10, "Race", T::CodedElement).max_length(250).repeating(),
            F::new(11, "Patient Address", T::Address).max_length(250).repeating(),
            F::new(12, "County Code", T::Coded).max_length(4),
            F::new(13, "Phone Number - Home", T::Phone).max_length(250).repeating(),
            F::new(14, "Phone Number - Business", T::Phone).max_length(250).repeating(),
            F::new(15, "Primary Language", T::CodedElement).max_length(250),
            F::new(16, "Marital Status", T::CodedElement).max_length(250),
            F::new(17, "Religion", T::CodedElement).max_length(250),
            F::new(18, "Patient Account Number", T::ExtendedId).max_length(250),
            F::new(19, "SSN Number - Patient", T::String).max_length(16),
            F::new(22, "Ethnic Group", T::CodedElement).max_length(250).repeating(),
            F::new(23, "Birth Place", T::String).max_length(250),
            F::new(24, "Multiple Birth Indicator", T::Coded).max_length(1),
            F::new(29, "Patient Death Date and Time", T::Timestamp).max_length(26),
            F::new(30, "Patient Death Indicator", T::Coded).max_length(1),
        ],
    )
}

fn pv1() -> SegmentSchema {
    schema(
        SegmentType::Pv1,
        "Patient Visit",
        vec![
            F::new(1, "Set ID - PV1", T::SequenceId).max_length(4),
            F::new(2, "Patient Class", T::Coded).max_length(1).required().table(4),
            F::new(3, "Assigned Patient Location", T::Composite).max_length(80),
            F::new(4, "Admission Type", T::Coded).max_length(2),
            F::new(5, "Preadmit Number", T::ExtendedId).max_length(250),
            F::new(6, "Prior Patient Location", T::Composite).max_length(80),
            F::new(7, "Attending Doctor", T::Composite).max_length(250).repeating(),
            F::new(8, "Referring Doctor", T::Composite).max_length(250).repeating(),
            F::new(9, "Consulting Doctor", T::Composite).max_length(250).repeating(),
            F::new(10, "Hospital Service", T::Coded).max_length(3),
            F::new(14, "Admit Source", T::Coded).max_length(6),
            F::new(17, "Admitting Doctor", T::Composite).max_length(250).repeating(),
            F::new(18, "Patient Type", T::Coded).max_length(2),
            F::new(19, "Visit Number", T::ExtendedId).max_length(250),
            F::new(36, "Discharge Disposition", T::Coded).max_length(3),
            F::new(39, "Servicing Facility", T::Coded).max_length(2),
            F::new(44, "Admit Date/Time", T::Timestamp).max_length(26),
            F::new(45, "Discharge Date/Time", T::Timestamp).max_length(26),
        ],
    )
}

fn pv2() -> SegmentSchema {
    schema(
        SegmentType::Pv2,
        "Patient Visit - Additional Information",
        vec![
            F::new(1, "Prior Pending Location", T::Composite).max_length(80),
            F::new(3, "Admit Reason", T::CodedElement).max_length(250),
            F::new(8, "Expected Admit Date/Time", T::Timestamp).max_length(26),
            F::new(9, "Expected Discharge Date/Time", T::Timestamp).max_length(26),
        ],
    )
}

fn nk1() -> SegmentSchema {
    schema(
        SegmentType::Nk1,
        "Next of Kin / Associated Parties",
        vec![
            F::new(1, "Set ID - NK1", T::SequenceId).max_length(4).required(),
            F::new(2, "Name", T::PersonName).max_length(250).repeating(),
            F::new(3, "Relationship", T::CodedElement).max_length(250),
            F::new(4, "Address", T::Address).max_length(250).repeating(),
            F::new(5, "Phone Number", T::Phone).max_length(250).repeating(),
        ],
    )
}

fn al1() -> SegmentSchema {
    schema(
        SegmentType::Al1,
        "Patient Allergy Information",
        vec![
            F::new(1, "Set ID - AL1", T::SequenceId).max_length(4).required(),
            F::new(2, "Allergen Type Code", T::CodedElement).max_length(250),
            F::new(3, "Allergen Code/Mnemonic/Description", T::CodedElement)
                .max_length(250)
                .required(),
            F::new(4, "Allergy Severity Code", T::CodedElement).max_length(250),
            F::new(5, "Allergy Reaction Code", T::String).max_length(15).repeating(),
            F::new(6, "Identification Date", T::Date).max_length(8),
        ],
    )
}

fn dg1() -> SegmentSchema {
    schema(
        SegmentType::Dg1,
        "Diagnosis",
        vec![
            F::new(1, "Set ID - DG1", T::SequenceId).max_length(4).required(),
            F::new(2, "Diagnosis Coding Method", T::Coded).max_length(2),
            F::new(3, "Diagnosis Code - DG1", T::CodedElement).max_length(250),
            F::new(4, "Diagnosis Description", T::String).max_length(40),
            F::new(5, "Diagnosis Date/Time", T::Timestamp).max_length(26),
            F::new(6, "Diagnosis Type", T::Coded).max_length(2).required(),
        ],
    )
}

fn orc() -> SegmentSchema {
    schema(
        SegmentType::Orc,
        "Common Order",
        vec![
            F::new(1, "Order Control", T::Coded).max_length(2).required().table(119),
            F::new(2, "Placer Order Number", T::Composite).max_length(22),
            F::new(3, "Filler Order Number", T::Composite).max_length(22),
            F::new(4, "Placer Group Number", T::Composite).max_length(22),
            F::new(5, "Order Status", T::Coded).max_length(2).table(38),
            F::new(6, "Response Flag", T::Coded).max_length(1),
            F::new(7, "Quantity/Timing", T::Composite).max_length(200).repeating(),
            F::new(9, "Date/Time of Transaction", T::Timestamp).max_length(26),
            F::new(10, "Entered By", T::Composite).max_length(250).repeating(),
            F::new(12, "Ordering Provider", T::Composite).max_length(250).repeating(),
            F::new(15, "Order Effective Date/Time", T::Timestamp).max_length(26),
            F::new(16, "Order Control Code Reason", T::CodedElement).max_length(250),
        ],
    )
}

fn obr() -> SegmentSchema {
    schema(
        SegmentType::Obr,
        "Observation Request",
        vec![
            F::new(1, "Set ID - OBR", T::SequenceId).max_length(4),
            F::new(2, "Placer Order Number", T::Composite).max_length(22),
            F::new(3, "Filler Order Number", T::Composite).max_length(22),
            F::new(4, "Universal Service Identifier", T::CodedElement)
                .max_length(250)
                .required(),
            F::new(5, "Priority - OBR", T::Coded).max_length(2),
            F::new(6, "Requested Date/Time", T::Timestamp).max_length(26),
            F::new(7, "Observation Date/Time", T::Timestamp).max_length(26),
            F::new(8, "Observation End Date/Time", T::Timestamp).max_length(26),
            F::new(13, "Relevant Clinical Information", T::String).max_length(300),
            F::new(16, "Ordering Provider", T::Composite).max_length(250).repeating(),
            F::new(22, "Results Rpt/Status Chng - Date/Time", T::Timestamp).max_length(26),
            F::new(24, "Diagnostic Serv Sect ID", T::Coded).max_length(10),
            F::new(25, "Result Status", T::Coded).max_length(1).table(123),
            F::new(27, "Quantity/Timing", T::Composite).max_length(200).repeating(),
        ],
    )
}

fn obx() -> SegmentSchema {
    schema(
        SegmentType::Obx,
        "Observation/Result",
        vec![
            F::new(1, "Set ID - OBX", T::SequenceId).max_length(4),
            F::new(2, "Value Type", T::Coded).max_length(3).table(125),
            F::new(3, "Observation Identifier", T::CodedElement)
                .max_length(250)
                .required(),
            F::new(4, "Observation Sub-ID", T::String).max_length(20),
            F::new(5, "Observation Value", T::Varies).repeating(),
            F::new(6, "Units", T::CodedElement).max_length(250),
            F::new(7, "References Range", T::String).max_length(60),
            F::new(8, "Abnormal Flags", T::Coded).max_length(5).repeating(),
            F::new(11, "Observation Result Status", T::Coded)
                .max_length(1)
                .required()
                .table(85),
            F::new(14, "Date/Time of the Observation", T::Timestamp).max_length(26),
            F::new(15, "Producer's ID", T::CodedElement).max_length(250),
            F::new(16, "Responsible Observer", T::Composite).max_length(250).repeating(),
        ],
    )
}

fn nte() -> SegmentSchema {
    schema(
        SegmentType::Nte,
        "Notes and Comments",
        vec![
            F::new(1, "Set ID - NTE", T::SequenceId).max_length(4),
            F::new(2, "Source of Comment", T::Coded).max_length(8),
            F::new(3, "Comment", T::Text).max_length(65536).repeating(),
        ],
    )
}

fn sch() -> SegmentSchema {
    schema(
        SegmentType::Sch,
        "Scheduling Activity Information",
        vec![
            F::new(1, "Placer Appointment ID", T::Composite).max_length(75),
            F::new(2, "Filler Appointment ID", T::Composite).max_length(75),
            F::new(3, "Occurrence Number", T::Numeric).max_length(5),
            F::new(5, "Schedule ID", T::CodedElement).max_length(250),
            F::new(6, "Event Reason", T::CodedElement).max_length(250).required(),
            F::new(7, "Appointment Reason", T::CodedElement).max_length(250),
            F::new(8, "Appointment Type", T::CodedElement).max_length(250),
            F::new(9, "Appointment Duration", T::Numeric).max_length(20),
            F::new(10, "Appointment Duration Units", T::CodedElement).max_length(250),
            F::new(11, "Appointment Timing Quantity", T::Composite)
                .max_length(200)
                .repeating(),
            F::new(16, "Filler Contact Person", T::Composite).max_length(250).repeating(),
            F::new(25, "Filler Status Code", T::CodedElement).max_length(250).table(278),
        ],
    )
}

fn ais() -> SegmentSchema {
    schema(
        SegmentType::Ais,
        "Appointment Information",
        vec![
            F::new(1, "Set ID - AIS", T::SequenceId).max_length(4).required(),
            F::new(2, "Segment Action Code", T::Coded).max_length(3),
            F::new(3, "Universal Service Identifier", T::CodedElement)
                .max_length(250)
                .required(),
            F::new(4, "Start Date/Time", T::Timestamp).max_length(26),
            F::new(5, "Start Date/Time Offset", T::Numeric).max_length(20),
            F::new(7, "Duration", T::Numeric).max_length(20),
            F::new(8, "Duration Units", T::CodedElement).max_length(250),
        ],
    )
}

fn rxa() -> SegmentSchema {
    schema(
        SegmentType::Rxa,
        "Pharmacy/Treatment Administration",
        vec![
            F::new(1, "Give Sub-ID Counter", T::Numeric).max_length(4).required(),
            F::new(2, "Administration Sub-ID Counter", T::Numeric).max_length(4).required(),
            F::new(3, "Date/Time Start of Administration", T::Timestamp)
                .max_length(26)
                .required(),
            F::new(4, "Date/Time End of Administration", T::Timestamp)
                .max_length(26)
                .required(),
            F::new(5, "Administered Code", T::CodedElement).max_length(250).required(),
            F::new(6, "Administered Amount", T::Numeric).max_length(20).required(),
            F::new(7, "Administered Units", T::CodedElement).max_length(250),
            F::new(9, "Administration Notes", T::CodedElement).max_length(250).repeating(),
            F::new(10, "Administering Provider", T::Composite).max_length(250).repeating(),
            F::new(15, "Substance Lot Number", T::String).max_length(20).repeating(),
            F::new(16, "Substance Expiration Date", T::Timestamp).max_length(26).repeating(),
            F::new(17, "Substance Manufacturer Name", T::CodedElement)
                .max_length(250)
                .repeating(),
            F::new(20, "Completion Status", T::Coded).max_length(2).table(322),
            F::new(21, "Action Code - RXA", T::Coded).max_length(2).table(323),
        ],
    )
}

fn rxr() -> SegmentSchema {
    schema(
        SegmentType::Rxr,
        "Pharmacy/Treatment Route",
        vec![
            F::new(1, "Route", T::CodedElement).max_length(250).required(),
            F::new(2, "Administration Site", T::CodedElement).max_length(250),
        ],
    )
}

fn msa() -> SegmentSchema {
    schema(
        SegmentType::Msa,
        "Message Acknowledgment",
        vec![
            F::new(1, "Acknowledgment Code", T::Coded).max_length(2).required().table(8),
            F::new(2, "Message Control ID", T::String).max_length(20).required(),
            F::new(3, "Text Message", T::String).max_length(80),
        ],
    )
}

fn err() -> SegmentSchema {
    schema(
        SegmentType::Err,
        "Error",
        vec![
            F::new(1, "Error Code and Location", T::Composite).max_length(493).repeating(),
            F::new(2, "Error Location", T::Composite).max_length(18).repeating(),
            F::new(3, "HL7 Error Code", T::CodedElement).max_length(705).required(),
            F::new(4, "Severity", T::Coded).max_length(2).required(),
        ],
    )
}
