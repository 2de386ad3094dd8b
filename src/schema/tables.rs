type TableValues = &'static [(&'static str, &'static str)];

const ADMINISTRATIVE_SEX: TableValues = &[
    ("A", "Ambiguous"),
    ("F", "Female"),
    ("M", "Male"),
    ("N", "Not applicable"),
    ("O", "Other"),
    ("U", "Unknown"),
];

const PATIENT_CLASS: TableValues = &[
    ("B", "Obstetrics"),
    ("C", "Commercial Account"),
    ("E", "Emergency"),
    ("I", "Inpatient"),
    ("N", "Not Applicable"),
    ("O", "Outpatient"),
    ("P", "Preadmit"),
    ("R", "Recurring patient"),
    ("U", "Unknown"),
];

const ACKNOWLEDGMENT_CODE: TableValues = &[
    ("AA", "Original mode: Application Accept"),
    ("AE", "Original mode: Application Error"),
    ("AR", "Original mode: Application Reject"),
    ("CA", "Enhanced mode: Accept Acknowledgment: Commit Accept"),
    ("CE", "Enhanced mode: Accept Acknowledgment: Commit Error"),
    ("CR", "Enhanced mode: Accept Acknowledgment: Commit Reject"),
];

const ORDER_STATUS: TableValues = &[
    ("A", "Some, but not all, results available"),
    ("CA", "Order was canceled"),
    ("CM", "Order is completed"),
    ("DC", "Order was discontinued"),
    ("ER", "Error, order not found"),
    ("HD", "Order is on hold"),
    ("IP", "In process, unspecified"),
    ("RP", "Order has been replaced"),
    ("SC", "In process, scheduled"),
];

const OBSERVATION_RESULT_STATUS: TableValues = &[
    ("C", "Record coming over is a correction"),
    ("D", "Deletes the OBX record"),
    ("F", "Final results"),
    ("I", "Specimen in lab; results pending"),
    ("N", "Not asked"),
    ("O", "Order detail description only"),
    ("P", "Preliminary results"),
    ("R", "Results entered -- not verified"),
    ("S", "Partial results"),
    ("U", "Results status change to final without retransmitting results"),
    ("W", "Post original as wrong"),
    ("X", "Results cannot be obtained for this observation"),
];

const PROCESSING_ID: TableValues = &[
    ("D", "Debugging"),
    ("P", "Production"),
    ("T", "Training"),
];

const ORDER_CONTROL: TableValues = &[
    ("CA", "Cancel order request"),
    ("CH", "Child order"),
    ("CR", "Canceled as requested"),
    ("DC", "Discontinue order request"),
    ("DR", "Discontinued as requested"),
    ("HD", "Hold order request"),
    ("NA", "Number assigned"),
    ("NW", "New order"),
    ("OC", "Order canceled"),
    ("OD", "Order discontinued"),
    ("OH", "Order held"),
    ("OK", "Order accepted & OK"),
    ("PA", "Parent order"),
    ("RE", "Observations to follow"),
    ("RL", "Release previous hold"),
    ("RP", "Order replace request"),
    ("SC", "Status changed"),
    ("SN", "Send order number"),
    ("XO", "Change order request"),
    ("XX", "Order changed, unsol."),
];

const RESULT_STATUS: TableValues = &[
    ("A", "Some, but not all, results available"),
    ("C", "Correction to results"),
    ("F", "Final results"),
    ("I", "No results available; specimen received"),
    ("O", "Order received; specimen not yet received"),
    ("P", "Preliminary"),
    ("R", "Results stored; not yet verified"),
    ("S", "No results available; procedure scheduled"),
    ("X", "No results available; Order canceled"),
    ("Y", "No order on record for this test"),
    ("Z", "No record of this patient"),
];

const VALUE_TYPE: TableValues = &[
    ("AD", "Address"),
    ("CE", "Coded Entry"),
    ("CF", "Coded Element With Formatted Values"),
    ("CNE", "Coded with No Exceptions"),
    ("CWE", "Coded Entry"),
    ("CX", "Extended Composite ID With Check Digit"),
    ("DT", "Date"),
    ("DTM", "Time Stamp (Date & Time)"),
    ("ED", "Encapsulated Data"),
    ("FT", "Formatted Text (Display)"),
    ("ID", "Coded Value for HL7 Defined Tables"),
    ("IS", "Coded Value for User-Defined Tables"),
    ("NM", "Numeric"),
    ("SN", "Structured Numeric"),
    ("ST", "String Data"),
    ("TM", "Time"),
    ("TS", "Time Stamp (Date & Time)"),
    ("TX", "Text Data (Display)"),
    ("XAD", "Extended Address"),
    ("XCN", "Extended Composite Name And Number For Persons"),
    ("XON", "Extended Composite Name And Number For Organizations"),
    ("XPN", "Extended Person Name"),
    ("XTN", "Extended Telecommunications Number"),
];

const ACKNOWLEDGMENT_CONDITIONS: TableValues = &[
    ("AL", "Always"),
    ("ER", "Error/reject conditions only"),
    ("NE", "Never"),
    ("SU", "Successful completion only"),
];

const FILLER_STATUS: TableValues = &[
    ("Blocked", "The indicated time slot(s) is(are) blocked"),
    ("Booked", "The indicated appointment is booked"),
    ("Cancelled", "The indicated appointment was stopped from occurring"),
    ("Complete", "The indicated appointment has completed normally"),
    ("Dc", "The indicated appointment has been discontinued"),
    ("Deleted", "The indicated appointment has been deleted"),
    ("Noshow", "The patient did not show up for the appointment"),
    ("Overbook", "The appointment has been confirmed; however it is overbooked"),
    ("Pending", "Appointment has not yet been confirmed"),
    ("Started", "The indicated appointment has begun"),
    ("Waitlist", "Appointment has been placed on a waiting list"),
];

const COMPLETION_STATUS: TableValues = &[
    ("CP", "Complete"),
    ("NA", "Not Administered"),
    ("PA", "Partially Administered"),
    ("RE", "Refused"),
];

const ACTION_CODE: TableValues = &[("A", "Add"), ("D", "Delete"), ("U", "Update")];

/// The values of a control table, by table number.
pub fn table_values(table: u16) -> Option<TableValues> {
    let values = match table {
        1 => ADMINISTRATIVE_SEX,
        4 => PATIENT_CLASS,
        8 => ACKNOWLEDGMENT_CODE,
        38 => ORDER_STATUS,
        85 => OBSERVATION_RESULT_STATUS,
        103 => PROCESSING_ID,
        119 => ORDER_CONTROL,
        123 => RESULT_STATUS,
        125 => VALUE_TYPE,
        155 => ACKNOWLEDGMENT_CONDITIONS,
        278 => FILLER_STATUS,
        322 => COMPLETION_STATUS,
        323 => ACTION_CODE,
        _ => return None,
    };
    Some(values)
}
