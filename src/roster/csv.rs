//! Roster CSV reading and writing.
//!
//! Each logical column has an ordered list of accepted header spellings. Headers are matched
//! case-sensitively and the first alias present in the file wins. Header resolution happens
//! once, before any row is read; a missing required column aborts the whole import.

use std::io;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};

use crate::database::service::StudentListItem;
use crate::roster::RosterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterField {
    Name,
    Email,
    RollNo,
    Vendor,
    Location,
}

impl RosterField {
    pub const REQUIRED: [RosterField; 4] = [
        RosterField::Name,
        RosterField::Email,
        RosterField::RollNo,
        RosterField::Vendor,
    ];

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            RosterField::Name => &["Name", "name", "Full Name", "Student Name", "NAME"],
            RosterField::Email => &[
                "Email",
                "email",
                "Email ID",
                "Email Address",
                "Institutional Email",
                "EMAIL",
            ],
            RosterField::RollNo => &["Roll No", "Roll Number", "roll_no", "RollNo", "Roll", "Batch", "ROLL NO"],
            RosterField::Vendor => &["Vendor", "vendor", "Vendor Name", "Mess", "VENDOR"],
            RosterField::Location => &["Location", "location", "Vendor Location", "LOCATION"],
        }
    }

    /// Spelling used when writing a roster back out
    pub fn canonical(self) -> &'static str {
        self.aliases()[0]
    }
}

/// Column positions resolved from a header record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    name: usize,
    email: usize,
    roll_no: usize,
    vendor: usize,
    location: Option<usize>,
}

fn find_column(headers: &StringRecord, field: RosterField) -> Option<usize> {
    field
        .aliases()
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == *alias))
}

impl HeaderMap {
    pub fn resolve(headers: &StringRecord) -> Result<Self, RosterError> {
        let name = find_column(headers, RosterField::Name);
        let email = find_column(headers, RosterField::Email);
        let roll_no = find_column(headers, RosterField::RollNo);
        let vendor = find_column(headers, RosterField::Vendor);

        match (name, email, roll_no, vendor) {
            (Some(name), Some(email), Some(roll_no), Some(vendor)) => Ok(Self {
                name,
                email,
                roll_no,
                vendor,
                location: find_column(headers, RosterField::Location),
            }),
            _ => {
                let missing = RosterField::REQUIRED
                    .iter()
                    .filter(|field| find_column(headers, **field).is_none())
                    .map(|field| field.canonical())
                    .collect();
                Err(RosterError::MissingColumns(missing))
            }
        }
    }

    fn row(&self, record: &StringRecord, line: u64) -> RosterRow {
        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
        RosterRow {
            line,
            name: field(self.name),
            email: field(self.email),
            roll_no: field(self.roll_no),
            vendor: field(self.vendor),
            location: self.location.map(field).filter(|l| !l.is_empty()),
        }
    }
}

/// One data line of a roster, values trimmed but otherwise unvalidated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    /// 1-based line number in the source file
    pub line: u64,
    pub name: String,
    pub email: String,
    pub roll_no: String,
    pub vendor: String,
    pub location: Option<String>,
}

/// Parse a roster, preserving row order. Blank lines and all-blank records are dropped.
pub fn read_roster<R: io::Read>(reader: R) -> Result<Vec<RosterRow>, RosterError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns = HeaderMap::resolve(&headers)?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 2);
        rows.push(columns.row(&record, line));
    }
    Ok(rows)
}

pub const EXPORT_HEADERS: [&str; 7] = ["Name", "Email", "Roll No", "Vendor", "Location", "Active", "QR Code"];

/// Write students in a shape `read_roster` accepts back
pub fn write_roster<W: io::Write>(writer: W, students: &[StudentListItem]) -> Result<(), RosterError> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(EXPORT_HEADERS)?;
    for item in students {
        let student = &item.student;
        writer.write_record([
            student.name.as_str(),
            student.email.as_str(),
            student.roll_no.as_str(),
            item.vendor_name.as_deref().unwrap_or(""),
            item.vendor_location.as_deref().unwrap_or(""),
            if student.is_active { "true" } else { "false" },
            student.qr_code.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
