//! CSV record parsing
//!
//! Turns the raw text of an uploaded sensor file into [`Record`]s.
//!
//! ## Input Format
//!
//! ```text
//! Product ID,Type,Air temperature [K],Process temperature [K],Rotational speed [rpm],Torque [Nm],Tool wear [min]
//! M14860,M,298.1,308.6,1551,42.8,0
//! L47182,L,298.2,308.7,1408,46.3,3
//! ```
//!
//! The first non-blank line is the header and is discarded. Data rows need at
//! least [`RECORD_FIELD_COUNT`] comma-separated fields; extra trailing fields
//! are ignored and shorter rows are skipped without error. Readings that do not
//! parse become `NaN` rather than rejecting the row.

use tracing::debug;

use crate::types::{MachineType, Record};

/// Positional fields consumed per row: product id, type, five readings.
pub const RECORD_FIELD_COUNT: usize = 7;

const FIELD_DELIMITER: char = ',';

/// Parse `text` into a lazy sequence of records.
///
/// The returned iterator borrows `text`; cloning it (or calling this again)
/// restarts from the top and yields the same sequence.
pub fn parse_records(text: &str) -> Records<'_> {
    Records {
        lines: text.lines(),
        header_seen: false,
        line_number: 0,
        record_line: 0,
        skipped: 0,
    }
}

/// Iterator over the records of one input text.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    lines: std::str::Lines<'a>,
    header_seen: bool,
    line_number: usize,
    record_line: usize,
    skipped: usize,
}

impl Records<'_> {
    /// Rows dropped so far for having too few fields.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// 1-based line of the source text the last yielded record came from,
    /// counting the header and blank lines. 0 before the first record.
    pub fn line(&self) -> usize {
        self.record_line
    }
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            let line = self.lines.next()?;
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }
            if !self.header_seen {
                self.header_seen = true;
                continue;
            }

            match parse_line(line) {
                Some(record) => {
                    self.record_line = self.line_number;
                    return Some(record);
                }
                None => {
                    self.skipped += 1;
                    debug!(line = self.line_number, "Skipping short row");
                }
            }
        }
    }
}

/// Parse one data row, or `None` if it has too few fields.
pub fn parse_line(line: &str) -> Option<Record> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();
    if fields.len() < RECORD_FIELD_COUNT {
        return None;
    }

    Some(Record {
        product_id: fields[0].to_string(),
        machine_type: MachineType::from(fields[1]),
        air_temperature: parse_reading(fields[2]),
        process_temperature: parse_reading(fields[3]),
        rotational_speed: parse_reading(fields[4]),
        torque: parse_reading(fields[5]),
        tool_wear: parse_reading(fields[6]),
    })
}

/// Lenient numeric conversion: an empty field reads as zero, anything else
/// that does not parse reads as `NaN`.
fn parse_reading(field: &str) -> f64 {
    if field.is_empty() {
        return 0.0;
    }
    field.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ROWS: &str =
        "header\nM14860,M,298.1,308.6,1551,42.8,0\nL47182,L,298.2,308.7,1408,46.3,3\n";

    #[test]
    fn parses_rows_in_order() {
        let records: Vec<Record> = parse_records(TWO_ROWS).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product_id, "M14860");
        assert_eq!(records[0].machine_type, MachineType::Medium);
        assert_eq!(records[0].rotational_speed, 1551.0);
        assert_eq!(records[1].product_id, "L47182");
        assert_eq!(records[1].machine_type, MachineType::Low);
        assert_eq!(records[1].tool_wear, 3.0);
    }

    #[test]
    fn short_rows_are_skipped_silently() {
        let text = "header\nX,L,300\nM14860,M,298.1,308.6,1551,42.8,0\n";
        let mut records = parse_records(text);
        let collected: Vec<Record> = records.by_ref().collect();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].product_id, "M14860");
        assert_eq!(records.skipped(), 1);
    }

    #[test]
    fn only_short_row_yields_nothing() {
        assert_eq!(parse_records("header\nX,L,300").count(), 0);
    }

    #[test]
    fn header_is_first_non_blank_line() {
        let text = "\n\n  \nheader\n\nM14860,M,298.1,308.6,1551,42.8,0\n\n";
        assert_eq!(parse_records(text).count(), 1);
    }

    #[test]
    fn handles_crlf_and_whitespace() {
        let text = "h\r\n  M1 , H , 300 , 310 , 1500 , 40 , 10  \r\n";
        let records: Vec<Record> = parse_records(text).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_id, "M1");
        assert_eq!(records[0].machine_type, MachineType::High);
        assert_eq!(records[0].tool_wear, 10.0);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let record = parse_line("M1,L,300,310,1500,40,10,extra,more").unwrap();
        assert_eq!(record.tool_wear, 10.0);
    }

    #[test]
    fn unparseable_reading_becomes_nan() {
        let record = parse_line("M1,L,hot,310,1500,40,10").unwrap();
        assert!(record.air_temperature.is_nan());
        assert_eq!(record.invalid_field(), Some("air_temperature"));
    }

    #[test]
    fn empty_reading_reads_as_zero() {
        let record = parse_line("M1,L,300,310,1500,,10").unwrap();
        assert_eq!(record.torque, 0.0);
    }

    #[test]
    fn header_only_input_is_empty() {
        assert_eq!(parse_records("Product ID,Type\n").count(), 0);
        assert_eq!(parse_records("").count(), 0);
    }

    #[test]
    fn parsing_is_restartable() {
        let records = parse_records(TWO_ROWS);
        let first: Vec<Record> = records.clone().collect();
        let second: Vec<Record> = records.collect();
        assert_eq!(first, second);
        assert_eq!(first, parse_records(TWO_ROWS).collect::<Vec<_>>());
    }

    #[test]
    fn line_tracks_source_position() {
        let text = "h\n\nshort\nA,L,1,2,3,4,5\nB,M,1,2,3,4,5\n";
        let mut records = parse_records(text);
        assert_eq!(records.line(), 0);
        assert_eq!(records.next().map(|r| r.product_id), Some("A".to_string()));
        assert_eq!(records.line(), 4);
        records.next();
        assert_eq!(records.line(), 5);
    }

    #[test]
    fn count_matches_rows_with_enough_fields() {
        let text = "h\na,L,1,2,3,4,5\nshort\nb,M,1,2,3,4,5\n\nc,H,1,2\nd,H,1,2,3,4,5,6\n";
        let mut records = parse_records(text);
        assert_eq!(records.by_ref().count(), 3);
        assert_eq!(records.skipped(), 2);
    }
}
