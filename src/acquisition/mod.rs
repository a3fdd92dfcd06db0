//! Sensor data acquisition module
//!
//! Handles record ingestion from uploaded CSV text.

pub mod csv_records;

pub use csv_records::{parse_line, parse_records, Records, RECORD_FIELD_COUNT};
