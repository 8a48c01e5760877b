//! Sectioned `.device` descriptor parser.
//!
//! Parsing is line-local: a row that does not fit its section's grammar is
//! dropped and recorded in the [`ParseReport`], and the scan carries on.

use crate::error::RowError;
use crate::line::{normalize, split, trim};
use crate::types::{
    AccessType, BaudRateTable, ControlTable, ControlTableEntry, DeviceDescriptor, MemoryType,
    TypeInfo,
};
use serde::Serialize;
use std::str::FromStr;
use tracing::debug;

/// Active descriptor section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    /// Before the first header.
    None,
    TypeInfo,
    BaudRate,
    ControlTable,
    /// Any header not listed above; its rows are ignored.
    Unknown,
}

impl Section {
    /// Parses a normalized line as a `[header]`.
    fn from_header(line: &str) -> Option<Self> {
        let inner = line.strip_prefix('[')?.strip_suffix(']')?;
        let section = match trim(inner).to_ascii_lowercase().as_str() {
            "type info" => Self::TypeInfo,
            "baud rate" => Self::BaudRate,
            "control table" => Self::ControlTable,
            _ => Self::Unknown,
        };
        Some(section)
    }
}

/// A row dropped while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line number.
    pub line: usize,
    pub section: Section,
    #[serde(serialize_with = "serialize_display")]
    pub error: RowError,
}

fn serialize_display<S: serde::Serializer>(err: &RowError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    pub skipped: Vec<SkippedRow>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Parses descriptor text with all-zero type info defaults.
pub fn parse_descriptor(text: &str) -> DeviceDescriptor {
    DescriptorParser::default().parse(text).0
}

#[derive(Debug, Default, Clone)]
pub struct DescriptorParser {
    defaults: TypeInfo,
}

impl DescriptorParser {
    /// Type info keys missing from the text keep the values in `defaults`.
    pub fn with_defaults(defaults: TypeInfo) -> Self {
        Self { defaults }
    }

    pub fn parse(&self, text: &str) -> (DeviceDescriptor, ParseReport) {
        let mut desc = DeviceDescriptor {
            type_info: self.defaults,
            ..Default::default()
        };
        let mut report = ParseReport::default();
        let mut section = Section::None;

        for (idx, raw) in text.lines().enumerate() {
            let line = normalize(raw);
            if line.is_empty() {
                continue;
            }
            if let Some(next) = Section::from_header(line) {
                section = next;
                continue;
            }

            let outcome = match section {
                Section::TypeInfo => parse_type_info_row(&mut desc.type_info, line),
                Section::BaudRate => parse_baud_row(&mut desc.baud_rates, line),
                Section::ControlTable => parse_control_row(&mut desc.control_table, line),
                Section::None | Section::Unknown => Ok(()),
            };
            if let Err(error) = outcome {
                debug!(line = idx + 1, ?section, %error, "skipping descriptor row");
                report.skipped.push(SkippedRow {
                    line: idx + 1,
                    section,
                    error,
                });
            }
        }

        (desc, report)
    }
}

fn fields<'a>(line: &'a str, delimiter: char, expected: usize) -> Result<Vec<&'a str>, RowError> {
    let tokens = split(line, delimiter);
    if tokens.len() != expected {
        return Err(RowError::FieldCount {
            expected,
            found: tokens.len(),
        });
    }
    Ok(tokens)
}

fn number<T: FromStr>(field: &str, value: &str) -> Result<T, RowError> {
    value.parse().map_err(|_| RowError::InvalidNumber {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn parse_type_info_row(info: &mut TypeInfo, line: &str) -> Result<(), RowError> {
    let kv = fields(line, '=', 2)?;
    let (key, value) = (kv[0], kv[1]);
    match key {
        "torque_to_current_value_ratio" => info.torque_to_current_value_ratio = number(key, value)?,
        "velocity_to_value_ratio" => info.velocity_to_value_ratio = number(key, value)?,
        "value_of_0_radian_position" => info.value_of_zero_radian_position = number(key, value)?,
        "value_of_min_radian_position" => info.value_of_min_radian_position = number(key, value)?,
        "value_of_max_radian_position" => info.value_of_max_radian_position = number(key, value)?,
        "min_radian" => info.min_radian = number(key, value)?,
        "max_radian" => info.max_radian = number(key, value)?,
        _ => {}
    }
    Ok(())
}

fn parse_baud_row(table: &mut BaudRateTable, line: &str) -> Result<(), RowError> {
    let row = fields(line, '|', 2)?;
    let code = number("baud rate code", row[0])?;
    let baud = number("baud rate", row[1])?;
    table.insert(code, baud);
    Ok(())
}

fn parse_control_row(table: &mut ControlTable, line: &str) -> Result<(), RowError> {
    let row = fields(line, '|', 5)?;
    let entry = ControlTableEntry {
        address: number("address", row[0])?,
        name: row[1].to_string(),
        length: number("data length", row[2])?,
        access: row[3].parse::<AccessType>()?,
        memory: row[4].parse::<MemoryType>()?,
    };
    table.insert(entry);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# sample descriptor
[Type Info]
torque_to_current_value_ratio = 149.795386991
velocity_to_value_ratio = 41.707853
value_of_0_radian_position = 2048
value_of_min_radian_position = 0
value_of_max_radian_position = 4095
min_radian = -3.14159265
max_radian = 3.14159265

[Baud Rate]
0 | 9600
1 | 57600   # default

[Control Table]
64 | Torque Enable | 1 | RW | RAM
132 | Present Position | 4 | R | RAM
";

    #[test]
    fn test_control_table_example() {
        let desc = parse_descriptor(
            "[Control Table]\n64 | Torque Enable | 1 | RW | RAM\n132 | Present Position | 4 | R | RAM\n",
        );
        let torque = desc.control_table.get("Torque Enable").unwrap();
        assert_eq!(torque.address, 64);
        assert_eq!(torque.length, 1);
        assert_eq!(torque.access, AccessType::ReadWrite);
        assert_eq!(torque.memory, MemoryType::Ram);
        let position = desc.control_table.get("Present Position").unwrap();
        assert_eq!(position.access, AccessType::Read);
        assert_eq!(position.length, 4);
    }

    #[test]
    fn test_full_sample() {
        let (desc, report) = DescriptorParser::default().parse(SAMPLE);
        assert!(report.is_clean());
        assert_eq!(desc.type_info.value_of_zero_radian_position, 2048);
        assert_eq!(desc.type_info.value_of_max_radian_position, 4095);
        assert!((desc.type_info.velocity_to_value_ratio - 41.707853).abs() < 1e-12);
        assert!((desc.type_info.min_radian + 3.14159265).abs() < 1e-12);
        assert_eq!(desc.baud_rates.get(1), Some(57600));
        assert_eq!(desc.baud_rates.len(), 2);
        assert_eq!(desc.control_table.len(), 2);
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse_descriptor(SAMPLE), parse_descriptor(SAMPLE));
    }

    #[test]
    fn test_last_write_wins() {
        let desc = parse_descriptor(
            "[control table]\n10 | LED | 1 | RW | RAM\n25 | LED | 1 | RW | RAM\n[baud rate]\n1 | 9600\n1 | 57600\n",
        );
        assert_eq!(desc.control_table.len(), 1);
        assert_eq!(desc.control_table.get("LED").unwrap().address, 25);
        assert_eq!(desc.baud_rates.get(1), Some(57600));
    }

    #[test]
    fn test_malformed_row_tolerance() {
        let (desc, report) = DescriptorParser::default()
            .parse("[Control Table]\n64 | Torque Enable | 1 | RW\n65 | LED | 1 | RW | RAM\n");
        assert_eq!(desc.control_table.len(), 1);
        assert!(desc.control_table.contains("LED"));
        assert_eq!(
            report.skipped,
            vec![SkippedRow {
                line: 2,
                section: Section::ControlTable,
                error: RowError::FieldCount {
                    expected: 5,
                    found: 4
                },
            }]
        );
    }

    #[test]
    fn test_section_isolation() {
        let (desc, report) =
            DescriptorParser::default().parse("[Control Table]\n1|57600\n");
        assert!(desc.baud_rates.is_empty());
        assert!(desc.control_table.is_empty());
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_headers_are_case_insensitive_and_trimmed() {
        let desc = parse_descriptor("[  BAUD rate ]  # comment\n3 | 1000000\n");
        assert_eq!(desc.baud_rates.get(3), Some(1_000_000));
    }

    #[test]
    fn test_rows_outside_known_sections_are_ignored() {
        let (desc, report) = DescriptorParser::default().parse(
            "1 | 57600\n[Vendor Notes]\n2 | 115200\n64 | Torque Enable | 1 | RW | RAM\n",
        );
        assert_eq!(desc, DeviceDescriptor::default());
        assert!(report.is_clean());
    }

    #[test]
    fn test_type_info_defaults_and_unknown_keys() {
        let defaults = TypeInfo {
            min_radian: -1.0,
            max_radian: 1.0,
            ..Default::default()
        };
        let (desc, report) = DescriptorParser::with_defaults(defaults).parse(
            "[type info]\nmax_radian = 2.5\nunknown_key = 7\nMin_Radian = 9\nvalue_of_0_radian_position = 512\n",
        );
        assert!(report.is_clean());
        assert_eq!(desc.type_info.max_radian, 2.5);
        assert_eq!(desc.type_info.min_radian, -1.0);
        assert_eq!(desc.type_info.value_of_zero_radian_position, 512);
    }

    #[test]
    fn test_unparsable_values_are_reported() {
        let (desc, report) = DescriptorParser::default().parse(
            "[type info]\nvalue_of_0_radian_position = 2048.5\nmin_radian\n[baud rate]\nx | 9600\n[control table]\n64 | Torque Enable | one | RW | RAM\n",
        );
        assert_eq!(desc, DeviceDescriptor::default());
        let lines: Vec<usize> = report.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![2, 3, 5, 7]);
        assert_eq!(
            report.skipped[0].error,
            RowError::InvalidNumber {
                field: "value_of_0_radian_position".into(),
                value: "2048.5".into()
            }
        );
    }

    #[test]
    fn test_out_of_range_numbers_drop_row() {
        let (desc, report) = DescriptorParser::default().parse(
            "[baud rate]\n256 | 9600\n1 | 57600\n[control table]\n70000 | Far Away | 1 | R | RAM\n64 | Torque Enable | 1 | RW | RAM\n",
        );
        assert_eq!(desc.baud_rates.len(), 1);
        assert_eq!(desc.baud_rates.get(1), Some(57600));
        assert_eq!(desc.control_table.len(), 1);
        assert!(!desc.control_table.contains("Far Away"));
        assert_eq!(
            report.skipped,
            vec![
                SkippedRow {
                    line: 2,
                    section: Section::BaudRate,
                    error: RowError::InvalidNumber {
                        field: "baud rate code".into(),
                        value: "256".into(),
                    },
                },
                SkippedRow {
                    line: 5,
                    section: Section::ControlTable,
                    error: RowError::InvalidNumber {
                        field: "address".into(),
                        value: "70000".into(),
                    },
                },
            ]
        );
    }

    #[test]
    fn test_nbsp_is_part_of_item_name() {
        let desc = parse_descriptor("[control table]\n65 | LED\u{a0} | 1 | RW | RAM\n");
        assert!(desc.control_table.contains("LED\u{a0}"));
        assert!(!desc.control_table.contains("LED"));
    }

    #[test]
    fn test_unknown_access_literal_drops_row() {
        let (desc, report) = DescriptorParser::default()
            .parse("[control table]\n64 | Torque Enable | 1 | W | RAM\n65 | LED | 1 | RW | ROM\n");
        assert!(desc.control_table.is_empty());
        assert_eq!(report.skipped[0].error, RowError::UnknownAccess("W".into()));
        assert_eq!(report.skipped[1].error, RowError::UnknownMemory("ROM".into()));
    }

    #[test]
    fn test_report_serializes_errors_as_text() {
        let (_, report) = DescriptorParser::default().parse("[baud rate]\n1 | 2 | 3\n");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skipped"][0]["section"], "BaudRate");
        assert_eq!(json["skipped"][0]["error"], "expected 2 fields, found 3");
    }
}
