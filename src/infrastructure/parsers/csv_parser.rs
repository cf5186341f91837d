use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Read, Split};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, error, info};

use crate::domain::{
    error::{RosterError, RowError},
    models::PlayerDraft,
};

pub const REQUIRED_COLUMNS: [&str; 6] = [
    "firstName",
    "lastName",
    "dateOfBirth",
    "height",
    "nationalities",
    "positions",
];

/// Separators accepted inside the `nationalities` and `positions` cells.
pub const MULTI_VALUE_DELIMITERS: [char; 6] = ['|', '/', ';', '#', '!', '%'];

/// Splits a multi-valued cell, dropping empty tokens.
pub fn split_multi_value(value: &str) -> BTreeSet<String> {
    value
        .split(&MULTI_VALUE_DELIMITERS[..])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Column layout taken from the header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvHeader {
    columns: Vec<String>,
}

impl CsvHeader {
    pub fn from_record(record: &StringRecord) -> Result<Self, RosterError> {
        let columns: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
        debug!("CSV headers: {:?}", columns);

        for required in REQUIRED_COLUMNS {
            if !columns.iter().any(|c| c == required) {
                error!("CSV header is missing required column {}", required);
                return Err(RosterError::MissingColumn(required.to_string()));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// A repeated column name resolves to its last occurrence.
    fn value<'r>(
        &self,
        record: &'r StringRecord,
        column: &'static str,
    ) -> Result<&'r str, RowError> {
        self.columns
            .iter()
            .rposition(|c| c == column)
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .ok_or(RowError::MissingValue(column))
    }

    /// Maps one data record onto a candidate player. Only syntax is checked
    /// here; field constraints are left to the validator.
    pub fn parse_row(&self, record: &StringRecord) -> Result<PlayerDraft, RowError> {
        let first_name = self.value(record, "firstName")?.to_string();
        let last_name = self.value(record, "lastName")?.to_string();

        let raw_dob = self.value(record, "dateOfBirth")?;
        let date_of_birth = NaiveDate::parse_from_str(raw_dob, "%Y-%m-%d").map_err(|source| {
            RowError::InvalidDate {
                value: raw_dob.to_string(),
                source,
            }
        })?;

        let raw_height = self.value(record, "height")?;
        let height = raw_height.parse::<f64>().map_err(|source| RowError::InvalidHeight {
            value: raw_height.to_string(),
            source,
        })?;

        Ok(PlayerDraft {
            first_name,
            last_name,
            nationalities: split_multi_value(self.value(record, "nationalities")?),
            positions: split_multi_value(self.value(record, "positions")?),
            date_of_birth: Some(date_of_birth),
            height: Some(height),
        })
    }
}

/// One data line: its 1-based physical line number and the parse outcome.
#[derive(Debug)]
pub struct CsvRow {
    pub line: u64,
    pub draft: Result<PlayerDraft, RowError>,
}

/// Streaming reader over a player upload. The input is consumed one
/// physical line at a time; line 1 is always the header and every later
/// line, blank or not, is a data row. Values are split on bare commas and
/// quoting is not interpreted.
pub struct PlayerCsvReader<R: Read> {
    lines: Split<BufReader<R>>,
    fields: ReaderBuilder,
    header: CsvHeader,
    line: u64,
}

impl<R: Read> PlayerCsvReader<R> {
    pub fn new(source: R) -> Result<Self, RosterError> {
        debug!("Creating line-based CSV reader with quoting disabled");
        let mut fields = ReaderBuilder::new();
        fields
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .trim(Trim::All);

        let mut lines = BufReader::new(source).split(b'\n');
        let raw = match lines.next() {
            Some(raw) => raw.map_err(|e| {
                error!("Failed to read CSV header: {}", e);
                RosterError::Stream(e.to_string())
            })?,
            None => {
                error!("CSV upload has no header row");
                return Err(RosterError::MissingHeader);
            }
        };

        let text = decode_line(raw).map_err(|e| RosterError::Stream(e.to_string()))?;
        let record = split_fields(&fields, &text).map_err(|e| RosterError::Stream(e.to_string()))?;
        let header = CsvHeader::from_record(&record)?;
        info!("Found {} columns in CSV header", header.columns().len());

        Ok(Self {
            lines,
            fields,
            header,
            line: 1,
        })
    }

    pub fn header(&self) -> &CsvHeader {
        &self.header
    }

    fn parse_line(&self, raw: Vec<u8>) -> Result<PlayerDraft, RowError> {
        let text = decode_line(raw)?;
        if text.trim().is_empty() {
            return Err(RowError::BlankLine);
        }
        let record = split_fields(&self.fields, &text)?;
        self.header.parse_row(&record)
    }
}

impl<R: Read> Iterator for PlayerCsvReader<R> {
    /// Data rows in input order. An I/O failure ends the stream with an
    /// error; everything else is reported on its row.
    type Item = Result<CsvRow, RosterError>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = match self.lines.next()? {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to read CSV line {}: {}", self.line + 1, e);
                return Some(Err(RosterError::Stream(e.to_string())));
            }
        };
        self.line += 1;
        Some(Ok(CsvRow {
            line: self.line,
            draft: self.parse_line(raw),
        }))
    }
}

/// Line bytes without the `\n` already removed by the splitter and without a
/// trailing `\r`.
fn decode_line(mut raw: Vec<u8>) -> Result<String, RowError> {
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    String::from_utf8(raw).map_err(|e| RowError::Unreadable(e.to_string()))
}

fn split_fields(fields: &ReaderBuilder, line: &str) -> Result<StringRecord, RowError> {
    let mut record = StringRecord::new();
    fields
        .from_reader(line.as_bytes())
        .read_record(&mut record)
        .map_err(|e| RowError::Unreadable(e.to_string()))?;
    Ok(record)
}
