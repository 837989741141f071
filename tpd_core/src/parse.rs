//! Raw experiment file parsing.
//!
//! Instrument exports are tab-separated text. Line 7 carries the channel
//! names; every channel then owns a block of three columns (sample index,
//! relative time, value) in header order. Records are read with a flexible
//! tab-delimited `csv` reader since the metadata block and the data table
//! disagree on column counts. Numeric cells may use either `.` or `,` as
//! decimal separator depending on the instrument locale; normalization
//! happens here, at the parsing boundary only.

use csv::ReaderBuilder;

use crate::error::ParseError;
use crate::experiment::{Channel, ChannelRole, Experiment};

/// Zero-based index of the channel-name header line.
pub const HEADER_LINE_INDEX: usize = 6;
/// Columns per channel block: sample index, relative time, value.
const BLOCK_WIDTH: usize = 3;

/// Parses one raw experiment file into row-aligned channels.
///
/// `name` is the source file stem; channels are named
/// `{name}_{header_token}`. The last header entry is tagged as the
/// temperature reference, all others as ion currents. Pure: no filesystem
/// access.
pub fn parse_experiment(name: &str, content: &str) -> Result<Experiment, ParseError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(content.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    // Candidate data rows with 1-indexed line numbers for error context.
    let mut rows: Vec<(usize, Vec<String>)> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ParseError::Malformed(e.to_string()))?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        if line <= HEADER_LINE_INDEX {
            // metadata block, tab content irrelevant
            continue;
        }
        if line == HEADER_LINE_INDEX + 1 {
            headers = Some(
                record
                    .iter()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect(),
            );
            continue;
        }
        let mut tokens: Vec<String> = record.iter().map(|t| t.trim().to_string()).collect();
        while tokens.last().is_some_and(String::is_empty) {
            tokens.pop();
        }
        if tokens.is_empty() {
            continue;
        }
        rows.push((line, tokens));
    }

    let headers = headers.ok_or(ParseError::MissingHeader)?;
    if headers.is_empty() {
        return Err(ParseError::EmptyHeader);
    }
    let expected = headers.len() * BLOCK_WIDTH;

    // The instrument repeats per-column labels on the first data row.
    if let Some((_, first)) = rows.first()
        && !row_is_numeric(first, expected)
    {
        rows.remove(0);
    }
    // Known non-data terminator line at the end of the export.
    if let Some((_, last)) = rows.last()
        && !row_is_numeric(last, expected)
    {
        rows.pop();
    }

    let mut blocks: Vec<(Vec<f64>, Vec<f64>)> = (0..headers.len())
        .map(|_| (Vec::with_capacity(rows.len()), Vec::with_capacity(rows.len())))
        .collect();
    for (row_no, tokens) in &rows {
        if tokens.len() < expected {
            return Err(ParseError::ColumnMismatch {
                row: *row_no,
                expected,
                got: tokens.len(),
                channels: headers.len(),
            });
        }
        for (slot, (time, value)) in blocks.iter_mut().enumerate() {
            time.push(parse_cell(tokens, *row_no, slot * BLOCK_WIDTH + 1)?);
            value.push(parse_cell(tokens, *row_no, slot * BLOCK_WIDTH + 2)?);
        }
    }

    let mut experiment = Experiment::new(name);
    let last_slot = headers.len() - 1;
    for (slot, (header, (time, value))) in headers.iter().zip(blocks).enumerate() {
        let role = if slot == last_slot {
            ChannelRole::Temperature
        } else {
            ChannelRole::IonCurrent
        };
        experiment.push_channel(Channel::new(format!("{name}_{header}"), role, time, value));
    }
    Ok(experiment)
}

/// Locale-tolerant numeric conversion: `,` is normalized to `.` first.
pub fn parse_number(token: &str) -> Option<f64> {
    if token.is_empty() {
        return None;
    }
    token.replace(',', ".").parse().ok()
}

fn row_is_numeric(tokens: &[String], expected: usize) -> bool {
    tokens
        .iter()
        .take(expected)
        .all(|t| parse_number(t).is_some())
}

fn parse_cell(tokens: &[String], row: usize, column: usize) -> Result<f64, ParseError> {
    let token = &tokens[column];
    parse_number(token).ok_or_else(|| ParseError::BadNumber {
        row,
        column: column + 1,
        token: token.clone(),
    })
}
