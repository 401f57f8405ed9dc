use super::table::{LmsRow, LmsTable};
use crate::error::{GrowthError, GrowthResult};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};

/// Parse a delimited LMS table: x, L, M, S in the first four columns.
///
/// A header row, blank lines, `#` comments, rows without four numeric fields and
/// rows failing [`LmsRow::is_valid`] are skipped. A resource that yields no
/// valid row is a [`GrowthError::MalformedCsv`].
pub fn parse_lms_table(resource: &str, bytes: &[u8]) -> GrowthResult<LmsTable> {
    let delimiter = detect_delimiter(bytes);

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .quoting(false)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut rejected = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!("{}: skipping undecodable record {}: {}", resource, index + 1, e);
                skipped += 1;
                continue;
            }
        };

        match numeric_row(&record) {
            Some(row) if row.is_valid() => rows.push(row),
            Some(_) => rejected += 1,
            None => {
                if index == 0 {
                    debug!("{}: treating first record as header", resource);
                } else {
                    skipped += 1;
                }
            }
        }
    }

    if rejected > 0 {
        warn!("{}: rejected {} rows with out-of-range LMS values", resource, rejected);
    }

    let parsed = rows.len();
    let table = LmsTable::from_rows(rows);
    if table.is_empty() {
        return Err(GrowthError::MalformedCsv {
            resource: resource.to_string(),
            reason: format!(
                "no valid numeric rows ({} skipped, {} rejected)",
                skipped, rejected
            ),
        });
    }

    if table.len() < parsed {
        debug!("{}: dropped {} rows with duplicate x", resource, parsed - table.len());
    }
    debug!(
        "{}: parsed {} rows, skipped {} non-numeric records",
        resource,
        table.len(),
        skipped
    );

    Ok(table)
}

fn numeric_row(record: &StringRecord) -> Option<LmsRow> {
    let mut values = [0.0f64; 4];
    for (slot, index) in values.iter_mut().zip(0..4) {
        *slot = record.get(index)?.parse::<f64>().ok()?;
    }
    let [x, l, m, s] = values;
    Some(LmsRow::new(x, l, m, s))
}

/// Tab or semicolon if the first non-blank, non-comment line uses one, else comma.
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes
        .split(|&b| b == b'\n')
        .find(|line| {
            line.iter()
                .find(|b| !b.is_ascii_whitespace())
                .map_or(false, |&b| b != b'#')
        })
        .unwrap_or(&[]);

    if first_line.contains(&b'\t') {
        b'\t'
    } else if first_line.contains(&b';') && !first_line.contains(&b',') {
        b';'
    } else {
        b','
    }
}
