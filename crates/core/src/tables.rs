//! CSV table reading and writing for the enrichment pipeline.
//!
//! The input is a headered CSV with a `Name` column; the output is the
//! same table with a `Symbol` column appended (or overwritten in place
//! when the input already carries one). Row order and every other
//! column are preserved; quoting follows standard CSV rules.

use std::io;

use csv::{ReaderBuilder, WriterBuilder};
use thiserror::Error;

use crate::enrichment::{InputRow, RowOutcome};

/// Header of the column holding company names.
pub const NAME_COLUMN: &str = "Name";

/// Header of the column the pipeline fills in.
pub const SYMBOL_COLUMN: &str = "Symbol";

/// Errors for table parsing and assembly.
#[derive(Error, Debug)]
pub enum TableError {
    /// The input had no header row at all.
    #[error("Input table is empty")]
    Empty,

    /// The input is missing the required name column.
    #[error("Input table has no '{0}' column")]
    MissingNameColumn(String),

    /// The outcome set does not line up with the table rows.
    #[error("Outcome mismatch: {outcomes} outcomes for {rows} rows")]
    OutcomeMismatch { outcomes: usize, rows: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// An input table: headers plus verbatim cell data, with the name
/// column located. Fixed for the duration of one enrichment run.
#[derive(Debug)]
pub struct NameTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
    name_index: usize,
    symbol_index: Option<usize>,
}

impl NameTable {
    /// Parse a headered CSV stream.
    ///
    /// Header matching is case-insensitive and tolerant of surrounding
    /// whitespace. Every data row is kept, including rows with a blank
    /// name cell; those fail row-level during resolution.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(TableError::Empty);
        }

        let name_index = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(NAME_COLUMN))
            .ok_or_else(|| TableError::MissingNameColumn(NAME_COLUMN.to_string()))?;
        let symbol_index = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(SYMBOL_COLUMN));

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            // Flexible parsing admits short rows; pad so every row has a
            // cell for every column
            cells.resize(headers.len(), String::new());
            records.push(cells);
        }

        Ok(Self {
            headers,
            records,
            name_index,
            symbol_index,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One [`InputRow`] per record, in table order.
    pub fn rows(&self) -> Vec<InputRow> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, cells)| InputRow::new(index, cells[self.name_index].clone()))
            .collect()
    }

    /// Attach resolved symbols, consuming the table.
    ///
    /// Requires exactly one outcome per row; unresolved rows get an
    /// empty symbol cell.
    pub fn with_symbols(mut self, outcomes: &[RowOutcome]) -> Result<OutputTable, TableError> {
        let rows = self.records.len();
        if outcomes.len() != rows {
            return Err(TableError::OutcomeMismatch {
                outcomes: outcomes.len(),
                rows,
            });
        }

        let symbol_index = match self.symbol_index {
            Some(index) => index,
            None => {
                self.headers.push(SYMBOL_COLUMN.to_string());
                for record in &mut self.records {
                    record.push(String::new());
                }
                self.headers.len() - 1
            }
        };

        for outcome in outcomes {
            let record = self.records.get_mut(outcome.index).ok_or(
                TableError::OutcomeMismatch {
                    outcomes: outcomes.len(),
                    rows,
                },
            )?;
            record[symbol_index] = outcome.symbol.clone().unwrap_or_default();
        }

        Ok(OutputTable {
            headers: self.headers,
            records: self.records,
        })
    }
}

/// The enriched table, ready to serialize. Always the same length and
/// row order as the input it came from.
#[derive(Debug)]
pub struct OutputTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the table as CSV. Values containing commas or quotes are
    /// quoted by the writer.
    pub fn write<W: io::Write>(&self, writer: W) -> Result<(), TableError> {
        let mut writer = WriterBuilder::new().from_writer(writer);

        writer.write_record(&self.headers)?;
        for record in &self.records {
            writer.write_record(record)?;
        }
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::RowError;

    fn write_to_string(table: &OutputTable) -> String {
        let mut buffer = Vec::new();
        table.write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_parse_locates_name_column() {
        let csv = "Id,Name,Country\n1,Apple Inc,US\n2,Tesla,US\n";
        let table = NameTable::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        let rows = table.rows();
        assert_eq!(rows[0], InputRow::new(0, "Apple Inc"));
        assert_eq!(rows[1], InputRow::new(1, "Tesla"));
    }

    #[test]
    fn test_header_match_is_case_insensitive() {
        let csv = "  name \nApple Inc\n";
        let table = NameTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.rows()[0].name, "Apple Inc");
    }

    #[test]
    fn test_missing_name_column() {
        let csv = "Company,Country\nApple Inc,US\n";
        let err = NameTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::MissingNameColumn(_)));
    }

    #[test]
    fn test_empty_input() {
        let err = NameTable::from_reader("".as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::Empty));
    }

    #[test]
    fn test_header_only_input_has_zero_rows() {
        let table = NameTable::from_reader("Name\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert!(table.rows().is_empty());
    }

    #[test]
    fn test_blank_names_are_kept() {
        let csv = "Name\nApple Inc\n   \nTesla\n";
        let table = NameTable::from_reader(csv.as_bytes()).unwrap();

        let rows = table.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].name, "   ");
    }

    #[test]
    fn test_symbol_column_is_appended() {
        let csv = "Name,Country\nApple Inc,US\nUnknownzzz Corp,US\n";
        let table = NameTable::from_reader(csv.as_bytes()).unwrap();

        let outcomes = vec![
            RowOutcome::success(0, "Apple Inc", "AAPL"),
            RowOutcome::failure(1, "Unknownzzz Corp", RowError::NotFound("Unknownzzz".into())),
        ];
        let output = table.with_symbols(&outcomes).unwrap();

        assert_eq!(output.len(), 2);
        assert_eq!(
            write_to_string(&output),
            "Name,Country,Symbol\nApple Inc,US,AAPL\nUnknownzzz Corp,US,\n"
        );
    }

    #[test]
    fn test_existing_symbol_column_is_overwritten() {
        let csv = "Name,Symbol\nApple Inc,OLD\nTesla,\n";
        let table = NameTable::from_reader(csv.as_bytes()).unwrap();

        let outcomes = vec![
            RowOutcome::success(0, "Apple Inc", "AAPL"),
            RowOutcome::success(1, "Tesla", "TSLA"),
        ];
        let output = table.with_symbols(&outcomes).unwrap();

        assert_eq!(
            write_to_string(&output),
            "Name,Symbol\nApple Inc,AAPL\nTesla,TSLA\n"
        );
    }

    #[test]
    fn test_comma_values_stay_quoted() {
        let csv = "Name,Notes\n\"Apple, Inc.\",\"big, fruity\"\n";
        let table = NameTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.rows()[0].name, "Apple, Inc.");

        let outcomes = vec![RowOutcome::success(0, "Apple, Inc.", "AAPL")];
        let output = table.with_symbols(&outcomes).unwrap();

        assert_eq!(
            write_to_string(&output),
            "Name,Notes,Symbol\n\"Apple, Inc.\",\"big, fruity\",AAPL\n"
        );
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = "Name,Country\nApple Inc\n";
        let table = NameTable::from_reader(csv.as_bytes()).unwrap();

        let outcomes = vec![RowOutcome::success(0, "Apple Inc", "AAPL")];
        let output = table.with_symbols(&outcomes).unwrap();

        assert_eq!(
            write_to_string(&output),
            "Name,Country,Symbol\nApple Inc,,AAPL\n"
        );
    }

    #[test]
    fn test_outcome_count_mismatch() {
        let csv = "Name\nApple Inc\nTesla\n";
        let table = NameTable::from_reader(csv.as_bytes()).unwrap();

        let outcomes = vec![RowOutcome::success(0, "Apple Inc", "AAPL")];
        let err = table.with_symbols(&outcomes).unwrap_err();
        assert!(matches!(
            err,
            TableError::OutcomeMismatch {
                outcomes: 1,
                rows: 2
            }
        ));
    }
}
