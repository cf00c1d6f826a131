use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::TIMESTAMP;

/// The uploaded table as text, before any typing.
/// The first header is always `Timestamp`; every row has as many cells as
/// there are headers.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Reads csv text whose first row is a throwaway line and second row is
    /// the header. Short rows are padded with empty cells, rows with more
    /// cells than the header are an error.
    pub fn from_reader<R: Read>(rdr: R) -> Result<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(rdr);
        let mut records = reader.records();

        match records.next() {
            Some(skipped) => debug!("skipped leading row {:?}", skipped?),
            None => return Err(Error::MissingHeader),
        }
        let mut headers: Vec<String> = match records.next() {
            Some(h) => h?.iter().map(String::from).collect(),
            None => return Err(Error::MissingHeader),
        };
        headers[0] = TIMESTAMP.to_string();

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            if record.len() > headers.len() {
                return Err(Error::TooManyFields {
                    line: record.position().map(|p| p.line()).unwrap_or(0),
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(String::from).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        info!("loaded {} rows and {} columns", rows.len(), headers.len());
        Ok(RawTable { headers, rows })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<RawTable> {
        RawTable::from_reader(bytes)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RawTable> {
        let file = File::open(path)?;
        RawTable::from_reader(file)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// All cells of column `j`, top to bottom.
    pub fn column(&self, j: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |r| r[j].as_str())
    }
}
