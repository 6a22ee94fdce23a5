//! Reusable row scanners.
//!
//! A scanner is built once per result set from its column names and then
//! refilled in place for every row, so iterating a large result does not
//! allocate a fresh map per row. Field data borrowed from the driver is
//! copied into owned text immediately; the scanner's output is the only thing
//! callers ever see.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::handle::{Cursor, RawField, RawRow};

pub(crate) fn decode_into(slot: &mut String, row: &dyn RawRow, index: usize, column: &str) -> Result<()> {
    slot.clear();
    let fault = || Error::Decode {
        index,
        column: column.to_string(),
    };
    match row.field(index).map_err(|_| fault())? {
        RawField::Null => {}
        RawField::Integer(i) => {
            let _ = write!(slot, "{i}");
        }
        RawField::Real(r) => {
            let _ = write!(slot, "{r}");
        }
        RawField::Bytes(bytes) => slot.push_str(std::str::from_utf8(bytes).map_err(|_| fault())?),
    }
    Ok(())
}

/// Scans rows into a column name → text mapping that is refilled in place.
///
/// The mapping returned by [`get`](Self::get) is overwritten by the next
/// [`update`](Self::update); use [`materialize`](Self::materialize) to keep a
/// row.
#[derive(Debug, Clone)]
pub struct MapScanner {
    columns: Vec<String>,
    row: HashMap<String, String>,
}

impl MapScanner {
    pub fn new(columns: &[String]) -> Self {
        let row = columns
            .iter()
            .map(|column| (column.clone(), String::new()))
            .collect();
        Self {
            columns: columns.to_vec(),
            row,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Copies every field of `row` into the mapping.
    ///
    /// All values are reset first, so a failed decode never leaves the
    /// previous row's data behind.
    pub fn update(&mut self, row: &dyn RawRow) -> Result<()> {
        self.row.values_mut().for_each(String::clear);
        for (index, column) in self.columns.iter().enumerate() {
            if let Some(slot) = self.row.get_mut(column.as_str()) {
                decode_into(slot, row, index, column)?;
            }
        }
        Ok(())
    }

    /// Fetches the next row from `cursor` and scans it. Returns `false` at the end.
    pub fn next(&mut self, cursor: &mut dyn Cursor) -> Result<bool> {
        match cursor.next_row()? {
            Some(row) => {
                self.update(row)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn get(&self) -> &HashMap<String, String> {
        &self.row
    }

    pub fn materialize(&self) -> HashMap<String, String> {
        self.row.clone()
    }
}

/// Scans rows into a flat `[name, value, name, value, ...]` vector.
#[derive(Debug, Clone)]
pub struct PairScanner {
    columns: Vec<String>,
    row: Vec<String>,
}

impl PairScanner {
    pub fn new(columns: &[String]) -> Self {
        let row = columns
            .iter()
            .flat_map(|column| [column.clone(), String::new()])
            .collect();
        Self {
            columns: columns.to_vec(),
            row,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn update(&mut self, row: &dyn RawRow) -> Result<()> {
        self.row.iter_mut().skip(1).step_by(2).for_each(String::clear);
        for (index, column) in self.columns.iter().enumerate() {
            decode_into(&mut self.row[index * 2 + 1], row, index, column)?;
        }
        Ok(())
    }

    pub fn next(&mut self, cursor: &mut dyn Cursor) -> Result<bool> {
        match cursor.next_row()? {
            Some(row) => {
                self.update(row)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn get(&self) -> &[String] {
        &self.row
    }

    pub fn materialize(&self) -> Vec<String> {
        self.row.clone()
    }
}

/// Scans a single row into a freshly allocated mapping.
///
/// Prefer [`MapScanner`] when iterating a result set.
pub fn scan_row_map(columns: &[String], row: &dyn RawRow) -> Result<HashMap<String, String>> {
    let mut map = HashMap::with_capacity(columns.len());
    for (index, column) in columns.iter().enumerate() {
        let mut value = String::new();
        decode_into(&mut value, row, index, column)?;
        map.insert(column.clone(), value);
    }
    Ok(map)
}
