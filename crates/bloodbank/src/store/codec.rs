//! CSV encoding of record tables.
//!
//! A table is a header row followed by one row per record. Rows are decoded
//! by header name, so the column order on disk does not matter when reading.
//! Writing always uses the canonical order from [`Record::COLUMNS`].

use std::io::{Read, Write};

use crate::record::Record;

/// Decode every row of a table.
///
/// An input with no bytes at all decodes as an empty table.
///
/// # Errors
///
/// Returns an error if the input is not valid CSV or a row does not decode
/// into `R` (e.g. a non-numeric age or an unknown blood group).
pub fn read_table<R: Record>(reader: impl Read) -> csv::Result<Vec<R>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    rdr.deserialize().collect()
}

/// Encode a full table, header row included.
///
/// An empty slice produces just the header row.
///
/// # Errors
///
/// Returns an error if a record cannot be serialized or the writer fails.
pub fn write_table<R: Record>(writer: impl Write, rows: &[R]) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(R::COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
