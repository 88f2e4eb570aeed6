//! Record store for bloodbank.
//!
//! Each record kind lives in its own CSV file inside the data directory.
//! The store has two operations:
//! - [`RecordStore::load`] reads a table, creating an empty one on disk if
//!   the file does not exist yet
//! - [`RecordStore::append`] reads the table, adds one row at the end and
//!   rewrites the whole file
//!
//! There is no locking. Two processes appending to the same table at once
//! can lose a row: each reads the old table and the later write wins.

pub mod codec;

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::record::{Kind, Record};

/// All rows of one table, in file order.
pub type Table<R> = Vec<R>;

/// Flat-file storage for users and donors.
#[derive(Debug, Clone)]
pub struct RecordStore {
    /// Directory holding the table files.
    data_dir: PathBuf,
    /// File name of the users table.
    users_file: String,
    /// File name of the donors table.
    donors_file: String,
}

impl RecordStore {
    /// Create a store rooted at `data_dir` with explicit table file names.
    ///
    /// Nothing is touched on disk until the first load or append.
    #[must_use]
    pub fn new(
        data_dir: impl Into<PathBuf>,
        users_file: impl Into<String>,
        donors_file: impl Into<String>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            users_file: users_file.into(),
            donors_file: donors_file.into(),
        }
    }

    /// Create a store from the storage section of the configuration.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.data_dir(),
            config.users_file.clone(),
            config.donors_file.clone(),
        )
    }

    /// Get the path of the table file for a record kind.
    #[must_use]
    pub fn path_for(&self, kind: Kind) -> PathBuf {
        match kind {
            Kind::User => self.data_dir.join(&self.users_file),
            Kind::Donor => self.data_dir.join(&self.donors_file),
        }
    }

    /// Load every row of the table for `R`.
    ///
    /// If the table file does not exist, an empty table with the canonical
    /// header is written first and an empty list is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded, or
    /// if the empty table cannot be created.
    pub fn load<R: Record>(&self) -> Result<Table<R>> {
        let path = self.path_for(R::KIND);
        if let Some(rows) = read_existing::<R>(&path)? {
            debug!("Loaded {} {} rows from {}", rows.len(), R::KIND, path.display());
            return Ok(rows);
        }

        info!("Creating empty {} table at {}", R::KIND, path.display());
        write_all::<R>(&path, &[])?;
        Ok(Vec::new())
    }

    /// Append one record to the table for `R`.
    ///
    /// The current table is read (a missing file counts as empty), the
    /// record is added as the last row and the full table is written back,
    /// replacing the previous file. Returns the new number of rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing table cannot be read or decoded, or
    /// if the new table cannot be written.
    pub fn append<R: Record>(&self, record: R) -> Result<usize> {
        let path = self.path_for(R::KIND);
        let mut rows = read_existing::<R>(&path)?.unwrap_or_default();
        rows.push(record);
        write_all(&path, &rows)?;

        info!("Appended {} row {} to {}", R::KIND, rows.len(), path.display());
        Ok(rows.len())
    }
}

/// Read a table file, returning `None` if it does not exist.
fn read_existing<R: Record>(path: &Path) -> Result<Option<Table<R>>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::TableIo {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let rows = codec::read_table(BufReader::new(file)).map_err(|source| Error::TableFormat {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(rows))
}

/// Write a full table, replacing whatever the file held.
fn write_all<R: Record>(path: &Path, rows: &[R]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let file = File::create(path).map_err(|source| Error::TableIo {
        path: path.to_path_buf(),
        source,
    })?;
    codec::write_table(BufWriter::new(file), rows).map_err(|source| Error::TableFormat {
        path: path.to_path_buf(),
        source,
    })
}
