//! CSV archive writing
//!
//! Records are written through serde, one row per record, using the `csv`
//! crate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
pub struct Archiver {
    path: PathBuf,
    writer: Writer<File>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file {0:?}: {1}")]
    CreateError(PathBuf, std::io::Error),

    #[error("Cannot write a record to {0:?}: {1}")]
    WriteError(PathBuf, csv::Error),

    #[error("Cannot flush the archive {0:?}: {1}")]
    FlushError(PathBuf, std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArchiveError {
    /// If the underlying cause of this error was an IO failure return it.
    pub fn into_io_error(self) -> std::io::Error {
        match self {
            ArchiveError::CreateError(_, e) => e,
            ArchiveError::FlushError(_, e) => e,
            ArchiveError::WriteError(path, e) => {
                let msg = format!("{:?}: {}", path, e);
                match e.into_kind() {
                    csv::ErrorKind::Io(io) => io,
                    _ => std::io::Error::new(std::io::ErrorKind::Other, msg),
                }
            }
        }
    }
}

impl Archiver {
    /// Create a new archiver writing to the given path, truncating any
    /// existing file.
    ///
    /// If `has_headers` is true the field names of the first serialised
    /// record are written as a header row.
    pub fn create<P: AsRef<Path>>(path: P, has_headers: bool) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();

        let file = File::create(&path).map_err(|e| ArchiveError::CreateError(path.clone(), e))?;

        let writer = WriterBuilder::new()
            .has_headers(has_headers)
            .from_writer(file);

        Ok(Self { path, writer })
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        self.writer
            .serialize(record)
            .map_err(|e| ArchiveError::WriteError(self.path.clone(), e))
    }

    /// Flush all buffered records to disk.
    pub fn flush(&mut self) -> Result<(), ArchiveError> {
        self.writer
            .flush()
            .map_err(|e| ArchiveError::FlushError(self.path.clone(), e))
    }
}
