//! Error types for decoding, migrating, and writing instrument data.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Possible errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Incorrect file length: expected at least {expected} bytes, found {found}")]
    FileLength { expected: usize, found: usize },

    #[error("Record table holds {found} bytes, expected {count} records of {record_length} bytes")]
    TableShape {
        count: usize,
        record_length: usize,
        found: usize,
    },

    #[error("Record too short for migration {from} -> {to}: expected at least {expected} bytes, found {found}")]
    RecordLength {
        from: u32,
        to: u32,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported version jump from {current} to {target}")]
    VersionJump { current: u32, target: u32 },

    #[error("No migration step registered for version {0}")]
    MissingStep(u32),

    #[error("Migration {from} has inserts out of order at offset {offset}")]
    InsertOrder { from: u32, offset: usize },

    #[error("Frequency word for note {note} exceeds 16 bits: {word}")]
    NoteRange { note: usize, word: f64 },

    #[error("No record layout declared for version {0}")]
    UnknownLayout(u32),

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The bytes of a file do not fit the expected layout. Aborts that file only.
    Format,
    /// The requested migration cannot run. Aborts before any file is touched.
    Config,
    /// Reading, writing, or listing files failed.
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FileLength { .. } | Error::TableShape { .. } | Error::RecordLength { .. } => {
                ErrorKind::Format
            }
            Error::VersionJump { .. }
            | Error::MissingStep(_)
            | Error::UnknownLayout(_)
            | Error::InsertOrder { .. }
            | Error::NoteRange { .. } => ErrorKind::Config,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn kind_ok() {
        let error = Error::FileLength {
            expected: 4,
            found: 2,
        };
        assert_eq!(error.kind(), ErrorKind::Format);

        let error = Error::VersionJump {
            current: 0,
            target: 2,
        };
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(format!("{}", error), "Unsupported version jump from 0 to 2");
    }

    #[test]
    fn io_source_ok() {
        let error = Error::io(
            Path::new("LEAD.COP"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );

        assert_eq!(error.kind(), ErrorKind::Io);
        assert_eq!(format!("{}", error), "I/O error on LEAD.COP");

        let source = error.source().map(|source| format!("{}", source));
        assert_eq!(source.as_deref(), Some("denied"));
    }
}
