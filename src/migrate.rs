//! Apply one migration step to every preset and song in a directory.
//!
//! Files are handled one at a time and independently: a file that fails to
//! migrate is reported and left as it was, while the others are still
//! migrated. Nothing written is ever rolled back, and no backups are kept.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::consts::{PRESET_EXTENSION, PRESET_HEADER_LENGTH, SONG_EXTENSION};
use crate::errors::Error;
use crate::layout::layout;
use crate::preset::Preset;
use crate::registry::Registry;
use crate::song::Song;
use crate::step::Step;

/// The two kinds of file carrying instrument records.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FileKind {
    /// `.COP`: a single instrument.
    Preset,
    /// `.COS`: 32 instrument slots followed by track data.
    Song,
}

impl FileKind {
    /// Classify a path by its extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<FileKind> {
        let ext = path.extension()?.to_str()?;

        if ext.eq_ignore_ascii_case(PRESET_EXTENSION) {
            Some(FileKind::Preset)
        } else if ext.eq_ignore_ascii_case(SONG_EXTENSION) {
            Some(FileKind::Song)
        } else {
            None
        }
    }
}

/// List the presets and songs directly inside `dir`, sorted by file name.
pub fn discover(dir: &Path) -> Result<Vec<(PathBuf, FileKind)>, Error> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::Io {
                path,
                source: e.into(),
            }
        })?;

        // Rewriting a link would replace it with a regular file.
        if entry.path_is_symlink() {
            if FileKind::from_path(entry.path()).is_some() {
                warn!(path = %entry.path().display(), "Skipping symbolic link");
            }
            continue;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        match FileKind::from_path(entry.path()) {
            Some(kind) => files.push((entry.into_path(), kind)),
            None => debug!(path = %entry.path().display(), "Skipping"),
        }
    }

    Ok(files)
}

/// Result of migrating one file.
#[derive(Debug)]
pub struct Outcome {
    pub path: PathBuf,
    pub kind: FileKind,
    pub result: Result<(), Error>,
}

/// Per-file results of a directory migration, in processing order.
#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
}

impl Report {
    pub fn migrated(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// A configured migration from one format version to the next.
///
/// ```no_run
/// # fn main() -> Result<(), concerto_data::Error> {
/// use concerto_data::Migration;
///
/// let report = Migration::new(0, 1)?.run(std::path::Path::new("."))?;
/// println!("{} files migrated", report.migrated());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Migration {
    step: &'static Step,
    song_record_length: Option<usize>,
    dry_run: bool,
}

impl Migration {
    /// Fails with a configuration error unless `target == current + 1` and a
    /// step for it is registered.
    pub fn new(current: u32, target: u32) -> Result<Self, Error> {
        Self::with_registry(&Registry::default(), current, target)
    }

    pub fn with_registry(registry: &Registry, current: u32, target: u32) -> Result<Self, Error> {
        let step = registry.select(current, target)?;

        Ok(Self {
            step,
            song_record_length: None,
            dry_run: false,
        })
    }

    /// Override the record length songs are decoded with. Defaults to the
    /// declared layout of the current version.
    pub fn song_record_length(mut self, record_length: usize) -> Self {
        self.song_record_length = Some(record_length);
        self
    }

    /// Migrate in memory only; never write.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn step(&self) -> &'static Step {
        self.step
    }

    fn resolve_song_record_length(&self) -> Result<usize, Error> {
        match self.song_record_length {
            Some(record_length) => Ok(record_length),
            None => layout(self.step.from)
                .map(|layout| layout.record_length)
                .ok_or(Error::UnknownLayout(self.step.from)),
        }
    }

    /// Migrate the bytes of a preset file.
    pub fn migrate_preset(&self, bytes: &[u8]) -> Result<Vec<u8>, Error> {
        let mut preset = Preset::from_slice(bytes)?;

        if let Some(layout) = layout(self.step.from) {
            let found = preset.instrument.record_length();
            if found < layout.record_length {
                return Err(Error::FileLength {
                    expected: PRESET_HEADER_LENGTH + layout.record_length,
                    found: bytes.len(),
                });
            }
            if found > layout.record_length {
                warn!(
                    expected = layout.record_length,
                    found, "Preset record length differs from version {} layout", layout.version
                );
            }
        }

        preset.instrument = self.step.apply(&preset.instrument)?;
        Ok(preset.to_bytes())
    }

    /// Migrate the bytes of a song file.
    pub fn migrate_song(&self, bytes: &[u8]) -> Result<Vec<u8>, Error> {
        let mut song = Song::from_slice(bytes, self.resolve_song_record_length()?)?;

        song.instruments = self.step.apply(&song.instruments)?;
        Ok(song.to_bytes())
    }

    pub fn migrate_bytes(&self, kind: FileKind, bytes: &[u8]) -> Result<Vec<u8>, Error> {
        match kind {
            FileKind::Preset => self.migrate_preset(bytes),
            FileKind::Song => self.migrate_song(bytes),
        }
    }

    /// Read, migrate, and overwrite one file.
    pub fn migrate_file(&self, path: &Path, kind: FileKind) -> Result<(), Error> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        let migrated = self.migrate_bytes(kind, &bytes)?;

        if self.dry_run {
            debug!(path = %path.display(), bytes = migrated.len(), "Dry run, not writing");
            return Ok(());
        }

        write_atomic(path, &migrated)
    }

    /// Migrate every preset and song directly inside `dir`.
    ///
    /// Configuration and directory listing errors abort before any file is
    /// touched. Errors on individual files are collected in the report.
    pub fn run(&self, dir: &Path) -> Result<Report, Error> {
        let files = discover(dir)?;
        if files.iter().any(|&(_, kind)| kind == FileKind::Song) {
            self.resolve_song_record_length()?;
        }

        info!(
            from = self.step.from,
            to = self.step.to(),
            files = files.len(),
            "Migrating: {}",
            self.step.description
        );

        let mut report = Report::default();
        for (path, kind) in files {
            let result = self.migrate_file(&path, kind);

            match &result {
                Ok(()) => info!(path = %path.display(), ?kind, "Migrated"),
                Err(e) => warn!(path = %path.display(), ?kind, error = %e, "Migration failed"),
            }

            report.outcomes.push(Outcome { path, kind, result });
        }

        Ok(report)
    }
}

/// Replace `path` with `bytes` via a temporary file in the same directory, so
/// an interrupted write never leaves a truncated file behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let permissions = fs::metadata(path)
        .map_err(|e| Error::io(path, e))?
        .permissions();

    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::io(path, e))?;
    file.write_all(bytes).map_err(|e| Error::io(path, e))?;
    file.as_file()
        .set_permissions(permissions)
        .map_err(|e| Error::io(path, e))?;
    file.persist(path).map_err(|e| Error::io(path, e.error))?;

    Ok(())
}
