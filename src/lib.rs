//! Offline tools for Concerto instrument data.
//!
//! Presets (`.COP`) and songs (`.COS`) store instrument records in a byte
//! layout that changes as the sound engine evolves. A [`Step`] migrates every
//! record of a file from one layout version to the next, and a [`Migration`]
//! applies a step to all files in a directory.

#![forbid(unsafe_code)]

mod consts;
mod errors;
pub mod layout;
mod migrate;
pub mod pitch;
mod preset;
mod registry;
mod song;
mod step;
mod table;

pub use errors::{Error, ErrorKind};
pub use migrate::{discover, FileKind, Migration, Outcome, Report};
pub use preset::Preset;
pub use registry::Registry;
pub use song::Song;
pub use step::{Edit, Insert, Step};
pub use table::RecordTable;

/// Number of instrument slots in a song.
pub const NUM_SLOTS: usize = consts::NUM_SLOTS;
