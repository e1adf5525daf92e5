pub(crate) const PRESET_HEADER_LENGTH: usize = 4;
pub(crate) const SONG_HEADER_LENGTH: usize = 7;
pub(crate) const NUM_SLOTS: usize = 32;

pub(crate) const PRESET_EXTENSION: &str = "COP";
pub(crate) const SONG_EXTENSION: &str = "COS";

pub(crate) const NUM_OSCILLATORS: usize = 4;
