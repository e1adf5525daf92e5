use crate::consts::{NUM_SLOTS, SONG_HEADER_LENGTH};
use crate::errors::Error;
use crate::table::RecordTable;

/// A `Song` (`.COS`) contains a 7-byte header, a table of 32 instrument slots,
/// and the track data that follows it.
///
/// On disk the instrument table is stored column-wise: byte `k` of every slot
/// comes before byte `k + 1` of any slot. `Song` holds the table transposed
/// back into one contiguous record per slot, so migrations never see the
/// storage order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Song {
    pub header: [u8; SONG_HEADER_LENGTH],
    pub instruments: RecordTable,
    pub tracks: Vec<u8>,
}

impl Song {
    /// Create a new `Song` from a byte slice, given the record length of the
    /// layout version the file is stored in.
    pub fn from_slice(slice: &[u8], record_length: usize) -> Result<Song, Error> {
        let too_short = |expected: usize| Error::FileLength {
            expected,
            found: slice.len(),
        };

        // A record length this large cannot describe any file.
        let table_length = NUM_SLOTS
            .checked_mul(record_length)
            .ok_or_else(|| too_short(usize::MAX))?;
        let expected = SONG_HEADER_LENGTH
            .checked_add(table_length)
            .ok_or_else(|| too_short(usize::MAX))?;
        if slice.len() < expected {
            return Err(too_short(expected));
        }

        let mut header = [0; SONG_HEADER_LENGTH];
        header.copy_from_slice(&slice[..SONG_HEADER_LENGTH]);

        let columns = &slice[SONG_HEADER_LENGTH..expected];
        let mut data = vec![0; table_length];
        for (k, row) in columns.chunks_exact(NUM_SLOTS).enumerate() {
            for (slot, &byte) in row.iter().enumerate() {
                data[slot * record_length + k] = byte;
            }
        }

        Ok(Song {
            header,
            instruments: RecordTable::new(NUM_SLOTS, record_length, data)?,
            tracks: slice[expected..].to_vec(),
        })
    }

    /// Serialize the song, transposing the instrument table back into its
    /// column-wise storage order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let record_length = self.instruments.record_length();
        let table_length = self.instruments.len() * record_length;

        let mut bytes = Vec::with_capacity(SONG_HEADER_LENGTH + table_length + self.tracks.len());
        bytes.extend_from_slice(&self.header);

        for k in 0..record_length {
            bytes.extend(self.instruments.records().map(|record| record[k]));
        }

        bytes.extend_from_slice(&self.tracks);
        bytes
    }
}
