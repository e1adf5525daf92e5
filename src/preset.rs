use crate::consts::PRESET_HEADER_LENGTH;
use crate::errors::Error;
use crate::table::RecordTable;

/// A standalone instrument preset (`.COP`): a 4-byte header followed by one
/// instrument record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Preset {
    pub header: [u8; PRESET_HEADER_LENGTH],
    pub instrument: RecordTable,
}

impl Preset {
    pub fn new(header: [u8; PRESET_HEADER_LENGTH], record: Vec<u8>) -> Self {
        Self {
            header,
            instrument: RecordTable::single(record),
        }
    }

    /// Create a new `Preset` from a byte slice. Everything after the header is
    /// the instrument record, whatever its length.
    pub fn from_slice(slice: &[u8]) -> Result<Preset, Error> {
        if slice.len() < PRESET_HEADER_LENGTH {
            return Err(Error::FileLength {
                expected: PRESET_HEADER_LENGTH,
                found: slice.len(),
            });
        }

        let (header, record) = slice.split_at(PRESET_HEADER_LENGTH);
        let mut buf = [0; PRESET_HEADER_LENGTH];
        buf.copy_from_slice(header);

        Ok(Preset::new(buf, record.to_vec()))
    }

    /// Serialize the preset. The record length is not checked.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PRESET_HEADER_LENGTH + self.instrument.as_bytes().len());
        bytes.extend_from_slice(&self.header);
        bytes.extend_from_slice(self.instrument.as_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_ok() {
        let preset = Preset::from_slice(&[1, 2, 3, 4, 10, 11, 12]).unwrap();

        assert_eq!(preset.header, [1, 2, 3, 4]);
        assert_eq!(preset.instrument.len(), 1);
        assert_eq!(preset.instrument.record(0), &[10, 11, 12]);
    }

    #[test]
    fn header_only() {
        let preset = Preset::from_slice(&[1, 2, 3, 4]).unwrap();

        assert_eq!(preset.instrument.record_length(), 0);
        assert_eq!(preset.to_bytes(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn too_short() {
        let error = Preset::from_slice(&[1, 2, 3]).unwrap_err();
        assert!(matches!(
            error,
            Error::FileLength {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn round_trip() {
        let bytes: Vec<u8> = (0..=255).collect();
        let preset = Preset::from_slice(&bytes).unwrap();

        assert_eq!(preset.to_bytes(), bytes);
    }
}
