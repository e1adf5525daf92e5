use crate::errors::Error;

/// A set of instrument records of equal length, stored one record after the
/// other (the logical, per-instrument view).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordTable {
    count: usize,
    record_length: usize,
    data: Vec<u8>,
}

impl RecordTable {
    /// Wrap `count` records of `record_length` bytes each.
    pub fn new(count: usize, record_length: usize, data: Vec<u8>) -> Result<Self, Error> {
        if count.checked_mul(record_length) != Some(data.len()) {
            return Err(Error::TableShape {
                count,
                record_length,
                found: data.len(),
            });
        }

        Ok(Self {
            count,
            record_length,
            data,
        })
    }

    /// A table holding exactly one record.
    pub fn single(record: Vec<u8>) -> Self {
        Self {
            count: 1,
            record_length: record.len(),
            data: record,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn record_length(&self) -> usize {
        self.record_length
    }

    pub fn record(&self, i: usize) -> &[u8] {
        let start = i * self.record_length;
        &self.data[start..start + self.record_length]
    }

    pub fn record_mut(&mut self, i: usize) -> &mut [u8] {
        let start = i * self.record_length;
        &mut self.data[start..start + self.record_length]
    }

    pub fn records(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.count).map(move |i| self.record(i))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
