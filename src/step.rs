//! Migration steps, expressed as field-level operations on instrument records.

use std::num::Wrapping as w;

use crate::consts::NUM_OSCILLATORS;
use crate::errors::Error;
use crate::layout::*;
use crate::table::RecordTable;

/// An in-place change to one byte of every record.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Edit {
    /// Add `amount`, wrapping at 256.
    Add { offset: usize, amount: u8 },

    /// Set `target` to `value` where the byte at `test` is one of `any_of`.
    /// The test always reads the record as it was before the step.
    SetWhere {
        test: usize,
        any_of: &'static [u8],
        target: usize,
        value: u8,
    },
}

/// Constant bytes spliced into every record in front of `offset`, an offset
/// into the record as it was before the step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Insert {
    pub offset: usize,
    pub bytes: &'static [u8],
}

/// Migrates every record of a file from version `from` to `from + 1`.
///
/// Edits run first, in record coordinates of the old version. Inserts follow
/// in ascending offset order. The output record is always
/// [`growth`](Step::growth) bytes longer than the input.
#[derive(Debug)]
pub struct Step {
    pub from: u32,
    pub description: &'static str,
    pub edits: &'static [Edit],
    pub inserts: &'static [Insert],
}

impl Edit {
    fn last_offset(&self) -> usize {
        match *self {
            Edit::Add { offset, .. } => offset,
            Edit::SetWhere { test, target, .. } => test.max(target),
        }
    }

    fn apply(&self, original: &[u8], record: &mut [u8]) {
        match *self {
            Edit::Add { offset, amount } => {
                record[offset] = (w(original[offset]) + w(amount)).0;
            }
            Edit::SetWhere {
                test,
                any_of,
                target,
                value,
            } => {
                if any_of.contains(&original[test]) {
                    record[target] = value;
                }
            }
        }
    }
}

impl Step {
    pub fn to(&self) -> u32 {
        self.from + 1
    }

    /// Number of bytes each record gains.
    pub fn growth(&self) -> usize {
        self.inserts.iter().map(|insert| insert.bytes.len()).sum()
    }

    /// Shortest input record the step can address.
    pub fn min_record_length(&self) -> usize {
        let edits = self.edits.iter().map(|edit| edit.last_offset() + 1);
        let inserts = self.inserts.iter().map(|insert| insert.offset);

        edits.chain(inserts).max().unwrap_or(0)
    }

    /// Record length after the step, or `None` if it does not fit a `usize`.
    pub fn output_length(&self, record_length: usize) -> Option<usize> {
        record_length.checked_add(self.growth())
    }

    /// Migrate all records of a table. The input is left untouched.
    ///
    /// Fails if a record is too short for the step or the inserts are not in
    /// ascending offset order.
    pub fn apply(&self, table: &RecordTable) -> Result<RecordTable, Error> {
        let record_length = table.record_length();
        let expected = self.min_record_length();
        if record_length < expected {
            return Err(Error::RecordLength {
                from: self.from,
                to: self.to(),
                expected,
                found: record_length,
            });
        }

        if let Some(pair) = self
            .inserts
            .windows(2)
            .find(|pair| pair[0].offset > pair[1].offset)
        {
            return Err(Error::InsertOrder {
                from: self.from,
                offset: pair[1].offset,
            });
        }

        let too_large = || Error::TableShape {
            count: table.len(),
            record_length,
            found: table.as_bytes().len(),
        };
        let output_length = self.output_length(record_length).ok_or_else(too_large)?;
        let capacity = table
            .len()
            .checked_mul(output_length)
            .ok_or_else(too_large)?;

        let mut data = Vec::with_capacity(capacity);
        let mut record = Vec::with_capacity(record_length);

        for original in table.records() {
            record.clear();
            record.extend_from_slice(original);
            for edit in self.edits {
                edit.apply(original, &mut record);
            }

            let mut start = 0;
            for insert in self.inserts {
                data.extend_from_slice(&record[start..insert.offset]);
                data.extend_from_slice(insert.bytes);
                start = insert.offset;
            }
            data.extend_from_slice(&record[start..]);
        }

        RecordTable::new(table.len(), output_length, data)
    }
}

// The PSG pitch now matches FM multiplier 1 instead of 0, so FM voices drop an octave.
const FM_REPITCH: u8 = 12;

pub(crate) static V0_TO_V1: Step = Step {
    from: 0,
    description: "re-pitch FM voice, insert LFO settings",
    edits: &[Edit::Add {
        offset: FM_PITCH.offset,
        amount: FM_REPITCH,
    }],
    inserts: &[
        Insert {
            offset: V0_LFO_INSERT,
            bytes: &LFO_DEFAULTS,
        },
        Insert {
            offset: V0_OP_SENS_INSERT,
            bytes: &OP_VOL_SENS_DEFAULTS,
        },
    ],
};

const SAWTOOTH: u8 = 64;
const TRIANGLE: u8 = 128;
const FULL_WIDTH_WAVEFORMS: [u8; 2] = [SAWTOOTH, TRIANGLE];

const FULL_PULSE_WIDTH: u8 = 63;
const PWM_SOURCE_NONE: u8 = 128;

const fn pulse_width_edits() -> [Edit; 2 * NUM_OSCILLATORS] {
    let mut edits = [Edit::Add {
        offset: 0,
        amount: 0,
    }; 2 * NUM_OSCILLATORS];

    let mut i = 0;
    while i < NUM_OSCILLATORS {
        edits[2 * i] = Edit::SetWhere {
            test: OSC_WAVEFORM.at(i),
            any_of: &FULL_WIDTH_WAVEFORMS,
            target: OSC_PULSE_WIDTH.at(i),
            value: FULL_PULSE_WIDTH,
        };
        edits[2 * i + 1] = Edit::SetWhere {
            test: OSC_WAVEFORM.at(i),
            any_of: &FULL_WIDTH_WAVEFORMS,
            target: OSC_PWM_SOURCE.at(i),
            value: PWM_SOURCE_NONE,
        };
        i += 1;
    }

    edits
}

const V1_TO_V2_EDITS: [Edit; 2 * NUM_OSCILLATORS] = pulse_width_edits();

pub(crate) static V1_TO_V2: Step = Step {
    from: 1,
    description: "full pulse width for sawtooth and triangle oscillators",
    edits: &V1_TO_V2_EDITS,
    inserts: &[],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn record_of(length: usize) -> Vec<u8> {
        (0..length).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn v0_v1_repitch_wraps() {
        let mut record = record_of(126);
        record[101] = 250;

        let table = V0_TO_V1.apply(&RecordTable::single(record)).unwrap();
        assert_eq!(table.record(0)[101], 6);

        let mut record = record_of(126);
        record[101] = 30;

        let table = V0_TO_V1.apply(&RecordTable::single(record)).unwrap();
        assert_eq!(table.record(0)[101], 42);
    }

    #[test]
    fn v0_v1_splice() {
        let record = record_of(126);
        let table = V0_TO_V1.apply(&RecordTable::single(record.clone())).unwrap();
        let out = table.record(0);

        assert_eq!(out.len(), record.len() + 11);
        assert_eq!(out[..101], record[..101]);
        assert_eq!(out[102..106], record[102..106]);
        assert_eq!(out[106..113], [0, 127, 127, 2, 210, 0, 0]);
        assert_eq!(out[113..121], record[106..114]);
        assert_eq!(out[121..125], [0, 0, 0, 0]);
        assert_eq!(out[125..], record[114..]);
    }

    #[test]
    fn v0_v1_shortest_record() {
        // The second insert may sit at the very end of the record.
        let table = V0_TO_V1.apply(&RecordTable::single(record_of(114))).unwrap();
        assert_eq!(table.record_length(), 125);
        assert_eq!(table.record(0)[121..], [0, 0, 0, 0]);

        let error = V0_TO_V1
            .apply(&RecordTable::single(record_of(113)))
            .unwrap_err();
        assert!(matches!(
            error,
            Error::RecordLength {
                from: 0,
                to: 1,
                expected: 114,
                found: 113
            }
        ));
    }

    #[test]
    fn v0_v1_every_slot() {
        let mut data = Vec::new();
        for slot in 0..32 {
            data.extend(std::iter::repeat(slot as u8).take(126));
        }
        let table = RecordTable::new(32, 126, data).unwrap();

        let out = V0_TO_V1.apply(&table).unwrap();
        assert_eq!(out.len(), 32);
        assert_eq!(out.record_length(), 137);
        for (slot, record) in out.records().enumerate() {
            assert_eq!(record[0], slot as u8);
            assert_eq!(record[101], slot as u8 + 12);
            assert_eq!(record[106..113], LFO_DEFAULTS);
            assert_eq!(record[136], slot as u8);
        }
    }

    #[test]
    fn v1_v2_full_width_waveforms() {
        for &waveform in &[SAWTOOTH, TRIANGLE] {
            let mut record = record_of(137);
            record[81] = waveform;
            record[85] = 5;
            record[89] = 7;

            let table = V1_TO_V2.apply(&RecordTable::single(record.clone())).unwrap();
            let out = table.record(0);

            assert_eq!(out[85], 63);
            assert_eq!(out[89], 128);
            // Other oscillators keep their values.
            assert_eq!(out[86..89], record[86..89]);
            assert_eq!(out[90..93], record[90..93]);
        }
    }

    #[test]
    fn v1_v2_other_waveforms_untouched() {
        for &waveform in &[0, 1, 63, 65, 127, 129, 192, 255] {
            let mut record = record_of(137);
            for i in 0..NUM_OSCILLATORS {
                record[81 + i] = waveform;
            }

            let table = V1_TO_V2.apply(&RecordTable::single(record.clone())).unwrap();
            assert_eq!(table.record(0), &record[..]);
        }
    }

    #[test]
    fn v1_v2_per_oscillator() {
        let mut record = vec![0; 137];
        record[81..85].copy_from_slice(&[0, SAWTOOTH, 192, TRIANGLE]);
        record[85..89].copy_from_slice(&[1, 2, 3, 4]);
        record[89..93].copy_from_slice(&[9, 9, 9, 9]);

        let table = V1_TO_V2.apply(&RecordTable::single(record)).unwrap();
        let out = table.record(0);

        assert_eq!(out[85..89], [1, 63, 3, 63]);
        assert_eq!(out[89..93], [9, 128, 9, 128]);
        assert_eq!(out.len(), 137);
    }

    #[test]
    fn declared_shapes() {
        assert_eq!(V0_TO_V1.growth(), 11);
        assert_eq!(V0_TO_V1.min_record_length(), 114);
        assert_eq!(V1_TO_V2.growth(), 0);
        assert_eq!(V1_TO_V2.min_record_length(), 93);

        for step in &[&V0_TO_V1, &V1_TO_V2] {
            let offsets: Vec<_> = step.inserts.iter().map(|insert| insert.offset).collect();
            let mut sorted = offsets.clone();
            sorted.sort_unstable();
            assert_eq!(offsets, sorted);
        }
    }

    #[test]
    fn lengths_match_layouts() {
        for step in &[&V0_TO_V1, &V1_TO_V2] {
            let from = layout(step.from).unwrap();
            let to = layout(step.to()).unwrap();
            assert_eq!(step.output_length(from.record_length), Some(to.record_length));
        }
    }

    #[test]
    fn unordered_inserts() {
        static UNORDERED: Step = Step {
            from: 7,
            description: "inserts out of order",
            edits: &[],
            inserts: &[
                Insert {
                    offset: 4,
                    bytes: &[1],
                },
                Insert {
                    offset: 2,
                    bytes: &[2],
                },
            ],
        };

        let error = UNORDERED
            .apply(&RecordTable::single(record_of(8)))
            .unwrap_err();
        assert!(matches!(error, Error::InsertOrder { from: 7, offset: 2 }));
        assert_eq!(error.kind(), crate::errors::ErrorKind::Config);
    }

    #[test]
    fn same_offset_inserts() {
        static ADJACENT: Step = Step {
            from: 7,
            description: "two blocks at one offset",
            edits: &[],
            inserts: &[
                Insert {
                    offset: 2,
                    bytes: &[0xa],
                },
                Insert {
                    offset: 2,
                    bytes: &[0xb],
                },
            ],
        };

        let table = ADJACENT.apply(&RecordTable::single(vec![1, 2, 3])).unwrap();
        assert_eq!(table.record(0), &[1, 2, 0xa, 0xb, 3]);
    }

    #[test]
    fn output_length_overflow() {
        assert_eq!(V0_TO_V1.output_length(usize::MAX - 10), None);

        let table = RecordTable::new(0, usize::MAX - 10, Vec::new()).unwrap();
        let error = V0_TO_V1.apply(&table).unwrap_err();
        assert!(matches!(error, Error::TableShape { .. }));
    }

    #[test]
    fn empty_table() {
        let table = RecordTable::new(0, 126, Vec::new()).unwrap();
        let out = V0_TO_V1.apply(&table).unwrap();

        assert!(out.is_empty());
        assert_eq!(out.record_length(), 137);
    }
}
