//! MIDI note frequency table for the VERA PSG, emitted as 6502 assembly.

use byteorder::{ByteOrder, LittleEndian};
use std::io::{self, Write};

use crate::errors::Error;

/// VERA PSG sample rate: 25 MHz / 512.
pub const PLAYBACK_SAMPLE_RATE: f64 = 25.0e6 / 512.0;

/// Notes in the firmware's table.
pub const NUM_NOTES: usize = 139;

// output_frequency = sample_rate / 2^17 * frequency_word
const FREQUENCY_WORD_SCALE: f64 = (1 << 17) as f64;

/// Frequency words for MIDI notes `0..notes`.
#[derive(Debug)]
pub struct PitchTable {
    words: Vec<u16>,
}

/// Equal temperament, A4 (note 69) = 440 Hz.
pub fn note_frequency(note: usize) -> f64 {
    440.0 * 2_f64.powf((note as f64 - 69.0) / 12.0)
}

impl PitchTable {
    /// Fails if a note's frequency word does not fit in 16 bits.
    pub fn new(notes: usize, sample_rate: f64) -> Result<Self, Error> {
        let words = (0..notes)
            .map(|note| {
                let word = note_frequency(note) * FREQUENCY_WORD_SCALE / sample_rate;
                if word.is_finite() && word < f64::from(u16::MAX) + 1.0 {
                    Ok(word as u16)
                } else {
                    Err(Error::NoteRange { note, word })
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { words })
    }

    pub fn words(&self) -> &[u16] {
        &self.words
    }

    pub fn word(&self, note: usize) -> Option<u16> {
        self.words.get(note).copied()
    }

    /// Write the high bytes under `pitch_dataH:`, then the low bytes under
    /// `pitch_dataL:`, one `.byte` directive per note.
    pub fn write_asm<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let mut high = Vec::with_capacity(self.words.len());
        let mut low = Vec::with_capacity(self.words.len());

        let mut buf = [0; 2];
        for &word in &self.words {
            LittleEndian::write_u16(&mut buf, word);
            low.push(buf[0]);
            high.push(buf[1]);
        }

        writeln!(writer, "pitch_dataH:")?;
        for byte in high {
            writeln!(writer, "   .byte {}", byte)?;
        }

        writeln!(writer, "pitch_dataL:")?;
        for byte in low {
            writeln!(writer, "   .byte {}", byte)?;
        }

        Ok(())
    }
}
