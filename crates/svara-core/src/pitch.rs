//! Conversions between frequency, note number and cents

use serde::{Deserialize, Serialize};

use crate::error::{Result, SvaraError};
use crate::note::ChromaticNote;

/// A4
pub const REFERENCE_NOTE_NUMBER: i32 = 69;
pub const REFERENCE_FREQUENCY: f64 = 440.0;

const CENTS_PER_OCTAVE: f64 = 1200.0;

fn check_frequency(hz: f64) -> Result<f64> {
    if hz.is_finite() && hz > 0.0 {
        Ok(hz)
    } else {
        Err(SvaraError::InvalidFrequency(hz))
    }
}

/// Nearest note number for a frequency.
///
/// Halfway cases round away from zero (`f64::round`).
pub fn frequency_to_note_number(hz: f64) -> Result<i32> {
    let hz = check_frequency(hz)?;
    let semitones = 12.0 * (hz / REFERENCE_FREQUENCY).log2();
    Ok(semitones.round() as i32 + REFERENCE_NOTE_NUMBER)
}

/// Equal-tempered frequency of a note number.
///
/// Underflows to `0.0` and overflows to infinity far outside the audible range.
pub fn note_number_to_frequency(note_number: i32) -> f64 {
    let semitones = note_number as f64 - REFERENCE_NOTE_NUMBER as f64;
    REFERENCE_FREQUENCY * 2f64.powf(semitones / 12.0)
}

/// Octave of a note number; 60 is in octave 4, 0 in octave -1
pub fn note_number_to_octave(note_number: i32) -> i32 {
    note_number.div_euclid(12) - 1
}

pub fn note_number_to_pitch_class(note_number: i32) -> ChromaticNote {
    ChromaticNote::ALL[note_number.rem_euclid(12) as usize]
}

/// Scientific pitch name, e.g. `A4` for 69
pub fn note_number_name(note_number: i32) -> String {
    format!(
        "{}{}",
        note_number_to_pitch_class(note_number),
        note_number_to_octave(note_number)
    )
}

/// Signed offset in cents of `measured_hz` from the canonical frequency of
/// `reference_note_number`, floored. Negative is flat, positive is sharp.
///
/// Fails when the reference note has no representable frequency or the
/// offset does not fit in an `i32`.
pub fn detune_cents(measured_hz: f64, reference_note_number: i32) -> Result<i32> {
    let hz = check_frequency(measured_hz)?;
    let reference = check_frequency(note_number_to_frequency(reference_note_number))?;
    let cents = (CENTS_PER_OCTAVE * (hz / reference).log2()).floor();
    if !(cents.is_finite() && (i32::MIN as f64..=i32::MAX as f64).contains(&cents)) {
        return Err(SvaraError::InvalidFrequency(hz));
    }
    Ok(cents as i32)
}

/// A measured frequency resolved against the nearest equal-tempered note
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchReading {
    pub frequency: f64,
    pub note_number: i32,
    pub note: ChromaticNote,
    pub octave: i32,
    /// Detune from `note_number`, within [-50, 50]
    pub cents: i32,
}

impl PitchReading {
    pub fn from_frequency(hz: f64) -> Result<Self> {
        let note_number = frequency_to_note_number(hz)?;
        Ok(Self {
            frequency: hz,
            note_number,
            note: note_number_to_pitch_class(note_number),
            octave: note_number_to_octave(note_number),
            // exact half-semitones round up a note and floor to -51
            cents: detune_cents(hz, note_number)?.clamp(-50, 50),
        })
    }

    pub fn name(&self) -> String {
        note_number_name(self.note_number)
    }
}
