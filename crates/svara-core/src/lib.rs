//! svara-core: Note, sargam and pitch primitives for Svara Darshini

pub mod detect;
mod error;
pub mod note;
pub mod pitch;
pub mod sargam;

pub use detect::{DetectorConfig, PitchDetector};
pub use error::{Result, SvaraError};
pub use note::{ChromaticNote, NATURALS};
pub use pitch::{
    detune_cents, frequency_to_note_number, note_number_name, note_number_to_frequency,
    note_number_to_octave, note_number_to_pitch_class, PitchReading, REFERENCE_FREQUENCY,
    REFERENCE_NOTE_NUMBER,
};
pub use sargam::{
    chromatic_degree, degree_for_offset, keys_to_notes, notes_to_sargam, notes_to_sargam_str,
    sargam_for_note, sargam_for_note_str, SargamDegree, MAJOR_SCALE_OFFSETS,
};
