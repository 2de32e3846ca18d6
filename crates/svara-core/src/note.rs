//! The 12-tone chromatic alphabet

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SvaraError};

/// A pitch class in 12-tone equal temperament, spelled with sharps.
///
/// The canonical ordering starts at C (index 0). Index arithmetic is mod 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChromaticNote {
    C,
    #[serde(rename = "C#")]
    CSharp,
    D,
    #[serde(rename = "D#")]
    DSharp,
    E,
    F,
    #[serde(rename = "F#")]
    FSharp,
    G,
    #[serde(rename = "G#")]
    GSharp,
    A,
    #[serde(rename = "A#")]
    ASharp,
    B,
}

/// The natural (unaltered) notes in canonical order.
pub const NATURALS: [ChromaticNote; 7] = [
    ChromaticNote::C,
    ChromaticNote::D,
    ChromaticNote::E,
    ChromaticNote::F,
    ChromaticNote::G,
    ChromaticNote::A,
    ChromaticNote::B,
];

impl ChromaticNote {
    /// All 12 notes, starting at C.
    pub const ALL: [ChromaticNote; 12] = [
        Self::C,
        Self::CSharp,
        Self::D,
        Self::DSharp,
        Self::E,
        Self::F,
        Self::FSharp,
        Self::G,
        Self::GSharp,
        Self::A,
        Self::ASharp,
        Self::B,
    ];

    /// Position in the C-based alphabet (0..12)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Note at `index` mod 12
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    /// Transpose by a (possibly negative) number of semitones, wrapping around the octave.
    pub fn transpose(self, semitones: i32) -> Self {
        let idx = (self.index() as i32 + semitones.rem_euclid(12)).rem_euclid(12);
        Self::ALL[idx as usize]
    }

    /// Upward distance in semitones from `from` to `self` (0..12)
    pub fn semitones_from(self, from: ChromaticNote) -> usize {
        (self.index() + 12 - from.index()) % 12
    }

    /// The alphabet rotated to start at `start`.
    ///
    /// `cycle_from(ChromaticNote::A)` yields the A-based ordering
    /// `A A# B C ... G#`.
    pub fn cycle_from(start: ChromaticNote) -> [ChromaticNote; 12] {
        let mut notes = Self::ALL;
        notes.rotate_left(start.index());
        notes
    }

    pub fn is_natural(self) -> bool {
        NATURALS.contains(&self)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::CSharp => "C#",
            Self::D => "D",
            Self::DSharp => "D#",
            Self::E => "E",
            Self::F => "F",
            Self::FSharp => "F#",
            Self::G => "G",
            Self::GSharp => "G#",
            Self::A => "A",
            Self::ASharp => "A#",
            Self::B => "B",
        }
    }
}

impl fmt::Display for ChromaticNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChromaticNote {
    type Err = SvaraError;

    /// Parses one of the 12 sharp spellings. The letter is case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = chars.next().map(|c| c.to_ascii_uppercase());
        let accidental = chars.as_str();

        let note = match (letter, accidental) {
            (Some('C'), "") => Self::C,
            (Some('C'), "#") => Self::CSharp,
            (Some('D'), "") => Self::D,
            (Some('D'), "#") => Self::DSharp,
            (Some('E'), "") => Self::E,
            (Some('F'), "") => Self::F,
            (Some('F'), "#") => Self::FSharp,
            (Some('G'), "") => Self::G,
            (Some('G'), "#") => Self::GSharp,
            (Some('A'), "") => Self::A,
            (Some('A'), "#") => Self::ASharp,
            (Some('B'), "") => Self::B,
            _ => return Err(SvaraError::InvalidNote(s.to_string())),
        };
        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_names() {
        for note in ChromaticNote::ALL {
            assert_eq!(note.name().parse::<ChromaticNote>().unwrap(), note);
        }
        assert_eq!("f#".parse::<ChromaticNote>().unwrap(), ChromaticNote::FSharp);
        assert_eq!(" A ".parse::<ChromaticNote>().unwrap(), ChromaticNote::A);
    }

    #[test]
    fn test_parse_rejects_non_alphabet() {
        for bad in ["H", "", "E#", "Bb", "C##", "#"] {
            assert!(
                matches!(bad.parse::<ChromaticNote>(), Err(SvaraError::InvalidNote(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_index_arithmetic_wraps() {
        assert_eq!(ChromaticNote::B.transpose(1), ChromaticNote::C);
        assert_eq!(ChromaticNote::C.transpose(-1), ChromaticNote::B);
        assert_eq!(ChromaticNote::A.transpose(27), ChromaticNote::C);
        assert_eq!(ChromaticNote::from_index(14), ChromaticNote::D);
        assert_eq!(ChromaticNote::C.semitones_from(ChromaticNote::A), 3);
        assert_eq!(ChromaticNote::A.semitones_from(ChromaticNote::C), 9);
    }

    #[test]
    fn test_transpose_extremes() {
        // i32::MAX = 7 (mod 12), i32::MIN = 4 (mod 12)
        assert_eq!(ChromaticNote::C.transpose(i32::MAX), ChromaticNote::G);
        assert_eq!(ChromaticNote::B.transpose(i32::MAX), ChromaticNote::FSharp);
        assert_eq!(ChromaticNote::C.transpose(i32::MIN), ChromaticNote::E);
        assert_eq!(ChromaticNote::A.transpose(i32::MIN), ChromaticNote::CSharp);
    }

    #[test]
    fn test_cycle_from_a() {
        let from_a = ChromaticNote::cycle_from(ChromaticNote::A);
        assert_eq!(from_a[0], ChromaticNote::A);
        assert_eq!(from_a[3], ChromaticNote::C);
        assert_eq!(from_a[11], ChromaticNote::GSharp);
    }

    #[test]
    fn test_naturals() {
        assert_eq!(ChromaticNote::ALL.iter().filter(|n| n.is_natural()).count(), 7);
        assert!(!ChromaticNote::DSharp.is_natural());
    }
}
