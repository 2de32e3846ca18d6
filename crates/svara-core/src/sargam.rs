//! Sargam degrees and their mapping onto chromatic notes

use serde::{Deserialize, Serialize};

use crate::error::{Result, SvaraError};
use crate::note::ChromaticNote;

/// Semitone offsets of the seven pure degrees from the tonic
/// (whole, whole, half, whole, whole, whole, half).
pub const MAJOR_SCALE_OFFSETS: [usize; 7] = [0, 2, 4, 5, 7, 9, 11];

/// One of the 12 sargam degrees, indexed by semitone offset from Sa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SargamDegree {
    Sa,
    FlatRe,
    Re,
    FlatGa,
    Ga,
    Ma,
    SharpMa,
    Pa,
    FlatDha,
    Dha,
    FlatNi,
    Ni,
}

impl SargamDegree {
    /// All degrees in semitone order
    pub const ALL: [SargamDegree; 12] = [
        Self::Sa,
        Self::FlatRe,
        Self::Re,
        Self::FlatGa,
        Self::Ga,
        Self::Ma,
        Self::SharpMa,
        Self::Pa,
        Self::FlatDha,
        Self::Dha,
        Self::FlatNi,
        Self::Ni,
    ];

    /// Sa Re Ga Ma Pa Dha Ni
    pub const PURE: [SargamDegree; 7] = [
        Self::Sa,
        Self::Re,
        Self::Ga,
        Self::Ma,
        Self::Pa,
        Self::Dha,
        Self::Ni,
    ];

    /// Semitones above Sa
    pub fn offset(self) -> usize {
        self as usize
    }

    pub fn is_pure(self) -> bool {
        MAJOR_SCALE_OFFSETS.contains(&self.offset())
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sa => "Sa",
            Self::FlatRe => "Flat Re",
            Self::Re => "Re",
            Self::FlatGa => "Flat Ga",
            Self::Ga => "Ga",
            Self::Ma => "Ma",
            Self::SharpMa => "Sharp Ma",
            Self::Pa => "Pa",
            Self::FlatDha => "Flat Dha",
            Self::Dha => "Dha",
            Self::FlatNi => "Flat Ni",
            Self::Ni => "Ni",
        }
    }

    /// Single-character shorthand. Pure degrees are lowercase, altered ones uppercase.
    pub fn key(self) -> char {
        match self {
            Self::Sa => 's',
            Self::FlatRe => 'R',
            Self::Re => 'r',
            Self::FlatGa => 'G',
            Self::Ga => 'g',
            Self::Ma => 'm',
            Self::SharpMa => 'M',
            Self::Pa => 'p',
            Self::FlatDha => 'D',
            Self::Dha => 'd',
            Self::FlatNi => 'N',
            Self::Ni => 'n',
        }
    }

    /// Reverse lookup of [`SargamDegree::key`]
    pub fn from_key(key: char) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|degree| degree.key() == key)
            .ok_or(SvaraError::InvalidKey(key))
    }

    /// The chromatic note this degree lands on for `tonic`
    pub fn note_for(self, tonic: ChromaticNote) -> ChromaticNote {
        tonic.transpose(self.offset() as i32)
    }
}

/// The seven notes of the major scale built on `tonic`, in degree order.
///
/// ```
/// use svara_core::{notes_to_sargam, ChromaticNote::*};
/// assert_eq!(notes_to_sargam(A), [A, B, CSharp, D, E, FSharp, GSharp]);
/// ```
pub fn notes_to_sargam(tonic: ChromaticNote) -> [ChromaticNote; 7] {
    MAJOR_SCALE_OFFSETS.map(|offset| ChromaticNote::from_index(tonic.index() + offset))
}

/// [`notes_to_sargam`] for an unvalidated tonic name
pub fn notes_to_sargam_str(tonic: &str) -> Result<[ChromaticNote; 7]> {
    Ok(notes_to_sargam(tonic.parse()?))
}

/// Pure degree of `note` within the major scale of `tonic`.
///
/// Only the seven diatonic members have a degree here; any other note is
/// reported as [`SvaraError::DegreeNotFound`]. Use [`chromatic_degree`] to
/// name altered degrees.
pub fn sargam_for_note(note: ChromaticNote, tonic: ChromaticNote) -> Result<SargamDegree> {
    let position = notes_to_sargam(tonic)
        .iter()
        .position(|&n| n == note)
        .ok_or_else(|| SvaraError::DegreeNotFound {
            note: note.to_string(),
            tonic: tonic.to_string(),
        })?;
    Ok(SargamDegree::PURE[position])
}

/// [`sargam_for_note`] for unvalidated note names
pub fn sargam_for_note_str(note: &str, tonic: &str) -> Result<SargamDegree> {
    sargam_for_note(note.parse()?, tonic.parse()?)
}

/// Degree at `semitones` above Sa, wrapping around the octave
pub fn degree_for_offset(semitones: usize) -> SargamDegree {
    SargamDegree::ALL[semitones % 12]
}

/// Degree of any chromatic note relative to `tonic`, altered degrees included
pub fn chromatic_degree(note: ChromaticNote, tonic: ChromaticNote) -> SargamDegree {
    degree_for_offset(note.semitones_from(tonic))
}

/// Translate typed shorthand keys (e.g. `"s r g m"`) into notes for `tonic`.
/// Whitespace is ignored.
pub fn keys_to_notes(keys: &str, tonic: ChromaticNote) -> Result<Vec<ChromaticNote>> {
    keys.chars()
        .filter(|c| !c.is_whitespace())
        .map(|key| SargamDegree::from_key(key).map(|degree| degree.note_for(tonic)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::ChromaticNote::*;

    #[test]
    fn test_notes_to_sargam_all_tonics() {
        for tonic in ChromaticNote::ALL {
            let scale = notes_to_sargam(tonic);
            for (note, offset) in scale.iter().zip(MAJOR_SCALE_OFFSETS) {
                assert_eq!(note.index(), (tonic.index() + offset) % 12);
            }
            let mut distinct = scale.to_vec();
            distinct.sort();
            distinct.dedup();
            assert_eq!(distinct.len(), 7, "scale of {tonic} has duplicates");
        }
    }

    #[test]
    fn test_notes_to_sargam_examples() {
        assert_eq!(notes_to_sargam(A), [A, B, CSharp, D, E, FSharp, GSharp]);
        assert_eq!(notes_to_sargam(C), [C, D, E, F, G, A, B]);
        assert_eq!(notes_to_sargam_str("A").unwrap(), notes_to_sargam(A));
    }

    #[test]
    fn test_notes_to_sargam_rejects_unknown_tonic() {
        assert!(matches!(notes_to_sargam_str("H"), Err(SvaraError::InvalidNote(_))));
    }

    #[test]
    fn test_sargam_for_note() {
        let degree = sargam_for_note(CSharp, A).unwrap();
        assert_eq!(degree, SargamDegree::Ga);
        assert_eq!(degree.name(), "Ga");
        assert_eq!(degree.key(), 'g');

        assert_eq!(sargam_for_note(A, A).unwrap(), SargamDegree::Sa);
        assert_eq!(sargam_for_note(GSharp, A).unwrap(), SargamDegree::Ni);
        assert_eq!(sargam_for_note_str("G", "C").unwrap(), SargamDegree::Pa);
    }

    #[test]
    fn test_sargam_for_note_outside_scale() {
        let err = sargam_for_note(C, A).unwrap_err();
        assert!(matches!(err, SvaraError::DegreeNotFound { .. }));
        assert!(matches!(sargam_for_note_str("C", "X"), Err(SvaraError::InvalidNote(_))));
    }

    #[test]
    fn test_chromatic_degree_names_altered_notes() {
        assert_eq!(chromatic_degree(C, A), SargamDegree::FlatGa);
        assert_eq!(chromatic_degree(FSharp, C), SargamDegree::SharpMa);
        assert_eq!(chromatic_degree(E, E), SargamDegree::Sa);
        assert_eq!(degree_for_offset(13), SargamDegree::FlatRe);
    }

    #[test]
    fn test_pure_degrees_agree_with_scale_positions() {
        for tonic in ChromaticNote::ALL {
            for note in notes_to_sargam(tonic) {
                let pure = sargam_for_note(note, tonic).unwrap();
                assert_eq!(pure, chromatic_degree(note, tonic));
                assert!(pure.is_pure());
            }
        }
    }

    #[test]
    fn test_keys_are_unique_and_reversible() {
        for degree in SargamDegree::ALL {
            assert_eq!(SargamDegree::from_key(degree.key()).unwrap(), degree);
        }
        assert!(matches!(SargamDegree::from_key('x'), Err(SvaraError::InvalidKey('x'))));
    }

    #[test]
    fn test_keys_to_notes() {
        let notes = keys_to_notes("s r g m p d n", D).unwrap();
        assert_eq!(notes, notes_to_sargam(D).to_vec());
        assert_eq!(keys_to_notes("R G M", C).unwrap(), vec![CSharp, DSharp, FSharp]);
        assert!(keys_to_notes("s q", C).is_err());
    }
}
