//! Error types for svara

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SvaraError {
    #[error("Invalid note name: {0:?}")]
    InvalidNote(String),
    #[error("Invalid sargam key: {0:?}")]
    InvalidKey(char),
    #[error("Invalid frequency: {0} Hz (must be positive and finite)")]
    InvalidFrequency(f64),
    #[error("Note {note} is not in the major scale of {tonic}")]
    DegreeNotFound { note: String, tonic: String },
    #[error("Invalid detector config: {0}")]
    InvalidConfig(String),
    #[error("Frame too short: expected {expected} samples, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, SvaraError>;
