//! svara-services: WAV input, tuner sessions and inactivity tracking

pub mod inactivity;
pub mod tuner;
pub mod wav;

pub use inactivity::{ActivityKind, InactivityTimer};
pub use tuner::{SessionOptions, Tuner, TunerError, TunerEvent, TunerReading, TunerSession};
pub use wav::{load_wav, MonoAudio, WavError};
