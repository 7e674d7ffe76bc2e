//! Shared types for the Kokoro job worker crates

mod error;

pub use error::HttpError;
