//! Error types for loading the dataset, synonym table and categories.
//!
//! Search, selection and derivation are total functions and never fail;
//! everything that can go wrong happens while reading a source.

use thiserror::Error;

/// Failure to load one of the static sources.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Local file could not be read.
    #[error("Failed to read {source_name}: {reason}")]
    Read { source_name: String, reason: String },

    /// Remote source could not be fetched (network error or non-2xx status).
    #[error("Failed to fetch {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },

    /// Source was read but is not valid JSON of the expected shape.
    #[error("Failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    /// A word is listed under more than one canonical synonym entry.
    #[error("Synonym '{word}' is listed under both '{first}' and '{second}'")]
    SynonymConflict {
        word: String,
        first: String,
        second: String,
    },
}

impl LoadError {
    pub fn read<E: std::fmt::Display>(source_name: &str, err: E) -> Self {
        Self::Read {
            source_name: source_name.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn fetch<E: std::fmt::Display>(source_name: &str, err: E) -> Self {
        Self::Fetch {
            source_name: source_name.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn parse<E: std::fmt::Display>(source_name: &str, err: E) -> Self {
        Self::Parse {
            source_name: source_name.to_string(),
            reason: err.to_string(),
        }
    }
}
