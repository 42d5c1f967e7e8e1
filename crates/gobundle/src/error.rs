//! Error taxonomy for the bundling pipeline
//!
//! Every stage returns [`BundleError`]. The binary wraps it with `anyhow`
//! context before reporting; library callers and tests can match on the
//! variant or on its [`ErrorCategory`].

use std::{io, path::PathBuf};

use thiserror::Error;

/// Coarse classification of a [`BundleError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing or invalid configuration, detected before any file access
    Configuration,
    /// Pattern expansion failed or matched something unusable
    Resolution,
    /// Fewer than two files to bundle
    Cardinality,
    /// An input file or the assembled bundle is not valid Go syntax
    Parse,
    /// Reading sources or writing the bundle failed
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Resolution => write!(f, "resolution"),
            Self::Cardinality => write!(f, "cardinality"),
            Self::Parse => write!(f, "parse"),
            Self::Io => write!(f, "io"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("package name required")]
    MissingPackageName,

    #[error("invalid package name \"{name}\": {reason}")]
    InvalidPackageName { name: String, reason: &'static str },

    #[error("no files given")]
    NoPatterns,

    #[error("invalid file pattern \"{pattern}\"")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("non-file \"{}\" found in args", path.display())]
    NotAFile { path: PathBuf },

    #[error("no files found in given path")]
    NoFilesFound,

    #[error("refusing to bundle a single file \"{}\"", path.display())]
    SingleFile { path: PathBuf },

    #[error("{}:{line}:{column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to access \"{}\"", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read \"{}\"", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write bundle")]
    Write(#[source] io::Error),
}

impl BundleError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingPackageName | Self::InvalidPackageName { .. } | Self::NoPatterns => {
                ErrorCategory::Configuration
            }
            Self::Pattern { .. } | Self::NotAFile { .. } | Self::NoFilesFound | Self::Io { .. } => {
                ErrorCategory::Resolution
            }
            Self::SingleFile { .. } => ErrorCategory::Cardinality,
            Self::Parse { .. } => ErrorCategory::Parse,
            Self::Read { .. } | Self::Write(_) => ErrorCategory::Io,
        }
    }
}

pub type Result<T, E = BundleError> = std::result::Result<T, E>;
