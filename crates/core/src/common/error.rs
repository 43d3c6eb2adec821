//! Error types surfaced outside the pipeline core (image loading, CLI plumbing).
//!
//! The pipeline itself has no runtime error path: unrecognized opcodes become
//! `valid=false` decode packets, structural hazards back-pressure, and
//! mispredicts are handled by recovery. The only fallible boundary is reading
//! an instruction image from disk.

use std::fmt;
use std::path::PathBuf;

/// An error encountered while loading or parsing an instruction memory image.
#[derive(Debug)]
pub enum ImageError {
    /// The image file could not be read from disk.
    NotFound {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A non-comment, non-blank line did not parse as a single hex byte.
    MalformedLine {
        /// Path of the offending file.
        path: PathBuf,
        /// 1-indexed line number.
        line: usize,
        /// The offending line's text.
        text: String,
    },
    /// The image contains more words than instruction memory can hold.
    TooLarge {
        /// Number of words the image decoded to.
        words: usize,
        /// Instruction memory capacity in words.
        capacity: usize,
    },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path, source } => {
                write!(f, "could not read image '{}': {}", path.display(), source)
            }
            Self::MalformedLine { path, line, text } => {
                write!(
                    f,
                    "{}:{}: expected a single hex byte, found '{}'",
                    path.display(),
                    line,
                    text
                )
            }
            Self::TooLarge { words, capacity } => {
                write!(
                    f,
                    "image decodes to {words} words, which exceeds instruction memory capacity of {capacity}"
                )
            }
        }
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound { source, .. } => Some(source),
            Self::MalformedLine { .. } | Self::TooLarge { .. } => None,
        }
    }
}
