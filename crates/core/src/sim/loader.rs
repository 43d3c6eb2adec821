//! Hex-byte instruction image loader.
//!
//! Reads a text file of one hex byte per non-blank, non-comment line, and
//! packs four bytes at a time into little-endian words. Both `#` and `//`
//! start a comment; a trailing partial word is zero-padded on the high end.

use std::fs;
use std::path::Path;

use crate::common::constants::IMEM_WORDS;
use crate::common::error::ImageError;

/// Parses an instruction image file into a sequence of little-endian 32-bit
/// words, ready for [`crate::core::imem::InstructionMemory::load`].
///
/// # Errors
///
/// Returns [`ImageError::NotFound`] if `path` can't be read,
/// [`ImageError::MalformedLine`] if a non-blank, non-comment line isn't a
/// valid hex byte, and [`ImageError::TooLarge`] if the decoded image
/// exceeds [`IMEM_WORDS`].
pub fn load_image(path: &Path) -> Result<Vec<u32>, ImageError> {
    let text = fs::read_to_string(path).map_err(|source| ImageError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let mut bytes = Vec::new();
    for (number, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }
        let digits = line.strip_prefix("0x").or_else(|| line.strip_prefix("0X")).unwrap_or(line);
        let value = u8::from_str_radix(digits, 16).map_err(|_| ImageError::MalformedLine {
            path: path.to_path_buf(),
            line: number + 1,
            text: raw_line.to_string(),
        })?;
        bytes.push(value);
    }

    let words: Vec<u32> = bytes
        .chunks(4)
        .map(|chunk| {
            let mut word_bytes = [0u8; 4];
            word_bytes[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(word_bytes)
        })
        .collect();

    if words.len() > IMEM_WORDS {
        return Err(ImageError::TooLarge {
            words: words.len(),
            capacity: IMEM_WORDS,
        });
    }

    Ok(words)
}
