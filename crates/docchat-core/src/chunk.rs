//! Fixed-size sliding-window chunker.
//!
//! Splits the full document text into windows of `chunk_size` characters,
//! advancing by `chunk_size - overlap` each step so that neighbouring
//! windows share `overlap` characters. Sizes are counted in Unicode scalar
//! values, so multi-byte text is never split inside a character.
//!
//! # Algorithm
//!
//! 1. Start at character offset 0.
//! 2. Take the window `[start, start + chunk_size)`, clipped to the text.
//! 3. Emit the window verbatim if it contains any non-whitespace.
//! 4. Advance `start` by `chunk_size - overlap` and repeat while
//!    `start < text length`.
//!
//! Whitespace-only windows are skipped but still advance the offset, so the
//! number of chunks can be lower than the naive window count.
//!
//! # Example
//!
//! ```rust
//! use docchat_core::chunk::ChunkConfig;
//!
//! let cfg = ChunkConfig::new(20, 5).unwrap();
//! let chunks = cfg.split("The cat sat. The dog ran. The cat ran.");
//! assert_eq!(chunks.len(), 3);
//! assert_eq!(chunks[0], "The cat sat. The dog");
//! ```

use crate::error::{Result, RetrievalError};

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 800;
/// Default overlap between neighbouring windows in characters.
pub const DEFAULT_OVERLAP: usize = 200;

/// Validated chunker parameters.
///
/// Construction enforces `0 < chunk_size` and `overlap < chunk_size`, which
/// guarantees forward progress in [`split`](ChunkConfig::split).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkConfig {
    /// Validate and build a chunker configuration.
    ///
    /// # Errors
    ///
    /// [`RetrievalError::InvalidConfiguration`] if `chunk_size == 0` or
    /// `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RetrievalError::InvalidConfiguration(
                "chunk_size must be > 0".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RetrievalError::InvalidConfiguration(format!(
                "overlap ({}) must be less than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between the starts of two consecutive windows.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Split `text` into overlapping windows, in document order.
    ///
    /// Returned chunks are the raw windows (not trimmed); only windows that
    /// are entirely whitespace are dropped.
    pub fn split(&self, text: &str) -> Vec<String> {
        // Byte offset of every char, plus the end of the text.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = bounds.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < char_len {
            let end = (start + self.chunk_size).min(char_len);
            let window = &text[bounds[start]..bounds[end]];
            if !window.trim().is_empty() {
                chunks.push(window.to_string());
            }
            start += self.stride();
        }
        chunks
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}
