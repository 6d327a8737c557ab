//! In-memory lexical index over one document.
//!
//! Holds the document's chunks in order plus one precomputed token set per
//! chunk at the same position. An [`Index`] is immutable once built; the
//! [`Retriever`](crate::retriever::Retriever) builds it at most once and
//! shares it with every reader.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::chunk::ChunkConfig;
use crate::tokenize::tokenize;

/// Chunks of a document and their token sets.
///
/// Invariant: `chunks.len() == token_sets.len()` and `token_sets[i]` is
/// exactly `tokenize(&chunks[i])`.
#[derive(Debug, Clone, Default)]
pub struct Index {
    chunks: Vec<String>,
    token_sets: Vec<HashSet<String>>,
    fingerprint: String,
}

impl Index {
    /// Chunk `document` and tokenize every chunk.
    ///
    /// A document with no usable text yields an index with zero chunks;
    /// retrieval over it returns an empty context rather than an error.
    pub fn build(document: &str, config: &ChunkConfig) -> Self {
        let chunks = config.split(document);
        let token_sets = chunks.iter().map(|c| tokenize(c)).collect();

        let mut hasher = Sha256::new();
        hasher.update(document.as_bytes());
        let fingerprint = format!("{:x}", hasher.finalize());

        if chunks.is_empty() {
            tracing::warn!(
                sha256 = %fingerprint,
                "document produced no chunks; retrieval will return empty context"
            );
        }

        Self {
            chunks,
            token_sets,
            fingerprint,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk contents in document order.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Token sets, parallel to [`chunks`](Index::chunks).
    pub fn token_sets(&self) -> &[HashSet<String>] {
        &self.token_sets
    }

    /// SHA-256 of the full document text the index was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Number of distinct tokens across all chunks.
    pub fn vocabulary_size(&self) -> usize {
        self.token_sets
            .iter()
            .flatten()
            .collect::<HashSet<_>>()
            .len()
    }
}
