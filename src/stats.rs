//! Index statistics.
//!
//! Builds the in-memory index for the configured document and prints a
//! short summary. Used by `docchat stats` to check that extraction and
//! chunking produce something sensible before the bot goes live.

use anyhow::Result;

use docchat_core::Index;

use crate::answer::retriever_from_config;
use crate::config::Config;

/// Summary numbers for an [`Index`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    pub chunks: usize,
    pub avg_chunk_chars: usize,
    pub vocabulary: usize,
}

impl IndexStats {
    pub fn of(index: &Index) -> Self {
        let total_chars: usize = index.chunks().iter().map(|c| c.chars().count()).sum();
        Self {
            chunks: index.len(),
            avg_chunk_chars: if index.is_empty() {
                0
            } else {
                total_chars / index.len()
            },
            vocabulary: index.vocabulary_size(),
        }
    }
}

/// Run the stats command: build the index and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let retriever = retriever_from_config(config)?;
    let index = retriever.index().await?;
    let stats = IndexStats::of(index);

    println!("docchat — Index Stats");
    println!("=====================");
    println!();
    println!("  Document:    {}", config.document.path.display());
    println!("  SHA-256:     {}", index.fingerprint());
    println!(
        "  Chunking:    {} chars, {} overlap",
        retriever.chunking().chunk_size(),
        retriever.chunking().overlap()
    );
    println!();
    println!("  Chunks:      {}", stats.chunks);
    println!("  Avg length:  {} chars", stats.avg_chunk_chars);
    println!("  Vocabulary:  {} tokens", stats.vocabulary);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_core::ChunkConfig;

    #[test]
    fn test_stats_of_index() {
        let index = Index::build(
            "The cat sat. The dog ran. The cat ran.",
            &ChunkConfig::new(20, 5).unwrap(),
        );
        let stats = IndexStats::of(&index);
        assert_eq!(stats.chunks, 3);
        // 20 + 20 + 8
        assert_eq!(stats.avg_chunk_chars, 16);
        assert_eq!(stats.vocabulary, 7);
    }

    #[test]
    fn test_stats_of_empty_index() {
        let stats = IndexStats::of(&Index::default());
        assert_eq!(
            stats,
            IndexStats {
                chunks: 0,
                avg_chunk_chars: 0,
                vocabulary: 0
            }
        );
    }
}
