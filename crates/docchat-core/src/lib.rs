//! # docchat Core
//!
//! Local, embedding-free retrieval over a single document: tokenizer,
//! overlapping chunker, lexical index, word-overlap ranker, and the lazy
//! retrieval facade that ties them together.
//!
//! This crate performs no filesystem or network I/O. Documents arrive
//! through the [`DocumentSource`](retriever::DocumentSource) trait, which
//! the application crate implements for files on disk.
//!
//! ```text
//! question ──▶ Retriever ──(first call)──▶ DocumentSource ──▶ Index::build
//!                 │                                            (chunk + tokenize)
//!                 ▼
//!               rank ──▶ top-k chunks ──▶ "\n\n"-joined context
//! ```

pub mod chunk;
pub mod error;
pub mod index;
pub mod rank;
pub mod retriever;
pub mod tokenize;

pub use chunk::ChunkConfig;
pub use error::RetrievalError;
pub use index::Index;
pub use rank::{rank, rank_scored, RankedChunk};
pub use retriever::{DocumentSource, Retriever, StaticSource, DEFAULT_TOP_K};
pub use tokenize::tokenize;
