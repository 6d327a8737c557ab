//! Retrieval facade: lazy single-flight indexing plus ranked context assembly.
//!
//! A [`Retriever`] owns a [`DocumentSource`] and builds its [`Index`] on the
//! first request. Initialization goes through a `tokio::sync::OnceCell`, so
//! concurrent first callers wait on one shared build instead of each loading
//! the document, and nobody observes a partially built index. A failed load
//! leaves the cell empty and is reported to the caller; the next request
//! tries again. After a successful build the index is never rebuilt.
//!
//! # Example
//!
//! ```rust
//! use docchat_core::{ChunkConfig, Retriever, StaticSource};
//!
//! # tokio_test_block_on(async {
//! let source = StaticSource::new("manual", "The cat sat. The dog ran. The cat ran.");
//! let retriever = Retriever::new(source, ChunkConfig::new(20, 5).unwrap());
//! let context = retriever.context("dog", 1).await.unwrap();
//! assert_eq!(context, "The cat sat. The dog");
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::chunk::ChunkConfig;
use crate::error::{Result, RetrievalError};
use crate::index::Index;
use crate::rank::{rank, rank_scored, RankedChunk};

/// Number of chunks placed in the context when the caller has no preference.
pub const DEFAULT_TOP_K: usize = 4;

/// Separator placed between chunks in the assembled context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Provider of the full document text.
///
/// Called at most once per successful [`Retriever`] initialization.
/// Implementations doing blocking I/O should move it off the async
/// executor (e.g. `tokio::task::spawn_blocking`).
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Load the full extracted text of the document.
    ///
    /// Returns [`RetrievalError::DocumentUnavailable`](crate::RetrievalError::DocumentUnavailable)
    /// when the document cannot be read.
    async fn load(&self) -> Result<String>;

    /// Human-readable identifier for logs (path, URL, name).
    fn describe(&self) -> String;
}

/// A document held in memory.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    text: String,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn load(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Lazily indexed retriever over a single document.
pub struct Retriever<S> {
    source: S,
    chunking: ChunkConfig,
    index: OnceCell<Index>,
}

impl<S: DocumentSource> Retriever<S> {
    pub fn new(source: S, chunking: ChunkConfig) -> Self {
        Self {
            source,
            chunking,
            index: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn chunking(&self) -> &ChunkConfig {
        &self.chunking
    }

    /// Whether the index has been built.
    pub fn is_initialized(&self) -> bool {
        self.index.initialized()
    }

    /// Return the index, building it on first use.
    ///
    /// # Errors
    ///
    /// Propagates the source's `DocumentUnavailable` error. The index is
    /// left unbuilt in that case.
    pub async fn index(&self) -> Result<&Index> {
        self.index
            .get_or_try_init(|| async {
                let name = self.source.describe();
                tracing::info!(source = %name, "building retrieval index");
                let text = self.source.load().await?;
                let index = Index::build(&text, &self.chunking);
                tracing::info!(
                    source = %name,
                    chunks = index.len(),
                    sha256 = %index.fingerprint(),
                    "retrieval index ready"
                );
                Ok::<_, RetrievalError>(index)
            })
            .await
    }

    /// Build the context for `question` from its `k` best chunks.
    ///
    /// Chunks are joined with a blank line. An empty document yields an
    /// empty string.
    pub async fn context(&self, question: &str, k: usize) -> Result<String> {
        let index = self.index().await?;
        Ok(rank(question, index, k).join(CONTEXT_SEPARATOR))
    }

    /// Ranked chunks for `question` with positions and scores.
    pub async fn ranked(&self, question: &str, k: usize) -> Result<Vec<RankedChunk<'_>>> {
        let index = self.index().await?;
        Ok(rank_scored(question, index, k))
    }
}
