//! Document text extraction and the on-disk [`DocumentSource`].
//!
//! The content type is picked from the file extension: PDFs go through
//! `pdf-extract`, everything else is read as UTF-8 text. Extraction runs on
//! the blocking thread pool so the async executor is never stalled by a
//! large PDF.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docchat_core::{DocumentSource, RetrievalError};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";

/// Extraction error. Mapped to `DocumentUnavailable` by [`FileSource`].
#[derive(Debug)]
pub enum ExtractError {
    UnsupportedContentType(String),
    Pdf(String),
    Utf8(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::UnsupportedContentType(ct) => {
                write!(f, "unsupported content-type: {}", ct)
            }
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Utf8(e) => write!(f, "text is not valid UTF-8: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Content type inferred from the file extension (case-insensitive).
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => MIME_PDF,
        _ => MIME_TEXT,
    }
}

/// Extracts plain text from document bytes.
pub fn extract_text(bytes: &[u8], content_type: &str) -> Result<String, ExtractError> {
    match content_type {
        MIME_PDF => extract_pdf(bytes),
        MIME_TEXT => {
            String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::Utf8(e.to_string()))
        }
        _ => Err(ExtractError::UnsupportedContentType(
            content_type.to_string(),
        )),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Reads and extracts a document from disk, once per retriever.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_blocking(path: &Path) -> Result<String, RetrievalError> {
        let name = path.display().to_string();
        if !path.exists() {
            return Err(RetrievalError::unavailable(name, "file not found"));
        }
        let bytes = std::fs::read(path).map_err(|e| RetrievalError::unavailable(&name, e))?;
        extract_text(&bytes, content_type_for(path)).map_err(|e| RetrievalError::unavailable(name, e))
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn load(&self) -> Result<String, RetrievalError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::read_blocking(&path))
            .await
            .map_err(|e| RetrievalError::unavailable(self.describe(), e))?
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("documento.pdf")), MIME_PDF);
        assert_eq!(content_type_for(Path::new("DOCUMENTO.PDF")), MIME_PDF);
        assert_eq!(content_type_for(Path::new("notas.md")), MIME_TEXT);
        assert_eq!(content_type_for(Path::new("sin_extension")), MIME_TEXT);
    }

    #[test]
    fn test_unsupported_content_type() {
        let err = extract_text(b"x", "image/png").unwrap_err();
        assert_eq!(err.to_string(), "unsupported content-type: image/png");
    }

    #[test]
    fn test_invalid_pdf_is_an_error() {
        let err = extract_text(b"definitely not a pdf", MIME_PDF).unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[tokio::test]
    async fn test_loads_text_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("manual.txt");
        fs::write(&path, "El gato duerme.\nEl perro corre.").unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.load().await.unwrap(), "El gato duerme.\nEl perro corre.");
        assert_eq!(source.describe(), path.display().to_string());
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let source = FileSource::new(tmp.path().join("documento.pdf"));
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, RetrievalError::DocumentUnavailable { .. }));
        assert!(err.to_string().contains("file not found"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("binary.txt");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let err = FileSource::new(&path).load().await.unwrap_err();
        assert!(matches!(err, RetrievalError::DocumentUnavailable { .. }));
    }
}
