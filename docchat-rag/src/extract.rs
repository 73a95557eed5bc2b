//! Raw text extraction from document sources.
//!
//! [`FileTextExtractor`] reads plain-text files from disk and, with the
//! `http` feature, fetches `http://` / `https://` sources. Binary formats
//! such as PDF or DOCX are rejected with [`RagError::UnsupportedFormat`].

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::error::{RagError, Result};

/// File extensions read as UTF-8 text.
const TEXT_EXTENSIONS: &[&str] =
    &["txt", "text", "md", "markdown", "rst", "csv", "tsv", "log", "html", "htm", "xml"];

/// Supplies the raw text of a document given its source reference.
///
/// Any failure is a precondition failure for ingestion: the pipeline does
/// not chunk anything when extraction fails.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Load the text behind `source` (a file path or URL).
    async fn extract(&self, source: &str) -> Result<String>;
}

/// Returns `true` if `source` looks like an HTTP(S) URL.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Extracts text from local files and, with the `http` feature, from URLs.
#[derive(Debug, Clone, Default)]
pub struct FileTextExtractor {
    #[cfg(feature = "http")]
    client: reqwest::Client,
}

impl FileTextExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self::default()
    }

    async fn read_file(&self, source: &str) -> Result<String> {
        let path = Path::new(source);
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(RagError::NotFound(format!("{source} is not a file"))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RagError::NotFound(source.to_string()));
            }
            Err(e) => {
                return Err(RagError::Extraction {
                    source_ref: source.to_string(),
                    message: e.to_string(),
                });
            }
        }

        if !TEXT_EXTENSIONS.contains(&extension.as_str()) {
            return Err(RagError::UnsupportedFormat(format!(
                "unsupported file format '.{extension}' for {source}"
            )));
        }

        tokio::fs::read_to_string(path).await.map_err(|e| {
            error!(source, error = %e, "failed to read text file");
            RagError::Extraction { source_ref: source.to_string(), message: e.to_string() }
        })
    }

    #[cfg(feature = "http")]
    async fn fetch_url(&self, url: &str) -> Result<String> {
        use std::time::Duration;

        let extraction = |message: String| RagError::Extraction {
            source_ref: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| {
                error!(url, error = %e, "request failed");
                extraction(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RagError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(extraction(format!("server returned {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("text") {
            return Err(RagError::UnsupportedFormat(format!(
                "unsupported content type '{content_type}' for {url}"
            )));
        }

        response.text().await.map_err(|e| extraction(format!("failed to read body: {e}")))
    }

    #[cfg(not(feature = "http"))]
    async fn fetch_url(&self, url: &str) -> Result<String> {
        Err(RagError::UnsupportedFormat(format!(
            "URL sources need the `http` feature: {url}"
        )))
    }
}

#[async_trait]
impl TextExtractor for FileTextExtractor {
    async fn extract(&self, source: &str) -> Result<String> {
        let text = if is_url(source) {
            self.fetch_url(source).await?
        } else {
            self.read_file(source).await?
        };
        debug!(source, text_len = text.len(), "extracted text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn reads_text_files() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(file, "# Title\n\nBody text.").unwrap();

        let text = FileTextExtractor::new().extract(file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(text, "# Title\n\nBody text.");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = FileTextExtractor::new().extract("/definitely/not/here.txt").await.unwrap_err();
        assert!(matches!(err, RagError::NotFound(_)));
    }

    #[tokio::test]
    async fn binary_formats_are_unsupported() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let err =
            FileTextExtractor::new().extract(file.path().to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, RagError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn invalid_utf8_is_an_extraction_error() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(&[0xff, 0xfe, 0xfd]).unwrap();
        let err =
            FileTextExtractor::new().extract(file.path().to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, RagError::Extraction { .. }));
    }

    #[test]
    fn detects_urls() {
        assert!(is_url("https://example.com/a.txt"));
        assert!(is_url("http://example.com"));
        assert!(!is_url("/tmp/https.txt"));
    }
}
