//! Error types for the `docchat-rag` crate.

use thiserror::Error;

/// Errors that can occur while ingesting documents or answering questions.
#[derive(Debug, Error)]
pub enum RagError {
    /// A caller supplied an out-of-range parameter (chunk size, overlap, top-k).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The document source does not exist.
    #[error("Source not found: {0}")]
    NotFound(String),

    /// The document source has a format the extractor cannot read.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Text extraction failed for a reason other than a missing or unsupported source.
    #[error("Extraction error ({source_ref}): {message}")]
    Extraction {
        /// The path or URL being read.
        source_ref: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred while generating an answer.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The answer generator that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the chunk store backend.
    #[error("Store error ({backend}): {message}")]
    Store {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in the ingestion or question-answering orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for docchat operations.
pub type Result<T> = std::result::Result<T, RagError>;
