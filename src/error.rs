//! Error types for the pdf2png library.
//!
//! Three error types cover three different layers (plus [`ConfigError`] for
//! builder validation):
//!
//! * [`LibraryLoadError`] — the rendering library could not be bound. It is
//!   `Clone` because every caller waiting on the same in-flight load receives
//!   the same failure.
//!
//! * [`LibraryError`] — a backend (PDFium or a test double) rejected a
//!   document, page or render request. Carries only the backend's message.
//!
//! * [`ConvertError`] — the conversion taxonomy. It never escapes the public
//!   conversion entry points: [`ConvertError::into_message`] flattens it into
//!   the string stored in [`crate::output::ConversionResult::error`].

use thiserror::Error;

/// Prefix applied to every failure caught by the conversion boundary.
pub const CONVERT_FAILURE_PREFIX: &str = "Failed to convert PDF: ";

/// The rendering library (or the shared library it wraps) failed to load.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to load PDF rendering library: {reason}")]
pub struct LibraryLoadError {
    pub reason: String,
}

impl LibraryLoadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Builder validation failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid configuration: {0}")]
pub struct ConfigError(pub String);

/// A failure reported by a [`crate::library::RenderLibrary`] backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct LibraryError {
    pub message: String,
}

impl LibraryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Every way a single conversion can fail.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Setup ─────────────────────────────────────────────────────────────
    /// Rendering library or its shared object failed to load.
    #[error(transparent)]
    LibraryLoad(#[from] LibraryLoadError),

    /// Input bytes could not be read.
    #[error("could not read '{name}': {source}")]
    FileRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    // ── PDF ───────────────────────────────────────────────────────────────
    /// Bytes are not a parseable PDF.
    #[error("invalid PDF document: {0}")]
    DocumentParse(#[source] LibraryError),

    /// The requested page does not exist or could not be loaded.
    #[error("page {page} could not be retrieved: {detail}")]
    PageRetrieval { page: usize, detail: String },

    /// Rasterising the page into the drawing surface failed.
    #[error("rendering failed: {0}")]
    Render(#[source] LibraryError),

    // ── Surface / encoding ────────────────────────────────────────────────
    /// No 2D context could be created for the viewport-sized canvas.
    #[error("Canvas context could not be retrieved")]
    ContextUnavailable,

    /// The encoder produced no blob.
    #[error("Failed to create image blob")]
    Encode,

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. the blocking render task panicked).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// User-facing message stored in a failed conversion result.
    ///
    /// Context and encode failures are early returns with fixed messages;
    /// everything else goes through the generic prefix.
    pub fn into_message(self) -> String {
        match self {
            ConvertError::ContextUnavailable | ConvertError::Encode => self.to_string(),
            other => format!("{CONVERT_FAILURE_PREFIX}{other}"),
        }
    }

    /// Whether this is an expected early return rather than an exception.
    pub fn is_early_return(&self) -> bool {
        matches!(self, ConvertError::ContextUnavailable | ConvertError::Encode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_unavailable_message_is_verbatim() {
        assert_eq!(
            ConvertError::ContextUnavailable.into_message(),
            "Canvas context could not be retrieved"
        );
    }

    #[test]
    fn encode_message_is_verbatim() {
        assert_eq!(
            ConvertError::Encode.into_message(),
            "Failed to create image blob"
        );
    }

    #[test]
    fn only_context_and_encode_are_early_returns() {
        assert!(ConvertError::ContextUnavailable.is_early_return());
        assert!(ConvertError::Encode.is_early_return());
        assert!(!ConvertError::DocumentParse(LibraryError::new("bad PDF")).is_early_return());
        assert!(!ConvertError::Render(LibraryError::new("x")).is_early_return());
        assert!(!ConvertError::Internal("panic".into()).is_early_return());
    }

    #[test]
    fn parse_failure_is_prefixed() {
        let msg = ConvertError::DocumentParse(LibraryError::new("bad PDF")).into_message();
        assert!(msg.starts_with("Failed to convert PDF: "), "got: {msg}");
        assert!(msg.contains("bad PDF"), "got: {msg}");
    }

    #[test]
    fn library_load_failure_keeps_reason() {
        let msg = ConvertError::from(LibraryLoadError::new("libpdfium.so not found")).into_message();
        assert!(msg.starts_with(CONVERT_FAILURE_PREFIX));
        assert!(msg.contains("libpdfium.so not found"), "got: {msg}");
    }

    #[test]
    fn file_read_names_the_input() {
        let e = ConvertError::FileRead {
            name: "missing.pdf".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = e.into_message();
        assert!(msg.contains("missing.pdf"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn page_retrieval_display() {
        let e = ConvertError::PageRetrieval {
            page: 1,
            detail: "document has no pages".into(),
        };
        assert!(e.to_string().contains("page 1"));
    }
}
