//! Input files: a name plus somewhere to read PDF bytes from.
//!
//! The name only matters for deriving the output file name; the bytes are
//! read once, at the start of a conversion. Path-backed inputs are read with
//! `tokio::fs` so the read is a real suspension point.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Where an [`InputFile`]'s bytes come from.
#[derive(Clone)]
enum Source {
    Memory(Arc<[u8]>),
    Path(PathBuf),
}

/// A named, file-like PDF input.
#[derive(Clone)]
pub struct InputFile {
    name: String,
    source: Source,
}

impl InputFile {
    /// In-memory input, e.g. bytes received from an upload.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            source: Source::Memory(bytes.into()),
        }
    }

    /// File on disk. The name is the path's final component.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            source: Source::Path(path),
        }
    }

    /// Override the name used for the output file.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing path, for path-based inputs.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::Path(p) => Some(p),
            Source::Memory(_) => None,
        }
    }

    /// Read the full content.
    pub async fn read_bytes(&self) -> std::io::Result<Arc<[u8]>> {
        match &self.source {
            Source::Memory(bytes) => Ok(Arc::clone(bytes)),
            Source::Path(path) => {
                let bytes = tokio::fs::read(path).await?;
                debug!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(bytes.into())
            }
        }
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Memory(b) => format!("<{} bytes in memory>", b.len()),
            Source::Path(p) => p.display().to_string(),
        };
        f.debug_struct("InputFile")
            .field("name", &self.name)
            .field("source", &source)
            .finish()
    }
}
