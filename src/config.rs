//! Configuration for locating the PDFium shared library.
//!
//! Rendering parameters are deliberately *not* configurable: every
//! conversion renders page one at [`RENDER_SCALE`] and encodes it as
//! [`OUTPUT_MIME_TYPE`] at [`ENCODE_QUALITY`]. The only knob is where the
//! rendering library lives, which differs per machine.
//!
//! # Design choice: builder over constructor
//! Same as the rest of the crate's public surface: callers set only what they
//! care about and rely on the documented defaults for the rest.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fixed scale applied to the page's native point size (4× ≈ 288 DPI).
pub const RENDER_SCALE: f32 = 4.0;

/// MIME type of the produced image.
pub const OUTPUT_MIME_TYPE: &str = "image/png";

/// Encoder quality passed to [`crate::surface::Canvas::to_blob`].
pub const ENCODE_QUALITY: f64 = 1.0;

/// Local directory searched for the platform PDFium library.
pub const DEFAULT_LIBRARY_DIR: &str = "./";

/// Environment variable pointing at an existing PDFium library.
pub const LIBRARY_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Where to look for the PDFium shared library.
///
/// # Example
/// ```rust
/// use pdf2png::LibraryConfig;
///
/// let config = LibraryConfig::builder()
///     .library_path("/opt/pdfium/lib/libpdfium.so")
///     .use_system_library(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Explicit library file, or a directory containing the platform library
    /// name. Tried first. Default: None.
    pub library_path: Option<PathBuf>,

    /// Local directory searched after the executable's own directory.
    /// Default: [`DEFAULT_LIBRARY_DIR`].
    pub library_dir: PathBuf,

    /// Fall back to the system library search path. Default: true.
    pub use_system_library: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            library_dir: PathBuf::from(DEFAULT_LIBRARY_DIR),
            use_system_library: true,
        }
    }
}

impl LibraryConfig {
    pub fn builder() -> LibraryConfigBuilder {
        LibraryConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults, with `library_path` taken from `PDFIUM_LIB_PATH` when set.
    pub fn from_env() -> Self {
        let library_path = std::env::var_os(LIBRARY_PATH_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self {
            library_path,
            ..Self::default()
        }
    }
}

/// Builder for [`LibraryConfig`].
#[derive(Debug)]
pub struct LibraryConfigBuilder {
    config: LibraryConfig,
}

impl LibraryConfigBuilder {
    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.library_path = Some(path.into());
        self
    }

    pub fn library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.library_dir = dir.into();
        self
    }

    pub fn use_system_library(mut self, v: bool) -> Self {
        self.config.use_system_library = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<LibraryConfig, ConfigError> {
        let c = &self.config;
        if c
            .library_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(ConfigError("library path must not be empty".into()));
        }
        if c.library_dir.as_os_str().is_empty() {
            return Err(ConfigError("library directory must not be empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = LibraryConfig::default();
        assert_eq!(c.library_path, None);
        assert_eq!(c.library_dir, PathBuf::from("./"));
        assert!(c.use_system_library);
    }

    #[test]
    fn builder_sets_fields() {
        let c = LibraryConfig::builder()
            .library_path("/opt/pdfium")
            .library_dir("/srv/lib")
            .use_system_library(false)
            .build()
            .unwrap();
        assert_eq!(c.library_path, Some(PathBuf::from("/opt/pdfium")));
        assert_eq!(c.library_dir, PathBuf::from("/srv/lib"));
        assert!(!c.use_system_library);
    }

    #[test]
    fn builder_rejects_empty_path() {
        assert!(LibraryConfig::builder().library_path("").build().is_err());
        assert!(LibraryConfig::builder().library_dir("").build().is_err());
    }

    #[test]
    fn from_env_reads_library_path() {
        std::env::set_var(LIBRARY_PATH_ENV, "/tmp/pdf2png-test/libpdfium.so");
        let c = LibraryConfig::from_env();
        std::env::remove_var(LIBRARY_PATH_ENV);
        assert_eq!(
            c.library_path,
            Some(PathBuf::from("/tmp/pdf2png-test/libpdfium.so"))
        );
        assert!(c.use_system_library);
    }
}
