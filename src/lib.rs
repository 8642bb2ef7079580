//! # pdf2png
//!
//! Render the first page of a PDF into a PNG image.
//!
//! The crate is a thin pipeline around PDFium: bind the library lazily
//! (once per process, shared by concurrent callers), read the input, parse
//! it, rasterise page one at 4× its native size onto an in-memory canvas,
//! and encode the canvas as PNG. The caller gets back an object URL and an
//! [`ImageFile`], or an error message — never a panic and never an `Err`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! InputFile
//!  │
//!  ├─ 1. Library  bind PDFium on first use (shared, retried after failure)
//!  ├─ 2. Read     whole file into memory
//!  ├─ 3. Parse    PDF document (spawn_blocking)
//!  ├─ 4. Page     fetch page 1
//!  ├─ 5. Render   viewport @4× → canvas, high-quality smoothing
//!  └─ 6. Encode   canvas → PNG blob → ImageFile + object URL
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2png::{convert_pdf_to_image, InputFile};
//!
//! #[tokio::main]
//! async fn main() {
//!     let result = convert_pdf_to_image(&InputFile::from_path("report.pdf")).await;
//!     match (result.file, result.error) {
//!         (Some(file), _) => println!("{} ({}x{})", file.name, file.width, file.height),
//!         (None, Some(err)) => eprintln!("{err}"),
//!         (None, None) => unreachable!(),
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2png` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Locating PDFium
//!
//! Set `PDFIUM_LIB_PATH` to the library file (or its directory), or place
//! the platform library next to the executable or in the working directory.
//! See [`LibraryConfig`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod input;
pub mod library;
pub mod object_url;
pub mod output;
pub mod surface;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{LibraryConfig, LibraryConfigBuilder, RENDER_SCALE};
pub use convert::{convert_pdf_to_image, PdfToImageConverter};
pub use error::{ConfigError, ConvertError, LibraryError, LibraryLoadError};
pub use input::InputFile;
pub use library::{
    LibraryLoader, LoadStatus, PdfiumLibrary, RenderDocument, RenderLibrary, RenderPage, Viewport,
};
pub use object_url::{create_object_url, resolve_object_url, revoke_object_url};
pub use output::{png_file_name, Blob, ConversionResult, ImageFile};
pub use surface::{Canvas, Context2d, Smoothing, SmoothingQuality};
