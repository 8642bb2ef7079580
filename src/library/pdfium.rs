//! PDFium backend for the [`RenderLibrary`] traits.
//!
//! ## Why bind on the blocking pool?
//!
//! Binding `dlopen`s a ~30 MB shared library and runs PDFium's global
//! initialisation. That is blocking file-system work, so [`load_pdfium`] moves
//! it onto `spawn_blocking` and the async caller just awaits it.
//!
//! ## Where the library is searched
//!
//! 1. `LibraryConfig::library_path` (a file, or a directory holding the
//!    platform library name); `PDFIUM_LIB_PATH` lands here via
//!    [`LibraryConfig::from_env`]
//! 2. the directory of the running executable
//! 3. `LibraryConfig::library_dir` (default `./`)
//! 4. the system library search path, unless disabled
//!
//! Every failed attempt is kept so the final error says where we looked.

use super::{RenderDocument, RenderLibrary, RenderPage, Viewport};
use crate::config::LibraryConfig;
use crate::error::{LibraryError, LibraryLoadError};
use crate::surface::{Context2d, Smoothing, SmoothingQuality};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The PDFium library, bound and initialised.
pub struct PdfiumLibrary {
    pdfium: Pdfium,
}

impl PdfiumLibrary {
    /// Bind synchronously. Prefer [`load_pdfium`] from async code.
    pub fn bind(config: &LibraryConfig) -> Result<Self, LibraryLoadError> {
        let mut attempts = Vec::new();

        for candidate in candidate_paths(config) {
            match Pdfium::bind_to_library(&candidate) {
                Ok(bindings) => {
                    info!("Bound PDFium from {}", candidate.display());
                    return Ok(Self {
                        pdfium: Pdfium::new(bindings),
                    });
                }
                Err(e) => {
                    debug!("PDFium not usable at {}: {}", candidate.display(), e);
                    attempts.push(format!("{}: {}", candidate.display(), e));
                }
            }
        }

        if config.use_system_library {
            match Pdfium::bind_to_system_library() {
                Ok(bindings) => {
                    info!("Bound PDFium from the system library path");
                    return Ok(Self {
                        pdfium: Pdfium::new(bindings),
                    });
                }
                Err(e) => attempts.push(format!("system library: {}", e)),
            }
        }

        if attempts.is_empty() {
            attempts.push("no search locations configured".to_string());
        }
        Err(LibraryLoadError::new(format!(
            "PDFium could not be bound ({}). Set {} to the path of libpdfium.",
            attempts.join("; "),
            crate::config::LIBRARY_PATH_ENV
        )))
    }
}

/// Bind PDFium on the blocking pool.
pub async fn load_pdfium(config: LibraryConfig) -> Result<PdfiumLibrary, LibraryLoadError> {
    tokio::task::spawn_blocking(move || PdfiumLibrary::bind(&config))
        .await
        .map_err(|e| LibraryLoadError::new(format!("bind task panicked: {}", e)))?
}

/// Library files to try, in order, before the system search path.
fn candidate_paths(config: &LibraryConfig) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(explicit) = &config.library_path {
        paths.push(resolve_library_file(explicit));
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
    {
        paths.push(Pdfium::pdfium_platform_library_name_at_path(exe_dir.as_path()));
    }

    paths.push(Pdfium::pdfium_platform_library_name_at_path(
        config.library_dir.as_path(),
    ));

    paths.dedup();
    paths
}

/// A directory means "the platform library inside it"; anything else is
/// taken as the library file itself.
fn resolve_library_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        Pdfium::pdfium_platform_library_name_at_path(path)
    } else {
        path.to_path_buf()
    }
}

impl RenderLibrary for PdfiumLibrary {
    fn load_document<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> Result<Box<dyn RenderDocument + 'a>, LibraryError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| LibraryError::new(format!("{}", e)))?;
        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl RenderDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page(&self, number: usize) -> Result<Box<dyn RenderPage + '_>, LibraryError> {
        let index = number
            .checked_sub(1)
            .and_then(|i| u16::try_from(i).ok())
            .ok_or_else(|| LibraryError::new(format!("invalid page number {}", number)))?;
        let page = self
            .document
            .pages()
            .get(index)
            .map_err(|e| LibraryError::new(format!("{}", e)))?;
        Ok(Box::new(PdfiumPage { page }))
    }
}

struct PdfiumPage<'a> {
    page: PdfPage<'a>,
}

impl RenderPage for PdfiumPage<'_> {
    fn size(&self) -> (f32, f32) {
        (self.page.width().value, self.page.height().value)
    }

    fn render(&self, context: &mut Context2d<'_>, _viewport: &Viewport) -> Result<(), LibraryError> {
        let render_config = smoothing_config(
            PdfRenderConfig::new()
                .set_target_width(context.width() as i32)
                .set_target_height(context.height() as i32),
            context.smoothing(),
        );

        let bitmap = self
            .page
            .render_with_config(&render_config)
            .map_err(|e| LibraryError::new(format!("{}", e)))?;

        let image = bitmap.as_image().to_rgba8();
        debug!("PDFium rendered {}x{} px", image.width(), image.height());
        context.draw_image(&image, 0, 0);
        Ok(())
    }
}

/// Map canvas smoothing onto PDFium's anti-aliasing switches.
fn smoothing_config(config: PdfRenderConfig, smoothing: Smoothing) -> PdfRenderConfig {
    let (text, paths, images) = match (smoothing.enabled, smoothing.quality) {
        (false, _) => (false, false, false),
        (true, SmoothingQuality::Low) => (true, false, false),
        (true, SmoothingQuality::Medium) => (true, true, false),
        (true, SmoothingQuality::High) => (true, true, true),
    };
    config
        .set_text_smoothing(text)
        .set_path_smoothing(paths)
        .set_image_smoothing(images)
}
