//! First-page PDF → PNG conversion.
//!
//! ## Pipeline
//!
//! ```text
//! get library ─▶ read bytes ─▶ parse ─▶ page 1 ─▶ canvas @4× ─▶ render ─▶ to_blob
//!   (shared)      (tokio fs)   └──────────── spawn_blocking ─────────────┘  (callback)
//! ```
//!
//! Parse, page fetch and render run in one `spawn_blocking` task because
//! PDFium documents and pages are not `Send`: they have to be created, used
//! and dropped on the same thread.
//!
//! ## Why a result value instead of `Result`?
//!
//! Callers display whatever comes back. [`PdfToImageConverter::convert`]
//! catches every failure at one boundary and turns it into
//! [`ConversionResult::failure`], so there is nothing to match on and nothing
//! that can propagate past the UI.

use crate::config::{LibraryConfig, ENCODE_QUALITY, OUTPUT_MIME_TYPE, RENDER_SCALE};
use crate::error::ConvertError;
use crate::input::InputFile;
use crate::library::pdfium::load_pdfium;
use crate::library::{LibraryLoader, LoadStatus, PdfiumLibrary, RenderLibrary};
use crate::object_url::create_object_url;
use crate::output::{png_file_name, Blob, ConversionResult, ImageFile};
use crate::surface::{Canvas, SmoothingQuality};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Page rendered by every conversion (1-indexed).
pub const FIRST_PAGE: usize = 1;

static DEFAULT_CONVERTER: Lazy<PdfToImageConverter<PdfiumLibrary>> =
    Lazy::new(|| PdfToImageConverter::pdfium(LibraryConfig::from_env()));

/// Convert the first page of `file` using the process-wide PDFium converter.
///
/// PDFium is located through [`LibraryConfig::from_env`] and bound on the
/// first call; later calls reuse it.
pub async fn convert_pdf_to_image(file: &InputFile) -> ConversionResult {
    DEFAULT_CONVERTER.convert(file).await
}

/// Converts PDFs to PNGs with a lazily loaded rendering library.
///
/// Clones share the same loader.
pub struct PdfToImageConverter<L> {
    loader: Arc<LibraryLoader<L>>,
}

impl<L> Clone for PdfToImageConverter<L> {
    fn clone(&self) -> Self {
        Self {
            loader: Arc::clone(&self.loader),
        }
    }
}

impl PdfToImageConverter<PdfiumLibrary> {
    /// A converter backed by PDFium, bound on first use.
    pub fn pdfium(config: LibraryConfig) -> Self {
        Self::new(LibraryLoader::new(move || load_pdfium(config.clone())))
    }
}

impl<L: RenderLibrary> PdfToImageConverter<L> {
    pub fn new(loader: LibraryLoader<L>) -> Self {
        Self {
            loader: Arc::new(loader),
        }
    }

    pub fn library_status(&self) -> LoadStatus {
        self.loader.status()
    }

    /// Render page one of `file` to a PNG.
    ///
    /// Never fails: every error is reported through
    /// [`ConversionResult::error`].
    pub async fn convert(&self, file: &InputFile) -> ConversionResult {
        let started = Instant::now();
        match self.try_convert(file).await {
            Ok(result) => {
                info!(
                    "Converted '{}' in {} ms",
                    file.name(),
                    started.elapsed().as_millis()
                );
                result
            }
            Err(e) if e.is_early_return() => {
                warn!("Conversion of '{}' stopped early: {}", file.name(), e);
                ConversionResult::failure(e.into_message())
            }
            Err(e) => {
                error!("Exception during PDF conversion of '{}': {}", file.name(), e);
                ConversionResult::failure(e.into_message())
            }
        }
    }

    async fn try_convert(&self, file: &InputFile) -> Result<ConversionResult, ConvertError> {
        debug!("Loading PDF rendering library");
        let library = self.loader.get().await?;
        debug!("PDF rendering library ready");

        debug!("Reading '{}'", file.name());
        let bytes = file
            .read_bytes()
            .await
            .map_err(|source| ConvertError::FileRead {
                name: file.name().to_string(),
                source,
            })?;
        debug!("Read {} bytes", bytes.len());

        let canvas = tokio::task::spawn_blocking(move || rasterize_first_page(&*library, &bytes))
            .await
            .map_err(|e| ConvertError::Internal(format!("Render task panicked: {}", e)))??;
        let (width, height) = (canvas.width(), canvas.height());

        debug!("Converting canvas to blob");
        let (tx, rx) = tokio::sync::oneshot::channel();
        canvas.to_blob(OUTPUT_MIME_TYPE, ENCODE_QUALITY, move |blob| {
            let _ = tx.send(blob);
        });
        let blob = rx.await.unwrap_or(None);

        Ok(finish(blob, file.name(), width, height))
    }
}

/// Parse `bytes`, render page one at [`RENDER_SCALE`] and return the canvas.
fn rasterize_first_page<L: RenderLibrary + ?Sized>(
    library: &L,
    bytes: &[u8],
) -> Result<Canvas, ConvertError> {
    debug!("Loading PDF document");
    let document = library
        .load_document(bytes)
        .map_err(ConvertError::DocumentParse)?;
    let page_count = document.page_count();
    info!("PDF document loaded ({} pages)", page_count);

    if page_count < FIRST_PAGE {
        return Err(ConvertError::PageRetrieval {
            page: FIRST_PAGE,
            detail: "document has no pages".into(),
        });
    }
    let page = document
        .page(FIRST_PAGE)
        .map_err(|e| ConvertError::PageRetrieval {
            page: FIRST_PAGE,
            detail: e.to_string(),
        })?;
    debug!("Page {} retrieved", FIRST_PAGE);

    let viewport = page.viewport(RENDER_SCALE);
    let mut canvas = Canvas::new(viewport.pixel_width(), viewport.pixel_height());
    let Some(mut context) = canvas.context_2d() else {
        error!("Canvas context could not be retrieved");
        return Err(ConvertError::ContextUnavailable);
    };
    context.set_image_smoothing_enabled(true);
    context.set_image_smoothing_quality(SmoothingQuality::High);

    debug!(
        "Rendering page {} at {}x{} px",
        FIRST_PAGE,
        context.width(),
        context.height()
    );
    page.render(&mut context, &viewport)
        .map_err(ConvertError::Render)?;
    debug!("Rendering complete");

    Ok(canvas)
}

/// Build the final result from the encoder's output.
///
/// `None` is only reachable when the canvas never got a context (already
/// rejected in [`rasterize_first_page`]) or the PNG encoder errors, so the
/// encode-failure branch is covered here and in `surface` rather than
/// through [`PdfToImageConverter::convert`].
fn finish(blob: Option<Blob>, input_name: &str, width: u32, height: u32) -> ConversionResult {
    match blob {
        Some(blob) => {
            let name = png_file_name(input_name);
            let image_url = create_object_url(&blob);
            debug!("Blob created: {} ({} bytes)", name, blob.size());
            ConversionResult::success(image_url, ImageFile::png(blob, name, width, height))
        }
        None => {
            error!("Canvas encoding produced no blob");
            ConversionResult::failure(ConvertError::Encode.into_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_url::{resolve_object_url, revoke_object_url};

    #[test]
    fn missing_blob_is_an_encode_failure() {
        let r = finish(None, "report.pdf", 10, 10);
        assert_eq!(r.error.as_deref(), Some("Failed to create image blob"));
        assert_eq!(r.image_url, "");
        assert!(r.file.is_none());
    }

    #[test]
    fn blob_becomes_named_png_with_object_url() {
        let blob = Blob::new(vec![1u8, 2, 3], "image/png");
        let r = finish(Some(blob.clone()), "REPORT.PDF", 8, 6);

        let file = r.file.as_ref().unwrap();
        assert_eq!(file.name, "REPORT.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!((file.width, file.height), (8, 6));
        assert!(r.error.is_none());
        assert_eq!(resolve_object_url(&r.image_url), Some(blob));
        assert!(revoke_object_url(&r.image_url));
    }

    #[test]
    fn converter_starts_unloaded() {
        let converter = PdfToImageConverter::pdfium(LibraryConfig::default());
        assert_eq!(converter.library_status(), LoadStatus::NotStarted);
    }
}
