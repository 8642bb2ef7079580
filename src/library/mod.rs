//! The PDF rendering library seam.
//!
//! The converter never talks to PDFium directly. It goes through three small
//! traits that describe the only operations it needs:
//!
//! ```text
//! RenderLibrary ──load_document──▶ RenderDocument ──page(n)──▶ RenderPage
//!                                   (page_count)               (viewport, render)
//! ```
//!
//! [`pdfium::PdfiumLibrary`] is the production backend. Tests plug in fakes
//! to exercise failure paths that a real PDF cannot easily trigger.
//!
//! Backends are `Send + Sync` so one handle can be shared across tasks, but
//! documents and pages are not: PDFium objects are bound to the thread that
//! created them, so the converter drives them from a single blocking task.

pub mod loader;
pub mod pdfium;

use crate::error::LibraryError;
use crate::surface::Context2d;

pub use loader::{LibraryLoader, LoadStatus};
pub use pdfium::PdfiumLibrary;

/// A loaded PDF rendering library.
pub trait RenderLibrary: Send + Sync + 'static {
    /// Parse `bytes` into a document.
    fn load_document<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> Result<Box<dyn RenderDocument + 'a>, LibraryError>;
}

/// A parsed PDF document.
pub trait RenderDocument {
    fn page_count(&self) -> usize;

    /// Fetch a page by its 1-indexed number.
    fn page(&self, number: usize) -> Result<Box<dyn RenderPage + '_>, LibraryError>;
}

/// A single page that can be rasterised.
pub trait RenderPage {
    /// Page size in PDF points (1/72 inch), after rotation.
    fn size(&self) -> (f32, f32);

    /// Pixel-space viewport at `scale`.
    fn viewport(&self, scale: f32) -> Viewport {
        let (width, height) = self.size();
        Viewport::new(width, height, scale)
    }

    /// Rasterise the page into `context`, covering the whole viewport.
    fn render(&self, context: &mut Context2d<'_>, viewport: &Viewport) -> Result<(), LibraryError>;
}

/// Pixel-space rectangle used to rasterise a page at a given scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl Viewport {
    /// Viewport for a page of `width × height` points scaled by `scale`.
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self {
            width: width * scale,
            height: height * scale,
            scale,
        }
    }

    /// Integer pixel width (fractional pixels are truncated; negative or NaN
    /// sizes become 0).
    pub fn pixel_width(&self) -> u32 {
        self.width as u32
    }

    /// Integer pixel height, truncated like [`Viewport::pixel_width`].
    pub fn pixel_height(&self) -> u32 {
        self.height as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_scales_both_axes() {
        let v = Viewport::new(612.0, 792.0, 4.0);
        assert_eq!((v.pixel_width(), v.pixel_height()), (2448, 3168));
        assert_eq!(v.scale, 4.0);
    }

    #[test]
    fn viewport_truncates_fractional_pixels() {
        let v = Viewport::new(100.6, 50.3, 1.0);
        assert_eq!((v.pixel_width(), v.pixel_height()), (100, 50));
    }

    #[test]
    fn degenerate_viewport_is_zero() {
        let v = Viewport::new(-10.0, f32::NAN, 4.0);
        assert_eq!((v.pixel_width(), v.pixel_height()), (0, 0));
    }
}
