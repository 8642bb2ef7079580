//! In-memory drawing surface: [`Canvas`], its [`Context2d`], and PNG
//! encoding into a [`Blob`].
//!
//! ## Why can the context be unavailable?
//!
//! The pixel buffer is only allocated when a context is first requested, and
//! the request is refused when the canvas is empty or larger than
//! [`MAX_CANVAS_DIMENSION`] / [`MAX_CANVAS_AREA`]. A 4× render of an A0
//! poster would otherwise try to allocate several gigabytes of RGBA.
//!
//! ## Why a callback for encoding?
//!
//! PNG compression at best quality is CPU-heavy. [`Canvas::to_blob`] moves it
//! onto tokio's blocking pool and reports back through a one-shot callback;
//! callers that want a future wrap it in a `oneshot` channel.

use crate::config::OUTPUT_MIME_TYPE;
use crate::output::Blob;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use tracing::{debug, warn};

/// Largest width or height, in pixels, a canvas may have.
pub const MAX_CANVAS_DIMENSION: u32 = 32_767;

/// Largest pixel count a canvas may have (16 384²).
pub const MAX_CANVAS_AREA: u64 = 268_435_456;

/// Resampling quality hint for image smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothingQuality {
    #[default]
    Low,
    Medium,
    High,
}

/// Image smoothing state carried by a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Smoothing {
    pub enabled: bool,
    pub quality: SmoothingQuality,
}

impl Default for Smoothing {
    fn default() -> Self {
        Self {
            enabled: true,
            quality: SmoothingQuality::Low,
        }
    }
}

/// Whether a `width × height` raster is within the canvas limits.
pub fn fits_canvas_limits(width: u32, height: u32) -> bool {
    width > 0
        && height > 0
        && width <= MAX_CANVAS_DIMENSION
        && height <= MAX_CANVAS_DIMENSION
        && u64::from(width) * u64::from(height) <= MAX_CANVAS_AREA
}

/// An off-screen RGBA raster of fixed size.
#[derive(Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Option<RgbaImage>,
    smoothing: Smoothing,
}

impl Canvas {
    /// A canvas of the given size. No memory is allocated until
    /// [`Canvas::context_2d`] succeeds.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: None,
            smoothing: Smoothing::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raster, once a context has been obtained.
    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }

    /// Get the 2D drawing context, allocating a transparent buffer on first
    /// use. `None` if the canvas size is outside the limits.
    pub fn context_2d(&mut self) -> Option<Context2d<'_>> {
        if self.pixels.is_none() {
            if !fits_canvas_limits(self.width, self.height) {
                warn!(
                    "Refusing 2D context for {}x{} canvas (limits: {} px per side, {} px total)",
                    self.width, self.height, MAX_CANVAS_DIMENSION, MAX_CANVAS_AREA
                );
                return None;
            }
            self.pixels = Some(RgbaImage::new(self.width, self.height));
        }
        let pixels = self.pixels.as_mut()?;
        Some(Context2d {
            pixels,
            smoothing: &mut self.smoothing,
        })
    }

    /// Encode the canvas and hand the result to `callback` exactly once.
    ///
    /// Runs on the blocking pool when called inside a tokio runtime, inline
    /// otherwise. The callback receives `None` when no context was ever
    /// obtained or the encoder failed. Only PNG is produced; other MIME
    /// types fall back to it. `quality >= 1.0` selects best compression.
    pub fn to_blob<F>(self, mime_type: &str, quality: f64, callback: F)
    where
        F: FnOnce(Option<Blob>) + Send + 'static,
    {
        if mime_type != OUTPUT_MIME_TYPE {
            debug!("Unsupported blob type '{}', encoding as PNG", mime_type);
        }
        let job = move || callback(self.encode(quality));
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(job);
            }
            Err(_) => job(),
        }
    }

    fn encode(&self, quality: f64) -> Option<Blob> {
        let pixels = self.pixels.as_ref()?;
        match encode_png(pixels, quality) {
            Ok(buf) => {
                debug!(
                    "Encoded {}x{} canvas → {} bytes PNG",
                    pixels.width(),
                    pixels.height(),
                    buf.len()
                );
                Some(Blob::new(buf, OUTPUT_MIME_TYPE))
            }
            Err(e) => {
                warn!("PNG encoding failed: {}", e);
                None
            }
        }
    }
}

fn encode_png(pixels: &RgbaImage, quality: f64) -> Result<Vec<u8>, image::ImageError> {
    let compression = if quality >= 1.0 {
        CompressionType::Best
    } else if quality <= 0.0 {
        CompressionType::Fast
    } else {
        CompressionType::Default
    };

    let mut buf = Vec::new();
    PngEncoder::new_with_quality(&mut buf, compression, FilterType::Adaptive).write_image(
        pixels.as_raw(),
        pixels.width(),
        pixels.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buf)
}

/// Drawing context borrowed from a [`Canvas`].
pub struct Context2d<'a> {
    pixels: &'a mut RgbaImage,
    smoothing: &'a mut Smoothing,
}

impl Context2d<'_> {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn smoothing(&self) -> Smoothing {
        *self.smoothing
    }

    pub fn set_image_smoothing_enabled(&mut self, enabled: bool) {
        self.smoothing.enabled = enabled;
    }

    pub fn set_image_smoothing_quality(&mut self, quality: SmoothingQuality) {
        self.smoothing.quality = quality;
    }

    /// Composite `image` over the canvas with its top-left corner at (x, y).
    pub fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        image::imageops::overlay(&mut *self.pixels, image, x, y);
    }

    /// Overwrite canvas pixels with `image`, ignoring alpha.
    pub fn put_image_data(&mut self, image: &RgbaImage, x: i64, y: i64) {
        image::imageops::replace(&mut *self.pixels, image, x, y);
    }

    pub fn pixels(&self) -> &RgbaImage {
        &*self.pixels
    }
}
