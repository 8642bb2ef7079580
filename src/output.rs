//! Output types: the encoded [`Blob`], the named [`ImageFile`], and the
//! [`ConversionResult`] handed back to callers.
//!
//! A result is either a success (`image_url` + `file`) or a failure
//! (`error`), never both. The constructors are the only way the converter
//! builds one, so the exclusivity holds by construction.

use crate::config::OUTPUT_MIME_TYPE;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

static RE_PDF_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.pdf$").unwrap());

/// Derive the output image name from the input file name.
///
/// A trailing `.pdf` (any case) is stripped and `.png` appended; the stem's
/// case is preserved.
pub fn png_file_name(input_name: &str) -> String {
    format!("{}.png", RE_PDF_SUFFIX.replace(input_name, ""))
}

// ── Blob ─────────────────────────────────────────────────────────────────

/// Immutable encoded bytes plus their MIME type.
///
/// Clones share the same allocation, so a blob can sit in the object-URL
/// registry and inside an [`ImageFile`] at the same time.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Arc<[u8]>,
    mime_type: String,
}

impl Blob {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

// ── ImageFile ────────────────────────────────────────────────────────────

/// A named image built from an encoded blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    /// Pixel width of the encoded raster.
    pub width: u32,
    /// Pixel height of the encoded raster.
    pub height: u32,
    /// Encoded size in bytes.
    pub size: usize,
    #[serde(skip)]
    blob: Blob,
}

impl ImageFile {
    /// Wrap `blob` as a PNG file called `name`.
    pub fn png(blob: Blob, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            mime_type: OUTPUT_MIME_TYPE.to_string(),
            width,
            height,
            size: blob.size(),
            blob,
        }
    }

    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    pub fn bytes(&self) -> &[u8] {
        self.blob.bytes()
    }

    /// `data:` URL embedding the image, for consumers that cannot resolve
    /// object URLs.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(self.bytes()))
    }

    /// Write the encoded bytes to `path`.
    pub async fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        tokio::fs::write(path, self.bytes()).await
    }
}

// ── ConversionResult ─────────────────────────────────────────────────────

/// Outcome of one conversion.
///
/// Exactly one of (`image_url` non-empty and `file` present) or `error`
/// present holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    /// Object URL referencing the PNG blob; empty on failure. Resolve it with
    /// [`crate::object_url::resolve_object_url`] and release it with
    /// [`crate::object_url::revoke_object_url`] when done.
    pub image_url: String,
    pub file: Option<ImageFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResult {
    pub fn success(image_url: impl Into<String>, file: ImageFile) -> Self {
        Self {
            image_url: image_url.into(),
            file: Some(file),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            image_url: String::new(),
            file: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.file.is_some()
    }

    /// Convert into a standard `Result`, for callers that prefer `?`.
    pub fn into_result(self) -> Result<(String, ImageFile), String> {
        match (self.error, self.file) {
            (Some(err), _) => Err(err),
            (None, Some(file)) => Ok((self.image_url, file)),
            (None, None) => Err("conversion produced no image".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> ImageFile {
        ImageFile::png(Blob::new(vec![1u8, 2, 3], "image/png"), "a.png", 4, 8)
    }

    #[test]
    fn png_name_strips_lowercase_suffix() {
        assert_eq!(png_file_name("report.pdf"), "report.png");
    }

    #[test]
    fn png_name_strips_uppercase_suffix_and_keeps_stem_case() {
        assert_eq!(png_file_name("REPORT.PDF"), "REPORT.png");
        assert_eq!(png_file_name("Scan.Pdf"), "Scan.png");
    }

    #[test]
    fn png_name_without_suffix_appends() {
        assert_eq!(png_file_name("notes"), "notes.png");
        assert_eq!(png_file_name("archive.pdf.zip"), "archive.pdf.zip.png");
        assert_eq!(png_file_name("pdf"), "pdf.png");
    }

    #[test]
    fn png_name_only_strips_final_suffix() {
        assert_eq!(png_file_name("a.pdf.pdf"), "a.pdf.png");
    }

    #[test]
    fn success_result_has_no_error() {
        let r = ConversionResult::success("blob:pdf2png/1", sample_file());
        assert!(r.is_success());
        assert!(!r.image_url.is_empty());
        assert!(r.error.is_none());
    }

    #[test]
    fn failure_result_is_empty() {
        let r = ConversionResult::failure("boom");
        assert!(!r.is_success());
        assert_eq!(r.image_url, "");
        assert!(r.file.is_none());
        assert_eq!(r.into_result().unwrap_err(), "boom");
    }

    #[test]
    fn image_file_reports_png_mime_and_size() {
        let f = sample_file();
        assert_eq!(f.mime_type, "image/png");
        assert_eq!(f.size, 3);
        assert_eq!(f.to_data_url(), "data:image/png;base64,AQID");
    }

    #[test]
    fn failure_serialises_error_and_skips_bytes() {
        let json = serde_json::to_value(ConversionResult::failure("nope")).unwrap();
        assert_eq!(json["error"], "nope");
        assert_eq!(json["image_url"], "");
        assert!(json["file"].is_null());

        let json = serde_json::to_value(ConversionResult::success("u", sample_file())).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["file"]["name"], "a.png");
        assert!(json["file"].get("blob").is_none());
    }
}
