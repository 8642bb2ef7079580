//! End-to-end tests against a real PDFium library.
//!
//! Gated behind `E2E_ENABLED` so they do not run in CI unless a PDFium
//! binary is available. Point `PDFIUM_LIB_PATH` at it, or drop it next to
//! the test executable.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use pdf2png::{convert_pdf_to_image, resolve_object_url, InputFile};
use std::io::Write;

// ── Test helpers ─────────────────────────────────────────────────────────────

macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

/// Build a valid PDF with one page per `(width, height)` in points, each
/// filled with a black rectangle, and a correct cross-reference table.
fn build_pdf(pages: &[(u32, u32)]) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 3 + i * 2).collect();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");
    objects.push(format!(
        "<< /Type /Pages /Kids [{kids}] /Count {} >>",
        pages.len()
    ));
    for (i, (w, h)) in pages.iter().enumerate() {
        let content_id = page_ids[i] + 1;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] /Contents {content_id} 0 R >>"
        ));
        let stream = format!("0 0 0 rg 10 10 {} {} re f", w / 2, h / 2);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}\nendstream",
            stream.len()
        ));
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        write!(out, "{} 0 obj\n{body}\nendobj\n", i + 1).unwrap();
    }
    let xref_at = out.len();
    write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).unwrap();
    for off in offsets {
        write!(out, "{off:010} 00000 n \n").unwrap();
    }
    write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    )
    .unwrap();
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_page_of_two_page_pdf() {
    e2e_skip_unless_enabled!();

    let bytes = build_pdf(&[(200, 100), (50, 50)]);
    let result = convert_pdf_to_image(&InputFile::from_bytes("two-pages.pdf", bytes)).await;
    assert!(result.error.is_none(), "unexpected error: {:?}", result.error);

    let file = result.file.expect("file");
    assert_eq!(file.name, "two-pages.png");
    assert_eq!(file.mime_type, "image/png");
    assert_eq!((file.width, file.height), (800, 400));

    let decoded = image::load_from_memory(file.bytes()).expect("valid PNG").to_rgba8();
    assert_eq!((decoded.width(), decoded.height()), (800, 400));
    // Bottom-left quadrant is covered by the black rectangle.
    let inside = decoded.get_pixel(200, 300).0;
    assert!(inside[0] < 64, "expected dark pixel, got {inside:?}");

    assert!(resolve_object_url(&result.image_url).is_some());
    println!("✓ rendered {}x{} ({} bytes)", file.width, file.height, file.size);
}

#[tokio::test]
async fn test_garbage_input_reports_error() {
    e2e_skip_unless_enabled!();

    let input = InputFile::from_bytes("garbage.pdf", b"definitely not a pdf".to_vec());
    let result = convert_pdf_to_image(&input).await;
    let err = result.error.expect("conversion should fail");
    assert!(err.starts_with("Failed to convert PDF: "), "got: {err}");
    assert!(result.file.is_none());
    assert_eq!(result.image_url, "");
}

#[tokio::test]
async fn test_pdf_on_disk() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Letter.PDF");
    std::fs::write(&path, build_pdf(&[(612, 792)])).unwrap();

    let result = convert_pdf_to_image(&InputFile::from_path(&path)).await;
    let file = result.file.expect("file");
    assert_eq!(file.name, "Letter.png");
    assert_eq!((file.width, file.height), (2448, 3168));

    let out = dir.path().join(&file.name);
    file.write_to(&out).await.unwrap();
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn build_pdf_has_consistent_xref() {
    let pdf = build_pdf(&[(10, 10)]);
    let text = String::from_utf8(pdf).unwrap();
    assert!(text.starts_with("%PDF-1.4"));
    let startxref: usize = text
        .rsplit("startxref\n")
        .next()
        .and_then(|s| s.lines().next())
        .and_then(|s| s.parse().ok())
        .unwrap();
    assert!(text[startxref..].starts_with("xref"));
}
