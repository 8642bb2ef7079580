//! CLI binary for pdf2png.
//!
//! A thin shim over the library crate: maps CLI flags to a
//! `LibraryConfig`, converts one PDF and writes the PNG.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2png::{ConversionResult, InputFile, LibraryConfig, PdfToImageConverter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Writes report.png next to report.pdf
  pdf2png report.pdf

  # Choose the output path
  pdf2png scan.PDF -o thumbnails/scan.png

  # Machine-readable result
  pdf2png --json report.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Log filter, overrides --verbose / --quiet

The first page is rendered at 4x its native size. PDFium is searched in
PDFIUM_LIB_PATH, next to the executable, in the working directory, and
finally on the system library path.
"#;

/// Render the first page of a PDF to a PNG image.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2png",
    version,
    about = "Render the first page of a PDF to a PNG image",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    input: PathBuf,

    /// Where to write the PNG. Default: next to the input, `.pdf` → `.png`.
    #[arg(short, long, env = "PDF2PNG_OUTPUT")]
    output: Option<PathBuf>,

    /// Path to the PDFium library file or its directory.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    library_path: Option<PathBuf>,

    /// Do not fall back to the system library search path.
    #[arg(long)]
    no_system_library: bool,

    /// Print the conversion result as JSON.
    #[arg(long, env = "PDF2PNG_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PNG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PNG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers progress; library INFO logs would tear it.
    let show_spinner = !cli.quiet && !cli.json && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = LibraryConfig::builder().use_system_library(!cli.no_system_library);
    if let Some(ref path) = cli.library_path {
        builder = builder.library_path(path.clone());
    }
    let config = builder.build().context("Invalid PDFium location")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let spinner = show_spinner.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Rendering");
        bar.set_message(cli.input.display().to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let converter = PdfToImageConverter::pdfium(config);
    let result = converter.convert(&InputFile::from_path(&cli.input)).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let output_path = write_output(&cli, &result).await?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        );
    }

    match (&result.error, output_path) {
        (Some(err), _) => {
            if !cli.json {
                eprintln!("{} {}", red("✘"), err);
            }
            bail!("conversion failed");
        }
        (None, Some(path)) => {
            if !cli.quiet && !cli.json {
                let file = result.file.as_ref();
                eprintln!(
                    "{} {}  {}",
                    green("✔"),
                    path.display(),
                    dim(&format!(
                        "{}x{} px, {} bytes",
                        file.map_or(0, |f| f.width),
                        file.map_or(0, |f| f.height),
                        file.map_or(0, |f| f.size)
                    ))
                );
            }
            Ok(())
        }
        (None, None) => bail!("conversion produced no image"),
    }
}

/// Write the PNG, if there is one. Returns the path written.
async fn write_output(cli: &Cli, result: &ConversionResult) -> Result<Option<PathBuf>> {
    let Some(file) = result.file.as_ref() else {
        return Ok(None);
    };

    let path = match &cli.output {
        Some(p) => p.clone(),
        None => default_output_path(&cli.input, &file.name),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    file.write_to(&path)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(Some(path))
}

fn default_output_path(input: &Path, file_name: &str) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output_path(Path::new("/data/in/report.pdf"), "report.png"),
            PathBuf::from("/data/in/report.png")
        );
        assert_eq!(
            default_output_path(Path::new("report.pdf"), "report.png"),
            PathBuf::from("report.png")
        );
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "pdf2png",
            "a.pdf",
            "-o",
            "out/a.png",
            "--library-path",
            "/opt/pdfium",
            "--no-system-library",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.input, PathBuf::from("a.pdf"));
        assert_eq!(cli.output, Some(PathBuf::from("out/a.png")));
        assert_eq!(cli.library_path, Some(PathBuf::from("/opt/pdfium")));
        assert!(cli.no_system_library);
        assert!(cli.json);
    }
}
