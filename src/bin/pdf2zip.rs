//! CLI binary for edgequake-pdf2zip.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and writes the archive.

use anyhow::{bail, Context, Result};
use clap::Parser;
use edgequake_pdf2zip::{
    convert_with, download_name, inspect_with, write_archive, ConversionConfig,
    ConversionProgressCallback, PdfiumEngine, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
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
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a single bar that advances once per page.
struct CliProgressCallback {
    bar: ProgressBar,
    image_bytes: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            image_bytes: AtomicUsize::new(0),
        })
    }

    /// Stop the spinner if the driver never reached a terminal event,
    /// e.g. when the document failed to open.
    fn abandon_if_running(&self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Rendering");
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, _page_num: usize, _total: usize, image_bytes: usize) {
        self.image_bytes.fetch_add(image_bytes, Ordering::SeqCst);
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.bar.abandon();
        eprintln!("  {} Page {:>3}/{:<3}  {}", red("✗"), page_num, total, red(error));
    }

    fn on_conversion_complete(&self, total_pages: usize, archive_bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages rendered  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!(
                "{} KiB images → {} KiB zip",
                self.image_bytes.load(Ordering::SeqCst) / 1024,
                archive_bytes / 1024
            )),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Writes report_images.zip next to the input
  pdf2zip report.pdf

  # Explicit output path
  pdf2zip report.pdf -o /tmp/pages.zip

  # Encrypted document, maximum compression
  pdf2zip --password s3cret --compression-level 9 statement.pdf

  # Page count and entry names only
  pdf2zip --inspect-only --json report.pdf

ARCHIVE LAYOUT:
  page_001.png, page_002.png, … one RGB PNG per page at the page's
  intrinsic size (1 px per PDF point), deflate-compressed.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  PDFIUM_AUTO_CACHE_DIR   Override the shared pdfium cache directory
  RUST_LOG                Log filter (overrides -v / -q)
"#;

/// Rasterise every page of a PDF into a ZIP of PNG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2zip",
    version,
    about = "Rasterise every page of a PDF into a ZIP of PNG images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Write the archive here instead of `<input-stem>_images.zip`.
    #[arg(short, long, env = "PDF2ZIP_OUTPUT")]
    output: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2ZIP_PASSWORD")]
    password: Option<String>,

    /// Deflate level for archive entries (0–9).
    #[arg(long, env = "PDF2ZIP_COMPRESSION_LEVEL",
          value_parser = clap::value_parser!(i64).range(0..=9))]
    compression_level: Option<i64>,

    /// Print page count and entry names only, no rendering.
    #[arg(long)]
    inspect_only: bool,

    /// Print a JSON summary on stdout.
    #[arg(long, env = "PDF2ZIP_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2ZIP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2ZIP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2ZIP_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Validate input ───────────────────────────────────────────────────
    check_pdf_extension(&cli.input)?;
    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    if bytes.is_empty() {
        bail!("No file content: '{}' is empty", cli.input.display());
    }

    let engine = PdfiumEngine::bind().context("Failed to load the PDF rendering engine")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect_with(&engine, &bytes, cli.password.as_deref())
            .context("Failed to inspect PDF")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize info")?
            );
        } else {
            println!("File:     {}", cli.input.display());
            println!("Pages:    {}", info.page_count);
            println!("Entries:  {}", info.entry_names.join(", "));
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let cli_progress = show_progress.then(CliProgressCallback::new);
    let progress_cb = cli_progress.clone().map(|cb| cb as ProgressCallback);
    let config = build_config(&cli, progress_cb)?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    // ── Run conversion ───────────────────────────────────────────────────
    let start = Instant::now();
    let archive = convert_with(&engine, &bytes, &config)
        .inspect_err(|_| {
            if let Some(ref cb) = cli_progress {
                cb.abandon_if_running();
            }
        })
        .context("Conversion failed")?;
    write_archive(&archive, &output_path).context("Failed to write archive")?;

    let summary = archive.summary();
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            summary.page_count,
            start.elapsed().as_millis(),
            bold(&output_path.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder();
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(level) = cli.compression_level {
        builder = builder.compression_level(level);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

/// Only `.pdf` files are accepted (case-insensitive).
fn check_pdf_extension(path: &Path) -> Result<()> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        bail!(
            "Please provide a PDF file (.pdf), got '{}'",
            path.display()
        );
    }
    Ok(())
}

/// `<dir>/<stem>_images.zip` next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(download_name(&file_name))
}
