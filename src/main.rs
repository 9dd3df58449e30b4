//! fortdoc: generate documentation from annotated Fortran source files.
//!
//! Supports two modes:
//!
//! - **stdin mode**: `fortdoc < file.f90`
//! - **file mode**: `fortdoc -o docs/api src/*.f90`

use anyhow::{Context, Result};
use clap::Parser;
use fortdoc::render::{self, Renderer};
use fortdoc::{extract, DocMarkers, Extraction, SyntaxTree};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fortdoc",
    about = "Generate documentation from annotated Fortran source files"
)]
struct Cli {
    /// Input files (glob patterns supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory (required when files are given)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: markdown (default), json
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    /// Docstring marker recognized after declarations
    #[arg(long, default_value = fortdoc::config::DEFAULT_MARKER)]
    marker: String,

    /// Four marker variants: doc,doc-alt,pre-doc,pre-doc-alt.
    /// A single character stands for `!` followed by it, e.g. '!,*,>,|'
    #[arg(long, conflicts_with = "marker")]
    doc_marks: Option<String>,

    /// Use the line-pattern extractor instead of the syntax tree
    #[arg(long)]
    text: bool,

    /// Log debug events (RUST_LOG overrides)
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let markers = markers(&cli)?;
    let renderer = render::create_renderer(&cli.format)?;

    if cli.files.is_empty() {
        return stdin_mode(&cli, &markers, renderer.as_ref());
    }

    file_mode(&cli, &markers, renderer.as_ref())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();
}

fn markers(cli: &Cli) -> Result<DocMarkers> {
    let markers = match &cli.doc_marks {
        Some(list) => DocMarkers::parse_variants(list),
        None => DocMarkers::single(&cli.marker),
    };
    markers.context("invalid docstring marker configuration")
}

fn run_extraction(source: &str, markers: &DocMarkers, text_only: bool) -> Extraction {
    if text_only {
        return extract(source, None, markers);
    }
    let tree = SyntaxTree::parse(source);
    extract(source, Some(&tree), markers)
}

/// stdin mode: read from stdin, write the rendered page to stdout.
fn stdin_mode(cli: &Cli, markers: &DocMarkers, renderer: &dyn Renderer) -> Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let result = run_extraction(&input, markers, cli.text);
    print!("{}", renderer.render(&result.model)?);
    Ok(())
}

/// file mode: process multiple files, write one page per file to the output directory.
fn file_mode(cli: &Cli, markers: &DocMarkers, renderer: &dyn Renderer) -> Result<()> {
    let output_dir = cli
        .output
        .as_deref()
        .context("--output is required when files are given")?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    let input_files = expand_globs(&cli.files)?;
    let ext = renderer.file_extension();

    for path in &input_files {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let span = tracing::info_span!("file", path = %path.display());
        let _enter = span.enter();

        let result = run_extraction(&content, markers, cli.text);
        // Skip files with nothing documented (e.g. a bare program)
        if result.model.is_empty() {
            tracing::debug!("no entities, no output");
            continue;
        }

        let source = path.to_string_lossy();
        let name = derive_output_name(&source);
        let out_path = output_dir.join(format!("{}.{}", name, ext));

        fs::write(&out_path, renderer.render(&result.model)?)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
    }

    Ok(())
}

/// File extensions recognized as free-form Fortran sources.
const SUPPORTED_EXTENSIONS: &[&str] = &["f90", "f95", "f03", "f08", "F90", "F95", "F03", "F08"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for supported file types.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // If it's a directory, scan for supported extensions (non-recursive)
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && has_supported_extension(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        // Try as glob
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            tracing::warn!("no files matched: {}", pattern);
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// Derive the output file name (without extension) from a source path.
/// "src/math_utils.f90" → "math_utils"
fn derive_output_name(source: &str) -> String {
    let filename = source.rsplit(['/', '\\']).next().unwrap_or(source);
    SUPPORTED_EXTENSIONS
        .iter()
        .find_map(|ext| {
            filename
                .strip_suffix(ext)
                .and_then(|stem| stem.strip_suffix('.'))
        })
        .unwrap_or(filename)
        .to_string()
}
