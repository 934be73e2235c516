//! MDView - Markdown preview renderer
//!
//! Entry point for the command line tool. Handles CLI argument parsing,
//! logging initialization, and rendering of the requested documents.

use anyhow::{bail, Context};
use mdview::config::Config;
use mdview::error::PipelineError;
use mdview::file_handler::{read_file, scan_directory, ScanConfig};
use mdview::markdown::{export_html, render_offloaded, suggest_output_path, RenderPipeline};
use mdview::state::{PresentationSettings, ThemeMode};
use mdview::utils::path::expand_tilde;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application name for logging
const APP_NAME: &str = "mdview";

/// Options parsed from the command line
#[derive(Debug, Default)]
struct Flags {
    files: Vec<PathBuf>,
    list_dir: Option<PathBuf>,
    export: bool,
    dark: bool,
    font_size_pt: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let flags = parse_args();
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Using default configuration: {}", e);
        Config::default()
    });
    config.validate()?;

    if let Some(dir) = &flags.list_dir {
        return list_documents(dir, &config);
    }
    if flags.files.is_empty() {
        bail!("no input files (use --help for usage information)");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    runtime.block_on(render_files(&flags, &config))
}

/// Initialize the logging system
fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,mdview=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .init();
}

/// Render each file in order, to stdout or to a sibling `.html` file
async fn render_files(flags: &Flags, config: &Config) -> anyhow::Result<()> {
    let pipeline = Arc::new(RenderPipeline::from_config(&config.render)?);

    let mut settings = config.presentation();
    if flags.dark {
        settings = settings.with_theme(ThemeMode::Dark);
    }
    if let Some(size) = flags.font_size_pt {
        settings = settings.with_font_size(size);
    }

    for path in &flags.files {
        let html = render_file(Arc::clone(&pipeline), path, settings, config).await?;

        if flags.export {
            let output = suggest_output_path(path);
            export_html(&html, &output)
                .with_context(|| format!("failed to export {}", path.display()))?;
            println!("{}", output.display());
        } else {
            println!("{}", html);
        }
    }
    Ok(())
}

async fn render_file(
    pipeline: Arc<RenderPipeline>,
    path: &Path,
    settings: PresentationSettings,
    config: &Config,
) -> anyhow::Result<String> {
    match read_file(path, config.files.max_file_size).await {
        Ok(text) => Ok(render_offloaded(pipeline, text, settings).await?),
        Err(e) => {
            log::error!("Failed to load {}: {}", path.display(), e);
            Ok(pipeline.render_error(&PipelineError::from(e), &settings))
        }
    }
}

/// Print every eligible document under a directory
fn list_documents(dir: &Path, config: &Config) -> anyhow::Result<()> {
    let tree = scan_directory(dir, &ScanConfig::from(&config.files))
        .with_context(|| format!("failed to list {}", dir.display()))?;

    log::info!("Found {} documents", tree.document_count);
    for path in tree.documents() {
        println!("{}", path.display());
    }
    Ok(())
}

/// Parse command line arguments
fn parse_args() -> Flags {
    let args: Vec<String> = std::env::args().collect();
    let mut flags = Flags::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-l" | "--list" => {
                if i + 1 < args.len() {
                    flags.list_dir = Some(expand_tilde(Path::new(&args[i + 1])));
                    i += 1;
                } else {
                    eprintln!("Error: --list requires a directory argument");
                    std::process::exit(1);
                }
            }
            "-e" | "--export" => flags.export = true,
            "--dark" => flags.dark = true,
            "--font-size" => match args.get(i + 1).and_then(|s| s.parse().ok()) {
                Some(size) => {
                    flags.font_size_pt = Some(size);
                    i += 1;
                }
                None => {
                    eprintln!("Error: --font-size requires a point size");
                    std::process::exit(1);
                }
            },
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
            _ => flags.files.push(expand_tilde(Path::new(&args[i]))),
        }
        i += 1;
    }

    flags
}

/// Print help message
fn print_help() {
    println!(
        r#"MDView - Markdown preview renderer

USAGE:
    mdview [OPTIONS] [FILES...]

OPTIONS:
    -h, --help              Show this help message
    -v, --version           Show version information
    -l, --list DIR          List the Markdown documents under DIR
    -e, --export            Write FILE.html next to each input instead of stdout
        --dark              Render with the dark theme
        --font-size N       Render with an N point base font

EXAMPLES:
    mdview README.md                    Print the rendered document
    mdview --export docs/*.md           Export each document to HTML
    mdview --list ~/Documents           List documents in a directory
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
