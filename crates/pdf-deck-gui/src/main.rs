#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use pdf_raster::{DocumentInfo, PdfiumDecoder};
use std::path::PathBuf;

mod app;
mod config;
mod logger;
mod slide;

use config::DeckConfig;
use logger::AppLogger;

const LOG_CAPACITY: usize = 200;

#[derive(Parser)]
#[command(name = "pdfdeck", about = "Present a PDF with separate audience and presenter windows", version)]
struct Args {
    /// PDF to present; a file dialog opens when omitted
    path: Option<PathBuf>,

    /// Only present the first N pages
    #[arg(long)]
    page_limit: Option<usize>,

    /// Slide to open at, counting from 1
    #[arg(long, default_value = "1")]
    start_page: usize,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing the pdfium library
    #[arg(long)]
    pdfium_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = DeckConfig::load(args.config.as_deref())?;
    let logger = AppLogger::new(LOG_CAPACITY, config.log_level()?);
    logger.init()?;

    let path = match args.path {
        Some(path) => path,
        None => match rfd::FileDialog::new().add_filter("PDF", &["pdf"]).pick_file() {
            Some(path) => path,
            None => return Ok(()),
        },
    };

    let decoder = PdfiumDecoder::new(args.pdfium_dir);
    decoder.check().context("Failed to load pdfium")?;
    let document = DocumentInfo::open(&path, args.page_limit)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let title = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pdfdeck".to_string());
    let app = app::DeckApp::new(
        document,
        &config,
        decoder,
        logger,
        args.start_page.saturating_sub(1),
    )?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_title(format!("{title} (presenter)")),
        ..Default::default()
    };
    eframe::run_native(
        "pdfdeck",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
