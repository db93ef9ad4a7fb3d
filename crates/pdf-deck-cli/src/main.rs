use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pdf_raster::{DocumentInfo, PdfiumDecoder, RasterConfig, RasterUpdate, Rasterizer};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdeck", about = "Slide deck rasterizer CLI", version)]
struct Cli {
    /// Log worker activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show page count and page aspect ratio
    Info {
        /// Input PDF file
        input: PathBuf,

        /// Only count the first N pages
        #[arg(long)]
        page_limit: Option<usize>,
    },

    /// Rasterize every page to fit a window and write PNG files
    Render {
        /// Input PDF file
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Window width in pixels
        #[arg(long, default_value = "1920", value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,

        /// Window height in pixels
        #[arg(long, default_value = "1080", value_parser = clap::value_parser!(u32).range(1..))]
        height: u32,

        /// Only render the first N pages
        #[arg(long)]
        page_limit: Option<usize>,

        /// Pages decoded per batch
        #[arg(long, default_value = "32")]
        batch_size: usize,

        /// Directory containing the pdfium library
        #[arg(long)]
        pdfium_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    match cli.command {
        Commands::Info { input, page_limit } => {
            let document = DocumentInfo::open(&input, page_limit)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            println!("Document: {}", document.path().display());
            println!("  Pages: {}", document.page_count());
            println!("  Aspect ratio: {:.4}", document.aspect());
        }

        Commands::Render {
            input,
            output,
            width,
            height,
            page_limit,
            batch_size,
            pdfium_dir,
        } => {
            let decoder = PdfiumDecoder::new(pdfium_dir);
            decoder.check().context("Failed to load pdfium")?;

            let config = RasterConfig {
                batch_size,
                ..Default::default()
            };
            let (mut rasterizer, mut updates) =
                Rasterizer::open(&input, page_limit, config, decoder)
                    .with_context(|| format!("Failed to open {}", input.display()))?;
            rasterizer.push_resize(width, height);

            while let Some(update) = updates.recv().await {
                match update {
                    RasterUpdate::Progress { rendered, total } => {
                        println!("Rasterized {rendered}/{total} pages");
                    }
                    RasterUpdate::Retrying {
                        first_page,
                        attempt,
                        message,
                    } => {
                        println!("Retrying from page {} (attempt {attempt}): {message}", first_page + 1);
                    }
                    RasterUpdate::Failed {
                        first_page,
                        message,
                    } => {
                        rasterizer.shutdown();
                        bail!("Rasterization failed at page {}: {}", first_page + 1, message);
                    }
                    RasterUpdate::Ready {
                        width,
                        height,
                        pages,
                    } => {
                        println!("Rendered {pages} pages at {width}x{height}");
                        break;
                    }
                }
            }

            let images = rasterizer
                .snapshot()
                .context("Rasterizer stopped before finishing")?;
            rasterizer.shutdown();

            tokio::fs::create_dir_all(&output).await?;
            let written = tokio::task::spawn_blocking(move || {
                for index in 0..images.len() {
                    let path = output.join(format!("page-{:03}.png", index + 1));
                    if let Some(page) = images.page(index) {
                        page.save(&path)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                    }
                }
                Ok::<_, anyhow::Error>((images.len(), output))
            })
            .await??;
            println!("Wrote {} pages → {}", written.0, written.1.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_args(extra: &[&str]) -> Vec<String> {
        ["pdeck", "render", "deck.pdf", "--output", "out"]
            .iter()
            .chain(extra)
            .map(|arg| arg.to_string())
            .collect()
    }

    #[test]
    fn test_render_defaults_to_full_hd() {
        let cli = Cli::try_parse_from(render_args(&[])).unwrap();
        match cli.command {
            Commands::Render { width, height, .. } => assert_eq!((width, height), (1920, 1080)),
            Commands::Info { .. } => panic!("parsed as info"),
        }
    }

    #[test]
    fn test_render_rejects_empty_window() {
        assert!(Cli::try_parse_from(render_args(&["--width", "0"])).is_err());
        assert!(Cli::try_parse_from(render_args(&["--height", "0"])).is_err());
        assert!(Cli::try_parse_from(render_args(&["--width", "1", "--height", "1"])).is_ok());
    }
}
