use crate::decoder::PageDecoder;
use crate::types::*;
use image::RgbaImage;
use pdfium_render::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

// pdfium is not reentrant; every decoder in the process takes this lock.
static PDFIUM_LOCK: Mutex<()> = Mutex::new(());

impl From<PdfiumError> for RasterError {
    fn from(err: PdfiumError) -> Self {
        RasterError::Pdfium(err.to_string())
    }
}

/// Bind pdfium from `library_dir` if given, then the vendored copy, then the system
pub fn init_pdfium(library_dir: Option<&Path>) -> std::result::Result<Pdfium, PdfiumError> {
    let vendor_dir = std::env::current_dir().ok().and_then(|mut p| {
        p.push("vendor/pdfium/lib");
        if p.exists() { Some(p) } else { None }
    });

    for dir in library_dir.map(Path::to_path_buf).into_iter().chain(vendor_dir) {
        match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir)) {
            Ok(binding) => return Ok(Pdfium::new(binding)),
            Err(e) => log::debug!("No usable pdfium in {}: {}", dir.display(), e),
        }
    }

    Pdfium::bind_to_system_library().map(Pdfium::new)
}

/// Page decoder that renders with pdfium.
///
/// The library is bound per batch on the worker thread, so the decoder itself
/// only carries the search path. Batches from different workers run one at a
/// time.
#[derive(Debug, Clone, Default)]
pub struct PdfiumDecoder {
    library_dir: Option<PathBuf>,
}

impl PdfiumDecoder {
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self { library_dir }
    }

    /// Check that pdfium can be bound before any worker starts
    pub fn check(&self) -> Result<()> {
        let _guard = PDFIUM_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        init_pdfium(self.library_dir.as_deref())?;
        Ok(())
    }
}

impl PageDecoder for PdfiumDecoder {
    fn decode_pages(
        &mut self,
        path: &Path,
        pages: Range<usize>,
        target: TargetSize,
    ) -> Result<Vec<RgbaImage>> {
        let _guard = PDFIUM_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let pdfium = init_pdfium(self.library_dir.as_deref())?;
        let document = pdfium.load_pdf_from_file(path, None)?;
        let config = render_config(target);

        let mut images = Vec::with_capacity(pages.len());
        for index in pages {
            let decode_error = |e: PdfiumError| RasterError::Decode {
                page: index,
                message: e.to_string(),
            };
            let page = document.pages().get(index as u16).map_err(decode_error)?;
            let bitmap = page.render_with_config(&config).map_err(decode_error)?;

            let width = bitmap.width() as u32;
            let height = bitmap.height() as u32;
            let rgba_data = bitmap.as_rgba_bytes().to_vec();
            let image = RgbaImage::from_raw(width, height, rgba_data).ok_or_else(|| {
                RasterError::Decode {
                    page: index,
                    message: format!("bitmap buffer does not match {width}x{height}"),
                }
            })?;
            images.push(image);
        }
        Ok(images)
    }
}

fn render_config(target: TargetSize) -> PdfRenderConfig {
    let config = PdfRenderConfig::new();
    match target {
        TargetSize::Exact { width, height } => {
            config.set_target_size(width as i32, height as i32)
        }
        TargetSize::Width(width) => config.set_target_width(width as i32),
        TargetSize::Height(height) => config.set_target_height(height as i32),
    }
}
