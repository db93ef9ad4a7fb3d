use crate::constants::*;
use crate::metadata::{LopdfProbe, MetadataProbe};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Pdfium error: {0}")]
    Pdfium(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Document has no pages")]
    NoPages,
    #[error("Failed to decode page {page}: {message}")]
    Decode { page: usize, message: String },
}

pub type Result<T> = std::result::Result<T, RasterError>;

/// Window dimensions in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Requested render size for every page of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetSize {
    /// Both dimensions fixed
    Exact { width: u32, height: u32 },
    /// Fixed width, height follows the page aspect ratio
    Width(u32),
    /// Fixed height, width follows the page aspect ratio
    Height(u32),
}

impl TargetSize {
    /// Largest page size that fits `window` without distorting the page.
    ///
    /// Returns `None` for a window with no area (minimized windows report
    /// zero sizes on some platforms).
    pub fn fit(window: WindowSize, aspect: f32) -> Option<Self> {
        if window.is_empty() {
            return None;
        }
        let window_aspect = window.width as f32 / window.height as f32;
        if window_aspect >= aspect {
            Some(TargetSize::Height(window.height))
        } else {
            Some(TargetSize::Width(window.width))
        }
    }

    /// Concrete pixel dimensions for a page with the given aspect ratio
    pub fn resolve(self, aspect: f32) -> (u32, u32) {
        match self {
            TargetSize::Exact { width, height } => (width.max(1), height.max(1)),
            TargetSize::Width(width) => {
                let height = (width as f32 / aspect).round() as u32;
                (width.max(1), height.max(1))
            }
            TargetSize::Height(height) => {
                let width = (height as f32 * aspect).round() as u32;
                (width.max(1), height.max(1))
            }
        }
    }
}

/// What a metadata probe learns about a document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentMetadata {
    pub page_count: usize,
    /// Displayed width of the first page, in points
    pub page_width_pt: f32,
    /// Displayed height of the first page, in points
    pub page_height_pt: f32,
}

impl DocumentMetadata {
    pub fn aspect(&self) -> f32 {
        self.page_width_pt / self.page_height_pt
    }
}

/// The document being presented, resolved once per session
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    path: PathBuf,
    page_count: usize,
    aspect: f32,
}

impl DocumentInfo {
    /// Probe `path` with lopdf, keeping at most `page_limit` pages
    pub fn open(path: impl AsRef<Path>, page_limit: Option<usize>) -> Result<Self> {
        Self::probe_with(&LopdfProbe, path, page_limit)
    }

    pub fn probe_with(
        probe: &impl MetadataProbe,
        path: impl AsRef<Path>,
        page_limit: Option<usize>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let metadata = probe.probe(path)?;
        Self::from_metadata(path, metadata, page_limit)
    }

    pub fn from_metadata(
        path: impl Into<PathBuf>,
        metadata: DocumentMetadata,
        page_limit: Option<usize>,
    ) -> Result<Self> {
        let page_count = match page_limit {
            Some(limit) => metadata.page_count.min(limit),
            None => metadata.page_count,
        };
        if page_count == 0 {
            return Err(RasterError::NoPages);
        }

        let aspect = metadata.aspect();
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(RasterError::Config(format!(
                "Invalid page size {}x{}",
                metadata.page_width_pt, metadata.page_height_pt
            )));
        }

        Ok(Self {
            path: path.into(),
            page_count,
            aspect,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Page width divided by page height
    pub fn aspect(&self) -> f32 {
        self.aspect
    }
}

/// Worker tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterConfig {
    pub batch_size: usize,
    pub max_decode_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_decode_attempts: DEFAULT_MAX_DECODE_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl RasterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(RasterError::Config(
                "Batch size must be at least 1".to_string(),
            ));
        }
        if self.max_decode_attempts == 0 {
            return Err(RasterError::Config(
                "Decode attempts must be at least 1".to_string(),
            ));
        }
        if self.retry_backoff > MAX_RETRY_BACKOFF {
            return Err(RasterError::Config(format!(
                "Retry backoff must be at most {:?}",
                MAX_RETRY_BACKOFF
            )));
        }
        Ok(())
    }
}

/// Messages from the owner to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterRequest {
    Resize(WindowSize),
    /// Restart a render cycle that failed
    Retry,
    Stop,
}

/// Status sent from the worker to the owner
#[derive(Debug, Clone, PartialEq)]
pub enum RasterUpdate {
    Progress {
        rendered: usize,
        total: usize,
    },
    /// A complete image set was published
    Ready {
        width: u32,
        height: u32,
        pages: usize,
    },
    Retrying {
        first_page: usize,
        attempt: u32,
        message: String,
    },
    /// The render cycle was abandoned; the previous image set stays current
    Failed {
        first_page: usize,
        message: String,
    },
}
