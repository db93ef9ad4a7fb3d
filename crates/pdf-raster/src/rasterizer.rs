use crate::decoder::PageDecoder;
use crate::image_set::ImageSet;
use crate::types::*;
use crate::worker::{ImageSetSink, RasterWorker};
use image::RgbaImage;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;

/// Latest published image set, shared between the worker and readers
#[derive(Default)]
struct LatestImages {
    current: Mutex<Option<Arc<ImageSet>>>,
}

impl LatestImages {
    fn snapshot(&self) -> Option<Arc<ImageSet>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ImageSetSink for LatestImages {
    fn on_image_set_ready(&self, images: ImageSet) {
        let images = Arc::new(images);
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(images);
    }
}

/// Handle to a background rasterization worker for one window.
///
/// Nothing here blocks on rendering except [`shutdown`](Rasterizer::shutdown).
pub struct Rasterizer {
    document: DocumentInfo,
    requests: mpsc::UnboundedSender<RasterRequest>,
    images: Arc<LatestImages>,
    worker: Option<JoinHandle<()>>,
}

impl Rasterizer {
    /// Probe `path` and start a worker for it.
    ///
    /// Fails without starting a thread if the document cannot be read.
    pub fn open<D: PageDecoder>(
        path: impl AsRef<Path>,
        page_limit: Option<usize>,
        config: RasterConfig,
        decoder: D,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RasterUpdate>)> {
        let document = DocumentInfo::open(path, page_limit)?;
        Self::spawn(document, config, decoder)
    }

    /// Start a worker for an already probed document
    pub fn spawn<D: PageDecoder>(
        document: DocumentInfo,
        config: RasterConfig,
        decoder: D,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RasterUpdate>)> {
        config.validate()?;

        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let images = Arc::new(LatestImages::default());

        let sink: Arc<dyn ImageSetSink> = images.clone();
        let worker = RasterWorker::new(
            document.clone(),
            config,
            decoder,
            sink,
            request_rx,
            update_tx,
        );
        let handle = thread::Builder::new()
            .name("rasterizer".to_string())
            .spawn(move || worker.run())?;

        Ok((
            Self {
                document,
                requests: request_tx,
                images,
                worker: Some(handle),
            },
            update_rx,
        ))
    }

    pub fn document(&self) -> &DocumentInfo {
        &self.document
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// Ask for the document at a new window size. Ignored after shutdown.
    pub fn push_resize(&self, width: u32, height: u32) {
        let _ = self
            .requests
            .send(RasterRequest::Resize(WindowSize::new(width, height)));
    }

    /// Redo a render cycle that gave up after decode failures
    pub fn retry(&self) {
        let _ = self.requests.send(RasterRequest::Retry);
    }

    /// Image for page `index` from the latest image set.
    ///
    /// Returns `None` until the first set is published, and the blank image
    /// for any index outside the document.
    pub fn get(&self, index: isize) -> Option<Arc<RgbaImage>> {
        self.images
            .snapshot()
            .map(|images| images.page_or_blank(index))
    }

    pub fn snapshot(&self) -> Option<Arc<ImageSet>> {
        self.images.snapshot()
    }

    /// Stop the worker and wait for it to exit. Safe to call more than once.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        let _ = self.requests.send(RasterRequest::Stop);
        if handle.join().is_err() {
            log::error!(
                "Rasterizer worker for {} panicked",
                self.document.path().display()
            );
        }
    }
}

impl Drop for Rasterizer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
