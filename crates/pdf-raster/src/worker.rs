use crate::constants::{BACKOFF_POLL_INTERVAL, MAX_RETRY_BACKOFF};
use crate::decoder::PageDecoder;
use crate::image_set::ImageSet;
use crate::types::*;
use image::RgbaImage;
use std::ops::Range;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tokio::sync::mpsc;

/// Receives complete image sets from a worker
pub trait ImageSetSink: Send + Sync + 'static {
    /// Called on the worker thread, once per uninterrupted render cycle
    fn on_image_set_ready(&self, images: ImageSet);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleState {
    Rendering,
    Published,
    Failed,
}

/// One attempt at rendering the whole document at one size
struct RenderCycle {
    target: TargetSize,
    pages: Vec<Option<RgbaImage>>,
    next_page: usize,
    attempts: u32,
    // Set after a failed batch; the batch is retried once this passes.
    retry_at: Option<Instant>,
    state: CycleState,
}

impl RenderCycle {
    fn new(target: TargetSize, page_count: usize) -> Self {
        Self {
            target,
            pages: (0..page_count).map(|_| None).collect(),
            next_page: 0,
            attempts: 0,
            retry_at: None,
            state: CycleState::Rendering,
        }
    }

    fn is_idle(&self) -> bool {
        self.state != CycleState::Rendering
    }
}

/// What the queue held when it was drained
#[derive(Debug, Default)]
struct Drained {
    stop: bool,
    latest: Option<WindowSize>,
    retry: bool,
}

/// Renders every page of a document, restarting whenever the size changes.
///
/// Normally driven by a [`Rasterizer`](crate::Rasterizer), which runs
/// [`run`](RasterWorker::run) on a dedicated thread.
pub struct RasterWorker<D> {
    document: DocumentInfo,
    config: RasterConfig,
    decoder: D,
    sink: Arc<dyn ImageSetSink>,
    requests: mpsc::UnboundedReceiver<RasterRequest>,
    updates: mpsc::UnboundedSender<RasterUpdate>,
}

impl<D: PageDecoder> RasterWorker<D> {
    pub fn new(
        document: DocumentInfo,
        config: RasterConfig,
        decoder: D,
        sink: Arc<dyn ImageSetSink>,
        requests: mpsc::UnboundedReceiver<RasterRequest>,
        updates: mpsc::UnboundedSender<RasterUpdate>,
    ) -> Self {
        Self {
            document,
            config,
            decoder,
            sink,
            requests,
            updates,
        }
    }

    /// Process requests until `Stop` arrives or every sender is gone
    pub fn run(mut self) {
        let Some(target) = self.wait_for_first_target() else {
            log::debug!("Rasterizer stopped before the first resize");
            return;
        };
        let mut cycle = RenderCycle::new(target, self.document.page_count());

        loop {
            let drained = self.drain_requests();
            if drained.stop {
                return;
            }
            self.apply(&mut cycle, drained);

            if cycle.is_idle() {
                // Nothing to do until the owner asks for something.
                let drained = match self.requests.blocking_recv() {
                    None | Some(RasterRequest::Stop) => return,
                    Some(RasterRequest::Resize(window)) => Drained {
                        latest: Some(window),
                        ..Default::default()
                    },
                    Some(RasterRequest::Retry) => Drained {
                        retry: true,
                        ..Default::default()
                    },
                };
                self.apply(&mut cycle, drained);
                continue;
            }

            if let Some(retry_at) = cycle.retry_at {
                let now = Instant::now();
                if now < retry_at {
                    // Keep draining so a stop or a new size cuts the wait short.
                    thread::sleep((retry_at - now).min(BACKOFF_POLL_INTERVAL));
                    continue;
                }
                cycle.retry_at = None;
            }

            self.step(&mut cycle);
        }
    }

    fn wait_for_first_target(&mut self) -> Option<TargetSize> {
        loop {
            match self.requests.blocking_recv()? {
                RasterRequest::Stop => return None,
                RasterRequest::Retry => {}
                RasterRequest::Resize(window) => {
                    if let Some(target) = TargetSize::fit(window, self.document.aspect()) {
                        return Some(target);
                    }
                }
            }
        }
    }

    /// Empty the queue without blocking, keeping only the newest resize
    fn drain_requests(&mut self) -> Drained {
        let mut drained = Drained::default();
        while let Ok(request) = self.requests.try_recv() {
            match request {
                RasterRequest::Stop => {
                    drained.stop = true;
                    break;
                }
                RasterRequest::Resize(window) => {
                    if let Some(older) = drained.latest.replace(window) {
                        log::debug!("Discarding queued resize to {:?}", older);
                    }
                }
                RasterRequest::Retry => drained.retry = true,
            }
        }
        drained
    }

    fn apply(&self, cycle: &mut RenderCycle, drained: Drained) {
        let target = drained
            .latest
            .and_then(|window| TargetSize::fit(window, self.document.aspect()));

        match target {
            Some(target) if target != cycle.target => {
                if cycle.state == CycleState::Rendering {
                    log::debug!(
                        "Abandoning render at {:?} after {} pages, restarting at {:?}",
                        cycle.target,
                        cycle.next_page,
                        target
                    );
                }
                *cycle = RenderCycle::new(target, self.document.page_count());
            }
            // Same size as the current cycle: only a failed cycle is redone.
            Some(target) if cycle.state == CycleState::Failed => {
                *cycle = RenderCycle::new(target, self.document.page_count());
            }
            _ if drained.retry && cycle.state == CycleState::Failed => {
                log::info!("Retrying render at {:?}", cycle.target);
                *cycle = RenderCycle::new(cycle.target, self.document.page_count());
            }
            _ => {}
        }
    }

    fn step(&mut self, cycle: &mut RenderCycle) {
        let total = cycle.pages.len();
        if cycle.next_page >= total {
            self.publish(cycle);
            return;
        }

        let end = (cycle.next_page + self.config.batch_size).min(total);
        let range = cycle.next_page..end;
        match self.decode_batch(range.clone(), cycle.target) {
            Ok(images) => {
                for (slot, image) in cycle.pages[range].iter_mut().zip(images) {
                    *slot = Some(image);
                }
                cycle.next_page = end;
                cycle.attempts = 0;
                let _ = self.updates.send(RasterUpdate::Progress {
                    rendered: end,
                    total,
                });
            }
            Err(e) => {
                cycle.attempts += 1;
                let first_page = range.start;
                let message = e.to_string();
                if cycle.attempts >= self.config.max_decode_attempts {
                    log::error!(
                        "Giving up on render at {:?}: {} (pages {:?})",
                        cycle.target,
                        message,
                        range
                    );
                    cycle.state = CycleState::Failed;
                    let _ = self
                        .updates
                        .send(RasterUpdate::Failed { first_page, message });
                } else {
                    log::warn!(
                        "Decode attempt {} for pages {:?} failed: {}",
                        cycle.attempts,
                        range,
                        message
                    );
                    let _ = self.updates.send(RasterUpdate::Retrying {
                        first_page,
                        attempt: cycle.attempts,
                        message,
                    });
                    let backoff = self
                        .config
                        .retry_backoff
                        .checked_mul(1 << (cycle.attempts - 1).min(16))
                        .map_or(MAX_RETRY_BACKOFF, |backoff| backoff.min(MAX_RETRY_BACKOFF));
                    cycle.retry_at = Some(Instant::now() + backoff);
                }
            }
        }
    }

    fn decode_batch(&mut self, range: Range<usize>, target: TargetSize) -> Result<Vec<RgbaImage>> {
        let expected = range.len();
        let first_page = range.start;
        let path = self.document.path();
        let decoder = &mut self.decoder;

        let images = catch_unwind(AssertUnwindSafe(|| {
            decoder.decode_pages(path, range, target)
        }))
        .map_err(|_| RasterError::Decode {
            page: first_page,
            message: "decoder panicked".to_string(),
        })??;

        if images.len() != expected {
            return Err(RasterError::Decode {
                page: first_page,
                message: format!("expected {} pages, decoder returned {}", expected, images.len()),
            });
        }
        Ok(images)
    }

    fn publish(&mut self, cycle: &mut RenderCycle) {
        let pages: Option<Vec<RgbaImage>> = std::mem::take(&mut cycle.pages).into_iter().collect();
        let Some(images) = pages.and_then(|pages| ImageSet::new(cycle.target, pages)) else {
            log::error!("Render at {:?} finished with missing pages", cycle.target);
            cycle.state = CycleState::Failed;
            return;
        };

        let (width, height) = images.dimensions();
        let page_count = images.len();
        self.sink.on_image_set_ready(images);
        cycle.state = CycleState::Published;
        log::info!(
            "Rasterized {} pages at {}x{} from {}",
            page_count,
            width,
            height,
            self.document.path().display()
        );
        let _ = self.updates.send(RasterUpdate::Ready {
            width,
            height,
            pages: page_count,
        });
    }
}
