use anyhow::Result;
use eframe::egui;
use pdf_raster::{DocumentInfo, PageDecoder, RasterConfig, RasterUpdate, Rasterizer, RgbaImage};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One window's view of the deck: a rasterizer sized to the window and the
/// texture for the slide it currently shows.
pub struct SlideView {
    name: &'static str,
    /// Slide shown relative to the cursor
    offset: isize,
    rasterizer: Rasterizer,
    updates: mpsc::UnboundedReceiver<RasterUpdate>,
    window: Option<(u32, u32)>,
    progress: Option<(usize, usize)>,
    failure: Option<String>,
    shown: Option<(Arc<RgbaImage>, egui::TextureHandle)>,
}

impl SlideView {
    pub fn new<D: PageDecoder>(
        name: &'static str,
        offset: isize,
        document: DocumentInfo,
        config: RasterConfig,
        decoder: D,
    ) -> Result<Self> {
        let (rasterizer, updates) = Rasterizer::spawn(document, config, decoder)?;
        Ok(Self {
            name,
            offset,
            rasterizer,
            updates,
            window: None,
            progress: None,
            failure: None,
            shown: None,
        })
    }

    /// Drain status updates from the worker
    pub fn poll(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            match update {
                RasterUpdate::Progress { rendered, total } => {
                    self.progress = Some((rendered, total));
                }
                RasterUpdate::Ready { .. } => {
                    self.progress = None;
                    self.failure = None;
                }
                RasterUpdate::Retrying { .. } => {}
                RasterUpdate::Failed {
                    first_page,
                    message,
                } => {
                    self.progress = None;
                    self.failure = Some(format!("page {}: {message}", first_page + 1));
                }
            }
        }
    }

    /// Forward the viewport's size in physical pixels when it changed
    pub fn track_window(&mut self, ctx: &egui::Context) {
        let pixels_per_point = ctx.pixels_per_point();
        let Some(rect) = ctx.input(|i| i.viewport().inner_rect) else {
            return;
        };
        let size = (
            (rect.width() * pixels_per_point).round() as u32,
            (rect.height() * pixels_per_point).round() as u32,
        );
        if self.window != Some(size) {
            log::debug!("{} window is now {}x{}", self.name, size.0, size.1);
            self.window = Some(size);
            self.rasterizer.push_resize(size.0, size.1);
        }
    }

    pub fn retry(&mut self) {
        if self.failure.take().is_some() {
            self.rasterizer.retry();
        }
    }

    /// Draw the slide at `cursor + offset`, or the progress label until the
    /// first image set arrives.
    pub fn show(&mut self, ui: &mut egui::Ui, cursor: usize) {
        let index = cursor as isize + self.offset;
        let Some(image) = self.rasterizer.get(index) else {
            self.show_pending(ui);
            return;
        };

        let texture = self.texture_for(ui.ctx(), image);
        let area = ui.max_rect();
        let size = texture.size_vec2();
        let scale = (area.width() / size.x).min(area.height() / size.y);
        let rect = egui::Rect::from_center_size(area.center(), size * scale);
        ui.painter().image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        // The last good set stays up after a failure; say so over it.
        if let Some(failure) = &self.failure {
            ui.painter().text(
                area.center_bottom() - egui::vec2(0.0, 16.0),
                egui::Align2::CENTER_BOTTOM,
                failure_notice(failure),
                egui::FontId::proportional(24.0),
                egui::Color32::LIGHT_RED,
            );
        }
    }

    // Upload only when the page image differs from the one on screen.
    fn texture_for(&mut self, ctx: &egui::Context, image: Arc<RgbaImage>) -> egui::TextureHandle {
        if let Some((shown, texture)) = &self.shown {
            if Arc::ptr_eq(shown, &image) {
                return texture.clone();
            }
        }

        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [image.width() as usize, image.height() as usize],
            image.as_raw(),
        );
        let texture = match self.shown.take() {
            Some((_, mut texture)) => {
                texture.set(color_image, egui::TextureOptions::LINEAR);
                texture
            }
            None => ctx.load_texture(self.name, color_image, egui::TextureOptions::LINEAR),
        };
        self.shown = Some((image, texture.clone()));
        texture
    }

    fn show_pending(&self, ui: &mut egui::Ui) {
        let text = match &self.failure {
            Some(failure) => failure_notice(failure),
            None => {
                let dots = ".".repeat((ui.input(|i| i.time) * 2.0) as usize % 4);
                match self.progress {
                    Some((rendered, total)) => format!("Rasterizing{dots:<3} {rendered}/{total}"),
                    None => format!("Rasterizing{dots:<3}"),
                }
            }
        };
        ui.centered_and_justified(|ui| {
            ui.label(
                egui::RichText::new(text)
                    .size(32.0)
                    .color(egui::Color32::GRAY),
            );
        });
    }

    pub fn shutdown(&mut self) {
        self.rasterizer.shutdown();
    }
}

fn failure_notice(failure: &str) -> String {
    format!("Rasterizing failed at {failure}\nPress R to retry")
}
