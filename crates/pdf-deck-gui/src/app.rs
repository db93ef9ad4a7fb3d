use anyhow::Result;
use eframe::egui;
use egui::{Key, ViewportCommand, ViewportId};
use pdf_cursor::Cursor;
use pdf_raster::{DocumentInfo, PageDecoder};
use std::time::{Duration, Instant};

use crate::config::DeckConfig;
use crate::logger::AppLogger;
use crate::slide::SlideView;

const FORWARD_KEYS: [Key; 4] = [Key::ArrowRight, Key::ArrowUp, Key::PageDown, Key::Space];
const REVERSE_KEYS: [Key; 4] = [Key::ArrowLeft, Key::ArrowDown, Key::PageUp, Key::Backspace];

/// Keyboard state read from one viewport
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct WindowInput {
    reverse: bool,
    forward: bool,
    quit: bool,
    retry: bool,
}

impl WindowInput {
    /// Read navigation keys and apply the window commands to `ctx`'s viewport
    fn read(ctx: &egui::Context) -> Self {
        let (input, fullscreen, toggle, leave) = ctx.input(|i| {
            let input = Self {
                reverse: REVERSE_KEYS.iter().any(|key| i.key_down(*key)),
                forward: FORWARD_KEYS.iter().any(|key| i.key_down(*key)),
                quit: i.key_pressed(Key::Q) || i.viewport().close_requested(),
                retry: i.key_pressed(Key::R),
            };
            (
                input,
                i.viewport().fullscreen.unwrap_or(false),
                i.key_pressed(Key::F),
                i.key_pressed(Key::Escape),
            )
        });

        if toggle {
            ctx.send_viewport_cmd(ViewportCommand::Fullscreen(!fullscreen));
        } else if leave && fullscreen {
            ctx.send_viewport_cmd(ViewportCommand::Fullscreen(false));
        }
        input
    }

    fn merge(self, other: Self) -> Self {
        Self {
            reverse: self.reverse || other.reverse,
            forward: self.forward || other.forward,
            quit: self.quit || other.quit,
            retry: self.retry || other.retry,
        }
    }

    fn holds_key(&self) -> bool {
        self.reverse || self.forward
    }
}

/// Presenter in the root viewport showing the next slide, audience in a
/// child viewport showing the current one
pub struct DeckApp {
    cursor: Cursor,
    presenter: SlideView,
    audience: SlideView,
    logger: AppLogger,
    fast_tick: Duration,
    slow_tick: Duration,
    last_frame: Instant,
    // Held keys from the audience window apply on the next frame.
    audience_input: WindowInput,
}

impl DeckApp {
    pub fn new<D: PageDecoder + Clone>(
        document: DocumentInfo,
        config: &DeckConfig,
        decoder: D,
        logger: AppLogger,
        start_index: usize,
    ) -> Result<Self> {
        let cursor = Cursor::with_timing(document.page_count(), config.repeat).at(start_index);
        let raster = config.raster_config();
        let presenter = SlideView::new("presenter", 1, document.clone(), raster, decoder.clone())?;
        let audience = SlideView::new("audience", 0, document, raster, decoder)?;

        log::info!(
            "Presenting {} slides from slide {}",
            cursor.nslides(),
            cursor.position() + 1
        );
        Ok(Self {
            cursor,
            presenter,
            audience,
            logger,
            fast_tick: config.fast_tick(),
            slow_tick: config.slow_tick(),
            last_frame: Instant::now(),
            audience_input: WindowInput::default(),
        })
    }

    fn show_presenter(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "Slide {} / {}",
                    self.cursor.position() + 1,
                    self.cursor.nslides()
                ));
                if let Some(entry) = self.logger.latest() {
                    ui.separator();
                    let color = match entry.level {
                        log::Level::Error => egui::Color32::RED,
                        log::Level::Warn => egui::Color32::YELLOW,
                        _ => ui.visuals().weak_text_color(),
                    };
                    ui.colored_label(
                        color,
                        format!("{} {}", entry.timestamp.format("%H:%M:%S"), entry.message),
                    );
                }
            });
        });

        let position = self.cursor.position();
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| self.presenter.show(ui, position));
    }

    fn show_audience(&mut self, ctx: &egui::Context) -> WindowInput {
        let position = self.cursor.position();
        let audience = &mut self.audience;
        ctx.show_viewport_immediate(
            ViewportId::from_hash_of("audience"),
            egui::ViewportBuilder::default()
                .with_title("pdfdeck")
                .with_inner_size([1024.0, 768.0]),
            |ctx, class| {
                audience.poll();
                audience.track_window(ctx);
                // Without multi-viewport support this shares the root's input.
                if matches!(class, egui::ViewportClass::Embedded) {
                    egui::Window::new("Audience").show(ctx, |ui| audience.show(ui, position));
                    return WindowInput::default();
                }
                egui::CentralPanel::default()
                    .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
                    .show(ctx, |ui| audience.show(ui, position));
                WindowInput::read(ctx)
            },
        )
    }
}

impl eframe::App for DeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame);
        self.last_frame = now;

        let input = WindowInput::read(ctx).merge(self.audience_input);
        if input.retry {
            self.presenter.retry();
            self.audience.retry();
        }
        self.cursor.tick(dt, input.reverse, input.forward);

        self.presenter.poll();
        self.presenter.track_window(ctx);
        self.show_presenter(ctx);

        let audience_input = self.show_audience(ctx);
        if audience_input.retry {
            self.presenter.retry();
            self.audience.retry();
        }
        if input.quit || audience_input.quit {
            ctx.send_viewport_cmd_to(ViewportId::ROOT, ViewportCommand::Close);
        }
        self.audience_input = WindowInput {
            quit: false,
            retry: false,
            ..audience_input
        };

        let busy = input.holds_key() || audience_input.holds_key() || self.cursor.is_repeating();
        ctx.request_repaint_after(if busy { self.fast_tick } else { self.slow_tick });
    }
}

impl Drop for DeckApp {
    fn drop(&mut self) {
        self.audience.shutdown();
        self.presenter.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_combines_both_windows() {
        let presenter = WindowInput {
            forward: true,
            ..Default::default()
        };
        let audience = WindowInput {
            reverse: true,
            quit: true,
            ..Default::default()
        };
        let merged = presenter.merge(audience);
        assert!(merged.forward && merged.reverse && merged.quit);
        assert!(!merged.retry);
        assert!(merged.holds_key());
        assert!(!WindowInput::default().holds_key());
    }

    #[test]
    fn test_navigation_keys_do_not_overlap() {
        for key in FORWARD_KEYS {
            assert!(!REVERSE_KEYS.contains(&key), "{key:?}");
        }
    }
}
