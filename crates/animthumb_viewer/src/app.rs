use std::path::{Path, PathBuf};
use std::sync::Arc;

use animthumb::ui::{paint_animation, TextureSlot};
use animthumb::{
    AnimatedPaintable, AnimatedThumbnails, DataPath, MainLoop, PlaybackMode, SettingsHandler,
    Thumbnail,
};
use egui::{vec2, Response, Sense, StrokeKind};
use strum::IntoEnumIterator;
use tracing::info;

use crate::args::Args;

struct Tile {
    uri: String,
    name: String,
    paintable: Option<AnimatedPaintable>,
    animated: bool,
    slot: TextureSlot,
}

fn file_uri(path: &Path) -> String {
    let abs = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    match url::Url::from_file_path(&abs) {
        Ok(url) => url.to_string(),
        Err(_) => format!("file://{}", abs.display()),
    }
}

impl Tile {
    fn load(
        ctx: &egui::Context,
        main_loop: &MainLoop,
        thumbnails: &AnimatedThumbnails,
        path: PathBuf,
    ) -> Self {
        let uri = file_uri(&path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| uri.clone());

        let (paintable, animated) = match thumbnails.thumbnail_for(&uri, &path, None) {
            Ok(Thumbnail::Animated(animation)) => {
                (Some(AnimatedPaintable::new(animation, main_loop)), true)
            }
            Ok(Thumbnail::Still(still)) => {
                (Some(AnimatedPaintable::new(Arc::new(still), main_loop)), false)
            }
            // already logged by the decoder
            Err(_) => (None, false),
        };

        if let Some(paintable) = &paintable {
            let ctx = ctx.clone();
            paintable.connect_invalidate(move || ctx.request_repaint());
        }

        Self {
            uri,
            name,
            paintable,
            animated,
            slot: TextureSlot::default(),
        }
    }

    fn set_playing(&self, play: bool) {
        let Some(paintable) = self.paintable.as_ref().filter(|_| self.animated) else {
            return;
        };

        if play {
            paintable.start();
        } else {
            paintable.stop();
        }
    }

    fn show(&mut self, ui: &mut egui::Ui, size: f32, selected: bool) -> Response {
        let response = ui
            .vertical(|ui| {
                ui.set_max_width(size);

                let response = match &self.paintable {
                    Some(paintable) => {
                        paint_animation(ui, paintable, &mut self.slot, &self.uri, vec2(size, size))
                    }
                    None => {
                        let (rect, response) =
                            ui.allocate_exact_size(vec2(size, size), Sense::click());
                        ui.painter()
                            .rect_filled(rect, 4.0, ui.visuals().faint_bg_color);
                        response
                    }
                };

                ui.add(egui::Label::new(&self.name).truncate());
                response
            })
            .inner;

        if selected {
            ui.painter().rect_stroke(
                response.rect.expand(2.0),
                4.0,
                ui.visuals().selection.stroke,
                StrokeKind::Outside,
            );
        }

        response
    }
}

pub struct ViewerApp {
    main_loop: MainLoop,
    thumbnails: AnimatedThumbnails,
    settings: SettingsHandler,
    mode: PlaybackMode,
    tiles: Vec<Tile>,
    selected: Option<usize>,
    thumb_size: f32,
}

impl ViewerApp {
    pub fn new(ctx: &egui::Context, args: Args, data_path: &DataPath) -> Self {
        let main_loop = MainLoop::default();
        let thumbnails = AnimatedThumbnails::default();
        let settings = SettingsHandler::new(data_path).load();
        let mode = args.mode.unwrap_or_else(|| settings.playback_mode());
        info!("animating thumbnails: {mode}");

        let tiles: Vec<Tile> = args
            .paths
            .into_iter()
            .map(|path| Tile::load(ctx, &main_loop, &thumbnails, path))
            .collect();

        info!(
            "loaded {} files, {} animated",
            tiles.len(),
            tiles.iter().filter(|t| t.animated).count()
        );

        Self {
            main_loop,
            thumbnails,
            settings,
            mode,
            tiles,
            selected: None,
            thumb_size: args.thumb_size,
        }
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut changed = false;

            egui::ComboBox::from_label("Animate thumbnails")
                .selected_text(self.mode.label())
                .show_ui(ui, |ui| {
                    for mode in PlaybackMode::iter() {
                        changed |= ui
                            .selectable_value(&mut self.mode, mode, mode.label())
                            .changed();
                    }
                });

            if changed {
                info!("playback mode changed to {}", self.mode);
                self.settings.set_playback_mode(self.mode);
            }

            ui.separator();
            ui.label(format!(
                "{} cached animations",
                self.thumbnails.cache().len()
            ));
        });
    }

    fn grid_ui(&mut self, ui: &mut egui::Ui) {
        let mut clicked = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for (i, tile) in self.tiles.iter_mut().enumerate() {
                    let selected = self.selected == Some(i);
                    let response = tile.show(ui, self.thumb_size, selected);

                    if response.clicked() {
                        clicked = Some(i);
                    }

                    tile.set_playing(self.mode.should_play(response.hovered(), selected));
                }
            });
        });

        if let Some(i) = clicked {
            self.selected = if self.selected == Some(i) {
                None
            } else {
                Some(i)
            };
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.main_loop.dispatch();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| self.controls_ui(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.grid_ui(ui));

        if let Some(wait) = self.main_loop.time_until_next() {
            ctx.request_repaint_after(wait);
        }
    }
}
