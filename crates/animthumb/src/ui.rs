use egui::{
    pos2, vec2, Color32, ColorImage, Pos2, Rect, Response, Sense, TextureHandle, TextureOptions,
    Vec2,
};

use crate::paintable::{FrameBitmap, Paintable, Surface};

const TEXTURE_OPTIONS: TextureOptions = TextureOptions::LINEAR;

/// The egui texture currently showing a paintable's bitmap. Owned by whoever
/// draws the paintable, one per thumbnail.
#[derive(Default)]
pub struct TextureSlot {
    texture: Option<(FrameBitmap, TextureHandle)>,
}

impl TextureSlot {
    /// Upload `bitmap` unless it's already what the texture holds
    pub fn texture_for(
        &mut self,
        ctx: &egui::Context,
        name: &str,
        bitmap: &FrameBitmap,
    ) -> &TextureHandle {
        let (current, handle) = self.texture.get_or_insert_with(|| {
            let image = ColorImage::clone(bitmap.image());
            (bitmap.clone(), ctx.load_texture(name, image, TEXTURE_OPTIONS))
        });

        if !current.same_pixels(bitmap) {
            handle.set(ColorImage::clone(bitmap.image()), TEXTURE_OPTIONS);
            *current = bitmap.clone();
        }

        handle
    }

    pub fn clear(&mut self) {
        self.texture = None;
    }
}

/// Paints bitmaps through an egui painter with their top left corner at `origin`
pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    origin: Pos2,
    slot: &'a mut TextureSlot,
    name: &'a str,
}

impl<'a> PainterSurface<'a> {
    pub fn new(
        painter: &'a egui::Painter,
        origin: Pos2,
        slot: &'a mut TextureSlot,
        name: &'a str,
    ) -> Self {
        Self {
            painter,
            origin,
            slot,
            name,
        }
    }
}

impl Surface for PainterSurface<'_> {
    fn draw_bitmap(&mut self, bitmap: &FrameBitmap, width: f32, height: f32) {
        let texture_id = self
            .slot
            .texture_for(self.painter.ctx(), self.name, bitmap)
            .id();
        let rect = Rect::from_min_size(self.origin, vec2(width, height));
        let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));

        self.painter.image(texture_id, rect, uv, Color32::WHITE);
    }
}

/// Largest size with the intrinsic aspect ratio that fits in `bounds`
pub fn fit_size(intrinsic_width: u32, intrinsic_height: u32, bounds: Vec2) -> Vec2 {
    if intrinsic_width == 0 || intrinsic_height == 0 {
        return Vec2::ZERO;
    }

    let w = intrinsic_width as f32;
    let h = intrinsic_height as f32;
    let scale = (bounds.x / w).min(bounds.y / h);

    vec2(w * scale, h * scale)
}

/// Allocate a clickable `size` rect and draw `paintable` centered in it
pub fn paint_animation(
    ui: &mut egui::Ui,
    paintable: &dyn Paintable,
    slot: &mut TextureSlot,
    name: &str,
    size: Vec2,
) -> Response {
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());

    if ui.is_rect_visible(rect) {
        let fitted = fit_size(
            paintable.intrinsic_width(),
            paintable.intrinsic_height(),
            rect.size(),
        );
        let origin = rect.center() - fitted / 2.0;
        let mut surface = PainterSurface::new(ui.painter(), origin, slot, name);
        paintable.snapshot(&mut surface, fitted.x, fitted.y);
    }

    response
}
