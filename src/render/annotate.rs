//! Year labels burned into the bottom-left corner of a frame.
//!
//! Text is rendered through `usvg`/`resvg` with the system font database, preferring
//! `family` and falling back to any sans-serif face. When no face is available (minimal
//! containers, CI) a small built-in bitmap font draws the label instead.
//!
//! Drawing is clipped to `label_bounds`, so pixels outside that box never change.

use std::sync::Arc;

use image::{Rgba, RgbaImage};
use usvg::fontdb;

pub const PREFERRED_FAMILY: &str = "DejaVu Sans";
pub const DEFAULT_FONT_SIZE: u32 = 32;
pub const DEFAULT_MARGIN: u32 = 16;

const TEXT_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT_SHADOW: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Pixel rectangle `[x, x + width) × [y, y + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl LabelBounds {
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Which renderer produced the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelOutcome {
    Unlabeled,
    Vector,
    Builtin,
}

pub struct Annotator {
    fonts: Option<Arc<fontdb::Database>>,
    family: String,
    font_size: u32,
    margin: u32,
}

impl Annotator {
    /// Load system fonts and prefer `family`.
    pub fn new(family: impl Into<String>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self::with_fonts(Arc::new(db), family)
    }

    /// Use an explicit font database. An empty database means built-in glyphs only.
    pub fn with_fonts(db: Arc<fontdb::Database>, family: impl Into<String>) -> Self {
        let family = family.into();
        let fonts = if db.is_empty() {
            tracing::info!("no fonts available; year labels use the built-in bitmap font");
            None
        } else {
            let preferred = [fontdb::Family::Name(&family)];
            if db
                .query(&fontdb::Query {
                    families: &preferred,
                    weight: fontdb::Weight::BOLD,
                    stretch: fontdb::Stretch::Normal,
                    style: fontdb::Style::Normal,
                })
                .is_none()
            {
                tracing::debug!(family = %family, "preferred font family missing; using sans-serif");
            }
            Some(db)
        };
        Self {
            fonts,
            family,
            font_size: DEFAULT_FONT_SIZE,
            margin: DEFAULT_MARGIN,
        }
    }

    /// Built-in bitmap glyphs, no font lookup at all.
    pub fn builtin() -> Self {
        Self {
            fonts: None,
            family: PREFERRED_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            margin: DEFAULT_MARGIN,
        }
    }

    /// Label `image` with `year` in place. `None` leaves the frame untouched.
    pub fn annotate(&self, image: &mut RgbaImage, year: Option<i32>) -> LabelOutcome {
        let Some(year) = year else {
            return LabelOutcome::Unlabeled;
        };
        let text = year.to_string();
        let Some(bounds) = self.label_bounds(image.width(), image.height(), &text) else {
            return LabelOutcome::Unlabeled;
        };

        if let Some(db) = &self.fonts {
            if self.draw_vector(image, bounds, &text, db) {
                return LabelOutcome::Vector;
            }
        }
        self.draw_builtin(image, bounds, &text);
        LabelOutcome::Builtin
    }

    /// The box a label for `text` occupies on a `width × height` frame, clipped to the frame.
    pub fn label_bounds(&self, width: u32, height: u32, text: &str) -> Option<LabelBounds> {
        let pad = self.pad();
        let box_h = self.font_size + 2 * pad;
        let box_w = text.chars().count() as u32 * self.font_size + 2 * pad;

        let x = self.margin;
        let bottom = height.checked_sub(self.margin)?;
        let y = bottom.saturating_sub(box_h);
        if x >= width || y >= bottom {
            return None;
        }
        Some(LabelBounds {
            x,
            y,
            width: box_w.min(width - x),
            height: bottom - y,
        })
    }

    fn pad(&self) -> u32 {
        (self.font_size / 8).max(2)
    }

    fn draw_vector(
        &self,
        image: &mut RgbaImage,
        bounds: LabelBounds,
        text: &str,
        db: &Arc<fontdb::Database>,
    ) -> bool {
        let pad = self.pad();
        let baseline = pad as f32 + self.font_size as f32 * 0.8;
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">
<text x="{pad}" y="{baseline}" font-family="'{family}', sans-serif" font-size="{size}" font-weight="bold" fill="white" stroke="black" stroke-width="{stroke}" paint-order="stroke">{text}</text>
</svg>"#,
            w = bounds.width,
            h = bounds.height,
            family = escape_xml(&self.family),
            size = self.font_size,
            stroke = (self.font_size as f32 / 12.0).max(1.0),
            text = escape_xml(text),
        );

        let opts = usvg::Options {
            fontdb: db.clone(),
            font_family: self.family.clone(),
            ..Default::default()
        };
        let tree = match usvg::Tree::from_str(&svg, &opts) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::debug!(error = %e, "label svg rejected");
                return false;
            }
        };
        let Some(mut pixmap) = resvg::tiny_skia::Pixmap::new(bounds.width, bounds.height) else {
            return false;
        };
        resvg::render(&tree, resvg::tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        // No glyphs resolved: nothing was drawn.
        if pixmap.data().chunks_exact(4).all(|px| px[3] == 0) {
            return false;
        }

        for (i, px) in pixmap.data().chunks_exact(4).enumerate() {
            let a = px[3] as u32;
            if a == 0 {
                continue;
            }
            let x = bounds.x + i as u32 % bounds.width;
            let y = bounds.y + i as u32 / bounds.width;
            let dst = image.get_pixel_mut(x, y);
            // Source is premultiplied.
            for c in 0..3 {
                dst.0[c] = (px[c] as u32 + dst.0[c] as u32 * (255 - a) / 255).min(255) as u8;
            }
            dst.0[3] = (a + dst.0[3] as u32 * (255 - a) / 255).min(255) as u8;
        }
        true
    }

    fn draw_builtin(&self, image: &mut RgbaImage, bounds: LabelBounds, text: &str) {
        let pad = self.pad();
        let scale = (self.font_size / GLYPH_H).max(1);
        let top = bounds.y + pad + self.font_size.saturating_sub(GLYPH_H * scale) / 2;
        let shadow = (scale / 2).max(1);

        let mut pen_x = bounds.x + pad;
        for ch in text.chars() {
            if let Some(rows) = glyph(ch) {
                draw_glyph(image, bounds, rows, pen_x + shadow, top + shadow, scale, TEXT_SHADOW);
                draw_glyph(image, bounds, rows, pen_x, top, scale, TEXT_FILL);
            }
            pen_x += (GLYPH_W + 1) * scale;
        }
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(PREFERRED_FAMILY)
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;

/// 5×7 rows, most significant of the low five bits is the leftmost column.
fn glyph(ch: char) -> Option<[u8; 7]> {
    Some(match ch {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        _ => return None,
    })
}

fn draw_glyph(
    image: &mut RgbaImage,
    bounds: LabelBounds,
    rows: [u8; 7],
    x0: u32,
    y0: u32,
    scale: u32,
    color: Rgba<u8>,
) {
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_W {
            if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                continue;
            }
            let cx = x0 + col * scale;
            let cy = y0 + row as u32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    let (x, y) = (cx + dx, cy + dy);
                    if bounds.contains(x, y) {
                        image.put_pixel(x, y, color);
                    }
                }
            }
        }
    }
}
