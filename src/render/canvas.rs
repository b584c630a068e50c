//! 2D canvas presentation of a [`FrameSnapshot`]

use std::f64::consts::PI;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Path2d};
use crate::particles::PaletteColor;
use super::shape::{
    Rgb, LEAF_MIDRIB, LEAF_OUTLINE, LEAF_SERRATION, LEAF_STEM, LEAF_VEINS, LEAF_VIEWBOX,
    STEM_COLOR, VEIN_COLOR,
};
use super::snapshot::{BranchStroke, FrameSnapshot, LeafSprite};

/// Leaf artwork paths, parsed once
struct LeafPaths {
    outline: Path2d,
    midrib: Path2d,
    veins: Path2d,
    stem: Path2d,
    serration: Path2d,
}

impl LeafPaths {
    fn new() -> Result<Self, JsValue> {
        Ok(Self {
            outline: Path2d::new_with_path_string(LEAF_OUTLINE)?,
            midrib: Path2d::new_with_path_string(LEAF_MIDRIB)?,
            veins: Path2d::new_with_path_string(LEAF_VEINS)?,
            stem: Path2d::new_with_path_string(LEAF_STEM)?,
            serration: Path2d::new_with_path_string(LEAF_SERRATION)?,
        })
    }
}

/// Draws snapshots onto a canvas sized to the viewport
pub struct CanvasPainter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    paths: LeafPaths,
    palette: Vec<Rgb>,
    width: f64,
    height: f64,
}

impl CanvasPainter {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2D canvas context not available"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let palette = (0..crate::particles::AUTUMN_PALETTE.len())
            .map(|i| {
                let hex = PaletteColor::from_index(i).hex();
                Rgb::from_hex(hex).ok_or_else(|| JsValue::from_str(&format!("bad palette colour {}", hex)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let width = canvas.width().max(1) as f64;
        let height = canvas.height().max(1) as f64;

        Ok(Self {
            canvas,
            ctx,
            paths: LeafPaths::new()?,
            palette,
            width,
            height,
        })
    }

    /// Match the canvas backing store to a new viewport size
    pub fn resize(&mut self, width: f32, height: f32) {
        let width = width.max(1.0).round() as u32;
        let height = height.max(1.0).round() as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.width = width as f64;
        self.height = height as f64;
    }

    pub fn paint(&self, snapshot: &FrameSnapshot) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        ctx.clear_rect(0.0, 0.0, self.width, self.height);

        ctx.set_line_cap("round");
        for stroke in &snapshot.branches {
            self.paint_branch(stroke);
        }

        if snapshot.shadows {
            ctx.set_shadow_color("rgba(0, 0, 0, 0.15)");
            ctx.set_shadow_blur(3.0);
            ctx.set_shadow_offset_x(1.0);
            ctx.set_shadow_offset_y(2.0);
        }
        for leaf in &snapshot.leaves {
            self.paint_leaf(leaf)?;
        }
        ctx.set_shadow_color("transparent");
        ctx.set_shadow_blur(0.0);
        ctx.set_global_alpha(1.0);
        Ok(())
    }

    fn to_px(&self, x: f32, y: f32) -> (f64, f64) {
        (x as f64 / 100.0 * self.width, y as f64 / 100.0 * self.height)
    }

    fn paint_branch(&self, stroke: &BranchStroke) {
        let ctx = &self.ctx;
        let (sx, sy) = self.to_px(stroke.start.x, stroke.start.y);
        let (cx, cy) = self.to_px(stroke.control.x, stroke.control.y);
        let (ex, ey) = self.to_px(stroke.end.x, stroke.end.y);

        ctx.set_global_alpha(1.0);
        ctx.set_stroke_style_str(&stroke.color.css());
        ctx.set_line_width(stroke.width as f64);
        ctx.begin_path();
        ctx.move_to(sx, sy);
        ctx.quadratic_curve_to(cx, cy, ex, ey);
        ctx.stroke();
    }

    fn paint_leaf(&self, leaf: &LeafSprite) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let (x, y) = self.to_px(leaf.x, leaf.y);
        let fill = self
            .palette
            .get(leaf.color.index())
            .copied()
            .unwrap_or(Rgb::new(0xD2, 0x69, 0x1E))
            .shade(leaf.brightness);

        // Every save is matched by a restore, even when a transform fails
        ctx.save();
        let drawn = self.draw_leaf(leaf, x, y, fill);
        ctx.restore();
        drawn
    }

    fn draw_leaf(&self, leaf: &LeafSprite, x: f64, y: f64, fill: Rgb) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.translate(x, y)?;
        ctx.rotate(leaf.rotation as f64 * PI / 180.0)?;
        ctx.scale(leaf.scale as f64, leaf.scale as f64)?;
        ctx.translate(-LEAF_VIEWBOX.0 / 2.0, -LEAF_VIEWBOX.1 / 2.0)?;

        let alpha = leaf.opacity as f64;
        ctx.set_global_alpha(alpha * 0.92);
        ctx.set_fill_style_str(&fill.css());
        ctx.fill_with_path_2d(&self.paths.outline);

        ctx.set_global_alpha(alpha * 0.4);
        ctx.set_stroke_style_str(VEIN_COLOR);
        ctx.set_line_width(0.8);
        ctx.stroke_with_path(&self.paths.midrib);

        ctx.set_global_alpha(alpha * 0.3);
        ctx.set_line_width(0.4);
        ctx.stroke_with_path(&self.paths.veins);

        ctx.set_global_alpha(alpha);
        ctx.set_stroke_style_str(STEM_COLOR);
        ctx.set_line_width(1.2);
        ctx.stroke_with_path(&self.paths.stem);

        ctx.set_global_alpha(alpha * 0.6);
        ctx.set_stroke_style_str(&fill.css());
        ctx.set_line_width(0.3);
        ctx.stroke_with_path(&self.paths.serration);
        Ok(())
    }
}
