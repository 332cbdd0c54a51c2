//! Telop overlay compositing: fit, wrap and center the caption text, plan the
//! speech-bubble geometry, rasterize panel + underline + outlined glyphs, and
//! alpha-composite the result over the background image.
//!
//! Planning is split out as a pure function over pre-measured lines so the
//! geometry invariants are testable without any font on the host.

use std::path::Path;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::composite::over_in_place;
use crate::draw::primitives;
use crate::foundation::color::{Rgba8, premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::foundation::error::{TelopError, TelopResult};
use crate::font::resolver::FontStyle;
use crate::layout::engine::{TextBrushRgba8, TextLayoutEngine};
use crate::theme::Theme;

/// Geometry and styling knobs of the overlay. The defaults are the production
/// values; configs deserialized from JSON may override any subset.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Horizontal margin between image edge and the widest allowed text line.
    pub padding_x: u32,
    /// Horizontal padding between text block and bubble edge.
    pub bubble_padding_x: u32,
    /// Vertical padding between text block and bubble edge.
    pub bubble_padding_y: u32,
    pub corner_radius: f64,
    pub border_width: f64,
    /// Halo radius of the text outline, in whole pixels.
    pub outline_width: i32,
    pub underline_thickness: f64,
    pub max_font_size: u32,
    pub min_font_size: u32,
    /// Top of the telop zone as a fraction of image height.
    pub telop_zone_fraction: f64,
    /// Inter-line gap as a fraction of the chosen font size.
    pub line_spacing_factor: f64,
    /// Translucent bubble interior; themes only recolor border and text.
    pub panel_fill: Rgba8,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            padding_x: 40,
            bubble_padding_x: 30,
            bubble_padding_y: 20,
            corner_radius: 20.0,
            border_width: 4.0,
            outline_width: 3,
            underline_thickness: 5.0,
            max_font_size: 64,
            min_font_size: 28,
            telop_zone_fraction: 0.75,
            line_spacing_factor: 0.3,
            panel_fill: Rgba8::new(20, 20, 30, 210),
        }
    }
}

/// One wrapped line with its rendered extent at the chosen font size.
#[derive(Clone, Debug)]
pub struct MeasuredLine {
    pub text: String,
    pub width: f32,
    pub height: f32,
}

/// A line placed on the canvas, in absolute pixel coordinates.
#[derive(Clone, Debug)]
pub struct PlannedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Resolved overlay geometry: bubble rect, line positions and the underline
/// segment, ready to rasterize.
#[derive(Clone, Debug)]
pub struct BubblePlan {
    pub bubble: kurbo::Rect,
    pub lines: Vec<PlannedLine>,
    /// `(x, y, width)` of the wavy underline, absent when the bubble is too
    /// narrow to carry one.
    pub underline: Option<(f64, f64, f64)>,
    pub font_size: u32,
}

/// Plan the bubble for `measured` lines on a `width` x `height` canvas.
///
/// All extents round up to whole pixels before the geometry is derived, so a
/// sub-pixel measurement never shrinks the bubble below its text. The bubble
/// centers horizontally in the image and vertically inside the telop zone;
/// each text line centers across the full image width. Returns `None` when
/// there is nothing to draw.
pub fn plan_bubble(
    width: u32,
    height: u32,
    measured: &[MeasuredLine],
    font_size: u32,
    cfg: &OverlayConfig,
) -> Option<BubblePlan> {
    if measured.is_empty() {
        return None;
    }

    let line_spacing = (f64::from(font_size) * cfg.line_spacing_factor).round() as i64;
    let widths: Vec<i64> = measured.iter().map(|l| f64::from(l.width).ceil() as i64).collect();
    let heights: Vec<i64> = measured.iter().map(|l| f64::from(l.height).ceil() as i64).collect();

    let text_w = widths.iter().copied().max()?;
    let text_h: i64 =
        heights.iter().sum::<i64>() + line_spacing * (measured.len() as i64 - 1);

    let pad_x = i64::from(cfg.bubble_padding_x);
    let pad_y = i64::from(cfg.bubble_padding_y);
    let bubble_w = text_w + 2 * pad_x;
    let bubble_h = text_h + 2 * pad_y;

    let w = i64::from(width);
    let h = i64::from(height);
    let zone_top = (f64::from(height) * cfg.telop_zone_fraction).round() as i64;
    let bubble_x = (w - bubble_w) / 2;
    let bubble_y = zone_top + (h - zone_top - bubble_h) / 2;

    let mut lines = Vec::with_capacity(measured.len());
    let mut cursor = bubble_y + pad_y;
    for (line, (&lw, &lh)) in measured.iter().zip(widths.iter().zip(heights.iter())) {
        lines.push(PlannedLine {
            text: line.text.clone(),
            x: ((w - lw) / 2) as f64,
            y: cursor as f64,
            width: lw as f64,
            height: lh as f64,
        });
        cursor += lh + line_spacing;
    }

    let underline_w = bubble_w - 2 * pad_x;
    let underline = (underline_w > 0).then(|| {
        (
            (bubble_x + pad_x) as f64,
            (bubble_y + bubble_h - pad_y + 8) as f64,
            underline_w as f64,
        )
    });

    Some(BubblePlan {
        bubble: kurbo::Rect::new(
            bubble_x as f64,
            bubble_y as f64,
            (bubble_x + bubble_w) as f64,
            (bubble_y + bubble_h) as f64,
        ),
        lines,
        underline,
        font_size,
    })
}

/// Draws themed telop overlays onto background images.
pub struct OverlayCompositor {
    engine: TextLayoutEngine,
    cfg: OverlayConfig,
}

impl OverlayCompositor {
    pub fn new(engine: TextLayoutEngine) -> Self {
        Self::with_config(engine, OverlayConfig::default())
    }

    pub fn with_config(engine: TextLayoutEngine, cfg: OverlayConfig) -> Self {
        Self { engine, cfg }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.cfg
    }

    /// Composite `text` as a themed bubble overlay onto `background`.
    ///
    /// Blank text returns the background unchanged. The same inputs always
    /// produce the same output bytes.
    #[tracing::instrument(skip_all, fields(theme = theme.name, chars = text.chars().count()))]
    pub fn composite_image(
        &mut self,
        background: &RgbaImage,
        text: &str,
        theme: &Theme,
    ) -> TelopResult<RgbaImage> {
        let (width, height) = background.dimensions();
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| TelopError::render("image width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| TelopError::render("image height exceeds u16"))?;

        if text.trim().is_empty() {
            return Ok(background.clone());
        }

        let max_text_width = width.saturating_sub(2 * self.cfg.padding_x) as f32;
        let font_size = self.engine.fit(
            text,
            max_text_width,
            FontStyle::Bold,
            self.cfg.max_font_size,
            self.cfg.min_font_size,
        );
        let lines = self
            .engine
            .wrap_text(text, FontStyle::Bold, font_size, max_text_width);

        let mut measured = Vec::with_capacity(lines.len());
        for line in lines {
            let (w, h) = self.engine.measure(&line, FontStyle::Bold, font_size)?;
            measured.push(MeasuredLine {
                text: line,
                width: w,
                height: h,
            });
        }

        let Some(plan) = plan_bubble(width, height, &measured, font_size, &self.cfg) else {
            return Ok(background.clone());
        };
        tracing::debug!(
            font_size,
            lines = plan.lines.len(),
            bubble = ?plan.bubble,
            "planned telop bubble"
        );

        let brush = TextBrushRgba8 {
            r: theme.text_color.r,
            g: theme.text_color.g,
            b: theme.text_color.b,
            a: theme.text_color.a,
        };

        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        primitives::fill_rounded_panel(&mut ctx, plan.bubble, self.cfg.corner_radius, self.cfg.panel_fill);
        primitives::stroke_rounded_panel(
            &mut ctx,
            plan.bubble,
            self.cfg.corner_radius,
            theme.border_color(),
            self.cfg.border_width,
        );
        if let Some((ux, uy, uw)) = plan.underline {
            primitives::draw_marker_underline(
                &mut ctx,
                ux,
                uy,
                uw,
                theme.underline_color(),
                self.cfg.underline_thickness,
            );
        }
        for line in &plan.lines {
            let layout =
                self.engine
                    .layout_line(&line.text, FontStyle::Bold, plan.font_size as f32, brush)?;
            primitives::draw_outlined_text(
                &mut ctx,
                &layout,
                line.x,
                line.y,
                theme.text_color,
                theme.outline_color,
                self.cfg.outline_width,
            );
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        ctx.render_to_pixmap(&mut pixmap);

        let mut dst = background.clone().into_raw();
        premultiply_rgba8_in_place(&mut dst);
        over_in_place(&mut dst, pixmap.data_as_u8_slice())?;
        unpremultiply_rgba8_in_place(&mut dst);
        // Final frames are opaque regardless of the background's alpha.
        for px in dst.chunks_exact_mut(4) {
            px[3] = 255;
        }

        RgbaImage::from_raw(width, height, dst)
            .ok_or_else(|| TelopError::render("composited buffer does not match image dimensions"))
    }

    /// Load `background`, overlay `text`, and write the result to `output`.
    ///
    /// The output format follows the extension: `.jpg`/`.jpeg` encodes JPEG at
    /// quality 95, everything else PNG. Encoding happens in memory before the
    /// file is written, so a failed encode leaves no partial output behind.
    #[tracing::instrument(skip_all, fields(background = %background.display(), output = %output.display()))]
    pub fn composite_file(
        &mut self,
        background: &Path,
        output: &Path,
        text: &str,
        theme: &Theme,
    ) -> TelopResult<()> {
        let bytes = std::fs::read(background).map_err(|e| {
            TelopError::image_load(format!("read {}: {e}", background.display()))
        })?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| TelopError::image_load(format!("decode {}: {e}", background.display())))?
            .to_rgba8();

        let composited = self.composite_image(&image, text, theme)?;
        save_image(&composited, output)
    }
}

fn save_image(image: &RgbaImage, path: &Path) -> TelopResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let mut buf = Vec::new();
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => {
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 95)
                .encode_image(&rgb)
                .map_err(|e| TelopError::render(format!("jpeg encode: {e}")))?;
        }
        _ => {
            use image::ImageEncoder as _;
            image::codecs::png::PngEncoder::new(&mut buf)
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| TelopError::render(format!("png encode: {e}")))?;
        }
    }

    std::fs::write(path, buf)
        .map_err(|e| TelopError::render(format!("write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, width: f32, height: f32) -> MeasuredLine {
        MeasuredLine {
            text: text.to_string(),
            width,
            height,
        }
    }

    #[test]
    fn no_lines_yields_no_plan() {
        let cfg = OverlayConfig::default();
        assert!(plan_bubble(1080, 1920, &[], 64, &cfg).is_none());
    }

    #[test]
    fn bubble_sits_inside_telop_zone() {
        let cfg = OverlayConfig::default();
        let plan = plan_bubble(1080, 1920, &[line("テロップ", 600.0, 70.0)], 64, &cfg).unwrap();

        let zone_top = 1920.0 * 0.75;
        assert!(plan.bubble.y0 >= zone_top);
        assert!(plan.bubble.y1 <= 1920.0);
        assert!(plan.bubble.x0 >= 0.0);
        assert!(plan.bubble.x1 <= 1080.0);
    }

    #[test]
    fn bubble_centers_horizontally() {
        let cfg = OverlayConfig::default();
        let plan = plan_bubble(1080, 1920, &[line("中央", 600.0, 70.0)], 64, &cfg).unwrap();

        // 600 text + 2 * 30 padding = 660 wide, so 210 on each side.
        assert_eq!(plan.bubble.x0, 210.0);
        assert_eq!(plan.bubble.x1, 870.0);
    }

    #[test]
    fn lines_center_across_full_image_width() {
        let cfg = OverlayConfig::default();
        let plan = plan_bubble(
            1080,
            1920,
            &[line("長い行です", 600.0, 70.0), line("短い", 200.0, 70.0)],
            64,
            &cfg,
        )
        .unwrap();

        assert_eq!(plan.lines[0].x, 240.0);
        assert_eq!(plan.lines[1].x, 440.0);
    }

    #[test]
    fn line_spacing_follows_font_size() {
        let cfg = OverlayConfig::default();
        let plan = plan_bubble(
            1080,
            1920,
            &[line("一行目", 400.0, 70.0), line("二行目", 400.0, 70.0)],
            64,
            &cfg,
        )
        .unwrap();

        // round(64 * 0.3) = 19
        assert_eq!(plan.lines[1].y - plan.lines[0].y, 70.0 + 19.0);
        assert_eq!(plan.bubble.height(), 70.0 * 2.0 + 19.0 + 2.0 * 20.0);
    }

    #[test]
    fn underline_spans_bubble_minus_padding() {
        let cfg = OverlayConfig::default();
        let plan = plan_bubble(1080, 1920, &[line("下線", 600.0, 70.0)], 64, &cfg).unwrap();

        let (ux, uy, uw) = plan.underline.unwrap();
        assert_eq!(ux, plan.bubble.x0 + 30.0);
        assert_eq!(uw, plan.bubble.width() - 60.0);
        assert_eq!(uy, plan.bubble.y1 - 20.0 + 8.0);
    }

    #[test]
    fn bubble_stays_in_zone_for_every_text_length_up_to_200() {
        use crate::layout::fit;

        let cfg = OverlayConfig::default();
        let size = cfg.min_font_size;
        // Full-width CJK advance at the floor size, with typical line height.
        let char_w = size as f32;
        let line_h = size as f32 * 1.25;
        let max_width = (1080 - 2 * cfg.padding_x) as f32;

        for len in 0..=200usize {
            let text: String = "あ".repeat(len);
            let wrapped = fit::wrap(|t| t.chars().count() as f32 * char_w, &text, max_width);
            let measured: Vec<MeasuredLine> = wrapped
                .iter()
                .map(|l| MeasuredLine {
                    text: l.clone(),
                    width: l.chars().count() as f32 * char_w,
                    height: line_h,
                })
                .collect();

            let Some(plan) = plan_bubble(1080, 1920, &measured, size, &cfg) else {
                assert_eq!(len, 0);
                continue;
            };
            let zone_top = 1920.0 * cfg.telop_zone_fraction;
            assert!(plan.bubble.y0 >= zone_top, "len {len}: y0 {}", plan.bubble.y0);
            assert!(plan.bubble.y1 <= 1920.0, "len {len}: y1 {}", plan.bubble.y1);
            assert!(plan.bubble.x0 >= 0.0, "len {len}: x0 {}", plan.bubble.x0);
            assert!(plan.bubble.x1 <= 1080.0, "len {len}: x1 {}", plan.bubble.x1);
        }
    }

    #[test]
    fn fractional_widths_round_up() {
        let cfg = OverlayConfig::default();
        let plan = plan_bubble(1080, 1920, &[line("端数", 599.2, 69.1)], 64, &cfg).unwrap();

        assert_eq!(plan.bubble.width(), 600.0 + 60.0);
        assert_eq!(plan.lines[0].height, 70.0);
    }

    #[test]
    fn config_deserializes_with_partial_overrides() {
        let cfg: OverlayConfig =
            serde_json::from_str(r#"{ "max_font_size": 48, "outline_width": 2 }"#).unwrap();
        assert_eq!(cfg.max_font_size, 48);
        assert_eq!(cfg.outline_width, 2);
        assert_eq!(cfg.min_font_size, 28);
        assert_eq!(cfg.panel_fill, Rgba8::new(20, 20, 30, 210));
    }
}
