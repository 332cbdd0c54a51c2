use std::f64::consts::{FRAC_PI_2, PI};

use kurbo::Shape as _;

use crate::foundation::color::Rgba8;
use crate::layout::engine::TextBrushRgba8;

/// Wave amplitude of the marker underline, in pixels.
const UNDERLINE_AMPLITUDE: f64 = 2.0;
/// Angular step of the underline sine per segment, in radians.
const UNDERLINE_STEP: f64 = 0.8;

/// Fill a rounded rectangle as two full-bleed axis rects plus four
/// quarter-circle pie slices, one per corner. The pieces overlap along their
/// shared edges, so the chosen radius shows no corner gaps or seams.
pub fn fill_rounded_panel(
    ctx: &mut vello_cpu::RenderContext,
    rect: kurbo::Rect,
    radius: f64,
    fill: Rgba8,
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(fill));

    ctx.fill_rect(&rect_to_cpu(kurbo::Rect::new(
        rect.x0 + radius,
        rect.y0,
        rect.x1 - radius,
        rect.y1,
    )));
    ctx.fill_rect(&rect_to_cpu(kurbo::Rect::new(
        rect.x0,
        rect.y0 + radius,
        rect.x1,
        rect.y1 - radius,
    )));

    let corners = [
        // (pie center, arc start angle); each sweeps a quarter turn
        (kurbo::Point::new(rect.x0 + radius, rect.y0 + radius), PI),
        (
            kurbo::Point::new(rect.x1 - radius, rect.y0 + radius),
            PI + FRAC_PI_2,
        ),
        (
            kurbo::Point::new(rect.x0 + radius, rect.y1 - radius),
            FRAC_PI_2,
        ),
        (kurbo::Point::new(rect.x1 - radius, rect.y1 - radius), 0.0),
    ];
    for (center, start) in corners {
        let slice = kurbo::CircleSegment::new(center, radius, 0.0, start, FRAC_PI_2);
        ctx.fill_path(&bezpath_to_cpu(&slice.to_path(0.1)));
    }
}

/// Stroke a rounded outline of the panel on top of its fill.
pub fn stroke_rounded_panel(
    ctx: &mut vello_cpu::RenderContext,
    rect: kurbo::Rect,
    radius: f64,
    color: Rgba8,
    width: f64,
) {
    let outline = kurbo::RoundedRect::from_rect(rect, radius).to_path(0.1);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(color));
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
    ctx.stroke_path(&bezpath_to_cpu(&outline));
}

/// Sample points of the hand-drawn underline: `max(width / 8, 4)` segments
/// whose vertical offsets follow a fixed-amplitude sine wave.
pub fn underline_points(x: f64, y: f64, width: f64) -> Vec<kurbo::Point> {
    let steps = ((width / 8.0) as usize).max(4);
    (0..=steps)
        .map(|i| {
            let px = x + width * i as f64 / steps as f64;
            let py = y + (i as f64 * UNDERLINE_STEP).sin() * UNDERLINE_AMPLITUDE;
            kurbo::Point::new(px, py)
        })
        .collect()
}

/// Stroke the wavy marker underline from `(x, y)` across `width` pixels.
pub fn draw_marker_underline(
    ctx: &mut vello_cpu::RenderContext,
    x: f64,
    y: f64,
    width: f64,
    color: Rgba8,
    thickness: f64,
) {
    if width <= 0.0 {
        return;
    }

    let points = underline_points(x, y, width);
    let mut path = kurbo::BezPath::new();
    path.move_to(points[0]);
    for p in &points[1..] {
        path.line_to(*p);
    }

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(color));
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(thickness));
    ctx.stroke_path(&bezpath_to_cpu(&path));
}

/// Every integer offset in `[-outline_width, outline_width]²` except `(0, 0)`,
/// in deterministic row order: the halo stamp positions for outlined text.
pub fn halo_offsets(outline_width: i32) -> Vec<(i32, i32)> {
    let mut offsets = Vec::new();
    for dx in -outline_width..=outline_width {
        for dy in -outline_width..=outline_width {
            if dx != 0 || dy != 0 {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Glyph runs of one shaped line, with the rasterizer's font handle rebuilt
/// from the run's own font bytes (correct face index for `.ttc` collections).
struct LineRun {
    font: vello_cpu::peniko::FontData,
    font_size: f32,
    glyphs: Vec<vello_cpu::Glyph>,
}

fn collect_runs(layout: &parley::Layout<TextBrushRgba8>) -> Vec<LineRun> {
    let mut runs = Vec::new();
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                continue;
            };

            let run = glyph_run.run();
            let font = run.font();
            let font_bytes: Vec<u8> = font.data.as_ref().to_vec();
            let cpu_font = vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font_bytes),
                font.index,
            );

            let glyphs = glyph_run
                .positioned_glyphs()
                .map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                })
                .collect();

            runs.push(LineRun {
                font: cpu_font,
                font_size: run.font_size(),
                glyphs,
            });
        }
    }
    runs
}

fn stamp_runs(ctx: &mut vello_cpu::RenderContext, runs: &[LineRun], x: f64, y: f64, color: Rgba8) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
    ctx.set_paint(color_to_cpu(color));
    for run in runs {
        ctx.glyph_run(&run.font)
            .font_size(run.font_size)
            .fill_glyphs(run.glyphs.iter().copied());
    }
}

/// Paint one shaped line at `(x, y)` with a uniform-width outline: the line is
/// stamped at every halo offset in the outline color, then once at the true
/// position in the fill color. `O(outline_width²)` stamps per line; widths stay
/// small (≤ 4 px) so this is cheap.
pub fn draw_outlined_text(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrushRgba8>,
    x: f64,
    y: f64,
    fill: Rgba8,
    outline: Rgba8,
    outline_width: i32,
) {
    let runs = collect_runs(layout);
    if runs.is_empty() {
        return;
    }

    for (dx, dy) in halo_offsets(outline_width) {
        stamp_runs(ctx, &runs, x + f64::from(dx), y + f64::from(dy), outline);
    }
    stamp_runs(ctx, &runs, x, y, fill);
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: kurbo::Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underline_has_at_least_four_segments() {
        let points = underline_points(0.0, 100.0, 10.0);
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn underline_spans_requested_width_with_bounded_wave() {
        let points = underline_points(70.0, 500.0, 800.0);
        assert_eq!(points.len(), 800 / 8 + 1);
        assert_eq!(points.first().unwrap().x, 70.0);
        assert_eq!(points.last().unwrap().x, 870.0);
        for p in &points {
            assert!((p.y - 500.0).abs() <= UNDERLINE_AMPLITUDE);
        }
    }

    #[test]
    fn halo_offsets_exclude_origin_and_cover_square() {
        let offsets = halo_offsets(3);
        assert_eq!(offsets.len(), 7 * 7 - 1);
        assert!(!offsets.contains(&(0, 0)));
        assert!(offsets.contains(&(-3, 3)));
        assert!(offsets.contains(&(3, -3)));
    }

    #[test]
    fn halo_offsets_width_1_is_eight_neighbors() {
        assert_eq!(halo_offsets(1).len(), 8);
    }
}
