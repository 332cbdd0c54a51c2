use std::borrow::Cow;
use std::collections::HashMap;

use crate::font::resolver::{FontResolver, FontStyle};
use crate::foundation::error::{TelopError, TelopResult};
use crate::layout::fit;

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

struct StyleFont {
    family: String,
}

/// Stateful Parley-backed measurer and shaper.
///
/// Resolved font bytes are registered with the font context once per style and
/// cached for the engine's lifetime; hold one engine to reuse fonts across
/// images. When resolution fails entirely the engine degrades to the system
/// `sans-serif` stack instead of erroring.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    fonts: HashMap<FontStyle, Option<StyleFont>>,
    resolver: FontResolver,
}

impl TextLayoutEngine {
    pub fn new(resolver: FontResolver) -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            fonts: HashMap::new(),
            resolver,
        }
    }

    /// Rendered width and height of `text` at `size` without any wrapping.
    pub fn measure(&mut self, text: &str, style: FontStyle, size: u32) -> TelopResult<(f32, f32)> {
        let layout = self.layout_line(text, style, size as f32, TextBrushRgba8::default())?;
        Ok((layout.full_width(), layout.height()))
    }

    /// Largest size in `[min_size, max_size]` at which the unwrapped `text`
    /// fits in `max_width`; the floor size on total overflow.
    pub fn fit(
        &mut self,
        text: &str,
        max_width: f32,
        style: FontStyle,
        max_size: u32,
        min_size: u32,
    ) -> u32 {
        fit::fit_size(
            |t, s| match self.measure(t, style, s) {
                Ok((w, _)) => w,
                Err(_) => f32::INFINITY,
            },
            text,
            max_width,
            max_size,
            min_size,
        )
    }

    /// Greedy per-character wrap of `text` at a fixed `size`.
    pub fn wrap_text(
        &mut self,
        text: &str,
        style: FontStyle,
        size: u32,
        max_width: f32,
    ) -> Vec<String> {
        fit::wrap(
            |t| match self.measure(t, style, size) {
                Ok((w, _)) => w,
                Err(_) => f32::INFINITY,
            },
            text,
            max_width,
        )
    }

    /// Shape a single pre-wrapped line (no line breaking) for rasterization.
    pub fn layout_line(
        &mut self,
        text: &str,
        style: FontStyle,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> TelopResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(TelopError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        self.ensure_style(style);
        let stack = match self.fonts.get(&style) {
            Some(Some(font)) => {
                parley::style::FontStack::Source(Cow::Owned(font.family.clone()))
            }
            _ => parley::style::FontStack::Source(Cow::Borrowed("sans-serif")),
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(stack));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    fn ensure_style(&mut self, style: FontStyle) {
        if self.fonts.contains_key(&style) {
            return;
        }
        let loaded = self.load_style(style);
        if loaded.is_none() {
            tracing::warn!(
                ?style,
                "no font resolved, degrading to the system sans-serif stack"
            );
        }
        self.fonts.insert(style, loaded);
    }

    fn load_style(&mut self, style: FontStyle) -> Option<StyleFont> {
        let source = self.resolver.resolve(style)?;
        let bytes = match std::fs::read(source.path()) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(
                    path = %source.path().display(),
                    error = %err,
                    "resolved font file unreadable"
                );
                return None;
            }
        };

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes), None);
        let family_id = families.first().map(|(id, _)| *id)?;
        let family = self.font_ctx.collection.family_name(family_id)?.to_string();

        tracing::debug!(?style, %family, source = ?source, "registered overlay font");
        Some(StyleFont { family })
    }
}
