#![forbid(unsafe_code)]

//! Deterministic telop overlay compositing for generated scene images.
//!
//! Fits Japanese caption text into a themed rounded speech bubble anchored to
//! the bottom quarter of a background image, rasterizes it on the CPU, and
//! alpha-composites the result. The same inputs always produce the same
//! output bytes.

pub mod composite;
pub mod draw;
pub mod font;
pub mod foundation;
pub mod layout;
pub mod overlay;
pub mod scene;
pub mod services;
pub mod theme;

pub use font::fetch::{FontFetcher, HttpFontFetcher};
pub use font::resolver::{FontResolver, FontSource, FontStyle, Platform};
pub use foundation::color::Rgba8;
pub use foundation::error::{TelopError, TelopResult};
pub use layout::engine::{TextBrushRgba8, TextLayoutEngine};
pub use overlay::{BubblePlan, MeasuredLine, OverlayCompositor, OverlayConfig, plan_bubble};
pub use scene::{BatchSummary, SceneImageTask, load_tasks, overlay_tasks};
pub use services::{
    BackgroundGenerator, SpeechSynthesizer, TextQualityVerifier, TextVerdict, VisionQa,
};
pub use theme::{DEFAULT_THEME, THEMES, Theme, theme_by_key, theme_for_scene};
