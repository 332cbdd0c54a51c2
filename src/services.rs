//! Seams for the external collaborators a full production run drives.
//!
//! The pipeline treats background generation, OCR verification, vision QA and
//! narration synthesis as black boxes behind these traits. The compositor
//! itself never calls them; batch drivers wire concrete clients in.

use std::path::Path;
use std::time::Duration;

use crate::foundation::error::TelopResult;

/// Produces a background image for a prompt, writing it to `output`.
pub trait BackgroundGenerator {
    /// Returns `Ok(true)` when an image was written, `Ok(false)` when the
    /// generator declined the prompt without failing.
    fn generate(&self, prompt: &str, output: &Path, timeout: Duration) -> TelopResult<bool>;
}

/// Outcome of OCR-based verification of a generated background.
#[derive(Clone, Debug)]
pub struct TextVerdict {
    /// True when the background carries no unwanted baked-in text.
    pub is_clean: bool,
    pub extracted_text: String,
}

/// Checks a generated background for stray text before it is used.
pub trait TextQualityVerifier {
    fn verify(&self, image: &Path) -> TelopResult<TextVerdict>;
}

/// Scores a finished composite for visual quality, in `[0.0, 1.0]`.
pub trait VisionQa {
    fn analyze(&self, image: &Path) -> TelopResult<f32>;
}

/// Renders narration audio for a scene's text.
pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str) -> TelopResult<Vec<u8>>;
}
