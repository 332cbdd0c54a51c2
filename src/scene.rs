//! Scene image tasks: the JSON work units a batch run composites overlays for.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{TelopError, TelopResult};
use crate::overlay::OverlayCompositor;
use crate::theme::{Theme, theme_for_scene};

/// One image to produce for a scene: a generation prompt plus the telop text
/// to overlay on the generated background.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneImageTask {
    pub scene_id: String,
    /// Position of this image within the scene, starting at 1.
    pub index: u32,
    pub prompt: String,
    pub overlay_text: String,
}

impl SceneImageTask {
    /// Canonical output name, stable across runs of the same task list. The
    /// index is zero-padded to two digits so names sort in scene order.
    pub fn output_file_name(&self) -> String {
        format!("{}_{:02}.png", self.scene_id, self.index)
    }

    /// Theme assigned to this task's scene.
    pub fn theme(&self) -> &'static Theme {
        theme_for_scene(&self.scene_id)
    }
}

/// Outcome counts of a batch overlay run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Overlay every task onto its background from `backgrounds`, writing results
/// into `out_dir`.
///
/// Tasks are isolated from each other: a missing background skips the task, a
/// failed composite is logged and counted, and the remaining tasks still run.
/// Only setup failures (the output directory itself) abort the batch.
pub fn overlay_tasks(
    compositor: &mut OverlayCompositor,
    tasks: &[SceneImageTask],
    backgrounds: &Path,
    out_dir: &Path,
) -> TelopResult<BatchSummary> {
    std::fs::create_dir_all(out_dir)
        .map_err(|e| TelopError::validation(format!("create {}: {e}", out_dir.display())))?;

    let mut summary = BatchSummary::default();
    for task in tasks {
        let name = task.output_file_name();
        let bg = backgrounds.join(&name);
        if !bg.exists() {
            tracing::warn!(%name, background = %bg.display(), "no background, skipping task");
            summary.skipped += 1;
            continue;
        }
        match compositor.composite_file(&bg, &out_dir.join(&name), &task.overlay_text, task.theme())
        {
            Ok(()) => summary.written += 1,
            Err(err) => {
                tracing::warn!(%name, error = %err, "task failed, continuing with siblings");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// Load a task list from a JSON array file.
pub fn load_tasks(path: &Path) -> TelopResult<Vec<SceneImageTask>> {
    let bytes = std::fs::read(path)
        .map_err(|e| TelopError::validation(format!("read {}: {e}", path.display())))?;
    let tasks: Vec<SceneImageTask> = serde_json::from_slice(&bytes)
        .map_err(|e| TelopError::validation(format!("parse {}: {e}", path.display())))?;
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::MANGA_DARK;

    #[test]
    fn task_round_trips_through_json() {
        let task = SceneImageTask {
            scene_id: "s01-hook".to_string(),
            index: 2,
            prompt: "dramatic castle gate at dawn".to_string(),
            overlay_text: "運命の朝".to_string(),
        };
        let json = serde_json::to_string(&task).unwrap();
        let back: SceneImageTask = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scene_id, task.scene_id);
        assert_eq!(back.overlay_text, task.overlay_text);
    }

    #[test]
    fn output_name_joins_scene_and_index() {
        let task = SceneImageTask {
            scene_id: "s07-seminar".to_string(),
            index: 1,
            prompt: String::new(),
            overlay_text: String::new(),
        };
        assert_eq!(task.output_file_name(), "s07-seminar_01.png");
    }

    #[test]
    fn task_theme_follows_scene_map() {
        let task = SceneImageTask {
            scene_id: "s01-hook".to_string(),
            index: 1,
            prompt: String::new(),
            overlay_text: String::new(),
        };
        assert_eq!(task.theme(), &MANGA_DARK);
    }

    #[test]
    fn missing_fields_fail_to_parse() {
        let err = serde_json::from_str::<SceneImageTask>(r#"{ "scene_id": "s01-hook" }"#);
        assert!(err.is_err());
    }
}
