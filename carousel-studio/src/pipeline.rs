//! Deck pipeline: render templates, mount every slide on a headless surface,
//! apply a scripted list of shell operations, and export the result.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use carousel_core::{
    CarouselEditor, DragStart, EditorError, ElementKind, EngineConfig, EventOutcome, Field,
    InputEvent, MediaReplacement, Point, PointerEvent, PointerPhase, ResizeHandle, Size,
    SlideContent, SlideRenderer, StyleProperty,
};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{ClientError, MediaSource};

/// Row field naming the search keyword for rows without media.
pub const KEYWORD_FIELD: &str = "keyword";

/// Errors raised by the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The editor rejected an operation.
    #[error(transparent)]
    Editor(#[from] EditorError),
    /// The media source failed.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// A script could not be parsed.
    #[error("invalid edit script: {0}")]
    Script(String),
    /// JSON input was malformed.
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
    /// Reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One shell operation in an edit script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum EditOp {
    /// Select an element kind, or just the slide.
    Select {
        /// Slide index.
        slide: usize,
        /// Element kind.
        #[serde(default)]
        kind: Option<ElementKind>,
    },
    /// Replace a title or subtitle.
    Text {
        /// Slide index.
        slide: usize,
        /// `title` or `subtitle`.
        kind: ElementKind,
        /// New text; `\n` separates lines.
        value: String,
    },
    /// Override a text style property.
    Style {
        /// Slide index.
        slide: usize,
        /// `title` or `subtitle`.
        kind: ElementKind,
        /// CSS or camelCase property name.
        property: String,
        /// Property value.
        value: String,
    },
    /// Replace the selected or largest media.
    ReplaceMedia {
        /// Slide index.
        slide: usize,
        /// New media URL.
        url: String,
    },
    /// Press, move and release the pointer.
    Drag {
        /// Slide index.
        slide: usize,
        /// Press position.
        from: Point,
        /// Release position.
        to: Point,
    },
    /// Resize the selected media with a handle.
    Resize {
        /// Slide index.
        slide: usize,
        /// Compass handle name (`n`, `se`, ...).
        handle: String,
        /// Press position.
        from: Point,
        /// Release position.
        to: Point,
    },
}

/// A list of operations plus the media sizes a headless render needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditScript {
    /// Intrinsic sizes of media URLs, for crop geometry.
    #[serde(default)]
    pub media_sizes: BTreeMap<String, Size>,
    /// Operations in order.
    #[serde(default)]
    pub ops: Vec<EditOp>,
}

/// What running a script did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    /// Operations that changed something.
    pub applied: usize,
    /// Operations that were silent no-ops.
    pub skipped: usize,
}

impl EditScript {
    /// Parse a script from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a script.
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        serde_json::from_str(json).map_err(|e| PipelineError::Script(e.to_string()))
    }

    /// Load a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Apply every operation in order.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown slides, style properties or handles.
    pub fn apply(&self, editor: &mut CarouselEditor) -> Result<ScriptReport, PipelineError> {
        let mut report = ScriptReport::default();
        for (index, op) in self.ops.iter().enumerate() {
            if apply_op(editor, op)? {
                report.applied += 1;
            } else {
                tracing::debug!("Script op {index} changed nothing: {op:?}");
                report.skipped += 1;
            }
        }
        tracing::info!(
            "Applied {} script ops ({} skipped)",
            report.applied,
            report.skipped
        );
        Ok(report)
    }
}

fn apply_op(editor: &mut CarouselEditor, op: &EditOp) -> Result<bool, PipelineError> {
    match op {
        EditOp::Select { slide, kind } => Ok(editor.select(*slide, *kind)?),
        EditOp::Text { slide, kind, value } => {
            let field = Field::for_text(*kind).ok_or_else(|| {
                PipelineError::Script(format!("{kind} is not a text field"))
            })?;
            editor.update_edited_value(*slide, field, value.as_str())?;
            Ok(true)
        }
        EditOp::Style {
            slide,
            kind,
            property,
            value,
        } => {
            let property = StyleProperty::parse(property)
                .ok_or_else(|| PipelineError::Script(format!("unknown style property {property}")))?;
            Ok(editor.update_element_style(*slide, *kind, property, value)?)
        }
        EditOp::ReplaceMedia { slide, url } => Ok(matches!(
            editor.replace_media(*slide, url)?,
            MediaReplacement::Replaced { .. }
        )),
        EditOp::Drag { slide, from, to } => Ok(gesture(editor, *slide, *from, *to, None)),
        EditOp::Resize {
            slide,
            handle,
            from,
            to,
        } => {
            let handle = ResizeHandle::parse(handle)
                .ok_or_else(|| PipelineError::Script(format!("unknown resize handle {handle}")))?;
            Ok(gesture(editor, *slide, *from, *to, Some(handle)))
        }
    }
}

/// Press at `from`, move to `to`, release. Returns whether a drag committed.
fn gesture(
    editor: &mut CarouselEditor,
    slide: usize,
    from: Point,
    to: Point,
    handle: Option<ResizeHandle>,
) -> bool {
    let mut down = PointerEvent::new(PointerPhase::Down, slide, from.x, from.y);
    if let Some(handle) = handle {
        down = down.with_handle(handle);
    }
    match editor.handle_event(&InputEvent::Pointer(down)) {
        EventOutcome::DragStarted(DragStart::Started) => {}
        EventOutcome::DragStarted(DragStart::Deferred) => {
            for _ in 0..editor.config().layout_retry_frames {
                editor.on_frame();
            }
        }
        _ => return false,
    }
    editor.handle_event(&InputEvent::Pointer(PointerEvent::new(
        PointerPhase::Move,
        slide,
        to.x,
        to.y,
    )));
    matches!(
        editor.handle_event(&InputEvent::Pointer(PointerEvent::new(
            PointerPhase::Up,
            slide,
            to.x,
            to.y,
        ))),
        EventOutcome::DragCommitted(_)
    )
}

/// Render a deck and mount every slide on a headless surface.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn build_deck(
    config: EngineConfig,
    templates: &[String],
    rows: &[SlideContent],
    renderer: impl SlideRenderer + 'static,
    media_sizes: &BTreeMap<String, Size>,
) -> Result<CarouselEditor, PipelineError> {
    let mut editor = CarouselEditor::new(config)?.with_renderer(renderer);
    let count = editor.load_deck(templates, rows);
    for index in 0..count {
        editor.mount_headless(index, |mut surface| {
            surface.register_media_sizes(media_sizes.iter().map(|(url, size)| (url.clone(), *size)));
            surface
        })?;
    }
    // Let any deferred background discovery settle.
    for _ in 0..editor.config().layout_retry_frames {
        if (0..count).all(|index| !editor.layout_pending(index)) {
            break;
        }
        editor.on_frame();
    }
    Ok(editor)
}

/// Fill rows without media from their `keyword` field, searching
/// concurrently. Returns the number of rows filled.
///
/// # Errors
///
/// Propagates the first search failure.
pub async fn fill_media(
    rows: &mut [SlideContent],
    source: &dyn MediaSource,
) -> Result<usize, ClientError> {
    let wanted: Vec<(usize, String)> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.media.is_none())
        .filter_map(|(index, row)| {
            row.extra
                .get(KEYWORD_FIELD)
                .and_then(|v| v.as_str())
                .filter(|k| !k.trim().is_empty())
                .map(|k| (index, k.to_string()))
        })
        .collect();

    let results = try_join_all(
        wanted
            .iter()
            .map(|(_, keyword)| source.search_images(keyword)),
    )
    .await?;

    let mut filled = 0;
    for ((index, keyword), urls) in wanted.iter().zip(results) {
        match urls.into_iter().next() {
            Some(url) => {
                rows[*index].media = Some(url);
                filled += 1;
            }
            None => tracing::debug!("No images for {keyword:?}"),
        }
    }
    Ok(filled)
}

/// Write every slide as a standalone HTML file into `dir`.
///
/// # Errors
///
/// Returns an error if a file cannot be written.
pub fn export_deck(editor: &CarouselEditor, dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let paths = editor
        .download_all()
        .iter()
        .map(|export| export.write_to(dir))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!("Wrote {} slides to {}", paths.len(), dir.display());
    Ok(paths)
}

/// Read slide rows from a JSON file holding an array of rows.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_rows(path: &Path) -> Result<Vec<SlideContent>, PipelineError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Read template files in order.
///
/// # Errors
///
/// Returns an error if any file cannot be read.
pub fn read_templates(paths: &[PathBuf]) -> Result<Vec<String>, PipelineError> {
    paths
        .iter()
        .map(|path| std::fs::read_to_string(path).map_err(PipelineError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use carousel_core::PlaceholderRenderer;

    const TEMPLATE: &str = r#"<div style="width: 1080px; height: 1350px">
<img src="{{media}}" style="width: 400px; height: 300px">
<h1>{{title}}</h1>
<p>{{subtitle}}</p>
</div>"#;

    struct FixedSource;

    #[async_trait]
    impl MediaSource for FixedSource {
        async fn search_images(&self, keyword: &str) -> Result<Vec<String>, ClientError> {
            if keyword == "nothing" {
                Ok(Vec::new())
            } else {
                Ok(vec![format!("https://img.test/{}.jpg", keyword.replace(' ', "-"))])
            }
        }
    }

    struct FailingSource;

    #[async_trait]
    impl MediaSource for FailingSource {
        async fn search_images(&self, _keyword: &str) -> Result<Vec<String>, ClientError> {
            Err(ClientError::UnexpectedResponse("down".to_string()))
        }
    }

    fn rows() -> Vec<SlideContent> {
        vec![
            SlideContent::new("First", "One").with_media("a.jpg"),
            SlideContent::new("Second", "Two").with_media("b.jpg"),
        ]
    }

    fn deck() -> CarouselEditor {
        let sizes = BTreeMap::from([
            ("a.jpg".to_string(), Size::new(800.0, 400.0)),
            ("b.jpg".to_string(), Size::new(800.0, 400.0)),
        ]);
        build_deck(
            EngineConfig {
                cover_epsilon: 0.0,
                ..EngineConfig::default()
            },
            &[TEMPLATE.to_string()],
            &rows(),
            PlaceholderRenderer,
            &sizes,
        )
        .expect("deck builds")
    }

    #[test]
    fn test_build_deck_mounts_every_slide() {
        let editor = deck();
        assert_eq!(editor.mounted_slides(), vec![0, 1]);
        assert_eq!(editor.elements(0).len(), 3);
    }

    #[test]
    fn test_script_parses_and_applies() {
        let script = EditScript::from_json_str(
            r##"{
                "ops": [
                    {"op": "text", "slide": 0, "kind": "title", "value": "Hello"},
                    {"op": "style", "slide": 0, "kind": "title", "property": "fontSize", "value": "80"},
                    {"op": "style", "slide": 0, "kind": "image", "property": "color", "value": "red"},
                    {"op": "drag", "slide": 1, "from": {"x": 100, "y": 100}, "to": {"x": 150, "y": 100}},
                    {"op": "select", "slide": 1, "kind": "image"},
                    {"op": "resize", "slide": 1, "handle": "e", "from": {"x": 400, "y": 150}, "to": {"x": 300, "y": 150}},
                    {"op": "replace-media", "slide": 0, "url": "https://img.test/new.jpg"}
                ]
            }"##,
        )
        .expect("script parses");
        let mut editor = deck();
        let report = script.apply(&mut editor).expect("script applies");
        assert_eq!(report, ScriptReport { applied: 6, skipped: 1 });

        let exports = editor.download_all();
        assert!(exports[0].html.contains("Hello"));
        assert!(exports[0].html.contains("font-size: 80px"));
        assert!(exports[0].html.contains("https://img.test/new.jpg"));
        assert!(exports[1].html.contains("object-position: 25% 50%"));
        assert!(exports[1].html.contains("width: 300px"));
    }

    #[test]
    fn test_script_rejects_unknown_names() {
        let mut editor = deck();
        let script = EditScript {
            ops: vec![EditOp::Resize {
                slide: 0,
                handle: "diagonal".to_string(),
                from: Point::new(0.0, 0.0),
                to: Point::new(1.0, 1.0),
            }],
            ..EditScript::default()
        };
        assert!(matches!(
            script.apply(&mut editor),
            Err(PipelineError::Script(_))
        ));
        assert!(EditScript::from_json_str(r#"{"ops": [{"op": "explode"}]}"#).is_err());
    }

    #[tokio::test]
    async fn test_fill_media_from_keywords() {
        let mut rows: Vec<SlideContent> = serde_json::from_str(
            r#"[
                {"title": "A", "keyword": "red car"},
                {"title": "B", "image": "kept.jpg", "keyword": "ignored"},
                {"title": "C", "keyword": "nothing"},
                {"title": "D"}
            ]"#,
        )
        .expect("rows parse");
        let filled = fill_media(&mut rows, &FixedSource).await.expect("search works");
        assert_eq!(filled, 1);
        assert_eq!(rows[0].media.as_deref(), Some("https://img.test/red-car.jpg"));
        assert_eq!(rows[1].media.as_deref(), Some("kept.jpg"));
        assert!(rows[2].media.is_none());
        assert!(rows[3].media.is_none());
    }

    #[tokio::test]
    async fn test_fill_media_propagates_failures() {
        let mut rows = vec![SlideContent::default()];
        rows[0]
            .extra
            .insert(KEYWORD_FIELD.to_string(), serde_json::Value::from("x"));
        assert!(fill_media(&mut rows, &FailingSource).await.is_err());
    }

    #[test]
    fn test_read_inputs() {
        let dir = tempfile::tempdir().expect("temp dir");
        let data = dir.path().join("rows.json");
        let template = dir.path().join("slide.html");
        std::fs::write(&data, r#"[{"title": "T", "body": "B"}]"#).expect("write rows");
        std::fs::write(&template, TEMPLATE).expect("write template");

        let rows = read_rows(&data).expect("rows");
        assert_eq!(rows[0].subtitle, "B");
        let templates = read_templates(&[template]).expect("templates");
        assert_eq!(templates, vec![TEMPLATE.to_string()]);

        std::fs::write(&data, "{").expect("write garbage");
        assert!(matches!(read_rows(&data), Err(PipelineError::Json(_))));
        assert!(matches!(
            read_rows(&dir.path().join("missing.json")),
            Err(PipelineError::Io(_))
        ));
    }

    #[test]
    fn test_export_deck_writes_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = export_deck(&deck(), dir.path()).expect("export");
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.exists()));
    }
}
