//! In-place text editing.
//!
//! `Display → Editing → Display`. A double activation on a title or subtitle
//! marker makes it editable and selects its text; blur, Enter or Escape
//! reads the field back and records it in the edit store.

use serde::{Deserialize, Serialize};

use crate::edits::{EditedContentMap, Field};
use crate::element::{EditableElement, ElementKind, EDITABLE_ATTR, EDITING_ATTR, LINE_ATTR};
use crate::event::KeyEvent;
use crate::surface::{NodeIndex, RenderSurface, SurfaceId, SurfaceMap};

/// Attribute the host honours to make a node editable.
const CONTENT_EDITABLE: &str = "contenteditable";

/// Where the controller is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InlineEditState {
    /// Nothing is being edited.
    #[default]
    Display,
    /// A text marker is editable.
    Editing {
        /// Slide being edited.
        slide: usize,
        /// Field being edited.
        kind: ElementKind,
        /// Surface mount the edit started on.
        surface: SurfaceId,
        /// Marker that received focus.
        node_id: String,
    },
}

/// Text read back when an edit ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCommit {
    /// Slide edited.
    pub slide: usize,
    /// Field edited.
    pub kind: ElementKind,
    /// All lines of the field joined by `\n`.
    pub text: String,
}

/// Drives one in-place text edit at a time.
#[derive(Debug, Clone, Default)]
pub struct InlineEditController {
    state: InlineEditState,
}

impl InlineEditController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &InlineEditState {
        &self.state
    }

    /// Whether an edit is open on `slide`.
    #[must_use]
    pub fn is_editing_slide(&self, slide: usize) -> bool {
        matches!(&self.state, InlineEditState::Editing { slide: s, .. } if *s == slide)
    }

    /// Start editing a title or subtitle marker.
    ///
    /// An edit already open elsewhere is committed first. Returns that
    /// earlier commit, if any, and whether the new edit started.
    pub fn begin(
        &mut self,
        surfaces: &mut SurfaceMap,
        slide: usize,
        element: &EditableElement,
        content: &mut EditedContentMap,
    ) -> (Option<TextCommit>, bool) {
        if !element.kind.is_text() {
            return (None, false);
        }
        let previous = self.finish(surfaces, content);

        let Some(surface) = surfaces.get_mut(&slide) else {
            return (previous, false);
        };
        let Some(node) = element.element.locate(surface.as_ref()) else {
            tracing::debug!("Inline edit target {} not mounted", element.node_id());
            return (previous, false);
        };
        surface.set_attribute(node, CONTENT_EDITABLE, "true");
        surface.set_attribute(node, EDITING_ATTR, "");
        surface.focus(node, true);

        tracing::debug!("Editing {} on slide {slide}", element.kind);
        self.state = InlineEditState::Editing {
            slide,
            kind: element.kind,
            surface: surface.id(),
            node_id: element.node_id().to_string(),
        };
        (previous, true)
    }

    /// Enter (without Shift) and Escape end the edit.
    pub fn handle_key(
        &mut self,
        key: &KeyEvent,
        surfaces: &mut SurfaceMap,
        content: &mut EditedContentMap,
    ) -> Option<TextCommit> {
        let ends = match key.key.as_str() {
            "Enter" => !key.modifiers.shift,
            "Escape" | "Esc" => true,
            _ => false,
        };
        if ends {
            self.finish(surfaces, content)
        } else {
            None
        }
    }

    /// Focus left the edited marker on `slide`.
    pub fn blur(
        &mut self,
        slide: usize,
        surfaces: &mut SurfaceMap,
        content: &mut EditedContentMap,
    ) -> Option<TextCommit> {
        if self.is_editing_slide(slide) {
            self.finish(surfaces, content)
        } else {
            None
        }
    }

    /// End the open edit: clear the flags, read the field back and record it.
    pub fn finish(
        &mut self,
        surfaces: &mut SurfaceMap,
        content: &mut EditedContentMap,
    ) -> Option<TextCommit> {
        let InlineEditState::Editing {
            slide,
            kind,
            surface: surface_id,
            ..
        } = std::mem::take(&mut self.state)
        else {
            return None;
        };
        let Some(surface) = surfaces.get_mut(&slide).filter(|s| s.id() == surface_id) else {
            tracing::debug!("Inline edit on slide {slide} dropped: surface replaced");
            return None;
        };

        for node in surface.all_with_attribute(EDITING_ATTR) {
            surface.remove_attribute(node, EDITING_ATTR);
            surface.remove_attribute(node, CONTENT_EDITABLE);
        }
        let text = read_field(surface.as_ref(), kind);
        let field = Field::for_text(kind)?;
        content.insert(slide, field, text.clone());
        tracing::debug!("Committed {kind} text on slide {slide}");
        Some(TextCommit { slide, kind, text })
    }
}

/// All line markers of a text field, joined by newlines in line order.
#[must_use]
pub fn read_field(surface: &dyn RenderSurface, kind: ElementKind) -> String {
    let mut lines: Vec<(usize, NodeIndex)> = surface
        .all_with_attribute(EDITABLE_ATTR)
        .into_iter()
        .filter(|&n| surface.attribute(n, EDITABLE_ATTR).as_deref() == Some(kind.as_str()))
        .map(|n| {
            let line = surface
                .attribute(n, LINE_ATTR)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0);
            (line, n)
        })
        .collect();
    lines.sort_by_key(|(line, _)| *line);
    lines
        .into_iter()
        .map(|(_, n)| surface.text_content(n))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::discovery::{augment_markup, discover, SlideText};
    use crate::event::KeyModifiers;
    use crate::headless::MarkupSurface;
    use crate::protection::Unprotected;

    const TEMPLATE: &str = "<h1>Big news</h1><p>First line<br>second line</p>";

    fn mount(surfaces: &mut SurfaceMap, slide: usize) -> Vec<EditableElement> {
        let markup = augment_markup(
            TEMPLATE,
            &SlideText::new("Big news", "First line\nsecond line"),
        );
        let mut surface = MarkupSurface::parse(&markup);
        let discovery = discover(&surface, &Unprotected, &EngineConfig::default());
        discovery.apply_tags(&mut surface);
        surfaces.insert(slide, Box::new(surface));
        discovery.elements
    }

    fn find(elements: &[EditableElement], kind: ElementKind) -> &EditableElement {
        elements
            .iter()
            .find(|e| e.kind == kind)
            .expect("text marker discovered")
    }

    #[test]
    fn test_begin_marks_and_focuses() {
        let mut surfaces = SurfaceMap::new();
        let elements = mount(&mut surfaces, 0);
        let mut content = EditedContentMap::default();
        let mut edit = InlineEditController::new();

        let (previous, started) =
            edit.begin(&mut surfaces, 0, find(&elements, ElementKind::Title), &mut content);
        assert!(previous.is_none());
        assert!(started);
        assert!(edit.is_editing_slide(0));

        let surface = &surfaces[&0];
        let node = surface.focused().expect("title focused");
        assert_eq!(surface.attribute(node, CONTENT_EDITABLE).as_deref(), Some("true"));
        assert!(surface.attribute(node, EDITING_ATTR).is_some());
    }

    #[test]
    fn test_enter_commits_but_shift_enter_does_not() {
        let mut surfaces = SurfaceMap::new();
        let elements = mount(&mut surfaces, 0);
        let mut content = EditedContentMap::default();
        let mut edit = InlineEditController::new();
        let title = find(&elements, ElementKind::Title);
        edit.begin(&mut surfaces, 0, title, &mut content);

        let surface = surfaces.get_mut(&0).expect("mounted");
        let node = title.element.locate(surface.as_ref()).expect("title marker");
        surface.set_text_content(node, "Bigger news");

        let shift_enter = KeyEvent {
            key: "Enter".into(),
            modifiers: KeyModifiers {
                shift: true,
                ..KeyModifiers::default()
            },
        };
        assert!(edit
            .handle_key(&shift_enter, &mut surfaces, &mut content)
            .is_none());
        assert!(edit.is_editing_slide(0));

        let commit = edit
            .handle_key(&KeyEvent::new("Enter"), &mut surfaces, &mut content)
            .expect("enter commits");
        assert_eq!(commit.text, "Bigger news");
        assert_eq!(content.get(0, &Field::Title), Some("Bigger news"));
        assert_eq!(*edit.state(), InlineEditState::Display);
        assert!(surfaces[&0].all_with_attribute(EDITING_ATTR).is_empty());
        assert!(surfaces[&0].all_with_attribute(CONTENT_EDITABLE).is_empty());
    }

    #[test]
    fn test_escape_and_blur_commit_all_lines() {
        let mut surfaces = SurfaceMap::new();
        let elements = mount(&mut surfaces, 1);
        let mut content = EditedContentMap::default();
        let mut edit = InlineEditController::new();
        let subtitle = find(&elements, ElementKind::Subtitle);

        edit.begin(&mut surfaces, 1, subtitle, &mut content);
        let commit = edit
            .handle_key(&KeyEvent::new("Escape"), &mut surfaces, &mut content)
            .expect("escape commits");
        assert_eq!(commit.text, "First line\nsecond line");

        edit.begin(&mut surfaces, 1, subtitle, &mut content);
        assert!(edit.blur(0, &mut surfaces, &mut content).is_none());
        assert!(edit.blur(1, &mut surfaces, &mut content).is_some());
    }

    #[test]
    fn test_second_begin_commits_open_edit() {
        let mut surfaces = SurfaceMap::new();
        let slide0 = mount(&mut surfaces, 0);
        let slide1 = mount(&mut surfaces, 1);
        let mut content = EditedContentMap::default();
        let mut edit = InlineEditController::new();

        edit.begin(&mut surfaces, 0, find(&slide0, ElementKind::Title), &mut content);
        let (previous, started) =
            edit.begin(&mut surfaces, 1, find(&slide1, ElementKind::Title), &mut content);
        assert!(started);
        let previous = previous.expect("open edit committed");
        assert_eq!(previous.slide, 0);
        assert_eq!(content.get(0, &Field::Title), Some("Big news"));
        assert!(surfaces[&0].all_with_attribute(EDITING_ATTR).is_empty());
        assert!(edit.is_editing_slide(1));
    }

    #[test]
    fn test_edit_on_replaced_surface_is_dropped() {
        let mut surfaces = SurfaceMap::new();
        let elements = mount(&mut surfaces, 0);
        let mut content = EditedContentMap::default();
        let mut edit = InlineEditController::new();

        edit.begin(&mut surfaces, 0, find(&elements, ElementKind::Title), &mut content);
        mount(&mut surfaces, 0);
        assert!(edit.finish(&mut surfaces, &mut content).is_none());
        assert!(content.is_empty());
    }
}
