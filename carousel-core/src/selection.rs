//! Selection and remount synchronization.
//!
//! Each slide lives in its own surface, so a highlight on one slide knows
//! nothing about the others. The [`SelectionManager`] keeps the one logical
//! selection, clears stale highlight markers on every surface before placing
//! a new one, and replays recorded edits onto freshly mounted surfaces.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::edits::{EditStore, Field, StyleOverride, StyleProperty, TextStyle};
use crate::element::{EditableElement, ElementKind, EDITING_ATTR, ID_ATTR, SELECTED_ATTR};
use crate::style::css_url;
use crate::surface::{NodeIndex, RenderSurface, SurfaceMap};

/// The logical selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    /// Selected slide.
    pub slide: usize,
    /// Selected element kind, `None` when only the slide is selected.
    pub kind: Option<ElementKind>,
    /// Stable identifier when a specific element was picked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// Tracks the selection and the capture-once text style cache.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    state: Option<SelectionState>,
    captured: HashMap<(usize, ElementKind), StyleOverride>,
}

impl SelectionManager {
    /// Create a manager with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current logical selection.
    #[must_use]
    pub fn state(&self) -> Option<&SelectionState> {
        self.state.as_ref()
    }

    /// Select the first editable element of `kind` on `slide`.
    ///
    /// Every highlight on every surface is cleared first. Returns whether a
    /// highlight was placed; the logical selection is updated either way, so
    /// an unmounted slide is highlighted when it mounts.
    pub fn select(
        &mut self,
        surfaces: &mut SurfaceMap,
        elements: &[EditableElement],
        slide: usize,
        kind: Option<ElementKind>,
    ) -> bool {
        Self::clear_all(surfaces);
        self.state = Some(SelectionState {
            slide,
            kind,
            node_id: None,
        });
        self.highlight(surfaces, elements, slide)
    }

    /// Select one specific element.
    pub fn select_element(
        &mut self,
        surfaces: &mut SurfaceMap,
        elements: &[EditableElement],
        slide: usize,
        element: &EditableElement,
    ) -> bool {
        Self::clear_all(surfaces);
        self.state = Some(SelectionState {
            slide,
            kind: Some(element.kind),
            node_id: Some(element.node_id().to_string()),
        });
        self.highlight(surfaces, elements, slide)
    }

    /// Drop the logical selection and every highlight.
    pub fn deselect(&mut self, surfaces: &mut SurfaceMap) {
        Self::clear_all(surfaces);
        self.state = None;
    }

    /// Remove every highlight marker from every mounted surface.
    pub fn clear_all(surfaces: &mut SurfaceMap) {
        for surface in surfaces.values_mut() {
            for node in surface.all_with_attribute(SELECTED_ATTR) {
                surface.remove_attribute(node, SELECTED_ATTR);
            }
        }
    }

    /// The element the selection points at on `slide`, if mounted there.
    #[must_use]
    pub fn selected_element<'a>(
        &self,
        slide: usize,
        elements: &'a [EditableElement],
    ) -> Option<&'a EditableElement> {
        let state = self.state.as_ref().filter(|s| s.slide == slide)?;
        match (&state.node_id, state.kind) {
            (Some(id), _) => elements.iter().find(|e| e.node_id() == id),
            (None, Some(kind)) => first_of_kind(elements, kind),
            (None, None) => None,
        }
    }

    /// Text style for the property panel: operator override, then the style
    /// captured at first selection, then the configured default.
    #[must_use]
    pub fn resolved_style(
        &self,
        slide: usize,
        kind: ElementKind,
        store: &EditStore,
        config: &EngineConfig,
    ) -> Option<TextStyle> {
        let default = config.default_style(kind)?;
        let overrides = store.styles.get(slide, kind);
        let captured = self.captured.get(&(slide, kind));
        let pick = |property: StyleProperty| {
            overrides
                .and_then(|o| o.get(property))
                .or_else(|| captured.and_then(|c| c.get(property)))
                .unwrap_or_else(|| default.get(property))
                .to_string()
        };
        Some(TextStyle {
            font_size: pick(StyleProperty::FontSize),
            font_weight: pick(StyleProperty::FontWeight),
            text_align: pick(StyleProperty::TextAlign),
            color: pick(StyleProperty::Color),
        })
    }

    /// The style captured for a slide's text kind, if any.
    #[must_use]
    pub fn captured_style(&self, slide: usize, kind: ElementKind) -> Option<&StyleOverride> {
        self.captured.get(&(slide, kind))
    }

    fn highlight(
        &mut self,
        surfaces: &mut SurfaceMap,
        elements: &[EditableElement],
        slide: usize,
    ) -> bool {
        let Some(surface) = surfaces.get_mut(&slide) else {
            tracing::debug!("Slide {slide} not mounted; highlight deferred to mount");
            return false;
        };
        self.mark(surface.as_mut(), elements, slide)
    }

    fn mark(
        &mut self,
        surface: &mut dyn RenderSurface,
        elements: &[EditableElement],
        slide: usize,
    ) -> bool {
        let Some(target) = self.selected_element(slide, elements) else {
            return false;
        };
        let Some(node) = target.element.locate(&*surface) else {
            return false;
        };
        let kind = target.kind;
        surface.set_attribute(node, SELECTED_ATTR, "");
        if kind.is_text() && !self.captured.contains_key(&(slide, kind)) {
            let mut style = StyleOverride::default();
            for property in StyleProperty::ALL {
                if let Some(value) = surface.computed_style(node, property.css_name()) {
                    style.set(property, value);
                }
            }
            self.captured.insert((slide, kind), style);
        }
        true
    }

    /// Replay every recorded edit for `slide` onto a mounted surface.
    ///
    /// Idempotent. Text runs currently being edited in place are left alone,
    /// and protected media is never overwritten. Re-marks the highlight when
    /// the selection points at this slide.
    pub fn resync(
        &mut self,
        surface: &mut dyn RenderSurface,
        elements: &[EditableElement],
        slide: usize,
        store: &EditStore,
    ) {
        for (field, value) in store.content.for_slide(slide) {
            match field {
                Field::Title | Field::Subtitle => {
                    if let Some(kind) = field.text_kind() {
                        write_text(surface, elements, kind, value);
                    }
                }
                Field::Media { node_id } => write_media(surface, elements, node_id, value),
            }
        }

        for (kind, style) in store.styles.for_slide(slide) {
            for node in text_nodes(&*surface, elements, kind) {
                for (property, value) in style.iter() {
                    surface.set_style(node, property.css_name(), value);
                }
            }
        }

        for (node_id, declarations) in store.placements.for_slide(slide) {
            let Some(node) = surface.find_by_attribute(ID_ATTR, node_id) else {
                tracing::debug!("Placement target {node_id} missing on slide {slide}");
                continue;
            };
            for (property, value) in declarations {
                surface.set_style(node, property, value);
            }
        }

        if self.state.as_ref().is_some_and(|s| s.slide == slide) {
            for node in surface.all_with_attribute(SELECTED_ATTR) {
                surface.remove_attribute(node, SELECTED_ATTR);
            }
            self.mark(surface, elements, slide);
        }
    }
}

fn first_of_kind(elements: &[EditableElement], kind: ElementKind) -> Option<&EditableElement> {
    elements
        .iter()
        .filter(|e| e.kind == kind && !e.protected)
        .min_by_key(|e| e.line.unwrap_or(0))
}

/// Line markers of a text kind, in line order.
fn text_nodes(
    surface: &dyn RenderSurface,
    elements: &[EditableElement],
    kind: ElementKind,
) -> Vec<NodeIndex> {
    let mut spans: Vec<&EditableElement> = elements.iter().filter(|e| e.kind == kind).collect();
    spans.sort_by_key(|e| e.line.unwrap_or(0));
    spans
        .into_iter()
        .filter_map(|e| e.element.locate(surface))
        .collect()
}

fn write_text(
    surface: &mut dyn RenderSurface,
    elements: &[EditableElement],
    kind: ElementKind,
    value: &str,
) {
    let nodes = text_nodes(&*surface, elements, kind);
    if nodes.is_empty() {
        tracing::debug!("No {kind} markers to receive edited text");
        return;
    }
    if nodes
        .iter()
        .any(|&n| surface.attribute(n, EDITING_ATTR).is_some())
    {
        tracing::debug!("Skipping {kind} sync: edit in progress");
        return;
    }

    let lines: Vec<&str> = value.split('\n').collect();
    let last = nodes.len() - 1;
    for (i, &node) in nodes.iter().enumerate() {
        let text = if i == last {
            lines.get(i..).map(|rest| rest.join("\n")).unwrap_or_default()
        } else {
            lines.get(i).map(ToString::to_string).unwrap_or_default()
        };
        if surface.text_content(node) != text {
            surface.set_text_content(node, &text);
        }
    }
}

fn write_media(
    surface: &mut dyn RenderSurface,
    elements: &[EditableElement],
    node_id: &str,
    url: &str,
) {
    let Some(element) = elements.iter().find(|e| e.node_id() == node_id) else {
        tracing::debug!("Media target {node_id} not discovered on this mount");
        return;
    };
    if element.protected {
        tracing::debug!("Refusing to overwrite protected media {node_id}");
        return;
    }
    let Some(node) = element.element.locate(&*surface) else {
        return;
    };
    match element.kind {
        ElementKind::Image => {
            surface.set_attribute(node, "src", url);
            surface.remove_attribute(node, "srcset");
        }
        ElementKind::Video => surface.set_attribute(node, "src", url),
        ElementKind::Background => surface.set_style(node, "background-image", &css_url(url)),
        ElementKind::Title | ElementKind::Subtitle => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{augment_markup, discover, SlideText};
    use crate::headless::MarkupSurface;
    use crate::protection::Unprotected;

    const TEMPLATE: &str = r#"<div style="width: 1080px; height: 1350px; color: #eee; font-size: 40px">
<div class="bg" style="width: 1080px; height: 1350px; background-image: url('bg.jpg')"></div>
<img src="photo.jpg" width="200" height="200">
<h1>Launch day</h1>
<p>Everything ships<br>tonight</p>
</div>"#;

    fn mount(surfaces: &mut SurfaceMap, slide: usize) -> Vec<EditableElement> {
        let markup = augment_markup(
            TEMPLATE,
            &SlideText::new("Launch day", "Everything ships\ntonight"),
        );
        let mut surface = MarkupSurface::parse(&markup);
        let discovery = discover(&surface, &Unprotected, &EngineConfig::default());
        discovery.apply_tags(&mut surface);
        surfaces.insert(slide, Box::new(surface));
        discovery.elements
    }

    fn selected_count(surfaces: &SurfaceMap) -> usize {
        surfaces
            .values()
            .map(|s| s.all_with_attribute(SELECTED_ATTR).len())
            .sum()
    }

    #[test]
    fn test_selection_is_exclusive_across_surfaces() {
        let mut surfaces = SurfaceMap::new();
        let slide0 = mount(&mut surfaces, 0);
        let slide2 = mount(&mut surfaces, 2);
        let mut selection = SelectionManager::new();

        assert!(selection.select(&mut surfaces, &slide0, 0, Some(ElementKind::Background)));
        assert_eq!(selected_count(&surfaces), 1);

        assert!(selection.select(&mut surfaces, &slide2, 2, Some(ElementKind::Title)));
        assert_eq!(selected_count(&surfaces), 1);
        assert!(surfaces[&0].all_with_attribute(SELECTED_ATTR).is_empty());
        let marked = surfaces[&2].all_with_attribute(SELECTED_ATTR);
        assert_eq!(
            surfaces[&2].attribute(marked[0], "data-cs-editable").as_deref(),
            Some("title")
        );

        let state = selection.state().expect("selection recorded");
        assert_eq!(state.slide, 2);
        assert_eq!(state.kind, Some(ElementKind::Title));
    }

    #[test]
    fn test_unmounted_slide_selection_is_logical_only() {
        let mut surfaces = SurfaceMap::new();
        let slide0 = mount(&mut surfaces, 0);
        let mut selection = SelectionManager::new();
        selection.select(&mut surfaces, &slide0, 0, Some(ElementKind::Image));

        assert!(!selection.select(&mut surfaces, &[], 5, Some(ElementKind::Title)));
        assert_eq!(selected_count(&surfaces), 0);
        assert_eq!(selection.state().map(|s| s.slide), Some(5));
    }

    #[test]
    fn test_style_captured_once_and_resolved_in_order() {
        let mut surfaces = SurfaceMap::new();
        let elements = mount(&mut surfaces, 0);
        let mut selection = SelectionManager::new();
        let config = EngineConfig::default();
        let mut store = EditStore::new();

        selection.select(&mut surfaces, &elements, 0, Some(ElementKind::Title));
        let captured = selection
            .captured_style(0, ElementKind::Title)
            .expect("style captured");
        assert_eq!(captured.get(StyleProperty::FontSize), Some("40px"));

        // A later override on the surface must not replace the capture.
        let title = surfaces[&0]
            .find_by_attribute(ID_ATTR, "title-0")
            .expect("title marker");
        surfaces
            .get_mut(&0)
            .expect("mounted")
            .set_style(title, "font-size", "99px");
        selection.select(&mut surfaces, &elements, 0, Some(ElementKind::Title));
        assert_eq!(
            selection
                .captured_style(0, ElementKind::Title)
                .and_then(|c| c.get(StyleProperty::FontSize)),
            Some("40px")
        );

        store
            .styles
            .set(0, ElementKind::Title, StyleProperty::Color, "#123456".into());
        let resolved = selection
            .resolved_style(0, ElementKind::Title, &store, &config)
            .expect("text kind resolves");
        assert_eq!(resolved.color, "#123456");
        assert_eq!(resolved.font_size, "40px");
        assert_eq!(resolved.font_weight, config.title_style.font_weight);

        let subtitle = selection
            .resolved_style(0, ElementKind::Subtitle, &store, &config)
            .expect("text kind resolves");
        assert_eq!(subtitle, config.subtitle_style);
    }

    #[test]
    fn test_resync_replays_edits_idempotently() {
        let mut store = EditStore::new();
        store.content.insert(0, Field::Title, "Launch night");
        store
            .content
            .insert(0, Field::Subtitle, "Nothing ships\nuntil\nmorning");
        store.content.insert(
            0,
            Field::Media {
                node_id: "image-0".into(),
            },
            "https://cdn.test/new.jpg",
        );
        store.content.insert(
            0,
            Field::Media {
                node_id: "background-0".into(),
            },
            "https://cdn.test/bg2.jpg",
        );
        store
            .styles
            .set(0, ElementKind::Title, StyleProperty::FontWeight, "900".into());
        store.placements.commit(
            0,
            "image-0",
            &[("object-position".into(), "10% 50%".into())],
        );

        let mut surfaces = SurfaceMap::new();
        let elements = mount(&mut surfaces, 0);
        let mut selection = SelectionManager::new();
        let surface = surfaces.get_mut(&0).expect("mounted");
        selection.resync(surface.as_mut(), &elements, 0, &store);
        let once = surface.markup();
        selection.resync(surface.as_mut(), &elements, 0, &store);
        assert_eq!(surface.markup(), once);

        assert!(once.contains(">Launch night</span>"));
        assert!(once.contains(">Nothing ships</span>"));
        assert!(once.contains(">until\nmorning</span>"));
        assert!(once.contains("src=\"https://cdn.test/new.jpg\""));
        assert!(once.contains("background-image: url(&quot;https://cdn.test/bg2.jpg&quot;)")
            || once.contains("url(\"https://cdn.test/bg2.jpg\")"));
        assert!(once.contains("font-weight: 900"));
        assert!(once.contains("object-position: 10% 50%"));
    }

    #[test]
    fn test_resync_skips_text_being_edited_and_protected_media() {
        let mut store = EditStore::new();
        store.content.insert(0, Field::Title, "Overwritten?");
        store.content.insert(
            0,
            Field::Media {
                node_id: "image-0".into(),
            },
            "https://cdn.test/new.jpg",
        );

        let mut surfaces = SurfaceMap::new();
        let mut elements = mount(&mut surfaces, 0);
        for element in &mut elements {
            if element.kind == ElementKind::Image {
                element.protected = true;
            }
        }
        let surface = surfaces.get_mut(&0).expect("mounted");
        let title = surface
            .find_by_attribute(ID_ATTR, "title-0")
            .expect("title marker");
        surface.set_attribute(title, EDITING_ATTR, "");

        SelectionManager::new().resync(surface.as_mut(), &elements, 0, &store);
        let markup = surface.markup();
        assert!(markup.contains(">Launch day</span>"));
        assert!(markup.contains("src=\"photo.jpg\""));
    }

    #[test]
    fn test_resync_restores_highlight_on_remount() {
        let mut surfaces = SurfaceMap::new();
        let elements = mount(&mut surfaces, 0);
        let mut selection = SelectionManager::new();
        selection.select(&mut surfaces, &elements, 0, Some(ElementKind::Image));

        let remounted = mount(&mut surfaces, 0);
        assert_eq!(selected_count(&surfaces), 0);
        let surface = surfaces.get_mut(&0).expect("mounted");
        selection.resync(surface.as_mut(), &remounted, 0, &EditStore::new());
        assert_eq!(selected_count(&surfaces), 1);
    }
}
