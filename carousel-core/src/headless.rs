//! Headless rendering surface.
//!
//! [`MarkupSurface`] implements [`RenderSurface`] over a parsed
//! [`Document`] without a layout engine. Boxes come from explicit
//! measurements or from inline pixel/percentage `left`/`top`/`width`/`height`
//! (and `width`/`height` attributes on media); media intrinsic sizes come from
//! a URL registry. It backs the CLI export pipeline and the test suite.

use std::collections::HashMap;

use crate::geometry::{Rect, Size};
use crate::markup::{Document, NodeId};
use crate::style::{css_url, extract_url, parse_px, InlineStyle};
use crate::surface::{NodeIndex, RenderSurface, SurfaceId};

/// Properties that inherit down the tree.
const INHERITED: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "letter-spacing",
    "line-height",
    "text-align",
    "text-transform",
];

/// Elements rendered inline by default.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "code", "em", "i", "img", "label", "mark", "small", "span", "strong",
    "sub", "sup", "u", "video", "svg",
];

/// Headless surface over a parsed document.
#[derive(Debug, Clone)]
pub struct MarkupSurface {
    id: SurfaceId,
    doc: Document,
    order: Vec<NodeId>,
    measured: HashMap<NodeId, Rect>,
    media_sizes: HashMap<String, Size>,
    pending_frames: u32,
    focused: Option<NodeId>,
    text_selected: bool,
}

impl MarkupSurface {
    /// Parse markup into a new surface with a fresh id.
    #[must_use]
    pub fn parse(markup: &str) -> Self {
        let doc = Document::parse(markup);
        let order = doc.elements();
        Self {
            id: SurfaceId::new(),
            doc,
            order,
            measured: HashMap::new(),
            media_sizes: HashMap::new(),
            pending_frames: 0,
            focused: None,
            text_selected: false,
        }
    }

    /// Register the intrinsic size of a media URL.
    #[must_use]
    pub fn with_media_size(mut self, url: impl Into<String>, size: Size) -> Self {
        self.media_sizes.insert(url.into(), size);
        self
    }

    /// Register intrinsic sizes for several URLs.
    pub fn register_media_sizes<I, S>(&mut self, sizes: I)
    where
        I: IntoIterator<Item = (S, Size)>,
        S: Into<String>,
    {
        self.media_sizes
            .extend(sizes.into_iter().map(|(url, size)| (url.into(), size)));
    }

    /// Report empty boxes until `frames` frame ticks have passed.
    #[must_use]
    pub fn settle_after_frames(mut self, frames: u32) -> Self {
        self.pending_frames = frames;
        self
    }

    /// Whether layout has settled.
    #[must_use]
    pub fn layout_settled(&self) -> bool {
        self.pending_frames == 0
    }

    /// Override the measured box of an element.
    pub fn set_rect(&mut self, node: NodeIndex, rect: Rect) {
        if let Some(id) = self.resolve(node) {
            self.measured.insert(id, rect);
        }
    }

    /// Whether the last focus call selected the element's whole text.
    #[must_use]
    pub fn text_selected(&self) -> bool {
        self.text_selected
    }

    fn resolve(&self, node: NodeIndex) -> Option<NodeId> {
        self.order.get(node.0).copied()
    }

    fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.order.iter().position(|n| *n == id).map(NodeIndex)
    }

    fn inline(&self, id: NodeId) -> InlineStyle {
        InlineStyle::parse(self.doc.attr(id, "style").unwrap_or_default())
    }

    fn is_inline_tag(&self, id: NodeId) -> bool {
        self.doc.tag(id).is_some_and(|t| INLINE_TAGS.contains(&t))
    }

    fn layout(&self, id: NodeId) -> Rect {
        if let Some(rect) = self.measured.get(&id) {
            return *rect;
        }
        let parent = self
            .doc
            .parent_element(id)
            .map(|p| self.layout(p))
            .unwrap_or_default();
        let style = self.inline(id);

        let width = style
            .get("width")
            .and_then(|v| resolve_length(v, parent.width))
            .or_else(|| self.doc.attr(id, "width").and_then(parse_px))
            .unwrap_or_else(|| {
                if self.is_inline_tag(id) {
                    0.0
                } else {
                    parent.width
                }
            });
        let height = style
            .get("height")
            .and_then(|v| resolve_length(v, parent.height))
            .or_else(|| self.doc.attr(id, "height").and_then(parse_px))
            .unwrap_or(0.0);
        let left = style
            .get("left")
            .and_then(|v| resolve_length(v, parent.width))
            .unwrap_or(0.0);
        let top = style
            .get("top")
            .and_then(|v| resolve_length(v, parent.height))
            .unwrap_or(0.0);

        Rect::new(parent.x + left, parent.y + top, width, height)
    }

    fn media_source(&self, id: NodeId) -> Option<String> {
        match self.doc.tag(id)? {
            "img" => self.doc.attr(id, "src").map(str::to_string),
            "video" => self
                .doc
                .attr(id, "src")
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .or_else(|| {
                    self.doc
                        .child_elements(id)
                        .into_iter()
                        .filter(|c| self.doc.tag(*c) == Some("source"))
                        .find_map(|c| self.doc.attr(c, "src").map(str::to_string))
                }),
            _ => self
                .computed(id, "background-image")
                .and_then(|v| extract_url(&v)),
        }
    }

    fn computed(&self, id: NodeId, property: &str) -> Option<String> {
        let property = property.to_ascii_lowercase();
        let style = self.inline(id);
        if let Some(value) = style.get(&property) {
            return Some(value.to_string());
        }
        if property == "background-image" {
            if let Some(url) = style.get("background").and_then(extract_url) {
                return Some(css_url(&url));
            }
        }
        if INHERITED.contains(&property.as_str()) {
            let mut current = self.doc.parent_element(id);
            while let Some(parent) = current {
                if let Some(value) = self.inline(parent).get(&property) {
                    return Some(value.to_string());
                }
                current = self.doc.parent_element(parent);
            }
            return None;
        }
        match property.as_str() {
            "display" => Some(if self.is_inline_tag(id) { "inline" } else { "block" }.to_string()),
            "object-position" => Some("50% 50%".to_string()),
            "background-position" => Some("0% 0%".to_string()),
            "object-fit" => Some("fill".to_string()),
            "background-size" => Some("auto".to_string()),
            "background-image" => Some("none".to_string()),
            _ => None,
        }
    }

    fn write_inline(&mut self, id: NodeId, style: &InlineStyle) {
        if style.is_empty() {
            self.doc.remove_attr(id, "style");
        } else {
            self.doc.set_attr(id, "style", &style.to_string());
        }
    }
}

fn resolve_length(value: &str, reference: f64) -> Option<f64> {
    let value = value.trim();
    if let Some(percent) = value.strip_suffix('%') {
        return percent
            .trim()
            .parse::<f64>()
            .ok()
            .map(|p| reference * p / 100.0);
    }
    parse_px(value)
}

impl RenderSurface for MarkupSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn element_count(&self) -> usize {
        self.order.len()
    }

    fn tag_name(&self, node: NodeIndex) -> Option<String> {
        self.resolve(node)
            .and_then(|id| self.doc.tag(id))
            .map(str::to_string)
    }

    fn attribute(&self, node: NodeIndex, name: &str) -> Option<String> {
        self.resolve(node)
            .and_then(|id| self.doc.attr(id, name))
            .map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeIndex, name: &str, value: &str) {
        if let Some(id) = self.resolve(node) {
            self.doc.set_attr(id, name, value);
        }
    }

    fn remove_attribute(&mut self, node: NodeIndex, name: &str) {
        if let Some(id) = self.resolve(node) {
            self.doc.remove_attr(id, name);
        }
    }

    fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        let id = self.resolve(node)?;
        self.doc
            .parent_element(id)
            .and_then(|p| self.index_of(p))
    }

    fn computed_style(&self, node: NodeIndex, property: &str) -> Option<String> {
        self.resolve(node).and_then(|id| self.computed(id, property))
    }

    fn inline_style(&self, node: NodeIndex, property: &str) -> Option<String> {
        let id = self.resolve(node)?;
        self.inline(id).get(property).map(str::to_string)
    }

    fn set_style(&mut self, node: NodeIndex, property: &str, value: &str) {
        if let Some(id) = self.resolve(node) {
            let mut style = self.inline(id);
            style.set(property, value);
            self.write_inline(id, &style);
        }
    }

    fn remove_style(&mut self, node: NodeIndex, property: &str) {
        if let Some(id) = self.resolve(node) {
            let mut style = self.inline(id);
            if style.remove(property) {
                self.write_inline(id, &style);
            }
        }
    }

    fn rect(&self, node: NodeIndex) -> Rect {
        if self.pending_frames > 0 {
            return Rect::default();
        }
        self.resolve(node)
            .map(|id| self.layout(id))
            .unwrap_or_default()
    }

    fn natural_size(&self, node: NodeIndex) -> Size {
        let Some(id) = self.resolve(node) else {
            return Size::default();
        };
        if let Some(size) = self
            .media_source(id)
            .and_then(|src| self.media_sizes.get(&src).copied())
        {
            return size;
        }
        let attr_size = |name: &str| {
            self.doc
                .attr(id, &format!("data-natural-{name}"))
                .and_then(parse_px)
        };
        match (attr_size("width"), attr_size("height")) {
            (Some(w), Some(h)) => Size::new(w, h),
            _ => Size::default(),
        }
    }

    fn text_content(&self, node: NodeIndex) -> String {
        self.resolve(node)
            .map(|id| self.doc.text_content(id))
            .unwrap_or_default()
    }

    fn set_text_content(&mut self, node: NodeIndex, text: &str) {
        if let Some(id) = self.resolve(node) {
            self.doc.set_text_content(id, text);
            self.order = self.doc.elements();
            self.measured.retain(|k, _| self.order.contains(k));
        }
    }

    fn focus(&mut self, node: NodeIndex, select_all: bool) {
        self.focused = self.resolve(node);
        self.text_selected = select_all && self.focused.is_some();
    }

    fn focused(&self) -> Option<NodeIndex> {
        self.focused.and_then(|id| self.index_of(id))
    }

    fn markup(&self) -> String {
        self.doc.to_html()
    }

    fn on_frame(&mut self) {
        self.pending_frames = self.pending_frames.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<div class="slide" style="width: 1080px; height: 1350px">
<div class="hero" style="left: 40px; top: 60px; width: 50%; height: 400px; background: url('bg.jpg') center / cover"></div>
<img src="photo.jpg" width="300" height="200">
<h1 style="font-size: 64px; color: #fff"><span>Title</span></h1>
</div>"#;

    #[test]
    fn test_layout_from_inline_styles() {
        let surface = MarkupSurface::parse(SLIDE);
        let hero = NodeIndex(1);
        assert_eq!(surface.rect(hero), Rect::new(40.0, 60.0, 540.0, 400.0));

        let img = NodeIndex(2);
        assert_eq!(surface.rect(img).size(), Size::new(300.0, 200.0));
    }

    #[test]
    fn test_layout_pending_until_frames_pass() {
        let mut surface = MarkupSurface::parse(SLIDE).settle_after_frames(2);
        assert!(surface.rect(NodeIndex(0)).is_empty());
        surface.on_frame();
        assert!(surface.rect(NodeIndex(0)).is_empty());
        surface.on_frame();
        assert_eq!(surface.rect(NodeIndex(0)).size(), Size::new(1080.0, 1350.0));
    }

    #[test]
    fn test_computed_style_inherits_and_expands_shorthand() {
        let surface = MarkupSurface::parse(SLIDE);
        let span = NodeIndex(4);
        assert_eq!(surface.computed_style(span, "font-size").as_deref(), Some("64px"));
        assert_eq!(surface.computed_style(span, "color").as_deref(), Some("#fff"));
        assert_eq!(surface.computed_style(span, "display").as_deref(), Some("inline"));

        let hero = NodeIndex(1);
        assert_eq!(
            surface.computed_style(hero, "background-image").as_deref(),
            Some("url(\"bg.jpg\")")
        );
        assert_eq!(
            surface.computed_style(NodeIndex(2), "object-position").as_deref(),
            Some("50% 50%")
        );
    }

    #[test]
    fn test_natural_size_lookup() {
        let surface = MarkupSurface::parse(SLIDE)
            .with_media_size("bg.jpg", Size::new(1600.0, 900.0))
            .with_media_size("photo.jpg", Size::new(800.0, 600.0));
        assert_eq!(surface.natural_size(NodeIndex(1)), Size::new(1600.0, 900.0));
        assert_eq!(surface.natural_size(NodeIndex(2)), Size::new(800.0, 600.0));
        assert!(surface.natural_size(NodeIndex(3)).is_empty());
    }

    #[test]
    fn test_style_writes_go_inline() {
        let mut surface = MarkupSurface::parse("<img src=\"a.png\">");
        surface.set_style(NodeIndex(0), "object-position", "10% 20%");
        assert_eq!(
            surface.inline_style(NodeIndex(0), "object-position").as_deref(),
            Some("10% 20%")
        );
        surface.remove_style(NodeIndex(0), "object-position");
        assert_eq!(surface.markup(), "<img src=\"a.png\">");
    }

    #[test]
    fn test_text_replacement_and_focus() {
        let mut surface = MarkupSurface::parse("<h1><span>Old</span></h1><p>x</p>");
        surface.focus(NodeIndex(1), true);
        assert_eq!(surface.focused(), Some(NodeIndex(1)));
        assert!(surface.text_selected());

        surface.set_text_content(NodeIndex(0), "New");
        assert_eq!(surface.element_count(), 2);
        assert_eq!(surface.text_content(NodeIndex(0)), "New");
        assert_eq!(surface.tag_name(NodeIndex(1)).as_deref(), Some("p"));
        assert_eq!(surface.focused(), None);
    }
}
