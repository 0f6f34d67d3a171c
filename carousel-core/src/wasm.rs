//! WebAssembly bindings for carousel-core.
//!
//! [`DomSurface`] implements [`RenderSurface`] over the document of a slide
//! iframe, and [`WasmEditor`] exposes the editor to JavaScript. Structured
//! values cross the boundary as JSON strings.

use std::collections::HashMap;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement, HtmlVideoElement};

use crate::editor::CarouselEditor;
use crate::edits::{Field, StyleProperty};
use crate::element::ElementKind;
use crate::event::InputEvent;
use crate::geometry::{Rect, Size};
use crate::slide::SlideContent;
use crate::style::parse_px;
use crate::surface::{NodeIndex, RenderSurface, SurfaceId};
use crate::EngineConfig;

/// Initialize the carousel WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Render surface backed by a live browser document.
pub struct DomSurface {
    id: SurfaceId,
    document: Document,
    media_sizes: HashMap<String, Size>,
}

impl DomSurface {
    /// Wrap a slide document. Every call mints a new surface identity.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            id: SurfaceId::new(),
            document,
            media_sizes: HashMap::new(),
        }
    }

    /// Register the intrinsic size of a background image URL.
    pub fn register_media_size(&mut self, url: impl Into<String>, size: Size) {
        self.media_sizes.insert(url.into(), size);
    }

    fn all(&self) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all("*") else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn element(&self, node: NodeIndex) -> Option<Element> {
        let list = self.document.query_selector_all("*").ok()?;
        let index = u32::try_from(node.0).ok()?;
        list.item(index)?.dyn_into::<Element>().ok()
    }

    fn html(&self, node: NodeIndex) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn index_of(&self, element: &Element) -> Option<NodeIndex> {
        self.all()
            .iter()
            .position(|e| e == element)
            .map(NodeIndex)
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn log_js_error(action: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        tracing::debug!("{action} failed: {err:?}");
    }
}

impl RenderSurface for DomSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn element_count(&self) -> usize {
        self.document
            .query_selector_all("*")
            .map_or(0, |list| list.length() as usize)
    }

    fn tag_name(&self, node: NodeIndex) -> Option<String> {
        self.element(node).map(|e| e.tag_name().to_ascii_lowercase())
    }

    fn attribute(&self, node: NodeIndex, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn set_attribute(&mut self, node: NodeIndex, name: &str, value: &str) {
        if let Some(element) = self.element(node) {
            log_js_error("setAttribute", element.set_attribute(name, value));
        }
    }

    fn remove_attribute(&mut self, node: NodeIndex, name: &str) {
        if let Some(element) = self.element(node) {
            log_js_error("removeAttribute", element.remove_attribute(name));
        }
    }

    fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        let parent = self.element(node)?.parent_element()?;
        self.index_of(&parent)
    }

    fn computed_style(&self, node: NodeIndex, property: &str) -> Option<String> {
        let element = self.element(node)?;
        let window = self.document.default_view()?;
        let style = window.get_computed_style(&element).ok()??;
        style.get_property_value(property).ok().and_then(non_empty)
    }

    fn inline_style(&self, node: NodeIndex, property: &str) -> Option<String> {
        self.html(node)?
            .style()
            .get_property_value(property)
            .ok()
            .and_then(non_empty)
    }

    fn set_style(&mut self, node: NodeIndex, property: &str, value: &str) {
        if let Some(element) = self.html(node) {
            log_js_error("setProperty", element.style().set_property(property, value));
        }
    }

    fn remove_style(&mut self, node: NodeIndex, property: &str) {
        if let Some(element) = self.html(node) {
            log_js_error(
                "removeProperty",
                element.style().remove_property(property).map(|_| ()),
            );
        }
    }

    fn rect(&self, node: NodeIndex) -> Rect {
        self.element(node).map_or_else(Rect::default, |element| {
            let r = element.get_bounding_client_rect();
            Rect::new(r.x(), r.y(), r.width(), r.height())
        })
    }

    fn natural_size(&self, node: NodeIndex) -> Size {
        let Some(element) = self.element(node) else {
            return Size::default();
        };
        if let Some(img) = element.dyn_ref::<HtmlImageElement>() {
            return Size::new(f64::from(img.natural_width()), f64::from(img.natural_height()));
        }
        if let Some(video) = element.dyn_ref::<HtmlVideoElement>() {
            return Size::new(f64::from(video.video_width()), f64::from(video.video_height()));
        }
        let registered = self
            .computed_style(node, "background-image")
            .and_then(|v| crate::style::extract_url(&v))
            .and_then(|url| self.media_sizes.get(&url).copied());
        if let Some(size) = registered {
            return size;
        }
        let attr = |name: &str| {
            element
                .get_attribute(&format!("data-natural-{name}"))
                .and_then(|v| parse_px(&v))
        };
        match (attr("width"), attr("height")) {
            (Some(w), Some(h)) => Size::new(w, h),
            _ => Size::default(),
        }
    }

    fn text_content(&self, node: NodeIndex) -> String {
        self.element(node)
            .and_then(|e| e.text_content())
            .unwrap_or_default()
    }

    fn set_text_content(&mut self, node: NodeIndex, text: &str) {
        if let Some(element) = self.element(node) {
            element.set_text_content(Some(text));
        }
    }

    fn focus(&mut self, node: NodeIndex, select_all: bool) {
        let Some(element) = self.html(node) else {
            return;
        };
        log_js_error("focus", element.focus());
        if !select_all {
            return;
        }
        let Some(window) = self.document.default_view() else {
            return;
        };
        let (Ok(Some(selection)), Ok(range)) = (window.get_selection(), self.document.create_range())
        else {
            return;
        };
        log_js_error("selectNodeContents", range.select_node_contents(&element));
        log_js_error("removeAllRanges", selection.remove_all_ranges());
        log_js_error("addRange", selection.add_range(&range));
    }

    fn focused(&self) -> Option<NodeIndex> {
        let active = self.document.active_element()?;
        self.index_of(&active)
    }

    fn markup(&self) -> String {
        self.document
            .document_element()
            .map(|root| format!("<!DOCTYPE html>\n{}", root.outer_html()))
            .unwrap_or_default()
    }
}

/// Carousel editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: CarouselEditor,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor. `config_json` may be empty for defaults.
    ///
    /// # Errors
    ///
    /// Returns an error string if the configuration is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmEditor, String> {
        let config = if config_json.trim().is_empty() {
            EngineConfig::default()
        } else {
            EngineConfig::from_json_str(config_json).map_err(|e| e.to_string())?
        };
        let editor = CarouselEditor::new(config).map_err(|e| e.to_string())?;
        Ok(Self { editor })
    }

    /// Render a deck from a JSON array of templates and a JSON array of rows.
    ///
    /// # Errors
    ///
    /// Returns an error string if either JSON value is malformed.
    #[wasm_bindgen(js_name = loadDeck)]
    pub fn load_deck(&mut self, templates_json: &str, rows_json: &str) -> Result<usize, String> {
        let templates: Vec<String> =
            serde_json::from_str(templates_json).map_err(|e| e.to_string())?;
        let rows: Vec<SlideContent> = serde_json::from_str(rows_json).map_err(|e| e.to_string())?;
        Ok(self.editor.load_deck(&templates, &rows))
    }

    /// Augmented markup to load into a slide's iframe.
    #[wasm_bindgen(js_name = slideMarkup)]
    #[must_use]
    pub fn slide_markup(&self, index: usize) -> Option<String> {
        self.editor.slide(index).map(|s| s.augmented().to_string())
    }

    /// Attach a slide iframe's document. Returns the mount report as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown slide.
    #[wasm_bindgen(js_name = mountSlide)]
    pub fn mount_slide(&mut self, index: usize, document: Document) -> Result<String, String> {
        let report = self
            .editor
            .mount_slide(index, Box::new(DomSurface::new(document)))
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&report).map_err(|e| e.to_string())
    }

    /// Detach a slide's document.
    #[wasm_bindgen(js_name = unmountSlide)]
    pub fn unmount_slide(&mut self, index: usize) -> bool {
        self.editor.unmount_slide(index)
    }

    /// Route an input event given as JSON. Returns the outcome as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the event JSON is malformed.
    #[wasm_bindgen(js_name = handleEvent)]
    pub fn handle_event(&mut self, event_json: &str) -> Result<String, String> {
        let event: InputEvent = serde_json::from_str(event_json).map_err(|e| e.to_string())?;
        let outcome = self.editor.handle_event(&event);
        serde_json::to_string(&outcome).map_err(|e| e.to_string())
    }

    /// Advance one animation frame.
    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(&mut self) {
        self.editor.on_frame();
    }

    /// Select an element kind (or just the slide when `kind` is absent).
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown slide or kind.
    pub fn select(&mut self, slide: usize, kind: Option<String>) -> Result<bool, String> {
        let kind = kind.as_deref().map(parse_kind).transpose()?;
        self.editor.select(slide, kind).map_err(|e| e.to_string())
    }

    /// Drop the selection.
    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.editor.clear_selection();
    }

    /// The current selection as JSON (`null` when empty).
    #[wasm_bindgen(js_name = getSelectionJson)]
    #[must_use]
    pub fn get_selection_json(&self) -> String {
        serde_json::to_string(&self.editor.selection()).unwrap_or_default()
    }

    /// Record a text or media value. `field_json` is a serialized field,
    /// e.g. `{"field":"title"}`.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown slide or malformed field.
    #[wasm_bindgen(js_name = updateEditedValue)]
    pub fn update_edited_value(
        &mut self,
        slide: usize,
        field_json: &str,
        value: &str,
    ) -> Result<(), String> {
        let field: Field = serde_json::from_str(field_json).map_err(|e| e.to_string())?;
        self.editor
            .update_edited_value(slide, field, value)
            .map_err(|e| e.to_string())
    }

    /// Override a text style property.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown slide, kind or property.
    #[wasm_bindgen(js_name = updateElementStyle)]
    pub fn update_element_style(
        &mut self,
        slide: usize,
        kind: &str,
        property: &str,
        value: &str,
    ) -> Result<bool, String> {
        let kind = parse_kind(kind)?;
        let property = StyleProperty::parse(property)
            .ok_or_else(|| format!("unknown style property: {property}"))?;
        self.editor
            .update_element_style(slide, kind, property, value)
            .map_err(|e| e.to_string())
    }

    /// Resolved text style as JSON, or `None` for media kinds.
    #[wasm_bindgen(js_name = getResolvedStyleJson)]
    #[must_use]
    pub fn get_resolved_style_json(&self, slide: usize, kind: &str) -> Option<String> {
        let kind = ElementKind::parse(kind)?;
        let style = self.editor.resolved_style(slide, kind)?;
        serde_json::to_string(&style).ok()
    }

    /// Replace media on a slide. Returns the outcome as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown slide.
    #[wasm_bindgen(js_name = replaceMedia)]
    pub fn replace_media(&mut self, slide: usize, url: &str) -> Result<String, String> {
        let outcome = self
            .editor
            .replace_media(slide, url)
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&outcome).map_err(|e| e.to_string())
    }

    /// Every slide as a standalone document, as a JSON array.
    #[wasm_bindgen(js_name = downloadAll)]
    #[must_use]
    pub fn download_all(&self) -> String {
        serde_json::to_string(&self.editor.download_all()).unwrap_or_default()
    }
}

fn parse_kind(kind: &str) -> Result<ElementKind, String> {
    ElementKind::parse(kind).ok_or_else(|| format!("unknown element kind: {kind}"))
}
