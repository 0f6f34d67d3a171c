//! Rendering surfaces.
//!
//! Each slide renders in its own isolated surface (an iframe in the browser,
//! a [`MarkupSurface`](crate::headless::MarkupSurface) headless). The engine
//! never owns a surface's layout or control flow; it only queries geometry
//! and style and writes attributes, inline styles and text back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Rect, Size};

/// Identity of one mounted surface.
///
/// A fresh id is minted for every mount, so anything holding the id of a
/// replaced surface can tell it is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    /// Create a new unique surface id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an element in a surface's document order.
///
/// Only valid for the surface it came from, and only until that surface's
/// element structure changes. Long-lived references use the stable
/// identifier attribute instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

/// Query/mutation interface over one rendered slide.
pub trait RenderSurface {
    /// This mount's identity.
    fn id(&self) -> SurfaceId;

    /// Number of elements, addressable as `NodeIndex(0..count)` in document order.
    fn element_count(&self) -> usize;

    /// Lowercased tag name.
    fn tag_name(&self, node: NodeIndex) -> Option<String>;

    /// Attribute value.
    fn attribute(&self, node: NodeIndex, name: &str) -> Option<String>;

    /// Set an attribute.
    fn set_attribute(&mut self, node: NodeIndex, name: &str, value: &str);

    /// Remove an attribute.
    fn remove_attribute(&mut self, node: NodeIndex, name: &str);

    /// Nearest ancestor element.
    fn parent(&self, node: NodeIndex) -> Option<NodeIndex>;

    /// Resolved value of a CSS property.
    fn computed_style(&self, node: NodeIndex, property: &str) -> Option<String>;

    /// Value of a property in the element's inline style only.
    fn inline_style(&self, node: NodeIndex, property: &str) -> Option<String>;

    /// Write a property into the element's inline style.
    fn set_style(&mut self, node: NodeIndex, property: &str, value: &str);

    /// Remove a property from the element's inline style.
    fn remove_style(&mut self, node: NodeIndex, property: &str);

    /// Rendered box. Empty until layout has settled.
    fn rect(&self, node: NodeIndex) -> Rect;

    /// Intrinsic size of the media the element shows (its image, video
    /// frame or background image). Empty while unknown.
    fn natural_size(&self, node: NodeIndex) -> Size;

    /// Text content.
    fn text_content(&self, node: NodeIndex) -> String;

    /// Replace the element's content with text.
    fn set_text_content(&mut self, node: NodeIndex, text: &str);

    /// Focus an element, optionally selecting all of its text.
    fn focus(&mut self, node: NodeIndex, select_all: bool);

    /// The currently focused element.
    fn focused(&self) -> Option<NodeIndex>;

    /// Serialize the surface's current document.
    fn markup(&self) -> String;

    /// Called once per animation frame by the host.
    fn on_frame(&mut self) {}

    /// First element whose attribute equals `value`.
    fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeIndex> {
        (0..self.element_count())
            .map(NodeIndex)
            .find(|&node| self.attribute(node, name).as_deref() == Some(value))
    }

    /// All elements carrying an attribute, in document order.
    fn all_with_attribute(&self, name: &str) -> Vec<NodeIndex> {
        (0..self.element_count())
            .map(NodeIndex)
            .filter(|&node| self.attribute(node, name).is_some())
            .collect()
    }
}

/// Mounted surfaces keyed by slide index.
pub type SurfaceMap = BTreeMap<usize, Box<dyn RenderSurface>>;
