//! Editable elements - the parts of a slide the operator can touch.

use serde::{Deserialize, Serialize};

use crate::surface::{NodeIndex, RenderSurface, SurfaceId};

/// Stable identifier attribute assigned during discovery.
pub const ID_ATTR: &str = "data-cs-id";
/// Marks an element as editable; the value is its [`ElementKind`].
pub const EDITABLE_ATTR: &str = "data-cs-editable";
/// Line number of a title/subtitle text marker.
pub const LINE_ATTR: &str = "data-cs-line";
/// Marks media the engine must never overwrite.
pub const PROTECTED_ATTR: &str = "data-cs-protected";
/// Highlight marker for the current selection.
pub const SELECTED_ATTR: &str = "data-cs-selected";
/// Set while a text marker is being edited in place.
pub const EDITING_ATTR: &str = "data-cs-editing";

/// What an editable element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Title text run.
    Title,
    /// Subtitle text run.
    Subtitle,
    /// An `<img>`.
    Image,
    /// A `<video>`.
    Video,
    /// A block container painted with a background image.
    Background,
}

impl ElementKind {
    /// Marker attribute value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Image => "image",
            Self::Video => "video",
            Self::Background => "background",
        }
    }

    /// Parse a marker attribute value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "subtitle" => Some(Self::Subtitle),
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "background" => Some(Self::Background),
            _ => None,
        }
    }

    /// Title or subtitle.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::Title | Self::Subtitle)
    }

    /// Image, video or background.
    #[must_use]
    pub const fn is_media(self) -> bool {
        !self.is_text()
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to an element inside one mounted surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    /// The surface mount the element belongs to.
    pub surface: SurfaceId,
    /// Value of the element's [`ID_ATTR`].
    pub node_id: String,
}

impl ElementRef {
    /// Create a reference.
    #[must_use]
    pub fn new(surface: SurfaceId, node_id: impl Into<String>) -> Self {
        Self {
            surface,
            node_id: node_id.into(),
        }
    }

    /// Find the element in `surface`, or `None` if the surface is a different
    /// mount or the element is gone.
    #[must_use]
    pub fn locate(&self, surface: &dyn RenderSurface) -> Option<NodeIndex> {
        if surface.id() != self.surface {
            return None;
        }
        surface.find_by_attribute(ID_ATTR, &self.node_id)
    }
}

/// An element discovery found in a mounted slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableElement {
    /// Where the element lives.
    pub element: ElementRef,
    /// What kind of element it is.
    pub kind: ElementKind,
    /// Excluded from replacement and dragging.
    pub protected: bool,
    /// Text marker line for titles/subtitles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Media source at discovery time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl EditableElement {
    /// Stable node identifier.
    #[must_use]
    pub fn node_id(&self) -> &str {
        &self.element.node_id
    }

    /// Whether the operator may drag, resize or retarget it.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        !self.protected
    }
}
