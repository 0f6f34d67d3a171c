//! Operator edits that must survive slide remounts.
//!
//! Remounting a slide throws its surface away, so every edit the operator
//! makes is recorded here first and replayed onto each fresh surface. Each
//! write is a single map insert, so a commit is never half-applied.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::element::ElementKind;

/// What an edited value applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "lowercase")]
pub enum Field {
    /// Title text.
    Title,
    /// Subtitle text.
    Subtitle,
    /// Replacement media URL for one element.
    Media {
        /// Stable identifier of the media element.
        node_id: String,
    },
}

impl Field {
    /// The text field for a text element kind.
    #[must_use]
    pub const fn for_text(kind: ElementKind) -> Option<Self> {
        match kind {
            ElementKind::Title => Some(Self::Title),
            ElementKind::Subtitle => Some(Self::Subtitle),
            _ => None,
        }
    }

    /// The element kind a text field is rendered by.
    #[must_use]
    pub const fn text_kind(&self) -> Option<ElementKind> {
        match self {
            Self::Title => Some(ElementKind::Title),
            Self::Subtitle => Some(ElementKind::Subtitle),
            Self::Media { .. } => None,
        }
    }
}

/// Text style properties the property panel edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleProperty {
    /// `font-size`.
    FontSize,
    /// `font-weight`.
    FontWeight,
    /// `text-align`.
    TextAlign,
    /// `color`.
    Color,
}

impl StyleProperty {
    /// All properties, in panel order.
    pub const ALL: [Self; 4] = [
        Self::FontSize,
        Self::FontWeight,
        Self::TextAlign,
        Self::Color,
    ];

    /// CSS property name.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::FontSize => "font-size",
            Self::FontWeight => "font-weight",
            Self::TextAlign => "text-align",
            Self::Color => "color",
        }
    }

    /// Parse either the CSS name or the camelCase name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "font-size" | "fontSize" => Some(Self::FontSize),
            "font-weight" | "fontWeight" => Some(Self::FontWeight),
            "text-align" | "textAlign" => Some(Self::TextAlign),
            "color" => Some(Self::Color),
            _ => None,
        }
    }

    /// Normalize a panel value into a CSS value (bare font sizes become px).
    #[must_use]
    pub fn normalize(self, value: &str) -> String {
        let value = value.trim();
        match self {
            Self::FontSize if value.parse::<f64>().is_ok() => format!("{value}px"),
            _ => value.to_string(),
        }
    }
}

/// A fully resolved text style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// CSS `font-size`.
    pub font_size: String,
    /// CSS `font-weight`.
    pub font_weight: String,
    /// CSS `text-align`.
    pub text_align: String,
    /// CSS `color`.
    pub color: String,
}

impl TextStyle {
    /// Read one property.
    #[must_use]
    pub fn get(&self, property: StyleProperty) -> &str {
        match property {
            StyleProperty::FontSize => &self.font_size,
            StyleProperty::FontWeight => &self.font_weight,
            StyleProperty::TextAlign => &self.text_align,
            StyleProperty::Color => &self.color,
        }
    }
}

/// Partial text style: only what the operator changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleOverride {
    values: Vec<(StyleProperty, String)>,
}

impl StyleOverride {
    /// Read one overridden property.
    #[must_use]
    pub fn get(&self, property: StyleProperty) -> Option<&str> {
        self.values
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set one property.
    pub fn set(&mut self, property: StyleProperty, value: String) {
        match self.values.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.values.push((property, value)),
        }
    }

    /// Iterate overridden properties.
    pub fn iter(&self) -> impl Iterator<Item = (StyleProperty, &str)> {
        self.values.iter().map(|(p, v)| (*p, v.as_str()))
    }
}

/// `(slide, field) → edited text or replacement media URL`.
#[derive(Debug, Clone, Default)]
pub struct EditedContentMap {
    entries: HashMap<(usize, Field), String>,
}

impl EditedContentMap {
    /// Record an edited value, replacing any earlier one.
    pub fn insert(&mut self, slide: usize, field: Field, value: impl Into<String>) {
        self.entries.insert((slide, field), value.into());
    }

    /// Read an edited value.
    #[must_use]
    pub fn get(&self, slide: usize, field: &Field) -> Option<&str> {
        self.entries
            .get(&(slide, field.clone()))
            .map(String::as_str)
    }

    /// All edits for one slide, sorted by field for deterministic replay.
    #[must_use]
    pub fn for_slide(&self, slide: usize) -> Vec<(&Field, &str)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .filter(|((s, _), _)| *s == slide)
            .map(|((_, field), value)| (field, value.as_str()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// Number of recorded edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been edited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `(slide, text kind) → style override`.
#[derive(Debug, Clone, Default)]
pub struct StyleOverrideMap {
    entries: HashMap<(usize, ElementKind), StyleOverride>,
}

impl StyleOverrideMap {
    /// Set one property of one slide's text kind.
    pub fn set(&mut self, slide: usize, kind: ElementKind, property: StyleProperty, value: String) {
        self.entries
            .entry((slide, kind))
            .or_default()
            .set(property, value);
    }

    /// The override for a slide's text kind.
    #[must_use]
    pub fn get(&self, slide: usize, kind: ElementKind) -> Option<&StyleOverride> {
        self.entries.get(&(slide, kind))
    }

    /// All overrides for one slide, sorted by kind.
    #[must_use]
    pub fn for_slide(&self, slide: usize) -> Vec<(ElementKind, &StyleOverride)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .filter(|((s, _), _)| *s == slide)
            .map(|((_, kind), style)| (*kind, style))
            .collect();
        out.sort_by_key(|(kind, _)| *kind);
        out
    }
}

/// `(slide, node id) → inline declarations committed by drag gestures`.
#[derive(Debug, Clone, Default)]
pub struct PlacementMap {
    entries: HashMap<(usize, String), Vec<(String, String)>>,
}

impl PlacementMap {
    /// Merge committed declarations into a node's placement.
    pub fn commit(&mut self, slide: usize, node_id: &str, declarations: &[(String, String)]) {
        let slot = self
            .entries
            .entry((slide, node_id.to_string()))
            .or_default();
        for (property, value) in declarations {
            match slot.iter_mut().find(|(p, _)| p == property) {
                Some(existing) => existing.1.clone_from(value),
                None => slot.push((property.clone(), value.clone())),
            }
        }
    }

    /// Drop one committed declaration. A node left with none is forgotten.
    /// Returns whether anything was removed.
    pub fn remove_property(&mut self, slide: usize, node_id: &str, property: &str) -> bool {
        let key = (slide, node_id.to_string());
        let Some(slot) = self.entries.get_mut(&key) else {
            return false;
        };
        let before = slot.len();
        slot.retain(|(p, _)| p != property);
        let removed = slot.len() != before;
        if slot.is_empty() {
            self.entries.remove(&key);
        }
        removed
    }

    /// Committed declarations of one node.
    #[must_use]
    pub fn get(&self, slide: usize, node_id: &str) -> Option<&[(String, String)]> {
        self.entries
            .get(&(slide, node_id.to_string()))
            .map(Vec::as_slice)
    }

    /// All placements for one slide, sorted by node id.
    #[must_use]
    pub fn for_slide(&self, slide: usize) -> Vec<(&str, &[(String, String)])> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .filter(|((s, _), _)| *s == slide)
            .map(|((_, node), decls)| (node.as_str(), decls.as_slice()))
            .collect();
        out.sort_by_key(|(node, _)| *node);
        out
    }
}

/// Every map the remount re-sync replays.
#[derive(Debug, Clone, Default)]
pub struct EditStore {
    /// Edited text and replacement media.
    pub content: EditedContentMap,
    /// Text style overrides.
    pub styles: StyleOverrideMap,
    /// Committed drag placements.
    pub placements: PlacementMap,
}

impl EditStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
