//! Heuristic discovery of editable elements.
//!
//! Templates are arbitrary markup the editor did not author. Discovery never
//! fails: anything that does not match a heuristic is simply not editable.
//!
//! Text is found before mounting by [`augment_markup`], which wraps the
//! literal title/subtitle runs in marker spans. Media and backgrounds are
//! found after mounting by [`discover`], which queries the surface.

use std::collections::HashSet;
use std::ops::Range;

use tracing::debug;

use crate::config::EngineConfig;
use crate::element::{
    EditableElement, ElementKind, ElementRef, EDITABLE_ATTR, ID_ATTR, LINE_ATTR, PROTECTED_ATTR,
};
use crate::protection::MediaGuard;
use crate::style::extract_url;
use crate::surface::{NodeIndex, RenderSurface};

/// Elements whose content is never searched for text.
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

/// Pattern matched between words of a text literal.
const WHITESPACE: &str = r"(?:\s|&nbsp;|&#0*160;|&#x0*a0;)+";

/// The text a slide was rendered with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideText {
    /// Title text; newlines separate lines.
    pub title: String,
    /// Subtitle text; newlines separate lines.
    pub subtitle: String,
}

impl SlideText {
    /// Create slide text.
    #[must_use]
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
        }
    }
}

struct Literal<'a> {
    kind: ElementKind,
    line: usize,
    text: &'a str,
}

struct Claim {
    range: Range<usize>,
    kind: ElementKind,
    line: usize,
}

/// Wrap the title and subtitle text runs of rendered markup in marker spans.
///
/// Each non-empty line of each field is matched case-insensitively, with any
/// run of whitespace matching any other and HTML entities matching the
/// characters they encode. Only text content is searched, never tags,
/// comments or raw-text elements. The first unclaimed match of each line is
/// wrapped; longer lines claim text first. Lines that are not found are left
/// alone.
#[must_use]
pub fn augment_markup(markup: &str, text: &SlideText) -> String {
    let mut literals: Vec<Literal<'_>> = [
        (ElementKind::Title, text.title.as_str()),
        (ElementKind::Subtitle, text.subtitle.as_str()),
    ]
    .into_iter()
    .flat_map(|(kind, value)| {
        value.split('\n').enumerate().filter_map(move |(line, t)| {
            let t = t.trim();
            (!t.is_empty()).then_some(Literal {
                kind,
                line,
                text: t,
            })
        })
    })
    .collect();
    if literals.is_empty() {
        return markup.to_string();
    }
    literals.sort_by_key(|l| std::cmp::Reverse(l.text.chars().count()));

    let ranges = text_ranges(markup);
    let mut claims: Vec<Claim> = Vec::new();

    for literal in &literals {
        let Ok(re) = regex::Regex::new(&literal_pattern(literal.text)) else {
            continue;
        };
        let found = ranges.iter().find_map(|segment| {
            re.find_iter(&markup[segment.clone()])
                .map(|m| (segment.start + m.start())..(segment.start + m.end()))
                .find(|range| {
                    !claims
                        .iter()
                        .any(|c| c.range.start < range.end && range.start < c.range.end)
                })
        });
        match found {
            Some(range) => claims.push(Claim {
                range,
                kind: literal.kind,
                line: literal.line,
            }),
            None => debug!(
                kind = %literal.kind,
                line = literal.line,
                "Text line not found in markup"
            ),
        }
    }

    claims.sort_by_key(|c| c.range.start);
    let mut out = String::with_capacity(markup.len() + claims.len() * 64);
    let mut cursor = 0;
    for claim in &claims {
        out.push_str(&markup[cursor..claim.range.start]);
        out.push_str(&format!(
            "<span {EDITABLE_ATTR}=\"{}\" {LINE_ATTR}=\"{}\">",
            claim.kind, claim.line
        ));
        out.push_str(&markup[claim.range.clone()]);
        out.push_str("</span>");
        cursor = claim.range.end;
    }
    out.push_str(&markup[cursor..]);
    out
}

fn literal_pattern(text: &str) -> String {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| word.chars().map(char_pattern).collect())
        .collect();
    format!("(?i){}", words.join(WHITESPACE))
}

fn char_pattern(c: char) -> String {
    match c {
        '&' => "(?:&|&amp;|&#0*38;|&#x0*26;)".to_string(),
        '\'' => "(?:'|&apos;|&#0*39;|&#x0*27;)".to_string(),
        '"' => "(?:\"|&quot;|&#0*34;|&#x0*22;)".to_string(),
        '<' => "(?:<|&lt;|&#0*60;|&#x0*3c;)".to_string(),
        '>' => "(?:>|&gt;|&#0*62;|&#x0*3e;)".to_string(),
        other => regex::escape(other.encode_utf8(&mut [0; 4])),
    }
}

/// Byte ranges of markup that are text content.
fn text_ranges(markup: &str) -> Vec<Range<usize>> {
    let bytes = markup.as_bytes();
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut i = 0;

    let push = |ranges: &mut Vec<Range<usize>>, range: Range<usize>| {
        if !range.is_empty() {
            ranges.push(range);
        }
    };

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        if markup[i..].starts_with("<!--") {
            push(&mut ranges, start..i);
            i = markup[i + 4..]
                .find("-->")
                .map_or(bytes.len(), |p| i + 4 + p + 3);
            start = i;
            continue;
        }
        let next = bytes.get(i + 1).copied().unwrap_or(b' ');
        if !(next.is_ascii_alphabetic() || matches!(next, b'/' | b'!' | b'?')) {
            i += 1;
            continue;
        }

        push(&mut ranges, start..i);
        let end = tag_end(bytes, i);
        let name: String = markup[i + 1..end]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        let self_closing = markup[i..end].trim_end_matches('>').ends_with('/');
        i = end;
        if !self_closing && RAW_TEXT_TAGS.contains(&name.as_str()) {
            let close = format!("</{name}");
            i = markup[i..]
                .to_ascii_lowercase()
                .find(&close)
                .map_or(bytes.len(), |p| i + p);
        }
        start = i;
    }
    push(&mut ranges, start..bytes.len());
    ranges
}

/// Index just past the `>` closing the tag opened at `open`.
fn tag_end(bytes: &[u8], open: usize) -> usize {
    let mut quote: Option<u8> = None;
    for (offset, &b) in bytes[open..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return open + offset + 1,
            None => {}
        }
    }
    bytes.len()
}

/// Result of one discovery pass over a mounted surface.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Editable elements in document order.
    pub elements: Vec<EditableElement>,
    /// Some background candidates had no layout yet; retry after a frame.
    pub needs_layout: bool,
    nodes: Vec<NodeIndex>,
}

impl Discovery {
    /// Write identifiers and markers for every discovered element.
    ///
    /// Only this surface's elements are touched, and writing the same
    /// discovery twice is a no-op.
    pub fn apply_tags(&self, surface: &mut dyn RenderSurface) {
        for (node, element) in self.nodes.iter().zip(&self.elements) {
            if element.element.surface != surface.id() {
                continue;
            }
            if surface.attribute(*node, ID_ATTR).as_deref() != Some(element.node_id()) {
                surface.set_attribute(*node, ID_ATTR, element.node_id());
            }
            if surface.attribute(*node, EDITABLE_ATTR).as_deref() != Some(element.kind.as_str()) {
                surface.set_attribute(*node, EDITABLE_ATTR, element.kind.as_str());
            }
            if element.protected && surface.attribute(*node, PROTECTED_ATTR).is_none() {
                surface.set_attribute(*node, PROTECTED_ATTR, "");
            }
        }
    }

    /// Elements of one kind.
    pub fn of_kind(&self, kind: ElementKind) -> impl Iterator<Item = &EditableElement> {
        self.elements.iter().filter(move |e| e.kind == kind)
    }
}

/// Find the editable elements of a mounted surface.
///
/// Pure: nothing is written to the surface. Call [`Discovery::apply_tags`]
/// to make the identifiers visible.
#[must_use]
pub fn discover(
    surface: &dyn RenderSurface,
    guard: &dyn MediaGuard,
    config: &EngineConfig,
) -> Discovery {
    let mut discovery = Discovery::default();
    let mut ids = IdAllocator::new(surface);

    for node in (0..surface.element_count()).map(NodeIndex) {
        let Some(tag) = surface.tag_name(node) else {
            continue;
        };

        let (kind, source) = match tag.as_str() {
            "img" => (ElementKind::Image, surface.attribute(node, "src")),
            "video" => (ElementKind::Video, video_source(surface, node)),
            "span" => {
                if let Some(element) = text_marker(surface, node, &mut ids) {
                    discovery.nodes.push(node);
                    discovery.elements.push(element);
                }
                continue;
            }
            _ => match background_candidate(surface, node, config) {
                Candidate::Found(url) => (ElementKind::Background, Some(url)),
                Candidate::Pending => {
                    discovery.needs_layout = true;
                    continue;
                }
                Candidate::None => continue,
            },
        };

        let protected = surface.attribute(node, PROTECTED_ATTR).is_some()
            || source.as_deref().is_some_and(|s| guard.is_protected(s));
        let node_id = ids.claim(surface.attribute(node, ID_ATTR), kind, None);

        discovery.nodes.push(node);
        discovery.elements.push(EditableElement {
            element: ElementRef::new(surface.id(), node_id),
            kind,
            protected,
            line: None,
            source,
        });
    }

    debug!(
        surface = %surface.id(),
        elements = discovery.elements.len(),
        needs_layout = discovery.needs_layout,
        "Discovery pass finished"
    );
    discovery
}

/// Hands out stable identifiers, unique within one surface.
///
/// An identifier the template already carries is kept unless an earlier node
/// claimed it. Generated identifiers are `kind-ordinal` and skip every
/// identifier present anywhere on the surface.
struct IdAllocator {
    reserved: HashSet<String>,
    claimed: HashSet<String>,
    ordinals: [usize; 5],
}

impl IdAllocator {
    fn new(surface: &dyn RenderSurface) -> Self {
        let reserved = surface
            .all_with_attribute(ID_ATTR)
            .into_iter()
            .filter_map(|node| surface.attribute(node, ID_ATTR))
            .collect();
        Self {
            reserved,
            claimed: HashSet::new(),
            ordinals: [0; 5],
        }
    }

    fn claim(
        &mut self,
        existing: Option<String>,
        kind: ElementKind,
        preferred: Option<String>,
    ) -> String {
        if let Some(id) = existing {
            if self.claimed.insert(id.clone()) {
                return id;
            }
            debug!("Duplicate element id {id}, assigning a fresh one");
        }
        if let Some(id) = preferred {
            if !self.reserved.contains(&id) && self.claimed.insert(id.clone()) {
                return id;
            }
        }
        loop {
            let ordinal = &mut self.ordinals[kind as usize];
            let id = format!("{kind}-{ordinal}");
            *ordinal += 1;
            if !self.reserved.contains(&id) && self.claimed.insert(id.clone()) {
                return id;
            }
        }
    }
}

fn text_marker(
    surface: &dyn RenderSurface,
    node: NodeIndex,
    ids: &mut IdAllocator,
) -> Option<EditableElement> {
    let kind = surface
        .attribute(node, EDITABLE_ATTR)
        .and_then(|v| ElementKind::parse(&v))
        .filter(|k| k.is_text())?;
    let line = surface
        .attribute(node, LINE_ATTR)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let node_id = ids.claim(
        surface.attribute(node, ID_ATTR),
        kind,
        Some(format!("{kind}-{line}")),
    );
    Some(EditableElement {
        element: ElementRef::new(surface.id(), node_id),
        kind,
        protected: false,
        line: Some(line),
        source: None,
    })
}

fn video_source(surface: &dyn RenderSurface, node: NodeIndex) -> Option<String> {
    surface
        .attribute(node, "src")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            (0..surface.element_count())
                .map(NodeIndex)
                .filter(|&child| {
                    surface.parent(child) == Some(node)
                        && surface.tag_name(child).as_deref() == Some("source")
                })
                .find_map(|child| surface.attribute(child, "src"))
        })
}

enum Candidate {
    Found(String),
    Pending,
    None,
}

fn background_candidate(
    surface: &dyn RenderSurface,
    node: NodeIndex,
    config: &EngineConfig,
) -> Candidate {
    let display = surface
        .computed_style(node, "display")
        .unwrap_or_else(|| "block".to_string());
    if matches!(display.trim(), "inline" | "none" | "contents") {
        return Candidate::None;
    }
    let Some(url) = surface
        .computed_style(node, "background-image")
        .and_then(|v| extract_url(&v))
    else {
        return Candidate::None;
    };
    let rect = surface.rect(node);
    if rect.is_empty() {
        return Candidate::Pending;
    }
    if rect.area() < config.min_background_area {
        return Candidate::None;
    }
    Candidate::Found(url)
}

/// The element automatic media replacement targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LargestVisual {
    /// Image or background.
    pub kind: ElementKind,
    /// The winning element.
    pub element: ElementRef,
}

/// Pick the non-protected image or background with the largest rendered area.
///
/// The first element in document order wins ties. Elements without layout
/// are ignored.
#[must_use]
pub fn find_largest_visual(
    surface: &dyn RenderSurface,
    elements: &[EditableElement],
) -> Option<LargestVisual> {
    let mut best: Option<(f64, &EditableElement)> = None;
    for element in elements {
        if element.protected
            || !matches!(element.kind, ElementKind::Image | ElementKind::Background)
        {
            continue;
        }
        let Some(node) = element.element.locate(surface) else {
            continue;
        };
        let area = surface.rect(node).area();
        if area <= 0.0 {
            continue;
        }
        if best.map_or(true, |(best_area, _)| area > best_area) {
            best = Some((area, element));
        }
    }
    best.map(|(_, element)| LargestVisual {
        kind: element.kind,
        element: element.element.clone(),
    })
}
