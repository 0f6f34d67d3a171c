//! Tolerant markup tree.
//!
//! Slide markup comes from third-party templates and is never validated.
//! Tokens come from a `quick_xml` reader with end-name checks off; the tree
//! builder adds the HTML rules on top: void and raw-text elements, unmatched
//! close tags ignored, unclosed elements closed at end of input. Serialization
//! keeps the source's text and entity spelling so a parse/serialize cycle does
//! not rewrite the author's markup.

use std::borrow::Cow;
use std::fmt::Write as _;

use quick_xml::escape::{partial_escape, resolve_predefined_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Index of a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An attribute with a decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    pub name: String,
    /// Decoded value, `None` for bare boolean attributes.
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeData {
    Element {
        tag: String,
        attrs: Vec<Attribute>,
        self_closing: bool,
    },
    /// Text exactly as written in the source (entities not decoded).
    Text(String),
    /// Content of a raw-text element such as `<style>`.
    RawText(String),
    /// Comments, `<!DOCTYPE ...>`, `<?...?>` and CDATA, verbatim.
    Verbatim(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed markup document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Document {
    /// Parse markup. Never fails.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        TreeBuilder::new(source).run()
    }

    fn push(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// All element nodes in document order.
    #[must_use]
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if matches!(node.data, NodeData::Element { .. }) {
                out.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Lowercased tag name of an element.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    fn attrs(&self, id: NodeId) -> Option<&Vec<Attribute>> {
        match &self.nodes.get(id.0)?.data {
            NodeData::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    fn attrs_mut(&mut self, id: NodeId) -> Option<&mut Vec<Attribute>> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    /// Decoded attribute value. Bare attributes read as an empty string.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)?
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(attrs) = self.attrs_mut(id) else {
            return;
        };
        if let Some(attr) = attrs.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            attr.value = Some(value.to_string());
        } else {
            attrs.push(Attribute {
                name: name.to_ascii_lowercase(),
                value: Some(value.to_string()),
            });
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(attrs) = self.attrs_mut(id) {
            attrs.retain(|a| !a.name.eq_ignore_ascii_case(name));
        }
    }

    /// Nearest ancestor element.
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.nodes.get(id.0)?.parent;
        while let Some(p) = current {
            if matches!(self.nodes[p.0].data, NodeData::Element { .. }) {
                return Some(p);
            }
            current = self.nodes[p.0].parent;
        }
        None
    }

    /// Child element nodes.
    #[must_use]
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id.0)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| matches!(self.nodes[c.0].data, NodeData::Element { .. }))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Decoded text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(&decode_entities(text)),
            NodeData::RawText(text) => out.push_str(text),
            NodeData::Element { .. } => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
            NodeData::Verbatim(_) => {}
        }
    }

    /// Replace all children of an element with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if self.tag(id).is_none() {
            return;
        }
        let old = std::mem::take(&mut self.nodes[id.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            self.push(NodeData::Text(escape_text(text)), Some(id));
        }
    }

    /// Serialize the whole document.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            self.write_node(*root, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        match &node.data {
            NodeData::Text(text) | NodeData::RawText(text) => out.push_str(text),
            NodeData::Verbatim(raw) => out.push_str(raw),
            NodeData::Element {
                tag,
                attrs,
                self_closing,
            } => {
                out.push('<');
                out.push_str(tag);
                for attr in attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    if let Some(value) = &attr.value {
                        let _ = write!(out, "=\"{}\"", escape_attr(value));
                    }
                }
                if is_void(tag) {
                    out.push('>');
                    return;
                }
                if *self_closing && node.children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for child in &node.children {
                    self.write_node(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// Builds a [`Document`] from the events of a lenient `quick_xml` reader.
///
/// Every node keeps the exact source text it came from, so serialization
/// reproduces untouched markup byte for byte.
struct TreeBuilder<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
    /// Source offset of the reader's current slice.
    base: usize,
    doc: Document,
    stack: Vec<(NodeId, String)>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.allow_dangling_amp = true;
        Self {
            source,
            reader,
            base: 0,
            doc: Document::default(),
            stack: Vec::new(),
        }
    }

    fn position(&self) -> usize {
        usize::try_from(self.reader.buffer_position())
            .map_or(self.source.len(), |consumed| self.base + consumed)
            .min(self.source.len())
    }

    fn current_parent(&self) -> Option<NodeId> {
        self.stack.last().map(|(id, _)| *id)
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or_default()
    }

    fn run(mut self) -> Document {
        loop {
            let start = self.position();
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    tracing::trace!("Markup tokenizer stopped at byte {start}: {err}");
                    self.text(start, self.source.len());
                    break;
                }
            };
            let end = self.position();
            match event {
                Event::Eof => break,
                Event::Start(tag) => self.open(&tag, false, start, end),
                Event::Empty(tag) => self.open(&tag, true, start, end),
                Event::End(tag) => {
                    self.close(&String::from_utf8_lossy(tag.name().as_ref()).to_ascii_lowercase());
                }
                Event::Text(_) | Event::GeneralRef(_) => self.text(start, end),
                Event::Comment(_)
                | Event::CData(_)
                | Event::Decl(_)
                | Event::PI(_)
                | Event::DocType(_) => {
                    let raw = self.slice(start, end).to_string();
                    self.doc.push(NodeData::Verbatim(raw), self.current_parent());
                }
            }
        }
        self.doc
    }

    fn open(&mut self, tag: &BytesStart<'_>, empty: bool, start: usize, end: usize) {
        let name = String::from_utf8_lossy(tag.name().as_ref()).to_ascii_lowercase();
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            // Not a tag at all, e.g. a stray '<' in prose.
            self.text(start, end);
            return;
        }

        let mut attrs: Vec<Attribute> = Vec::new();
        let mut iter = tag.html_attributes();
        iter.with_checks(false);
        for attr in iter.map_while(Result::ok) {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
            if attrs.iter().any(|a| a.name == key) {
                continue;
            }
            let raw = String::from_utf8_lossy(&attr.value);
            attrs.push(Attribute {
                name: key,
                value: (!raw.is_empty()).then(|| decode_entities(&raw)),
            });
        }

        let id = self.doc.push(
            NodeData::Element {
                tag: name.clone(),
                attrs,
                self_closing: empty,
            },
            self.current_parent(),
        );
        if empty || is_void(&name) {
            return;
        }
        if is_raw_text(&name) {
            self.raw_text(id, &name, end);
        }
        self.stack.push((id, name));
    }

    /// Take everything up to the matching end tag as one text node, then
    /// resume the reader at that end tag.
    fn raw_text(&mut self, id: NodeId, tag: &str, from: usize) {
        let needle = format!("</{tag}");
        let close = self
            .slice(from, self.source.len())
            .to_ascii_lowercase()
            .find(&needle)
            .map_or(self.source.len(), |offset| from + offset);
        if close > from {
            let content = self.slice(from, close).to_string();
            self.doc.push(NodeData::RawText(content), Some(id));
        }
        let consumed = usize::try_from(self.reader.buffer_position()).unwrap_or_default();
        *self.reader.get_mut() = self.source.as_bytes().get(close..).unwrap_or_default();
        self.base = close.saturating_sub(consumed);
    }

    fn close(&mut self, name: &str) {
        if let Some(depth) = self.stack.iter().rposition(|(_, tag)| tag == name) {
            self.stack.truncate(depth);
        }
    }

    /// Append source text, merging with a preceding text node.
    fn text(&mut self, start: usize, end: usize) {
        let raw = self.slice(start, end);
        if raw.is_empty() {
            return;
        }
        let parent = self.current_parent();
        let last = match parent {
            Some(p) => self.doc.nodes[p.0].children.last().copied(),
            None => self.doc.roots.last().copied(),
        };
        if let Some(NodeData::Text(existing)) = last.map(|id| &mut self.doc.nodes[id.0].data) {
            existing.push_str(raw);
            return;
        }
        self.doc.push(NodeData::Text(raw.to_string()), parent);
    }
}

/// Decode character references and the named entities templates commonly
/// emit. Text with a malformed reference is returned unchanged.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    unescape_with(text, |entity| match entity {
        "nbsp" => Some("\u{a0}"),
        other => resolve_predefined_entity(other),
    })
    .map_or_else(|_| text.to_string(), Cow::into_owned)
}

/// Escape text for use as element content.
#[must_use]
pub fn escape_text(text: &str) -> String {
    partial_escape(text).into_owned()
}

/// Escape text for use inside a double-quoted attribute value.
#[must_use]
pub fn escape_attr(text: &str) -> String {
    text.replace('&', "&amp;").replace('"', "&quot;")
}
