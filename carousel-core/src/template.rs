//! Slide rendering boundary.
//!
//! The engine treats rendered slides as opaque markup. [`SlideRenderer`] is
//! the seam a host plugs its template engine into; [`PlaceholderRenderer`]
//! handles the `{{ key }}` templates the generation service ships.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::markup::escape_text;
use crate::slide::SlideContent;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").expect("placeholder regex is valid")
});

/// Renders slide templates with slide data.
pub trait SlideRenderer {
    /// Render one slide. `index` is zero-based.
    fn render_slide(&self, template: &str, data: &SlideContent, index: usize) -> String;

    /// Render a whole deck. Templates are reused in order when there are
    /// fewer templates than rows; no templates renders nothing.
    fn render_all_slides(&self, templates: &[String], data: &[SlideContent]) -> Vec<String> {
        if templates.is_empty() {
            return Vec::new();
        }
        let count = data.len();
        data.iter()
            .enumerate()
            .map(|(index, row)| {
                let mut row = row.clone();
                row.extra
                    .entry("slide_count")
                    .or_insert_with(|| Value::from(count));
                self.render_slide(&templates[index % templates.len()], &row, index)
            })
            .collect()
    }
}

/// Substitutes `{{ key }}` placeholders with HTML-escaped values.
///
/// Known keys are `title`, `subtitle`, `media`, `slide_number` (one-based)
/// and `slide_count`; any other key is looked up in the row's extra fields,
/// following dots into nested objects. Unknown keys render empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl PlaceholderRenderer {
    fn lookup(data: &SlideContent, index: usize, key: &str) -> Option<String> {
        match key {
            "title" => Some(data.title.clone()),
            "subtitle" => Some(data.subtitle.clone()),
            "media" | "image" => data.media.clone(),
            "slide_number" => Some((index + 1).to_string()),
            _ => {
                let mut parts = key.split('.');
                let first = parts.next()?;
                let mut value = data.extra.get(first)?;
                for part in parts {
                    value = value.get(part)?;
                }
                scalar_text(value)
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl SlideRenderer for PlaceholderRenderer {
    fn render_slide(&self, template: &str, data: &SlideContent, index: usize) -> String {
        PLACEHOLDER_RE
            .replace_all(template, |caps: &Captures<'_>| {
                let value = Self::lookup(data, index, &caps[1]).unwrap_or_else(|| {
                    tracing::trace!("Unknown placeholder {}", &caps[1]);
                    String::new()
                });
                escape_text(&value).replace('"', "&quot;")
            })
            .into_owned()
    }
}
