//! Slides and the data they are rendered from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::discovery::{augment_markup, SlideText};
use crate::template::SlideRenderer;

/// One row of carousel data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideContent {
    /// Title text.
    #[serde(default)]
    pub title: String,
    /// Subtitle text.
    #[serde(default, alias = "description", alias = "body")]
    pub subtitle: String,
    /// Primary media URL.
    #[serde(
        default,
        alias = "image",
        alias = "image_url",
        alias = "media_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub media: Option<String>,
    /// Any other fields, available to templates by name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SlideContent {
    /// Content with a title and subtitle.
    #[must_use]
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            ..Self::default()
        }
    }

    /// Set the media URL.
    #[must_use]
    pub fn with_media(mut self, url: impl Into<String>) -> Self {
        self.media = Some(url.into());
        self
    }
}

/// A rendered slide.
///
/// Owned by the host; the engine only reads it. The augmented markup is
/// derived again whenever the content or template changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    /// Position in the deck.
    pub index: usize,
    template: String,
    content: SlideContent,
    markup: String,
    augmented: String,
}

impl Slide {
    /// Render a slide.
    #[must_use]
    pub fn render(
        index: usize,
        template: impl Into<String>,
        content: SlideContent,
        renderer: &dyn SlideRenderer,
    ) -> Self {
        let template = template.into();
        let markup = renderer.render_slide(&template, &content, index);
        Self::from_markup(index, template, content, markup)
    }

    /// Wrap markup that was already rendered elsewhere.
    #[must_use]
    pub fn from_markup(
        index: usize,
        template: impl Into<String>,
        content: SlideContent,
        markup: impl Into<String>,
    ) -> Self {
        let markup = markup.into();
        let augmented = augment_markup(&markup, &text_of(&content));
        Self {
            index,
            template: template.into(),
            content,
            markup,
            augmented,
        }
    }

    /// Raw template markup.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The data the slide was rendered from.
    #[must_use]
    pub fn content(&self) -> &SlideContent {
        &self.content
    }

    /// Rendered markup.
    #[must_use]
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Rendered markup with title/subtitle marker spans.
    #[must_use]
    pub fn augmented(&self) -> &str {
        &self.augmented
    }

    /// Title and subtitle as rendered.
    #[must_use]
    pub fn text(&self) -> SlideText {
        text_of(&self.content)
    }

    /// Re-render with new content.
    pub fn set_content(&mut self, content: SlideContent, renderer: &dyn SlideRenderer) {
        *self = Self::render(self.index, std::mem::take(&mut self.template), content, renderer);
    }

    /// Re-render with a new template.
    pub fn set_template(&mut self, template: impl Into<String>, renderer: &dyn SlideRenderer) {
        let content = std::mem::take(&mut self.content);
        *self = Self::render(self.index, template, content, renderer);
    }
}

fn text_of(content: &SlideContent) -> SlideText {
    SlideText::new(content.title.clone(), content.subtitle.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::PlaceholderRenderer;

    #[test]
    fn test_content_aliases() {
        let content: SlideContent = serde_json::from_str(
            r#"{"title": "T", "description": "D", "image_url": "u.jpg", "cta": "Buy"}"#,
        )
        .expect("content parses");
        assert_eq!(content.subtitle, "D");
        assert_eq!(content.media.as_deref(), Some("u.jpg"));
        assert_eq!(content.extra.get("cta"), Some(&Value::from("Buy")));
    }

    #[test]
    fn test_render_derives_augmented_markup() {
        let mut slide = Slide::render(
            0,
            "<h1>{{title}}</h1>",
            SlideContent::new("Hello", ""),
            &PlaceholderRenderer,
        );
        assert_eq!(slide.markup(), "<h1>Hello</h1>");
        assert!(slide.augmented().contains("data-cs-editable=\"title\""));

        slide.set_content(SlideContent::new("Bye", ""), &PlaceholderRenderer);
        assert_eq!(slide.markup(), "<h1>Bye</h1>");
        assert!(slide.augmented().contains(">Bye</span>"));

        slide.set_template("<h2>{{title}}</h2>", &PlaceholderRenderer);
        assert_eq!(slide.markup(), "<h2>Bye</h2>");
        assert_eq!(slide.content().title, "Bye");
    }
}
