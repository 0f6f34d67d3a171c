//! CSS value helpers.
//!
//! Just enough CSS to read and write the properties the engine touches:
//! inline declaration lists, pixel lengths, `url(...)` references and the
//! `object-position` / `background-position` grammar.

use std::fmt;
use std::sync::LazyLock;

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
};
use regex::Regex;

use crate::geometry::{offset_to_percent, Anchor, Size};

static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^)\s]*))\s*\)"#).expect("valid url regex")
});

/// An inline `style` attribute as an ordered declaration list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse a `style` attribute value.
    ///
    /// Declarations are split by the CSS tokenizer, so `url("a;b")` survives.
    /// Values keep their source spelling. Malformed declarations are dropped
    /// and a repeated property keeps its last value.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut input = ParserInput::new(source);
        let mut parser = Parser::new(&mut input);
        let mut declarations: Vec<(String, String)> = Vec::new();
        for item in RuleBodyParser::new(&mut parser, &mut DeclarationCollector) {
            match item {
                Ok((name, value)) => {
                    declarations.retain(|(existing, _)| *existing != name);
                    declarations.push((name, value));
                }
                Err((_, skipped)) => {
                    tracing::trace!("Dropping malformed declaration {skipped:?}");
                }
            }
        }
        Self { declarations }
    }

    /// Get a declared value.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, value)| value.as_str())
    }

    /// Set a declaration, replacing an existing one in place.
    pub fn set(&mut self, property: &str, value: &str) {
        let property = property.to_ascii_lowercase();
        if let Some(slot) = self
            .declarations
            .iter_mut()
            .find(|(name, _)| *name == property)
        {
            slot.1 = value.to_string();
        } else {
            self.declarations.push((property, value.to_string()));
        }
    }

    /// Remove a declaration. Returns whether one was present.
    pub fn remove(&mut self, property: &str) -> bool {
        let before = self.declarations.len();
        self.declarations
            .retain(|(name, _)| !name.eq_ignore_ascii_case(property));
        before != self.declarations.len()
    }

    /// Whether no declarations remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Iterate declarations in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}: {value};")?;
        }
        Ok(())
    }
}

/// Collects `name: value` pairs with the raw value text.
struct DeclarationCollector;

impl<'i> DeclarationParser<'i> for DeclarationCollector {
    type Declaration = (String, String);
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let value = input.slice_from(start).trim();
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok((name.to_ascii_lowercase(), value.to_string()))
    }
}

impl<'i> AtRuleParser<'i> for DeclarationCollector {
    type Prelude = ();
    type AtRule = (String, String);
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationCollector {
    type Prelude = ();
    type QualifiedRule = (String, String);
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, (String, String), ()> for DeclarationCollector {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Parse a pixel length such as `12px`, `12.5px` or a bare `12`.
#[must_use]
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Extract the first `url(...)` reference from a CSS value.
#[must_use]
pub fn extract_url(value: &str) -> Option<String> {
    let caps = CSS_URL_RE.captures(value)?;
    let url = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))?
        .as_str()
        .trim();
    (!url.is_empty()).then(|| url.to_string())
}

/// Format a URL as a quoted CSS `url(...)` value.
#[must_use]
pub fn css_url(url: &str) -> String {
    format!("url(\"{}\")", url.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Format a number for CSS output with at most four decimals.
#[must_use]
pub fn format_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let text = format!("{rounded:.4}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a pixel length.
#[must_use]
pub fn format_px(value: f64) -> String {
    format!("{}px", format_number(value))
}

/// Format an anchor as a two-value percentage position.
#[must_use]
pub fn format_anchor(anchor: Anchor) -> String {
    format!("{}% {}%", format_number(anchor.x), format_number(anchor.y))
}

/// One axis of a parsed position value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionComponent {
    /// A percentage anchor.
    Percent(f64),
    /// A pixel offset of the media's edge from the container's edge.
    Px(f64),
}

impl PositionComponent {
    fn resolve(self, overflow: f64, fallback: f64) -> f64 {
        match self {
            Self::Percent(p) => p,
            Self::Px(px) => offset_to_percent(px, overflow).unwrap_or(fallback),
        }
    }
}

/// A parsed `object-position` / `background-position` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Horizontal component.
    pub x: PositionComponent,
    /// Vertical component.
    pub y: PositionComponent,
}

impl Position {
    /// Resolve pixel components against the overflow of each axis.
    #[must_use]
    pub fn resolve(self, overflow: Size, fallback: Anchor) -> Anchor {
        Anchor::new(
            self.x.resolve(overflow.width, fallback.x),
            self.y.resolve(overflow.height, fallback.y),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Horizontal(f64),
    Vertical(f64),
    Center,
    Value(PositionComponent),
}

fn tokenize_position(word: &str) -> Option<Token> {
    match word.to_ascii_lowercase().as_str() {
        "left" => Some(Token::Horizontal(0.0)),
        "right" => Some(Token::Horizontal(100.0)),
        "top" => Some(Token::Vertical(0.0)),
        "bottom" => Some(Token::Vertical(100.0)),
        "center" => Some(Token::Center),
        other => {
            if let Some(percent) = other.strip_suffix('%') {
                percent
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|p| p.is_finite())
                    .map(|p| Token::Value(PositionComponent::Percent(p)))
            } else {
                parse_px(other).map(|px| Token::Value(PositionComponent::Px(px)))
            }
        }
    }
}

fn as_component(token: Token) -> PositionComponent {
    match token {
        Token::Horizontal(p) | Token::Vertical(p) => PositionComponent::Percent(p),
        Token::Center => PositionComponent::Percent(50.0),
        Token::Value(value) => value,
    }
}

/// Parse a one- or two-value CSS position.
///
/// Only the first layer of a comma-separated background list is read. Four
/// value edge-offset syntax is not supported and yields `None`, which callers
/// treat as "use the default anchor".
#[must_use]
pub fn parse_position(value: &str) -> Option<Position> {
    let first_layer = value.split(',').next()?.trim();
    let tokens: Vec<Token> = first_layer
        .split_whitespace()
        .map(tokenize_position)
        .collect::<Option<_>>()?;

    match tokens.as_slice() {
        [Token::Vertical(p)] => Some(Position {
            x: PositionComponent::Percent(50.0),
            y: PositionComponent::Percent(*p),
        }),
        [single] => Some(Position {
            x: as_component(*single),
            y: PositionComponent::Percent(50.0),
        }),
        [first, second] => {
            let swapped = matches!(first, Token::Vertical(_))
                || matches!(second, Token::Horizontal(_));
            let (x, y) = if swapped {
                (*second, *first)
            } else {
                (*first, *second)
            };
            if matches!(x, Token::Vertical(_)) || matches!(y, Token::Horizontal(_)) {
                return None;
            }
            Some(Position {
                x: as_component(x),
                y: as_component(y),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_style_parse_and_set() {
        let mut style = InlineStyle::parse(
            "width: 100px; background-image: url(\"a;b.png\"); ; broken; color:red",
        );
        assert_eq!(style.get("width"), Some("100px"));
        assert_eq!(style.get("background-image"), Some("url(\"a;b.png\")"));
        assert_eq!(style.get("COLOR"), Some("red"));

        style.set("width", "120px");
        style.set("object-position", "10% 20%");
        assert!(style.remove("color"));
        assert!(!style.remove("color"));
        assert_eq!(
            style.to_string(),
            "width: 120px; background-image: url(\"a;b.png\"); object-position: 10% 20%;"
        );
    }

    #[test]
    fn test_inline_style_keeps_source_spelling() {
        let style = InlineStyle::parse(
            "color: #FF0000 !important; /* note */ object-position: 75% 50%; width: 10px; width: 20px; margin",
        );
        assert_eq!(style.get("color"), Some("#FF0000 !important"));
        assert_eq!(style.get("object-position"), Some("75% 50%"));
        assert_eq!(style.get("width"), Some("20px"));
        assert_eq!(style.iter().count(), 3);
        assert_eq!(
            style.to_string(),
            "color: #FF0000 !important; object-position: 75% 50%; width: 20px;"
        );
        assert!(InlineStyle::parse("").is_empty());
        assert!(InlineStyle::parse("font-size:;").is_empty());
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("12px"), Some(12.0));
        assert_eq!(parse_px(" 12.5 "), Some(12.5));
        assert_eq!(parse_px("auto"), None);
    }

    #[test]
    fn test_extract_url_variants() {
        assert_eq!(
            extract_url("url(\"https://a.test/x.png\")").as_deref(),
            Some("https://a.test/x.png")
        );
        assert_eq!(
            extract_url("linear-gradient(red, blue), url('b.jpg') no-repeat").as_deref(),
            Some("b.jpg")
        );
        assert_eq!(extract_url("url(c.webp)").as_deref(), Some("c.webp"));
        assert_eq!(extract_url("none"), None);
        assert_eq!(extract_url("url()"), None);
    }

    #[test]
    fn test_css_url_escapes_quotes() {
        assert_eq!(css_url("a\"b.png"), "url(\"a\\\"b.png\")");
    }

    #[test]
    fn test_format_number_trims() {
        assert_eq!(format_number(25.0), "25");
        assert_eq!(format_number(33.333_333), "33.3333");
        assert_eq!(format_number(-0.000_01), "0");
        assert_eq!(format_px(50.5), "50.5px");
        assert_eq!(format_anchor(Anchor::new(12.5, 100.0)), "12.5% 100%");
    }

    #[test]
    fn test_parse_position_keywords() {
        let pos = parse_position("right bottom").expect("valid");
        assert_eq!(pos.x, PositionComponent::Percent(100.0));
        assert_eq!(pos.y, PositionComponent::Percent(100.0));

        let pos = parse_position("top").expect("valid");
        assert_eq!(pos.x, PositionComponent::Percent(50.0));
        assert_eq!(pos.y, PositionComponent::Percent(0.0));

        let pos = parse_position("bottom left").expect("valid");
        assert_eq!(pos.x, PositionComponent::Percent(0.0));
        assert_eq!(pos.y, PositionComponent::Percent(100.0));

        let pos = parse_position("center").expect("valid");
        assert_eq!(pos.x, PositionComponent::Percent(50.0));
        assert_eq!(pos.y, PositionComponent::Percent(50.0));
    }

    #[test]
    fn test_parse_position_lengths() {
        let pos = parse_position("30% -40px").expect("valid");
        assert_eq!(pos.x, PositionComponent::Percent(30.0));
        assert_eq!(pos.y, PositionComponent::Px(-40.0));

        let anchor = pos.resolve(Size::new(100.0, 80.0), Anchor::CENTER);
        assert!((anchor.x - 30.0).abs() < 1e-9);
        assert!((anchor.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_position_rejects_unsupported() {
        assert!(parse_position("left left").is_none());
        assert!(parse_position("right 10px bottom 20px").is_none());
        assert!(parse_position("inherit").is_none());
        assert!(parse_position("").is_none());
    }

    #[test]
    fn test_parse_position_first_layer_only() {
        let pos = parse_position("0% 100%, center").expect("valid");
        assert_eq!(pos.y, PositionComponent::Percent(100.0));
    }
}
