//! Protected media predicates.
//!
//! Some media (brand avatars, logos) must survive every automatic
//! replacement. Which sources count as protected is pluggable: the default
//! [`PatternGuard`] matches configured regular expressions, and templates can
//! additionally mark elements with `data-cs-protected`.

use regex::Regex;

/// Decides whether a media source must never be overwritten.
pub trait MediaGuard {
    /// Whether `source` is protected.
    fn is_protected(&self, source: &str) -> bool;
}

impl<F> MediaGuard for F
where
    F: Fn(&str) -> bool,
{
    fn is_protected(&self, source: &str) -> bool {
        self(source)
    }
}

/// Guard that protects nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unprotected;

impl MediaGuard for Unprotected {
    fn is_protected(&self, _source: &str) -> bool {
        false
    }
}

/// Guard matching sources against regular expressions.
#[derive(Debug, Clone, Default)]
pub struct PatternGuard {
    patterns: Vec<Regex>,
}

impl PatternGuard {
    /// Compile a guard from pattern strings.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Number of compiled patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the guard has no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl MediaGuard for PatternGuard {
    fn is_protected(&self, source: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(source))
    }
}
