//! Paint attribute values (`fill`, `stroke`).
//!
//! ```text
//! paint    := "none" | "currentColor" | <color> | "url(" <iri> ")" [ <fallback> ]
//! fallback := "none" | "currentColor" | <color>
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::{parse_color, Color, ColorValue};
use crate::error::{PaintError, Result};

// ==================== IRI ====================

/// Reference to a document element, e.g. the `#grad` in `url(#grad)`.
///
/// Never empty. Local references store the fragment without the `#`.
/// Build one with [`Iri::parse`]; it serializes as its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iri {
    value: String,
    local: bool,
}

impl Iri {
    /// Parse the contents of `url(...)` or an `href` attribute.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.strip_prefix('#') {
            Some("") => Err(PaintError::malformed(format!("empty fragment in \"{s}\""))),
            Some(fragment) => Ok(Self::local(fragment)),
            None if s.is_empty() => Err(PaintError::malformed("empty IRI")),
            None => Ok(Self {
                value: s.to_string(),
                local: false,
            }),
        }
    }

    /// A same-document reference to the element with id `fragment`, which
    /// must not be empty.
    pub(crate) fn local(fragment: impl Into<String>) -> Self {
        let value = fragment.into();
        debug_assert!(!value.is_empty(), "local IRI with an empty fragment");
        Self { value, local: true }
    }

    /// Whether this names an element of the current document.
    pub fn is_local(&self) -> bool {
        self.local
    }

    /// The element id for local references, or the full IRI otherwise.
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl TryFrom<String> for Iri {
    type Error = PaintError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Iri> for String {
    fn from(iri: Iri) -> String {
        iri.to_string()
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.local {
            write!(f, "#{}", self.value)
        } else {
            f.write_str(&self.value)
        }
    }
}

// ==================== Paint ====================

/// What to paint when a referenced paint server cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackPaint {
    None,
    CurrentColor,
    Color(Color),
}

impl FallbackPaint {
    fn parse(s: &str) -> Result<Self> {
        if s == "none" {
            return Ok(FallbackPaint::None);
        }
        match parse_color(s)? {
            ColorValue::CurrentColor => Ok(FallbackPaint::CurrentColor),
            ColorValue::Rgba(color) => Ok(FallbackPaint::Color(color)),
        }
    }
}

impl fmt::Display for FallbackPaint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackPaint::None => f.write_str("none"),
            FallbackPaint::CurrentColor => f.write_str("currentColor"),
            FallbackPaint::Color(color) => color.fmt(f),
        }
    }
}

/// Unresolved paint value straight from a `fill` or `stroke` attribute.
///
/// `currentColor` stays symbolic until the paint is applied, since its value
/// depends on the element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaintSpec {
    /// `fill="none"`
    None,
    /// `fill="currentColor"`
    CurrentColor,
    /// `fill="blue"`
    Solid(Color),
    /// `fill="url(#gradient) blue"`
    Reference {
        iri: Iri,
        fallback: Option<FallbackPaint>,
    },
}

impl Default for PaintSpec {
    /// Initial value of `fill`.
    fn default() -> Self {
        PaintSpec::Solid(Color::BLACK)
    }
}

impl PaintSpec {
    /// Parse paint attribute.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PaintError::malformed("empty paint"));
        }

        if s == "none" {
            return Ok(PaintSpec::None);
        }

        if let Some(rest) = strip_prefix_ignore_case(s, "url(") {
            let close = rest
                .find(')')
                .ok_or_else(|| PaintError::malformed(format!("unterminated url in \"{s}\"")))?;
            let iri = Iri::parse(unquote(rest[..close].trim()))
                .map_err(|_| PaintError::malformed(format!("empty url in \"{s}\"")))?;

            let tail = rest[close + 1..].trim();
            let fallback = if tail.is_empty() {
                None
            } else {
                let fallback = FallbackPaint::parse(tail)
                    .map_err(|err| PaintError::malformed(format!("bad fallback in \"{s}\": {err}")))?;
                Some(fallback)
            };
            return Ok(PaintSpec::Reference { iri, fallback });
        }

        match parse_color(s) {
            Ok(ColorValue::CurrentColor) => Ok(PaintSpec::CurrentColor),
            Ok(ColorValue::Rgba(color)) => Ok(PaintSpec::Solid(color)),
            Err(err) => Err(PaintError::malformed(format!("\"{s}\": {err}"))),
        }
    }

    /// Parse, substituting "no paint" for a malformed value.
    pub fn parse_or_none(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|err| {
            warn!(value = s, error = %err, "Ignoring malformed paint");
            PaintSpec::None
        })
    }

    /// The referenced IRI, if any.
    pub fn iri(&self) -> Option<&Iri> {
        match self {
            PaintSpec::Reference { iri, .. } => Some(iri),
            _ => None,
        }
    }
}

impl FromStr for PaintSpec {
    type Err = PaintError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PaintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaintSpec::None => f.write_str("none"),
            PaintSpec::CurrentColor => f.write_str("currentColor"),
            PaintSpec::Solid(color) => color.fmt(f),
            PaintSpec::Reference { iri, fallback } => {
                write!(f, "url({iri})")?;
                if let Some(fallback) = fallback {
                    write!(f, " {fallback}")?;
                }
                Ok(())
            }
        }
    }
}

/// A `fill`/`stroke` value as written, before the cascade: either `inherit`
/// or a paint.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintAttribute {
    Inherit,
    Specified(PaintSpec),
}

impl PaintAttribute {
    pub fn parse(s: &str) -> Result<Self> {
        if s.trim() == "inherit" {
            Ok(PaintAttribute::Inherit)
        } else {
            PaintSpec::parse(s).map(PaintAttribute::Specified)
        }
    }

    /// The specified paint, or `parent` for `inherit`.
    pub fn computed(self, parent: &PaintSpec) -> PaintSpec {
        match self {
            PaintAttribute::Inherit => parent.clone(),
            PaintAttribute::Specified(spec) => spec,
        }
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|s| s.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}
