//! Error types for paint parsing and resolution.
//!
//! None of these are fatal to a render: every error produced while handling a
//! single paint is turned into a harmless degradation by the applicator.

use thiserror::Error;

use crate::document::NodeKind;

/// Errors that can occur while parsing or resolving a paint.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaintError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Malformed paint: {0}")]
    MalformedPaint(String),

    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    #[error("Reference {iri} points to a {kind:?} element, expected a gradient or pattern")]
    WrongReferenceKind { iri: String, kind: NodeKind },

    #[error("Cyclic template reference: {0}")]
    CyclicReference(String),

    #[error("Template chain starting at {iri} exceeds {limit} links")]
    TemplateChainTooLong { iri: String, limit: usize },

    #[error("Invalid attribute {name}=\"{value}\"")]
    InvalidAttribute { name: String, value: String },

    #[error("Paint server {0} cannot be applied: {1}")]
    UnusableServer(String, &'static str),
}

impl PaintError {
    /// Create an invalid color error.
    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColor(value.into())
    }

    /// Create a malformed paint error.
    pub fn malformed(value: impl Into<String>) -> Self {
        Self::MalformedPaint(value.into())
    }

    /// Create an invalid attribute error.
    pub fn invalid_attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Get the error category for diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            PaintError::InvalidColor(_) => "invalid_color",
            PaintError::MalformedPaint(_) => "malformed_paint",
            PaintError::ReferenceNotFound(_) => "reference_not_found",
            PaintError::WrongReferenceKind { .. } => "wrong_reference_kind",
            PaintError::CyclicReference(_) => "cyclic_reference",
            PaintError::TemplateChainTooLong { .. } => "template_chain_too_long",
            PaintError::InvalidAttribute { .. } => "invalid_attribute",
            PaintError::UnusableServer(..) => "unusable_server",
        }
    }
}

/// Result type alias for paint operations.
pub type Result<T> = std::result::Result<T, PaintError>;
