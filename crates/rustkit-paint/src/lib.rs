//! # RustKit Paint
//!
//! SVG paint server resolution for the RustKit browser engine.
//!
//! ## Features
//!
//! - **Paint Parsing**: `none`, `currentColor`, colors, `url(#id) <fallback>`
//! - **Colors**: hex, `rgb()`/`rgba()`, named colors
//! - **Paint Servers**: linear/radial gradients and patterns
//! - **Templates**: `href` attribute inheritance with cycle detection
//! - **Application**: bounding box units, opacity, fallback paints
//!
//! ## Architecture
//!
//! ```text
//! fill="url(#g) blue"
//!    └── PaintSpec::parse
//!           └── PaintResolver::apply(spec, context)
//!                  ├── resolve_server   (template chain walk)
//!                  ├── build            (defaults, stop normalization)
//!                  └── AppliedPaint     (user-space descriptor)
//! ```
//!
//! ## Example
//!
//! ```
//! use rustkit_paint::{
//!     AppliedPaint, Color, PaintContext, PaintDocument, PaintResolver, PaintSpec, Rect,
//! };
//!
//! let mut doc = PaintDocument::new();
//! let g = doc.add_element("linearGradient", &[("id", "g")]);
//! doc.append_child(g, "stop", &[("offset", "0"), ("stop-color", "white")]);
//! doc.append_child(g, "stop", &[("offset", "1"), ("stop-color", "black")]);
//!
//! let spec = PaintSpec::parse("url(#g) red").unwrap();
//! let context = PaintContext::new(Color::BLACK).with_bbox(Rect::new(0.0, 0.0, 10.0, 10.0));
//! let paint = PaintResolver::new(&doc).apply(&spec, &context);
//! assert!(matches!(paint, AppliedPaint::LinearGradient(_)));
//! ```

pub mod apply;
pub mod aspect_ratio;
pub mod attributes;
pub mod builder;
pub mod color;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod paint;
pub mod resolver;

pub use apply::{
    AppliedLinearGradient, AppliedPaint, AppliedPattern, AppliedRadialGradient, AppliedStop,
    PaintContext, PaintOutcome,
};
pub use aspect_ratio::{AspectRatio, AxisAlign, FitMode, ViewBox};
pub use attributes::{
    GradientAttributes, GradientStop, LinearGeometry, PatternAttributes, RadialGeometry,
    SpreadMethod, TileGeometry, Units,
};
pub use builder::{GradientGeometry, ResolvedGradient, ResolvedPaint, ResolvedPattern};
pub use color::{parse_color, Color, ColorValue};
pub use config::{CyclePolicy, ResolverConfig};
pub use document::{NodeId, NodeKind, PaintDocument, PaintServerSource};
pub use error::{PaintError, Result};
pub use geometry::{Length, LengthUnit, Rect, Transform2D, Viewport};
pub use paint::{FallbackPaint, Iri, PaintAttribute, PaintSpec};
pub use resolver::{PaintResolver, ServerResolution};
