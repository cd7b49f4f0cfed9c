//! Binding resolved paints to a shape.
//!
//! The applicator turns a [`PaintSpec`] into the user-space descriptor a
//! rendering backend consumes. It never fails: anything that goes wrong while
//! resolving a reference degrades to the paint's fallback.

use serde::Serialize;
use tracing::warn;

use crate::attributes::{clamp_unit, GradientStop, SpreadMethod, Units};
use crate::builder::{GradientGeometry, ResolvedGradient, ResolvedPaint, ResolvedPattern};
use crate::color::Color;
use crate::document::PaintServerSource;
use crate::error::{PaintError, Result};
use crate::geometry::{Length, LengthDir, Rect, Transform2D, Viewport};
use crate::paint::{FallbackPaint, Iri, PaintSpec};
use crate::resolver::PaintResolver;

/// Per-element inputs to paint application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintContext {
    /// Value of the `color` property, used for `currentColor`.
    pub current_color: Color,
    /// `fill-opacity` or `stroke-opacity`, in [0, 1].
    pub opacity: f32,
    /// Object bounding box of the painted shape, if it has one.
    pub bbox: Option<Rect>,
    /// Basis for user-space percentages.
    pub viewport: Viewport,
    /// Basis for `em` and `ex` lengths.
    pub font_size: f32,
}

impl Default for PaintContext {
    fn default() -> Self {
        Self {
            current_color: Color::BLACK,
            opacity: 1.0,
            bbox: None,
            viewport: Viewport::default(),
            font_size: 16.0,
        }
    }
}

impl PaintContext {
    pub fn new(current_color: Color) -> Self {
        Self {
            current_color,
            ..Default::default()
        }
    }

    /// Set the opacity, clamped to [0, 1].
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = clamp_unit(opacity);
        self
    }

    pub fn with_bbox(mut self, bbox: Rect) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    fn color(&self, color: Color) -> Color {
        color.with_opacity(self.opacity)
    }

    /// The bounding box, when it can carry `objectBoundingBox` units.
    fn usable_bbox(&self) -> Option<Rect> {
        self.bbox.filter(|b| !b.is_empty() && b.is_finite())
    }
}

/// Gradient stop with its opacity folded into the color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliedStop {
    pub offset: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedLinearGradient {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stops: Vec<AppliedStop>,
    pub spread: SpreadMethod,
    /// Gradient space to user space.
    pub transform: Transform2D,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedRadialGradient {
    pub cx: f32,
    pub cy: f32,
    pub r: f32,
    pub fx: f32,
    pub fy: f32,
    pub fr: f32,
    pub stops: Vec<AppliedStop>,
    pub spread: SpreadMethod,
    /// Gradient space to user space.
    pub transform: Transform2D,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedPattern<H> {
    /// Tile size; the tile origin is folded into `transform`.
    pub tile: Rect,
    /// Tile space to user space.
    pub transform: Transform2D,
    /// Content space to tile space.
    pub content_transform: Transform2D,
    /// Node whose children fill the tile.
    pub content: H,
    pub opacity: f32,
}

/// Paint ready for the rendering backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppliedPaint<H> {
    None,
    Solid { color: Color },
    LinearGradient(AppliedLinearGradient),
    RadialGradient(AppliedRadialGradient),
    Pattern(AppliedPattern<H>),
}

impl<H> AppliedPaint<H> {
    pub fn is_none(&self) -> bool {
        matches!(self, AppliedPaint::None)
    }

    pub fn solid(color: Color) -> Self {
        AppliedPaint::Solid { color }
    }
}

/// An applied paint together with the errors that degraded it.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintOutcome<H> {
    pub paint: AppliedPaint<H>,
    pub issues: Vec<PaintError>,
}

impl<H> PaintOutcome<H> {
    /// Whether anything went wrong on the way to `paint`.
    pub fn is_degraded(&self) -> bool {
        !self.issues.is_empty()
    }
}

impl<S> PaintResolver<'_, S>
where
    S: PaintServerSource + ?Sized,
{
    /// Apply a paint to a shape.
    pub fn apply(&self, spec: &PaintSpec, context: &PaintContext) -> AppliedPaint<S::Handle> {
        self.apply_with_report(spec, context).paint
    }

    /// Apply a paint to a shape, also returning what went wrong, if anything.
    pub fn apply_with_report(
        &self,
        spec: &PaintSpec,
        context: &PaintContext,
    ) -> PaintOutcome<S::Handle> {
        let mut issues = Vec::new();

        let paint = match spec {
            PaintSpec::None => AppliedPaint::None,
            PaintSpec::CurrentColor => AppliedPaint::solid(context.color(context.current_color)),
            PaintSpec::Solid(color) => AppliedPaint::solid(context.color(*color)),
            PaintSpec::Reference { iri, fallback } => {
                match self.apply_reference(iri, context, &mut issues) {
                    Ok(paint) => paint,
                    Err(err) => {
                        warn!(%iri, error = %err, fallback = ?fallback, "Paint server unusable, using fallback");
                        issues.push(err);
                        apply_fallback(fallback.as_ref(), context)
                    }
                }
            }
        };

        if !self.config.report_degradations {
            issues.clear();
        }
        PaintOutcome { paint, issues }
    }

    fn apply_reference(
        &self,
        iri: &Iri,
        context: &PaintContext,
        issues: &mut Vec<PaintError>,
    ) -> Result<AppliedPaint<S::Handle>> {
        let resolution = self.resolve_server(iri)?;
        resolution.check_cycle_policy(self.config.cycle_policy)?;
        if let Some(err) = resolution.interruption() {
            issues.push(err.clone());
        }

        match resolution.build()? {
            ResolvedPaint::None => Ok(AppliedPaint::None),
            ResolvedPaint::Solid(color) => Ok(AppliedPaint::solid(context.color(color))),
            ResolvedPaint::Gradient(gradient) => apply_gradient(iri, &gradient, context),
            ResolvedPaint::Pattern(pattern) => apply_pattern(iri, pattern, context),
        }
    }
}

fn apply_fallback<H>(fallback: Option<&FallbackPaint>, context: &PaintContext) -> AppliedPaint<H> {
    match fallback {
        None | Some(FallbackPaint::None) => AppliedPaint::None,
        Some(FallbackPaint::CurrentColor) => AppliedPaint::solid(context.color(context.current_color)),
        Some(FallbackPaint::Color(color)) => AppliedPaint::solid(context.color(*color)),
    }
}

fn stop_color(stop: &GradientStop, context: &PaintContext) -> Color {
    stop.color
        .resolve(context.current_color)
        .with_opacity(stop.opacity * context.opacity)
}

/// Length basis for a coordinate system.
struct Basis {
    viewport: Viewport,
    font_size: f32,
}

impl Basis {
    fn new(units: Units, context: &PaintContext) -> Self {
        let viewport = match units {
            Units::ObjectBoundingBox => Viewport::unit(),
            Units::UserSpaceOnUse => context.viewport,
        };
        Self {
            viewport,
            font_size: context.font_size,
        }
    }

    fn x(&self, length: Length) -> f32 {
        length.normalize(LengthDir::Horizontal, self.viewport, self.font_size)
    }

    fn y(&self, length: Length) -> f32 {
        length.normalize(LengthDir::Vertical, self.viewport, self.font_size)
    }

    fn both(&self, length: Length) -> f32 {
        length.normalize(LengthDir::Both, self.viewport, self.font_size)
    }
}

fn apply_gradient<H>(
    iri: &Iri,
    gradient: &ResolvedGradient,
    context: &PaintContext,
) -> Result<AppliedPaint<H>> {
    let transform = match gradient.units {
        Units::ObjectBoundingBox => {
            let bbox = context.usable_bbox().ok_or_else(|| {
                PaintError::UnusableServer(iri.to_string(), "empty bounding box")
            })?;
            bbox.unit_to_rect().multiply(&gradient.transform)
        }
        Units::UserSpaceOnUse => gradient.transform,
    };

    // A single stop paints its color everywhere.
    if let [only] = gradient.stops.as_slice() {
        return Ok(AppliedPaint::solid(stop_color(only, context)));
    }

    let basis = Basis::new(gradient.units, context);
    let stops = gradient
        .stops
        .iter()
        .map(|stop| AppliedStop {
            offset: stop.offset,
            color: stop_color(stop, context),
        })
        .collect();

    let paint = match gradient.geometry {
        GradientGeometry::Linear(g) => AppliedPaint::LinearGradient(AppliedLinearGradient {
            x1: basis.x(g.x1),
            y1: basis.y(g.y1),
            x2: basis.x(g.x2),
            y2: basis.y(g.y2),
            stops,
            spread: gradient.spread,
            transform,
        }),
        GradientGeometry::Radial(g) => AppliedPaint::RadialGradient(AppliedRadialGradient {
            cx: basis.x(g.cx),
            cy: basis.y(g.cy),
            r: basis.both(g.r),
            fx: basis.x(g.fx),
            fy: basis.y(g.fy),
            fr: basis.both(g.fr),
            stops,
            spread: gradient.spread,
            transform,
        }),
    };
    Ok(paint)
}

fn apply_pattern<H>(
    iri: &Iri,
    pattern: ResolvedPattern<H>,
    context: &PaintContext,
) -> Result<AppliedPaint<H>> {
    let needs_bbox = pattern.units == Units::ObjectBoundingBox
        || (pattern.view_box.is_none() && pattern.content_units == Units::ObjectBoundingBox);
    let bbox = if needs_bbox {
        let bbox = context
            .usable_bbox()
            .ok_or_else(|| PaintError::UnusableServer(iri.to_string(), "empty bounding box"))?;
        Some(bbox)
    } else {
        None
    };

    let basis = Basis::new(pattern.units, context);
    let unit_tile = Rect::new(
        basis.x(pattern.tile.x),
        basis.y(pattern.tile.y),
        basis.x(pattern.tile.width),
        basis.y(pattern.tile.height),
    );
    let tile = match (pattern.units, bbox) {
        (Units::ObjectBoundingBox, Some(bbox)) => Rect::new(
            bbox.x + unit_tile.x * bbox.width,
            bbox.y + unit_tile.y * bbox.height,
            unit_tile.width * bbox.width,
            unit_tile.height * bbox.height,
        ),
        _ => unit_tile,
    };
    if tile.is_empty() || !tile.is_finite() {
        return Err(PaintError::UnusableServer(iri.to_string(), "zero-size tile"));
    }

    let transform = pattern.transform.translate(tile.x, tile.y);
    let content_transform = match (pattern.view_box, bbox) {
        (Some(view_box), _) => pattern
            .preserve_aspect_ratio
            .view_box_transform(&view_box, Rect::new(0.0, 0.0, tile.width, tile.height)),
        (None, Some(bbox)) if pattern.content_units == Units::ObjectBoundingBox => {
            Transform2D::identity().scale(bbox.width, bbox.height)
        }
        _ => Transform2D::identity(),
    };

    Ok(AppliedPaint::Pattern(AppliedPattern {
        tile: Rect::new(0.0, 0.0, tile.width, tile.height),
        transform,
        content_transform,
        content: pattern.content,
        opacity: context.opacity,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::document::PaintDocument;

    fn gradient_doc() -> PaintDocument {
        let mut doc = PaintDocument::new();
        let g = doc.add_element("linearGradient", &[("id", "g")]);
        doc.append_child(g, "stop", &[("offset", "0"), ("stop-color", "red")]);
        doc.append_child(
            g,
            "stop",
            &[("offset", "1"), ("stop-color", "currentColor"), ("stop-opacity", "0.5")],
        );
        doc
    }

    fn reference(id: &str, fallback: Option<FallbackPaint>) -> PaintSpec {
        PaintSpec::Reference {
            iri: Iri::local(id),
            fallback,
        }
    }

    #[test]
    fn test_solid_paints() {
        let doc = PaintDocument::new();
        let resolver = PaintResolver::new(&doc);
        let context = PaintContext::new(Color::from_rgb(0x11, 0x22, 0x33)).with_opacity(0.5);

        assert_eq!(
            resolver.apply(&PaintSpec::CurrentColor, &context),
            AppliedPaint::solid(Color::new(0x11, 0x22, 0x33, 128))
        );
        assert_eq!(
            resolver.apply(&PaintSpec::Solid(Color::WHITE), &context),
            AppliedPaint::solid(Color::new(255, 255, 255, 128))
        );
        assert!(resolver.apply(&PaintSpec::None, &context).is_none());
    }

    #[test]
    fn test_obb_linear_gradient() {
        let doc = gradient_doc();
        let resolver = PaintResolver::new(&doc);
        let context = PaintContext::new(Color::from_rgb(0, 0, 255))
            .with_bbox(Rect::new(10.0, 20.0, 100.0, 50.0));

        let AppliedPaint::LinearGradient(g) = resolver.apply(&reference("g", None), &context) else {
            panic!("expected linear gradient");
        };
        assert_eq!((g.x1, g.y1, g.x2, g.y2), (0.0, 0.0, 1.0, 0.0));
        assert_eq!(g.transform.apply(1.0, 1.0), (110.0, 70.0));
        assert_eq!(g.stops[0].color, Color::from_rgb(255, 0, 0));
        assert_eq!(g.stops[1].color, Color::new(0, 0, 255, 128));
    }

    #[test]
    fn test_user_space_gradient_percentages() {
        let mut doc = PaintDocument::new();
        let g = doc.add_element(
            "radialGradient",
            &[("id", "g"), ("gradientUnits", "userSpaceOnUse"), ("r", "10")],
        );
        doc.append_child(g, "stop", &[("offset", "0")]);
        doc.append_child(g, "stop", &[("offset", "1")]);

        let resolver = PaintResolver::new(&doc);
        let context = PaintContext::default().with_viewport(Viewport::new(200.0, 100.0));
        let AppliedPaint::RadialGradient(g) = resolver.apply(&reference("g", None), &context) else {
            panic!("expected radial gradient");
        };
        assert_eq!((g.cx, g.cy, g.r), (100.0, 50.0, 10.0));
        assert_eq!((g.fx, g.fy, g.fr), (100.0, 50.0, 0.0));
        assert_eq!(g.transform, Transform2D::identity());
    }

    #[test]
    fn test_empty_bbox_uses_fallback() {
        let doc = gradient_doc();
        let resolver = PaintResolver::new(&doc);
        let context = PaintContext::default().with_bbox(Rect::new(0.0, 0.0, 100.0, 0.0));

        let outcome = resolver.apply_with_report(
            &reference("g", Some(FallbackPaint::Color(Color::WHITE))),
            &context,
        );
        assert_eq!(outcome.paint, AppliedPaint::solid(Color::WHITE));
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].category(), "unusable_server");

        assert!(resolver.apply(&reference("g", None), &context).is_none());
    }

    #[test]
    fn test_missing_reference_fallbacks() {
        let doc = PaintDocument::new();
        let resolver = PaintResolver::new(&doc);
        let context = PaintContext::new(Color::from_rgb(9, 9, 9));

        let blue = Color::from_rgb(0, 0, 255);
        assert_eq!(
            resolver.apply(&reference("missing", Some(FallbackPaint::Color(blue))), &context),
            AppliedPaint::solid(blue)
        );
        assert_eq!(
            resolver.apply(&reference("missing", Some(FallbackPaint::CurrentColor)), &context),
            AppliedPaint::solid(Color::from_rgb(9, 9, 9))
        );
        assert!(resolver
            .apply(&reference("missing", Some(FallbackPaint::None)), &context)
            .is_none());
        assert!(resolver.apply(&reference("missing", None), &context).is_none());
    }

    #[test]
    fn test_single_stop_is_solid() {
        let mut doc = PaintDocument::new();
        let g = doc.add_element("linearGradient", &[("id", "g")]);
        doc.append_child(g, "stop", &[("stop-color", "lime"), ("stop-opacity", "0.5")]);

        let resolver = PaintResolver::new(&doc);
        let context = PaintContext::default().with_bbox(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(
            resolver.apply(&reference("g", None), &context),
            AppliedPaint::solid(Color::new(0, 255, 0, 128))
        );

        // objectBoundingBox units still need a box before the stop is used.
        let red = Color::from_rgb(255, 0, 0);
        let outcome = resolver.apply_with_report(
            &reference("g", Some(FallbackPaint::Color(red))),
            &PaintContext::default(),
        );
        assert_eq!(outcome.paint, AppliedPaint::solid(red));
        assert_eq!(outcome.issues[0].category(), "unusable_server");
    }

    #[test]
    fn test_gradient_without_stops_uses_fallback() {
        let mut doc = PaintDocument::new();
        doc.add_element("linearGradient", &[("id", "g"), ("href", "#h")]);
        doc.add_element("linearGradient", &[("id", "h")]);

        let resolver = PaintResolver::new(&doc);
        let context = PaintContext::default().with_bbox(Rect::new(0.0, 0.0, 10.0, 10.0));
        let blue = Color::from_rgb(0, 0, 255);

        let outcome =
            resolver.apply_with_report(&reference("g", Some(FallbackPaint::Color(blue))), &context);
        assert_eq!(outcome.paint, AppliedPaint::solid(blue));
        assert_eq!(
            outcome.issues,
            vec![PaintError::UnusableServer("#g".into(), "no stops")]
        );

        assert!(resolver.apply(&reference("g", None), &context).is_none());
    }

    #[test]
    fn test_pattern_obb_tile() {
        let mut doc = PaintDocument::new();
        let p = doc.add_element(
            "pattern",
            &[
                ("id", "p"),
                ("x", "0.1"),
                ("width", "0.5"),
                ("height", "25%"),
                ("patternContentUnits", "objectBoundingBox"),
            ],
        );
        doc.append_child(p, "rect", &[]);

        let resolver = PaintResolver::new(&doc);
        let context = PaintContext::default()
            .with_opacity(0.25)
            .with_bbox(Rect::new(0.0, 10.0, 200.0, 40.0));
        let AppliedPaint::Pattern(pattern) = resolver.apply(&reference("p", None), &context) else {
            panic!("expected pattern");
        };
        assert_eq!(pattern.tile, Rect::new(0.0, 0.0, 100.0, 10.0));
        assert_eq!(pattern.transform.apply(0.0, 0.0), (20.0, 10.0));
        assert_eq!(pattern.content_transform.apply(1.0, 1.0), (200.0, 40.0));
        assert_eq!(pattern.content, p);
        assert_eq!(pattern.opacity, 0.25);
    }

    #[test]
    fn test_pattern_view_box() {
        let mut doc = PaintDocument::new();
        let p = doc.add_element(
            "pattern",
            &[
                ("id", "p"),
                ("patternUnits", "userSpaceOnUse"),
                ("width", "20"),
                ("height", "10"),
                ("viewBox", "0 0 5 5"),
            ],
        );
        doc.append_child(p, "rect", &[]);

        let resolver = PaintResolver::new(&doc);
        let AppliedPaint::Pattern(pattern) =
            resolver.apply(&reference("p", None), &PaintContext::default())
        else {
            panic!("expected pattern");
        };
        // xMidYMid meet: scale 2, centered horizontally.
        assert_eq!(pattern.content_transform.apply(0.0, 0.0), (5.0, 0.0));
        assert_eq!(pattern.content_transform.apply(5.0, 5.0), (15.0, 10.0));
    }

    #[test]
    fn test_pattern_zero_tile_and_no_content() {
        let mut doc = PaintDocument::new();
        let zero = doc.add_element("pattern", &[("id", "zero"), ("width", "1")]);
        doc.append_child(zero, "rect", &[]);
        doc.add_element("pattern", &[("id", "empty"), ("width", "1"), ("height", "1")]);

        let resolver = PaintResolver::new(&doc);
        let context = PaintContext::default().with_bbox(Rect::new(0.0, 0.0, 10.0, 10.0));
        let red = Color::from_rgb(255, 0, 0);

        let outcome =
            resolver.apply_with_report(&reference("zero", Some(FallbackPaint::Color(red))), &context);
        assert_eq!(outcome.paint, AppliedPaint::solid(red));
        assert!(outcome.is_degraded());

        let outcome =
            resolver.apply_with_report(&reference("empty", Some(FallbackPaint::Color(red))), &context);
        assert!(outcome.paint.is_none());
        assert!(!outcome.is_degraded());
    }

    #[test]
    fn test_quiet_config_drops_issues() {
        let doc = PaintDocument::new();
        let resolver = PaintResolver::with_config(&doc, ResolverConfig::quiet());
        let outcome = resolver.apply_with_report(&reference("missing", None), &PaintContext::default());
        assert!(outcome.paint.is_none());
        assert!(!outcome.is_degraded());
    }

    #[test]
    fn test_opacity_is_clamped() {
        assert_eq!(PaintContext::default().with_opacity(3.0).opacity, 1.0);
        assert_eq!(PaintContext::default().with_opacity(-1.0).opacity, 0.0);
    }
}
