//! Geometry-independent paint descriptors.
//!
//! Built from a [`ServerResolution`] with all defaults applied. Lengths are
//! still unresolved here since they may depend on the painted shape.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aspect_ratio::{AspectRatio, ViewBox};
use crate::attributes::{
    clamp_unit, GradientStop, LinearGeometry, RadialGeometry, SpreadMethod, TileGeometry, Units,
};
use crate::color::Color;
use crate::document::NodeKind;
use crate::error::{PaintError, Result};
use crate::geometry::Transform2D;
use crate::resolver::ServerResolution;

/// Resolved paint, not yet bound to a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolvedPaint<H> {
    None,
    Solid(Color),
    Gradient(ResolvedGradient),
    Pattern(ResolvedPattern<H>),
}

/// Gradient shape with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GradientGeometry {
    Linear(LinearGeometry),
    Radial(RadialGeometry),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedGradient {
    pub geometry: GradientGeometry,
    /// Never empty; offsets are non-decreasing.
    pub stops: Vec<GradientStop>,
    pub spread: SpreadMethod,
    pub units: Units,
    pub transform: Transform2D,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPattern<H> {
    /// The referenced pattern's own tile.
    pub tile: TileGeometry,
    pub units: Units,
    pub content_units: Units,
    pub transform: Transform2D,
    pub view_box: Option<ViewBox>,
    pub preserve_aspect_ratio: AspectRatio,
    /// Pattern node whose children are drawn into the tile.
    pub content: H,
}

impl<H: Copy> ServerResolution<H> {
    /// Apply defaults and produce a descriptor.
    ///
    /// A gradient without stops is unusable. A pattern without content
    /// paints nothing.
    pub fn build(&self) -> Result<ResolvedPaint<H>> {
        match self.kind {
            NodeKind::LinearGradient | NodeKind::RadialGradient => self.build_gradient(),
            NodeKind::Pattern => Ok(self.build_pattern()),
            NodeKind::Other => Ok(ResolvedPaint::None),
        }
    }

    fn build_gradient(&self) -> Result<ResolvedPaint<H>> {
        if self.stops.is_empty() {
            debug!(iri = %self.iri, kind = ?self.kind, "Gradient has no stops");
            return Err(PaintError::UnusableServer(self.iri.to_string(), "no stops"));
        }

        let attrs = &self.gradient;
        let geometry = if self.kind == NodeKind::RadialGradient {
            GradientGeometry::Radial(attrs.resolve_radial())
        } else {
            GradientGeometry::Linear(attrs.resolve_linear())
        };

        Ok(ResolvedPaint::Gradient(ResolvedGradient {
            geometry,
            stops: normalize_stops(&self.stops),
            spread: attrs.spread.unwrap_or_default(),
            units: attrs.units.unwrap_or(Units::ObjectBoundingBox),
            transform: attrs.transform.unwrap_or_default(),
        }))
    }

    fn build_pattern(&self) -> ResolvedPaint<H> {
        let Some(content) = self.content else {
            debug!("Pattern has no content, painting nothing");
            return ResolvedPaint::None;
        };

        let attrs = &self.pattern;
        ResolvedPaint::Pattern(ResolvedPattern {
            tile: attrs.tile(),
            units: attrs.units.unwrap_or(Units::ObjectBoundingBox),
            content_units: attrs.content_units.unwrap_or(Units::UserSpaceOnUse),
            transform: attrs.transform.unwrap_or_default(),
            view_box: attrs.view_box,
            preserve_aspect_ratio: attrs.preserve_aspect_ratio.unwrap_or_default(),
            content,
        })
    }
}

/// Clamp offsets to [0, 1] and raise each one to at least its predecessor,
/// keeping document order.
pub fn normalize_stops(stops: &[GradientStop]) -> Vec<GradientStop> {
    let mut previous = 0.0_f32;
    stops
        .iter()
        .map(|stop| {
            let offset = clamp_unit(stop.offset).max(previous);
            previous = offset;
            GradientStop { offset, ..*stop }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorValue;
    use crate::document::PaintDocument;
    use crate::geometry::Length;
    use crate::paint::Iri;
    use crate::resolver::PaintResolver;

    fn stop(offset: f32) -> GradientStop {
        GradientStop {
            offset,
            color: ColorValue::CurrentColor,
            opacity: 1.0,
        }
    }

    #[test]
    fn test_normalize_stops_keeps_document_order() {
        let stops = normalize_stops(&[stop(0.5), stop(0.2), stop(0.8)]);
        let offsets: Vec<f32> = stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.5, 0.5, 0.8]);
    }

    #[test]
    fn test_normalize_stops_clamps() {
        let stops = normalize_stops(&[stop(-1.0), stop(2.0), stop(0.3)]);
        let offsets: Vec<f32> = stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_build_gradient_defaults() {
        let mut doc = PaintDocument::new();
        let g = doc.add_element("radialGradient", &[("id", "g"), ("cx", "20%")]);
        doc.append_child(g, "stop", &[("stop-color", "red")]);

        let resolver = PaintResolver::new(&doc);
        let paint = resolver.resolve_server(&Iri::local("g")).unwrap().build().unwrap();
        let ResolvedPaint::Gradient(gradient) = paint else {
            panic!("expected gradient, got {paint:?}");
        };

        assert_eq!(gradient.units, Units::ObjectBoundingBox);
        assert_eq!(gradient.spread, SpreadMethod::Pad);
        assert_eq!(gradient.transform, Transform2D::identity());
        let GradientGeometry::Radial(radial) = gradient.geometry else {
            panic!("expected radial geometry");
        };
        assert_eq!(radial.cx, Length::percent(20.0));
        assert_eq!(radial.fx, Length::percent(20.0));
        assert_eq!(radial.r, Length::percent(50.0));
    }

    #[test]
    fn test_build_without_stops_or_content() {
        let mut doc = PaintDocument::new();
        doc.add_element("linearGradient", &[("id", "g")]);
        doc.add_element("pattern", &[("id", "p"), ("width", "1"), ("height", "1")]);

        let resolver = PaintResolver::new(&doc);
        let err = resolver.resolve_server(&Iri::local("g")).unwrap().build().unwrap_err();
        assert_eq!(err, PaintError::UnusableServer("#g".into(), "no stops"));

        let paint = resolver.resolve_server(&Iri::local("p")).unwrap().build().unwrap();
        assert_eq!(paint, ResolvedPaint::None);
    }

    #[test]
    fn test_build_pattern() {
        let mut doc = PaintDocument::new();
        let p = doc.add_element(
            "pattern",
            &[("id", "p"), ("width", "0.5"), ("height", "0.25"), ("viewBox", "0 0 10 10")],
        );
        doc.append_child(p, "circle", &[]);

        let resolver = PaintResolver::new(&doc);
        let paint = resolver.resolve_server(&Iri::local("p")).unwrap().build().unwrap();
        let ResolvedPaint::Pattern(pattern) = paint else {
            panic!("expected pattern, got {paint:?}");
        };
        assert_eq!(pattern.content, p);
        assert_eq!(pattern.units, Units::ObjectBoundingBox);
        assert_eq!(pattern.content_units, Units::UserSpaceOnUse);
        assert_eq!(pattern.tile.width, Length::number(0.5));
        assert_eq!(pattern.preserve_aspect_ratio, AspectRatio::default());
        assert!(pattern.view_box.is_some());
    }
}
