//! Partial gradient/pattern attribute sets.
//!
//! Every field is `None` until a node sets it explicitly. Unset fields are
//! filled from template nodes and finally from the SVG defaults.

use serde::{Deserialize, Serialize};

use crate::aspect_ratio::{AspectRatio, ViewBox};
use crate::color::{parse_color, ColorValue};
use crate::error::{PaintError, Result};
use crate::geometry::{Length, Transform2D};

/// Gradient spread behavior outside the [0, 1] stop range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpreadMethod {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

impl SpreadMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "pad" => Some(SpreadMethod::Pad),
            "reflect" => Some(SpreadMethod::Reflect),
            "repeat" => Some(SpreadMethod::Repeat),
            _ => None,
        }
    }
}

/// Coordinate system for gradient/pattern geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    UserSpaceOnUse,
    ObjectBoundingBox,
}

impl Units {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "userSpaceOnUse" => Some(Units::UserSpaceOnUse),
            "objectBoundingBox" => Some(Units::ObjectBoundingBox),
            _ => None,
        }
    }
}

/// A gradient control point as declared by a `<stop>` element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Offset in [0, 1].
    pub offset: f32,
    pub color: ColorValue,
    /// `stop-opacity` in [0, 1].
    pub opacity: f32,
}

impl GradientStop {
    pub fn new(offset: f32, color: impl Into<ColorValue>, opacity: f32) -> Self {
        Self {
            offset: clamp_unit(offset),
            color: color.into(),
            opacity: clamp_unit(opacity),
        }
    }

    /// Build a stop from `<stop>` attributes: `offset`, `stop-color`,
    /// `stop-opacity`, and the same two properties inside `style`.
    ///
    /// Invalid values are reported and the property keeps its default.
    pub fn from_attributes(attrs: &[(&str, &str)]) -> (Self, Vec<PaintError>) {
        let mut stop = GradientStop::new(0.0, ColorValue::Rgba(crate::Color::BLACK), 1.0);
        let mut errors = Vec::new();

        let declarations = attrs
            .iter()
            .filter(|(name, _)| *name == "style")
            .flat_map(|&(_, style)| style.split(';'))
            .filter_map(|decl| decl.split_once(':'))
            .map(|(k, v)| (k.trim(), v.trim()));

        // Style declarations win over presentation attributes.
        let all = attrs.iter().copied().chain(declarations);
        for (name, value) in all {
            let result = match name {
                "offset" => parse_offset(value).map(|o| stop.offset = o),
                "stop-color" => parse_color(value).map(|c| stop.color = c),
                "stop-opacity" => parse_opacity(value).map(|o| stop.opacity = o),
                _ => Ok(()),
            };
            if let Err(err) = result {
                errors.push(err);
            }
        }

        (stop, errors)
    }
}

/// Number or percentage, clamped to [0, 1].
pub fn parse_offset(value: &str) -> Result<f32> {
    let value = value.trim();
    let parsed = match value.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f32>().map(|p| p / 100.0),
        None => value.parse::<f32>(),
    };
    match parsed {
        Ok(v) if v.is_finite() => Ok(clamp_unit(v)),
        _ => Err(PaintError::invalid_attribute("offset", value)),
    }
}

/// `<alpha-value>`, clamped to [0, 1].
pub fn parse_opacity(value: &str) -> Result<f32> {
    match value.trim().parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(clamp_unit(v)),
        _ => Err(PaintError::invalid_attribute("opacity", value)),
    }
}

pub(crate) fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

// ==================== Gradients ====================

/// Explicitly set attributes of a `<linearGradient>` or `<radialGradient>`.
///
/// Linear and radial geometry live side by side; a node only ever sets the
/// fields of its own kind, and the builder only reads the fields of the
/// starting node's kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradientAttributes {
    pub units: Option<Units>,
    pub spread: Option<SpreadMethod>,
    pub transform: Option<Transform2D>,

    pub x1: Option<Length>,
    pub y1: Option<Length>,
    pub x2: Option<Length>,
    pub y2: Option<Length>,

    pub cx: Option<Length>,
    pub cy: Option<Length>,
    pub r: Option<Length>,
    pub fx: Option<Length>,
    pub fy: Option<Length>,
    pub fr: Option<Length>,
}

impl GradientAttributes {
    /// Fill every unset field from `template`.
    pub fn fill_unset_from(&mut self, template: &GradientAttributes) {
        fill(&mut self.units, template.units);
        fill(&mut self.spread, template.spread);
        fill(&mut self.transform, template.transform);
        fill(&mut self.x1, template.x1);
        fill(&mut self.y1, template.y1);
        fill(&mut self.x2, template.x2);
        fill(&mut self.y2, template.y2);
        fill(&mut self.cx, template.cx);
        fill(&mut self.cy, template.cy);
        fill(&mut self.r, template.r);
        fill(&mut self.fx, template.fx);
        fill(&mut self.fy, template.fy);
        fill(&mut self.fr, template.fr);
    }

    /// Set one attribute from its string value. Unknown names are ignored;
    /// `radial` selects which geometry attributes apply.
    pub fn set_attribute(&mut self, radial: bool, name: &str, value: &str) -> Result<()> {
        let invalid = || PaintError::invalid_attribute(name, value);
        let length = || Length::parse(value).ok_or_else(invalid);

        match (name, radial) {
            ("gradientUnits", _) => self.units = Some(Units::parse(value).ok_or_else(invalid)?),
            ("spreadMethod", _) => {
                self.spread = Some(SpreadMethod::parse(value).ok_or_else(invalid)?)
            }
            ("gradientTransform", _) => {
                self.transform = Some(Transform2D::parse(value).ok_or_else(invalid)?)
            }
            ("x1", false) => self.x1 = Some(length()?),
            ("y1", false) => self.y1 = Some(length()?),
            ("x2", false) => self.x2 = Some(length()?),
            ("y2", false) => self.y2 = Some(length()?),
            ("cx", true) => self.cx = Some(length()?),
            ("cy", true) => self.cy = Some(length()?),
            ("r", true) => self.r = Some(non_negative(length()?).ok_or_else(invalid)?),
            ("fx", true) => self.fx = Some(length()?),
            ("fy", true) => self.fy = Some(length()?),
            ("fr", true) => self.fr = Some(non_negative(length()?).ok_or_else(invalid)?),
            _ => {}
        }
        Ok(())
    }

    /// Drop the geometry fields that do not belong to this gradient shape.
    pub fn retain_geometry(&mut self, radial: bool) {
        if radial {
            self.x1 = None;
            self.y1 = None;
            self.x2 = None;
            self.y2 = None;
        } else {
            self.cx = None;
            self.cy = None;
            self.r = None;
            self.fx = None;
            self.fy = None;
            self.fr = None;
        }
    }

    pub fn resolve_linear(&self) -> LinearGeometry {
        LinearGeometry {
            x1: self.x1.unwrap_or(Length::percent(0.0)),
            y1: self.y1.unwrap_or(Length::percent(0.0)),
            x2: self.x2.unwrap_or(Length::percent(100.0)),
            y2: self.y2.unwrap_or(Length::percent(0.0)),
        }
    }

    pub fn resolve_radial(&self) -> RadialGeometry {
        let cx = self.cx.unwrap_or(Length::percent(50.0));
        let cy = self.cy.unwrap_or(Length::percent(50.0));
        RadialGeometry {
            cx,
            cy,
            r: self.r.unwrap_or(Length::percent(50.0)),
            fx: self.fx.unwrap_or(cx),
            fy: self.fy.unwrap_or(cy),
            fr: self.fr.unwrap_or(Length::percent(0.0)),
        }
    }
}

/// Linear gradient vector with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearGeometry {
    pub x1: Length,
    pub y1: Length,
    pub x2: Length,
    pub y2: Length,
}

/// Radial gradient circles with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialGeometry {
    pub cx: Length,
    pub cy: Length,
    pub r: Length,
    pub fx: Length,
    pub fy: Length,
    pub fr: Length,
}

// ==================== Patterns ====================

/// Explicitly set attributes of a `<pattern>`.
///
/// The tile rect (`x`, `y`, `width`, `height`) is never taken from a
/// template; only appearance attributes are inherited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternAttributes {
    pub units: Option<Units>,
    pub content_units: Option<Units>,
    pub transform: Option<Transform2D>,
    pub view_box: Option<ViewBox>,
    pub preserve_aspect_ratio: Option<AspectRatio>,

    pub x: Option<Length>,
    pub y: Option<Length>,
    pub width: Option<Length>,
    pub height: Option<Length>,
}

impl PatternAttributes {
    /// Fill every unset inheritable field from `template`.
    pub fn fill_unset_from(&mut self, template: &PatternAttributes) {
        fill(&mut self.units, template.units);
        fill(&mut self.content_units, template.content_units);
        fill(&mut self.transform, template.transform);
        fill(&mut self.view_box, template.view_box);
        fill(&mut self.preserve_aspect_ratio, template.preserve_aspect_ratio);
    }

    /// Set one attribute from its string value. Unknown names are ignored.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        let invalid = || PaintError::invalid_attribute(name, value);
        let length = || Length::parse(value).ok_or_else(invalid);

        match name {
            "patternUnits" => self.units = Some(Units::parse(value).ok_or_else(invalid)?),
            "patternContentUnits" => {
                self.content_units = Some(Units::parse(value).ok_or_else(invalid)?)
            }
            "patternTransform" => {
                self.transform = Some(Transform2D::parse(value).ok_or_else(invalid)?)
            }
            "viewBox" => self.view_box = Some(ViewBox::parse(value).ok_or_else(invalid)?),
            "preserveAspectRatio" => {
                self.preserve_aspect_ratio = Some(AspectRatio::parse(value).ok_or_else(invalid)?)
            }
            "x" => self.x = Some(length()?),
            "y" => self.y = Some(length()?),
            "width" => self.width = Some(non_negative(length()?).ok_or_else(invalid)?),
            "height" => self.height = Some(non_negative(length()?).ok_or_else(invalid)?),
            _ => {}
        }
        Ok(())
    }

    /// Tile rect of this node, zero where unset.
    pub fn tile(&self) -> TileGeometry {
        let zero = Length::number(0.0);
        TileGeometry {
            x: self.x.unwrap_or(zero),
            y: self.y.unwrap_or(zero),
            width: self.width.unwrap_or(zero),
            height: self.height.unwrap_or(zero),
        }
    }
}

/// Pattern tile rect, in the pattern's `patternUnits`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileGeometry {
    pub x: Length,
    pub y: Length,
    pub width: Length,
    pub height: Length,
}

fn fill<T: Copy>(slot: &mut Option<T>, template: Option<T>) {
    if slot.is_none() {
        *slot = template;
    }
}

fn non_negative(length: Length) -> Option<Length> {
    (length.value >= 0.0).then_some(length)
}
