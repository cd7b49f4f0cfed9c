//! Geometry values used by paint servers: affine transforms, rectangles and
//! SVG lengths.

use serde::{Deserialize, Serialize};

// ==================== Transform ====================

/// 2D affine transform matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// Matrix elements [a, b, c, d, e, f]
    /// Represents: [a c e]
    ///             [b d f]
    ///             [0 0 1]
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Create identity transform.
    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Post-multiply by a translation.
    pub fn translate(self, tx: f32, ty: f32) -> Self {
        self.multiply(&Transform2D::new(1.0, 0.0, 0.0, 1.0, tx, ty))
    }

    /// Post-multiply by a scale.
    pub fn scale(self, sx: f32, sy: f32) -> Self {
        self.multiply(&Transform2D::new(sx, 0.0, 0.0, sy, 0.0, 0.0))
    }

    /// Post-multiply by a rotation (radians).
    pub fn rotate(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.multiply(&Transform2D::new(cos, sin, -sin, cos, 0.0, 0.0))
    }

    pub fn skew_x(self, angle: f32) -> Self {
        self.multiply(&Transform2D::new(1.0, 0.0, angle.tan(), 1.0, 0.0, 0.0))
    }

    pub fn skew_y(self, angle: f32) -> Self {
        self.multiply(&Transform2D::new(1.0, angle.tan(), 0.0, 1.0, 0.0, 0.0))
    }

    /// `self × other`: `other` is applied to points first.
    pub fn multiply(&self, other: &Transform2D) -> Self {
        Transform2D {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Parse an SVG transform list, e.g. `translate(10, 20) rotate(45)`.
    ///
    /// Returns `None` when any part of the list is malformed; an empty list
    /// is the identity.
    pub fn parse(s: &str) -> Option<Self> {
        let mut result = Self::identity();
        let mut s = s.trim();
        while !s.is_empty() {
            let (func, rest) = parse_transform_function(s)?;
            result = result.multiply(&func);
            s = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        }
        Some(result)
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Parse a single transform function, returning it and the unparsed rest.
fn parse_transform_function(s: &str) -> Option<(Transform2D, &str)> {
    let open = s.find('(')?;
    let close = open + s[open..].find(')')?;

    let name = s[..open].trim();
    let args = s[open + 1..close]
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<f32>().ok())
        .collect::<Option<Vec<f32>>>()?;

    let id = Transform2D::identity();
    let transform = match (name, args.as_slice()) {
        ("translate", [tx]) => id.translate(*tx, 0.0),
        ("translate", [tx, ty]) => id.translate(*tx, *ty),
        ("scale", [s]) => id.scale(*s, *s),
        ("scale", [sx, sy]) => id.scale(*sx, *sy),
        ("rotate", [angle]) => id.rotate(angle.to_radians()),
        ("rotate", [angle, cx, cy]) => id
            .translate(*cx, *cy)
            .rotate(angle.to_radians())
            .translate(-cx, -cy),
        ("skewX", [angle]) => id.skew_x(angle.to_radians()),
        ("skewY", [angle]) => id.skew_y(angle.to_radians()),
        ("matrix", [a, b, c, d, e, f]) => Transform2D::new(*a, *b, *c, *d, *e, *f),
        _ => return None,
    };

    Some((transform, &s[close + 1..]))
}

// ==================== Rect / Viewport ====================

/// Axis-aligned rectangle in user units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the rectangle has no area (a horizontal or vertical line
    /// has an empty bounding box).
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Maps the unit square onto this rectangle, used for
    /// `objectBoundingBox` units.
    pub fn unit_to_rect(&self) -> Transform2D {
        Transform2D::identity()
            .translate(self.x, self.y)
            .scale(self.width, self.height)
    }
}

/// Size of the nearest viewport, the basis for user-space percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The unit viewport percentages resolve against in
    /// `objectBoundingBox` units.
    pub const fn unit() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl Default for Viewport {
    /// Initial viewport of an SVG without explicit size.
    fn default() -> Self {
        Self::new(300.0, 150.0)
    }
}

// ==================== SVG Length ====================

const DPI: f32 = 96.0;
const POINTS_PER_INCH: f32 = 72.0;
const PICA_PER_INCH: f32 = 6.0;
const CM_PER_INCH: f32 = 2.54;
const MM_PER_INCH: f32 = 25.4;

/// Unit of an SVG length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    /// Plain number, user units.
    Number,
    Px,
    Percent,
    Em,
    Ex,
    In,
    Cm,
    Mm,
    Pt,
    Pc,
}

/// Which viewport dimension a percentage refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthDir {
    Horizontal,
    Vertical,
    /// Normalized diagonal, used for radii.
    Both,
}

/// SVG length value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

impl Length {
    pub const fn new(value: f32, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub const fn number(value: f32) -> Self {
        Self::new(value, LengthUnit::Number)
    }

    pub const fn percent(value: f32) -> Self {
        Self::new(value, LengthUnit::Percent)
    }

    /// Parse length string.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (number, unit) = s.split_at(number_prefix_len(s));
        let value: f32 = number.parse().ok()?;
        if !value.is_finite() {
            return None;
        }

        let unit = match unit {
            "" => LengthUnit::Number,
            "%" => LengthUnit::Percent,
            "px" => LengthUnit::Px,
            "em" => LengthUnit::Em,
            "ex" => LengthUnit::Ex,
            "in" => LengthUnit::In,
            "cm" => LengthUnit::Cm,
            "mm" => LengthUnit::Mm,
            "pt" => LengthUnit::Pt,
            "pc" => LengthUnit::Pc,
            _ => return None,
        };
        Some(Length::new(value, unit))
    }

    /// Convert to user units.
    pub fn normalize(&self, dir: LengthDir, viewport: Viewport, font_size: f32) -> f32 {
        let v = self.value;
        match self.unit {
            LengthUnit::Number | LengthUnit::Px => v,
            LengthUnit::Percent => {
                let basis = match dir {
                    LengthDir::Horizontal => viewport.width,
                    LengthDir::Vertical => viewport.height,
                    LengthDir::Both => {
                        ((viewport.width * viewport.width + viewport.height * viewport.height) / 2.0)
                            .sqrt()
                    }
                };
                basis * v / 100.0
            }
            LengthUnit::Em => v * font_size,
            LengthUnit::Ex => v * font_size / 2.0,
            LengthUnit::In => v * DPI,
            LengthUnit::Cm => v * DPI / CM_PER_INCH,
            LengthUnit::Mm => v * DPI / MM_PER_INCH,
            LengthUnit::Pt => v * DPI / POINTS_PER_INCH,
            LengthUnit::Pc => v * DPI / PICA_PER_INCH,
        }
    }
}

/// Length of the leading `[+-]digits[.digits][e[+-]digits]` run.
fn number_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    i = digits(i);
    if bytes.get(i) == Some(&b'.') {
        i = digits(i + 1);
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        if bytes.get(j).is_some_and(u8::is_ascii_digit) {
            i = digits(j);
        }
    }
    i
}
