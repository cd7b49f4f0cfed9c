//! SVG color literals.
//!
//! Recognizes `currentColor`, `#rgb`, `#rrggbb`, `rgb()`/`rgba()` and the SVG
//! named color keywords.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attributes::clamp_unit;
use crate::error::{PaintError, Result};

/// An sRGB color with 8 bits per channel, straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);
    pub const WHITE: Color = Color::from_rgb(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Scale alpha by `opacity` (clamped to [0, 1]), rounding to the nearest step.
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = clamp_unit(opacity);
        let alpha = (f32::from(self.a) * opacity).round().clamp(0.0, 255.0);
        Self {
            a: alpha as u8,
            ..self
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                f32::from(self.a) / 255.0
            )
        }
    }
}

/// A parsed color token: either a literal color or the `currentColor` keyword,
/// which is only resolved when the paint is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorValue {
    CurrentColor,
    Rgba(Color),
}

impl ColorValue {
    /// Resolve against the element's current color.
    pub fn resolve(self, current_color: Color) -> Color {
        match self {
            ColorValue::CurrentColor => current_color,
            ColorValue::Rgba(color) => color,
        }
    }
}

impl From<Color> for ColorValue {
    fn from(color: Color) -> Self {
        ColorValue::Rgba(color)
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorValue::CurrentColor => f.write_str("currentColor"),
            ColorValue::Rgba(color) => color.fmt(f),
        }
    }
}

impl FromStr for ColorValue {
    type Err = PaintError;

    fn from_str(s: &str) -> Result<Self> {
        parse_color(s)
    }
}

impl FromStr for Color {
    type Err = PaintError;

    /// Parses a literal color; `currentColor` is rejected since it has no
    /// value outside an element context.
    fn from_str(s: &str) -> Result<Self> {
        match parse_color(s)? {
            ColorValue::Rgba(color) => Ok(color),
            ColorValue::CurrentColor => Err(PaintError::invalid_color(s)),
        }
    }
}

/// Parse a color token.
pub fn parse_color(s: &str) -> Result<ColorValue> {
    let s = s.trim();

    if s == "currentColor" {
        return Ok(ColorValue::CurrentColor);
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex)
            .map(ColorValue::Rgba)
            .ok_or_else(|| PaintError::invalid_color(s));
    }

    let lower = s.to_ascii_lowercase();
    if let Some(inner) = function_args(&lower, "rgba") {
        return parse_rgb_function(inner, true)
            .map(ColorValue::Rgba)
            .ok_or_else(|| PaintError::invalid_color(s));
    }
    if let Some(inner) = function_args(&lower, "rgb") {
        return parse_rgb_function(inner, false)
            .map(ColorValue::Rgba)
            .ok_or_else(|| PaintError::invalid_color(s));
    }

    named_color(&lower)
        .map(ColorValue::Rgba)
        .ok_or_else(|| PaintError::invalid_color(s))
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Color::from_rgb(r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::from_rgb(r, g, b))
        }
        _ => None,
    }
}

/// Returns the text between `name(` and the closing `)`.
fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(name)?.trim_start();
    rest.strip_prefix('(')?.strip_suffix(')')
}

fn parse_rgb_function(inner: &str, with_alpha: bool) -> Option<Color> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    // Channels are either all integers or all percentages.
    let percent = parts[0].ends_with('%');
    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts[..3]) {
        if part.ends_with('%') != percent {
            return None;
        }
        *slot = if percent {
            parse_percent_channel(part)?
        } else {
            parse_integer_channel(part)?
        };
    }

    let alpha = if with_alpha {
        let a: f32 = parts[3].parse().ok()?;
        if !(0.0..=1.0).contains(&a) {
            return None;
        }
        (a * 255.0).round() as u8
    } else {
        255
    };

    Some(Color::new(channels[0], channels[1], channels[2], alpha))
}

fn parse_integer_channel(s: &str) -> Option<u8> {
    let value: i32 = s.parse().ok()?;
    u8::try_from(value).ok()
}

fn parse_percent_channel(s: &str) -> Option<u8> {
    let value: f32 = s.trim_end_matches('%').trim().parse().ok()?;
    if !(0.0..=100.0).contains(&value) {
        return None;
    }
    Some((value * 255.0 / 100.0).round() as u8)
}

/// Look up an SVG color keyword (lowercase).
pub fn named_color(name: &str) -> Option<Color> {
    let rgb = |r, g, b| Some(Color::from_rgb(r, g, b));
    match name {
        "aliceblue" => rgb(240, 248, 255),
        "antiquewhite" => rgb(250, 235, 215),
        "aqua" => rgb(0, 255, 255),
        "aquamarine" => rgb(127, 255, 212),
        "azure" => rgb(240, 255, 255),
        "beige" => rgb(245, 245, 220),
        "bisque" => rgb(255, 228, 196),
        "black" => rgb(0, 0, 0),
        "blanchedalmond" => rgb(255, 235, 205),
        "blue" => rgb(0, 0, 255),
        "blueviolet" => rgb(138, 43, 226),
        "brown" => rgb(165, 42, 42),
        "burlywood" => rgb(222, 184, 135),
        "cadetblue" => rgb(95, 158, 160),
        "chartreuse" => rgb(127, 255, 0),
        "chocolate" => rgb(210, 105, 30),
        "coral" => rgb(255, 127, 80),
        "cornflowerblue" => rgb(100, 149, 237),
        "cornsilk" => rgb(255, 248, 220),
        "crimson" => rgb(220, 20, 60),
        "cyan" => rgb(0, 255, 255),
        "darkblue" => rgb(0, 0, 139),
        "darkcyan" => rgb(0, 139, 139),
        "darkgoldenrod" => rgb(184, 134, 11),
        "darkgray" | "darkgrey" => rgb(169, 169, 169),
        "darkgreen" => rgb(0, 100, 0),
        "darkkhaki" => rgb(189, 183, 107),
        "darkmagenta" => rgb(139, 0, 139),
        "darkolivegreen" => rgb(85, 107, 47),
        "darkorange" => rgb(255, 140, 0),
        "darkorchid" => rgb(153, 50, 204),
        "darkred" => rgb(139, 0, 0),
        "darksalmon" => rgb(233, 150, 122),
        "darkseagreen" => rgb(143, 188, 143),
        "darkslateblue" => rgb(72, 61, 139),
        "darkslategray" | "darkslategrey" => rgb(47, 79, 79),
        "darkturquoise" => rgb(0, 206, 209),
        "darkviolet" => rgb(148, 0, 211),
        "deeppink" => rgb(255, 20, 147),
        "deepskyblue" => rgb(0, 191, 255),
        "dimgray" | "dimgrey" => rgb(105, 105, 105),
        "dodgerblue" => rgb(30, 144, 255),
        "firebrick" => rgb(178, 34, 34),
        "floralwhite" => rgb(255, 250, 240),
        "forestgreen" => rgb(34, 139, 34),
        "fuchsia" => rgb(255, 0, 255),
        "gainsboro" => rgb(220, 220, 220),
        "ghostwhite" => rgb(248, 248, 255),
        "gold" => rgb(255, 215, 0),
        "goldenrod" => rgb(218, 165, 32),
        "gray" | "grey" => rgb(128, 128, 128),
        "green" => rgb(0, 128, 0),
        "greenyellow" => rgb(173, 255, 47),
        "honeydew" => rgb(240, 255, 240),
        "hotpink" => rgb(255, 105, 180),
        "indianred" => rgb(205, 92, 92),
        "indigo" => rgb(75, 0, 130),
        "ivory" => rgb(255, 255, 240),
        "khaki" => rgb(240, 230, 140),
        "lavender" => rgb(230, 230, 250),
        "lavenderblush" => rgb(255, 240, 245),
        "lawngreen" => rgb(124, 252, 0),
        "lemonchiffon" => rgb(255, 250, 205),
        "lightblue" => rgb(173, 216, 230),
        "lightcoral" => rgb(240, 128, 128),
        "lightcyan" => rgb(224, 255, 255),
        "lightgoldenrodyellow" => rgb(250, 250, 210),
        "lightgray" | "lightgrey" => rgb(211, 211, 211),
        "lightgreen" => rgb(144, 238, 144),
        "lightpink" => rgb(255, 182, 193),
        "lightsalmon" => rgb(255, 160, 122),
        "lightseagreen" => rgb(32, 178, 170),
        "lightskyblue" => rgb(135, 206, 250),
        "lightslategray" | "lightslategrey" => rgb(119, 136, 153),
        "lightsteelblue" => rgb(176, 196, 222),
        "lightyellow" => rgb(255, 255, 224),
        "lime" => rgb(0, 255, 0),
        "limegreen" => rgb(50, 205, 50),
        "linen" => rgb(250, 240, 230),
        "magenta" => rgb(255, 0, 255),
        "maroon" => rgb(128, 0, 0),
        "mediumaquamarine" => rgb(102, 205, 170),
        "mediumblue" => rgb(0, 0, 205),
        "mediumorchid" => rgb(186, 85, 211),
        "mediumpurple" => rgb(147, 112, 219),
        "mediumseagreen" => rgb(60, 179, 113),
        "mediumslateblue" => rgb(123, 104, 238),
        "mediumspringgreen" => rgb(0, 250, 154),
        "mediumturquoise" => rgb(72, 209, 204),
        "mediumvioletred" => rgb(199, 21, 133),
        "midnightblue" => rgb(25, 25, 112),
        "mintcream" => rgb(245, 255, 250),
        "mistyrose" => rgb(255, 228, 225),
        "moccasin" => rgb(255, 228, 181),
        "navajowhite" => rgb(255, 222, 173),
        "navy" => rgb(0, 0, 128),
        "oldlace" => rgb(253, 245, 230),
        "olive" => rgb(128, 128, 0),
        "olivedrab" => rgb(107, 142, 35),
        "orange" => rgb(255, 165, 0),
        "orangered" => rgb(255, 69, 0),
        "orchid" => rgb(218, 112, 214),
        "palegoldenrod" => rgb(238, 232, 170),
        "palegreen" => rgb(152, 251, 152),
        "paleturquoise" => rgb(175, 238, 238),
        "palevioletred" => rgb(219, 112, 147),
        "papayawhip" => rgb(255, 239, 213),
        "peachpuff" => rgb(255, 218, 185),
        "peru" => rgb(205, 133, 63),
        "pink" => rgb(255, 192, 203),
        "plum" => rgb(221, 160, 221),
        "powderblue" => rgb(176, 224, 230),
        "purple" => rgb(128, 0, 128),
        "red" => rgb(255, 0, 0),
        "rosybrown" => rgb(188, 143, 143),
        "royalblue" => rgb(65, 105, 225),
        "saddlebrown" => rgb(139, 69, 19),
        "salmon" => rgb(250, 128, 114),
        "sandybrown" => rgb(244, 164, 96),
        "seagreen" => rgb(46, 139, 87),
        "seashell" => rgb(255, 245, 238),
        "sienna" => rgb(160, 82, 45),
        "silver" => rgb(192, 192, 192),
        "skyblue" => rgb(135, 206, 235),
        "slateblue" => rgb(106, 90, 205),
        "slategray" | "slategrey" => rgb(112, 128, 144),
        "snow" => rgb(255, 250, 250),
        "springgreen" => rgb(0, 255, 127),
        "steelblue" => rgb(70, 130, 180),
        "tan" => rgb(210, 180, 140),
        "teal" => rgb(0, 128, 128),
        "thistle" => rgb(216, 191, 216),
        "tomato" => rgb(255, 99, 71),
        "turquoise" => rgb(64, 224, 208),
        "violet" => rgb(238, 130, 238),
        "wheat" => rgb(245, 222, 179),
        "white" => rgb(255, 255, 255),
        "whitesmoke" => rgb(245, 245, 245),
        "yellow" => rgb(255, 255, 0),
        "yellowgreen" => rgb(154, 205, 50),
        "transparent" => Some(Color::TRANSPARENT),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(s: &str) -> Color {
        match parse_color(s).unwrap() {
            ColorValue::Rgba(c) => c,
            ColorValue::CurrentColor => panic!("unexpected currentColor for {s}"),
        }
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(rgba("#ff0000"), Color::from_rgb(255, 0, 0));
        assert_eq!(rgba("#f00"), Color::from_rgb(255, 0, 0));
        assert_eq!(rgba("#ABCDEF"), Color::from_rgb(0xab, 0xcd, 0xef));
    }

    #[test]
    fn test_short_hex_expands() {
        assert_eq!(rgba("#abc"), rgba("#aabbcc"));
    }

    #[test]
    fn test_six_digit_hex_is_exact() {
        for value in [0x000000u32, 0x010203, 0x7f8081, 0xfefdfc, 0xffffff] {
            let s = format!("#{value:06x}");
            let c = rgba(&s);
            assert_eq!(c.r, (value >> 16) as u8);
            assert_eq!(c.g, (value >> 8) as u8);
            assert_eq!(c.b, value as u8);
            assert_eq!(c.to_string(), s);
        }
    }

    #[test]
    fn test_bad_hex() {
        assert!(parse_color("#ff00").is_err());
        assert!(parse_color("#ggg").is_err());
        assert!(parse_color("#").is_err());
    }

    #[test]
    fn test_current_color_is_case_sensitive() {
        assert_eq!(parse_color("currentColor").unwrap(), ColorValue::CurrentColor);
        assert!(parse_color("currentcolor").is_err());
    }

    #[test]
    fn test_rgb_function() {
        assert_eq!(rgba("rgb(255, 128, 0)"), Color::from_rgb(255, 128, 0));
        assert_eq!(rgba("RGB( 1,2 ,3 )"), Color::from_rgb(1, 2, 3));
        assert_eq!(rgba("rgb(100%, 50%, 0%)"), Color::from_rgb(255, 128, 0));
    }

    #[test]
    fn test_rgb_out_of_range() {
        assert!(parse_color("rgb(256, 0, 0)").is_err());
        assert!(parse_color("rgb(-1, 0, 0)").is_err());
        assert!(parse_color("rgb(101%, 0%, 0%)").is_err());
        assert!(parse_color("rgb(10%, 0, 0)").is_err());
        assert!(parse_color("rgb(1, 2)").is_err());
    }

    #[test]
    fn test_rgba_function() {
        assert_eq!(rgba("rgba(255, 0, 0, 0.5)"), Color::new(255, 0, 0, 128));
        assert!(parse_color("rgba(255, 0, 0, 2)").is_err());
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(rgba("blue"), Color::from_rgb(0, 0, 255));
        assert_eq!(rgba("Red"), Color::from_rgb(255, 0, 0));
        assert_eq!(rgba("lightgoldenrodyellow"), Color::from_rgb(250, 250, 210));
        assert_eq!(rgba("transparent"), Color::TRANSPARENT);
        assert!(parse_color("none").is_err());
        assert!(parse_color("notacolor").is_err());
    }

    #[test]
    fn test_with_opacity() {
        let c = Color::from_rgb(0x11, 0x22, 0x33).with_opacity(0.5);
        assert_eq!(c.a, 128);
        assert_eq!(Color::from_rgb(1, 2, 3).with_opacity(2.0).a, 255);
        assert_eq!(Color::from_rgb(1, 2, 3).with_opacity(f32::NAN).a, 0);
    }

    #[test]
    fn test_translucent_display_reparses() {
        for a in [0u8, 1, 64, 128, 254] {
            let c = Color::new(10, 20, 30, a);
            assert_eq!(rgba(&c.to_string()), c);
        }
    }
}
