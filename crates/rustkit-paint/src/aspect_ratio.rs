//! `viewBox` and `preserveAspectRatio`, used to map pattern content into
//! its tile.

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Transform2D};

/// SVG viewBox.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewBox {
    /// Parse viewBox attribute. A box with a non-positive size is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let parts = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<f32>().ok())
            .collect::<Option<Vec<f32>>>()?;

        match parts.as_slice() {
            [min_x, min_y, width, height] if *width > 0.0 && *height > 0.0 => Some(ViewBox {
                min_x: *min_x,
                min_y: *min_y,
                width: *width,
                height: *height,
            }),
            _ => None,
        }
    }
}

/// Alignment along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisAlign {
    Min,
    Mid,
    Max,
}

impl AxisAlign {
    fn offset(self, dest_pos: f32, dest_size: f32, obj_size: f32) -> f32 {
        match self {
            AxisAlign::Min => dest_pos,
            AxisAlign::Mid => dest_pos + (dest_size - obj_size) / 2.0,
            AxisAlign::Max => dest_pos + dest_size - obj_size,
        }
    }
}

/// `meet` scales to fit inside, `slice` scales to cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FitMode {
    #[default]
    Meet,
    Slice,
}

/// Parsed `preserveAspectRatio` value. `align == None` means `none`
/// (non-uniform scaling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub defer: bool,
    pub align: Option<(AxisAlign, AxisAlign)>,
    pub fit: FitMode,
}

impl Default for AspectRatio {
    /// `xMidYMid meet`
    fn default() -> Self {
        Self {
            defer: false,
            align: Some((AxisAlign::Mid, AxisAlign::Mid)),
            fit: FitMode::Meet,
        }
    }
}

impl AspectRatio {
    /// Parse `[defer] <align> [meet | slice]`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut tokens = s.split_whitespace().peekable();

        let defer = tokens.next_if_eq(&"defer").is_some();
        let align = parse_align(tokens.next()?)?;
        let fit = match tokens.next() {
            None => FitMode::Meet,
            Some("meet") => FitMode::Meet,
            Some("slice") => FitMode::Slice,
            Some(_) => return None,
        };
        if tokens.next().is_some() {
            return None;
        }

        Some(Self { defer, align, fit })
    }

    /// Place an object of the given size inside `dest`.
    pub fn compute(&self, object_width: f32, object_height: f32, dest: Rect) -> Rect {
        let Some((x_align, y_align)) = self.align else {
            return dest;
        };

        let w_factor = dest.width / object_width;
        let h_factor = dest.height / object_height;
        let factor = match self.fit {
            FitMode::Meet => w_factor.min(h_factor),
            FitMode::Slice => w_factor.max(h_factor),
        };

        let w = object_width * factor;
        let h = object_height * factor;
        Rect::new(
            x_align.offset(dest.x, dest.width, w),
            y_align.offset(dest.y, dest.height, h),
            w,
            h,
        )
    }

    /// Transform mapping `view_box` coordinates into `dest`.
    pub fn view_box_transform(&self, view_box: &ViewBox, dest: Rect) -> Transform2D {
        let placed = self.compute(view_box.width, view_box.height, dest);
        let sx = placed.width / view_box.width;
        let sy = placed.height / view_box.height;
        Transform2D::identity()
            .translate(placed.x - view_box.min_x * sx, placed.y - view_box.min_y * sy)
            .scale(sx, sy)
    }
}

fn parse_align(s: &str) -> Option<Option<(AxisAlign, AxisAlign)>> {
    if s == "none" {
        return Some(None);
    }
    let axis = |a: &str| match a {
        "Min" => Some(AxisAlign::Min),
        "Mid" => Some(AxisAlign::Mid),
        "Max" => Some(AxisAlign::Max),
        _ => None,
    };

    // xMinYMid => ("Min", "Mid")
    let rest = s.strip_prefix('x')?;
    if rest.len() != 7 || !rest.is_char_boundary(3) || &rest[3..4] != "Y" {
        return None;
    }
    Some(Some((axis(&rest[..3])?, axis(&rest[4..])?)))
}
