use crate::package::SlideSize;
use crate::xml::{XmlDocument, A};
use indextree::NodeId;
use serde::{Deserialize, Serialize};

/// Angle unit of `a:xfrm/@rot`: 60000ths of a degree.
pub const ROTATION_UNITS_PER_DEGREE: f64 = 60_000.0;

/// An `a:xfrm` as written, in the coordinate space of the shape's parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawTransform {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
    pub rot: i64,
    pub flip_h: bool,
    pub flip_v: bool,
}

/// Child coordinate space of a group (`a:chOff`/`a:chExt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChildExtents {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// Per-axis affine map from a coordinate space into slide space:
/// `slide = offset + local * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSpace {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for CoordinateSpace {
    fn default() -> Self {
        Self::identity()
    }
}

impl CoordinateSpace {
    pub fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    /// The space a group's children live in, given the group's own transform
    /// (expressed in `self`) and its child extents. The group's rotation and
    /// flips are not part of the map.
    pub fn enter_group(&self, group: &RawTransform, child: &ChildExtents) -> Self {
        let axis = |ext: i64, ch_ext: i64| {
            if ch_ext == 0 {
                1.0
            } else {
                ext as f64 / ch_ext as f64
            }
        };
        let local_sx = axis(group.cx, child.cx);
        let local_sy = axis(group.cy, child.cy);

        // child -> group parent: off + (c - chOff) * s
        let local_ox = group.x as f64 - child.x as f64 * local_sx;
        let local_oy = group.y as f64 - child.y as f64 * local_sy;

        Self {
            scale_x: self.scale_x * local_sx,
            scale_y: self.scale_y * local_sy,
            offset_x: self.offset_x + local_ox * self.scale_x,
            offset_y: self.offset_y + local_oy * self.scale_y,
        }
    }

    /// False once a group with zero `ext` over a non-zero `chExt` has collapsed
    /// an axis; slide positions can no longer be mapped back into such a space.
    pub fn is_invertible(&self) -> bool {
        self.scale_x != 0.0 && self.scale_y != 0.0
    }

    fn to_slide(&self, x: f64, y: f64) -> (f64, f64) {
        (self.offset_x + x * self.scale_x, self.offset_y + y * self.scale_y)
    }

    fn from_slide(&self, x: f64, y: f64) -> (f64, f64) {
        let sx = if self.scale_x == 0.0 { 1.0 } else { self.scale_x };
        let sy = if self.scale_y == 0.0 { 1.0 } else { self.scale_y };
        ((x - self.offset_x) / sx, (y - self.offset_y) / sy)
    }
}

/// Position and size as fractions of the slide, plus rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub flip_h: bool,
    #[serde(default)]
    pub flip_v: bool,
}

impl Bounds {
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height, self.rotation]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Equal within `tolerance` on every numeric component.
    pub fn approx_eq(&self, other: &Bounds, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
            && (self.rotation - other.rotation).abs() <= tolerance
            && self.flip_h == other.flip_h
            && self.flip_v == other.flip_v
    }
}

/// Maps a transform written in `space` to slide-relative bounds.
pub fn normalize(raw: &RawTransform, space: &CoordinateSpace, slide: SlideSize) -> Bounds {
    let (x, y) = space.to_slide(raw.x as f64, raw.y as f64);
    let width = raw.cx as f64 * space.scale_x;
    let height = raw.cy as f64 * space.scale_y;
    let w = slide.width.max(1) as f64;
    let h = slide.height.max(1) as f64;

    Bounds {
        x: x / w,
        y: y / h,
        width: width / w,
        height: height / h,
        rotation: raw.rot as f64 / ROTATION_UNITS_PER_DEGREE,
        flip_h: raw.flip_h,
        flip_v: raw.flip_v,
    }
}

/// Exact inverse of [`normalize`], rounding to the nearest EMU. Only defined
/// for spaces where [`CoordinateSpace::is_invertible`] holds; a collapsed axis
/// is written unscaled.
pub fn denormalize(bounds: &Bounds, space: &CoordinateSpace, slide: SlideSize) -> RawTransform {
    let w = slide.width.max(1) as f64;
    let h = slide.height.max(1) as f64;
    let (x, y) = space.from_slide(bounds.x * w, bounds.y * h);
    let sx = if space.scale_x == 0.0 { 1.0 } else { space.scale_x };
    let sy = if space.scale_y == 0.0 { 1.0 } else { space.scale_y };

    RawTransform {
        x: x.round() as i64,
        y: y.round() as i64,
        cx: (bounds.width * w / sx).round() as i64,
        cy: (bounds.height * h / sy).round() as i64,
        rot: (bounds.rotation * ROTATION_UNITS_PER_DEGREE).round() as i64,
        flip_h: bounds.flip_h,
        flip_v: bounds.flip_v,
    }
}

/// Outcome of reading an optional `a:xfrm`-like element.
pub type XfrmRead<T> = std::result::Result<Option<T>, String>;

fn int_attr(doc: &XmlDocument, node: NodeId, name: &str, default: Option<i64>) -> std::result::Result<i64, String> {
    match doc.attr(node, name) {
        Some(v) => v
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("non-numeric {}=\"{}\"", name, v)),
        None => default.ok_or_else(|| format!("missing {}", name)),
    }
}

fn bool_attr(doc: &XmlDocument, node: NodeId, name: &str) -> bool {
    matches!(doc.attr(node, name), Some("1") | Some("true"))
}

/// Reads an `a:xfrm` or `p:xfrm` element. `Ok(None)` when `xfrm` is `None`
/// or carries neither offset nor extents.
pub fn read_transform(doc: &XmlDocument, xfrm: Option<NodeId>) -> XfrmRead<RawTransform> {
    let Some(xfrm) = xfrm else {
        return Ok(None);
    };
    let off = doc.first_child(xfrm, &A::off());
    let ext = doc.first_child(xfrm, &A::ext());
    if off.is_none() && ext.is_none() {
        return Ok(None);
    }

    let (x, y) = match off {
        Some(off) => (int_attr(doc, off, "x", None)?, int_attr(doc, off, "y", None)?),
        None => (0, 0),
    };
    let (cx, cy) = match ext {
        Some(ext) => (int_attr(doc, ext, "cx", None)?, int_attr(doc, ext, "cy", None)?),
        None => (0, 0),
    };
    if cx < 0 || cy < 0 {
        return Err("negative extents".to_string());
    }

    Ok(Some(RawTransform {
        x,
        y,
        cx,
        cy,
        rot: int_attr(doc, xfrm, "rot", Some(0))?,
        flip_h: bool_attr(doc, xfrm, "flipH"),
        flip_v: bool_attr(doc, xfrm, "flipV"),
    }))
}

/// Reads `a:chOff`/`a:chExt` of a group transform. Missing child extents mean
/// the children share the group's own coordinates.
pub fn read_child_extents(doc: &XmlDocument, xfrm: NodeId, own: &RawTransform) -> std::result::Result<ChildExtents, String> {
    let (x, y) = match doc.first_child(xfrm, &A::chOff()) {
        Some(n) => (int_attr(doc, n, "x", None)?, int_attr(doc, n, "y", None)?),
        None => (own.x, own.y),
    };
    let (cx, cy) = match doc.first_child(xfrm, &A::chExt()) {
        Some(n) => (int_attr(doc, n, "cx", None)?, int_attr(doc, n, "cy", None)?),
        None => (own.cx, own.cy),
    };
    Ok(ChildExtents { x, y, cx, cy })
}
