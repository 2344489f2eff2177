pub use kurbo::{Point, Rect};

/// Index of an audio clip in the ballot's clip table.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ClipIndex(pub usize);

/// Width/height pair used by the size-equality checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Axis-aligned integer pixel rectangle as authored in a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RectDef {
    /// Left edge in pixels.
    pub left: u32,
    /// Top edge in pixels.
    pub top: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl RectDef {
    /// Size of the rectangle.
    pub fn size(self) -> SpriteSize {
        SpriteSize {
            width: self.width,
            height: self.height,
        }
    }

    /// Convert to a float rect for geometry queries.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.left),
            f64::from(self.top),
            f64::from(self.left) + f64::from(self.width),
            f64::from(self.top) + f64::from(self.height),
        )
    }

    /// Return `true` when `p` lies inside the half-open pixel extent.
    pub fn contains(self, p: Point) -> bool {
        let r = self.to_rect();
        p.x >= r.x0 && p.x < r.x1 && p.y >= r.y0 && p.y < r.y1
    }

    /// Return `true` when two rectangles share any pixel.
    pub fn overlaps(self, other: RectDef) -> bool {
        let a = self.to_rect();
        let b = other.to_rect();
        let i = a.intersect(b);
        i.width() > 0.0 && i.height() > 0.0
    }
}

/// Interpret an authored `-1`-sentinel index field.
pub(crate) fn opt_index(i: i32) -> Option<usize> {
    usize::try_from(i).ok()
}
