//! Planar coordinate type and bounding boxes.
//!
//! Scenario networks are stored in a projected coordinate reference system
//! (metres), so all geometry here is plain Euclidean in `f64`.

/// A projected planar coordinate, in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: Coord) -> f64 {
        self.distance_2(other).sqrt()
    }

    /// Squared Euclidean distance.  Cheaper than `distance` for comparisons.
    #[inline]
    pub fn distance_2(self, other: Coord) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Point at fraction `t` (0 = `self`, 1 = `other`) along the segment.
    #[inline]
    pub fn lerp(self, other: Coord, t: f64) -> Coord {
        Coord::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box.
///
/// An empty box (`Bounds::EMPTY`) has `min > max`; extending it with the
/// first coordinate makes it a degenerate point box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: Coord,
    pub max: Coord,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min: Coord { x: f64::INFINITY, y: f64::INFINITY },
        max: Coord { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY },
    };

    /// Smallest box containing every coordinate in `coords`.
    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Self {
        let mut b = Self::EMPTY;
        for c in coords {
            b.extend(*c);
        }
        b
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    #[inline]
    pub fn extend(&mut self, c: Coord) {
        self.min.x = self.min.x.min(c.x);
        self.min.y = self.min.y.min(c.y);
        self.max.x = self.max.x.max(c.x);
        self.max.y = self.max.y.max(c.y);
    }

    /// Grow the box by `margin` on every side.
    #[inline]
    pub fn expanded(self, margin: f64) -> Bounds {
        Bounds {
            min: Coord::new(self.min.x - margin, self.min.y - margin),
            max: Coord::new(self.max.x + margin, self.max.y + margin),
        }
    }

    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        c.x >= self.min.x && c.x <= self.max.x && c.y >= self.min.y && c.y <= self.max.y
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}
