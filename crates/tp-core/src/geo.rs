//! Planar geometry: `Position` and the `Shape` polyline every edge carries.
//!
//! Network coordinates are projected metres (x east, y north), so distances
//! are plain Euclidean.  A `Shape` is the reference geometry of an edge; a
//! stage resolves "position `p` along edge `e`" to a point on that shape,
//! optionally shifted sideways by a lateral offset.
//!
//! # Lateral sign convention
//!
//! A positive lateral offset moves the point to the **right** of the
//! direction of travel; negative moves it left.  Roadside clearances are
//! therefore positive in right-hand traffic and mirrored for left-hand
//! networks.

/// A point in projected network coordinates (metres).
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance_to(self, other: Position) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Point `len` metres from `self` in direction `angle` (radians).
    #[inline]
    pub fn moved(self, angle: f64, len: f64) -> Position {
        Position::new(self.x + angle.cos() * len, self.y + angle.sin() * len)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ── Shape ─────────────────────────────────────────────────────────────────────

/// An open polyline.  Offsets are measured along the line from its first
/// point and clamped to `[0, length]`.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    points: Vec<Position>,
}

impl Shape {
    pub fn new(points: Vec<Position>) -> Self {
        Self { points }
    }

    /// Straight two-point shape.
    pub fn line(from: Position, to: Position) -> Self {
        Self { points: vec![from, to] }
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    /// Geometric length of the polyline.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(w[1]))
            .sum()
    }

    /// Point at `offset` along the line, shifted `lateral` metres to the right.
    pub fn position_at_offset(&self, offset: f64, lateral: f64) -> Position {
        match self.segment_at(offset) {
            None => self.points.first().copied().unwrap_or_default(),
            Some((from, to, within)) => {
                let seg_len = from.distance_to(to);
                let dx = (to.x - from.x) / seg_len;
                let dy = (to.y - from.y) / seg_len;
                Position::new(
                    from.x + dx * within + dy * lateral,
                    from.y + dy * within - dx * lateral,
                )
            }
        }
    }

    /// Heading (radians, counter-clockwise from east) of the segment
    /// containing `offset`.  Zero for degenerate shapes.
    pub fn rotation_at_offset(&self, offset: f64) -> f64 {
        match self.segment_at(offset) {
            None => 0.0,
            Some((from, to, _)) => (to.y - from.y).atan2(to.x - from.x),
        }
    }

    /// `(segment start, segment end, offset within segment)` for the first
    /// non-degenerate segment covering `offset`.
    fn segment_at(&self, offset: f64) -> Option<(Position, Position, f64)> {
        let mut remaining = offset.max(0.0);
        let mut last = None;
        for w in self.points.windows(2) {
            let seg_len = w[0].distance_to(w[1]);
            if seg_len <= f64::EPSILON {
                continue;
            }
            if remaining <= seg_len {
                return Some((w[0], w[1], remaining));
            }
            remaining -= seg_len;
            last = Some((w[0], w[1], seg_len));
        }
        last
    }
}
