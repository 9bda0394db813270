//! Point types for the three coordinate spaces.

/// A point in source-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another pixel point.
    pub fn distance_to(&self, other: &PixelPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Check whether the point lies in `[0, width) x [0, height)`.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        (0.0..f64::from(width)).contains(&self.x) && (0.0..f64::from(height)).contains(&self.y)
    }
}

impl From<[f64; 2]> for PixelPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<PixelPoint> for [f64; 2] {
    fn from(point: PixelPoint) -> Self {
        [point.x, point.y]
    }
}

impl std::fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// A point in calibrated real-world units.
///
/// Stores hold `Option<RealPoint>`; `None` is the unset pair recorded when
/// no calibration existed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RealPoint {
    pub x: f64,
    pub y: f64,
}

impl RealPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Parse user input of the form `"x,y"`.
    ///
    /// Exactly two comma-separated numbers are accepted; surrounding
    /// whitespace on each number is ignored.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split(',');
        let x = parts.next()?.trim().parse::<f64>().ok()?;
        let y = parts.next()?.trim().parse::<f64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(x, y))
    }
}

impl From<RealPoint> for [f64; 2] {
    fn from(point: RealPoint) -> Self {
        [point.x, point.y]
    }
}

impl std::fmt::Display for RealPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
