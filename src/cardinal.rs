use serde::Serialize;
use std::fmt;

/// One of the eight principal compass points, labelled as on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardinalPoint {
    #[serde(rename = "Nord")]
    North,
    #[serde(rename = "Nord-Est")]
    NorthEast,
    #[serde(rename = "Est")]
    East,
    #[serde(rename = "Sud-Est")]
    SouthEast,
    #[serde(rename = "Sud")]
    South,
    #[serde(rename = "Sud-Ovest")]
    SouthWest,
    #[serde(rename = "Ovest")]
    West,
    #[serde(rename = "Nord-Ovest")]
    NorthWest,
}

impl CardinalPoint {
    /// Reference points in resolution order; earlier entries win ties.
    pub const ALL: [CardinalPoint; 8] = [
        CardinalPoint::North,
        CardinalPoint::NorthEast,
        CardinalPoint::East,
        CardinalPoint::SouthEast,
        CardinalPoint::South,
        CardinalPoint::SouthWest,
        CardinalPoint::West,
        CardinalPoint::NorthWest,
    ];

    pub fn bearing(&self) -> f64 {
        match self {
            CardinalPoint::North => 0.0,
            CardinalPoint::NorthEast => 45.0,
            CardinalPoint::East => 90.0,
            CardinalPoint::SouthEast => 135.0,
            CardinalPoint::South => 180.0,
            CardinalPoint::SouthWest => 225.0,
            CardinalPoint::West => 270.0,
            CardinalPoint::NorthWest => 315.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardinalPoint::North => "Nord",
            CardinalPoint::NorthEast => "Nord-Est",
            CardinalPoint::East => "Est",
            CardinalPoint::SouthEast => "Sud-Est",
            CardinalPoint::South => "Sud",
            CardinalPoint::SouthWest => "Sud-Ovest",
            CardinalPoint::West => "Ovest",
            CardinalPoint::NorthWest => "Nord-Ovest",
        }
    }
}

impl fmt::Display for CardinalPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolves a wind bearing in degrees to the closest compass point.
///
/// Distance is measured around the circle, so 350° is 10° from north.
/// Bearings outside [0, 360) are wrapped first. Equidistant points resolve
/// to the one listed first in [`CardinalPoint::ALL`].
pub fn nearest_cardinal(angle_degrees: f64) -> CardinalPoint {
    let angle = angle_degrees.rem_euclid(360.0);
    let mut best = CardinalPoint::North;
    let mut best_distance = f64::INFINITY;
    for point in CardinalPoint::ALL {
        let distance = circular_distance(angle, point.bearing());
        if distance < best_distance {
            best = point;
            best_distance = distance;
        }
    }
    best
}

fn circular_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs();
    diff.min(360.0 - diff)
}
