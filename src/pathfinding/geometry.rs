use serde::{Deserialize, Serialize};

use super::models::Coord;

pub fn euclidean_distance(p1: Coord, p2: Coord) -> f64 {
    let dx = (p2.0 - p1.0) as f64;
    let dy = (p2.1 - p1.1) as f64;
    dx.hypot(dy)
}

pub fn manhattan_distance(p1: Coord, p2: Coord) -> f64 {
    ((p2.0 - p1.0).abs() + (p2.1 - p1.1).abs()) as f64
}

/// Grid cells at most this far apart may share a corridor edge (one diagonal step).
pub const MAX_ADJACENT_DISTANCE: f64 = std::f64::consts::SQRT_2;

pub fn is_grid_adjacent(p1: Coord, p2: Coord) -> bool {
    // small slack so the diagonal step itself is never rejected by rounding
    euclidean_distance(p1, p2) <= MAX_ADJACENT_DISTANCE + 1e-9
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
}

impl DistanceMetric {
    pub fn distance(self, p1: Coord, p2: Coord) -> f64 {
        match self {
            DistanceMetric::Euclidean => euclidean_distance(p1, p2),
            DistanceMetric::Manhattan => manhattan_distance(p1, p2),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "euclid" => Some(DistanceMetric::Euclidean),
            "manhattan" | "taxicab" => Some(DistanceMetric::Manhattan),
            _ => None,
        }
    }
}
