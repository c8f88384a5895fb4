use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid cell within a single level.
pub type Coord = (i32, i32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Node {
    pub level: i32,
    pub x: i32,
    pub y: i32,
}

impl Node {
    pub fn new(level: i32, x: i32, y: i32) -> Self {
        Self { level, x, y }
    }

    pub fn at(level: i32, c: Coord) -> Self {
        Self { level, x: c.0, y: c.1 }
    }

    pub fn coord(&self) -> Coord {
        (self.x, self.y)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.level, self.x, self.y)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorridorDirection {
    #[default]
    Both,
    Forward,
    Backward,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RampDirection {
    Up,
    Down,
    #[default]
    Both,
}

impl RampDirection {
    /// Edge direction from the ramp's own end (`from_level`) toward its far end.
    pub fn as_corridor_direction(self, from_level: i32, to_level: i32) -> CorridorDirection {
        let ascending = to_level >= from_level;
        match (self, ascending) {
            (RampDirection::Both, _) => CorridorDirection::Both,
            (RampDirection::Up, true) | (RampDirection::Down, false) => CorridorDirection::Forward,
            (RampDirection::Up, false) | (RampDirection::Down, true) => CorridorDirection::Backward,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    #[default]
    Available,
    Occupied,
    Allocated,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum GridSize {
    Square(u32),
    Rect { width: u32, height: u32 },
}

impl GridSize {
    pub fn dims(&self) -> (u32, u32) {
        match *self {
            GridSize::Square(n) => (n, n),
            GridSize::Rect { width, height } => (width, height),
        }
    }

    pub fn contains(&self, c: Coord) -> bool {
        let (w, h) = self.dims();
        c.0 >= 0 && c.1 >= 0 && (c.0 as i64) < w as i64 && (c.1 as i64) < h as i64
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entrance {
    pub id: String,
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exit {
    pub id: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub status: SlotStatus,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub reserved_by: Option<String>,
}

impl Slot {
    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub id: String,
    #[serde(default)]
    pub points: Vec<Coord>,
    #[serde(default)]
    pub direction: CorridorDirection,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub to_level: i32,
    pub to_x: i32,
    pub to_y: i32,
    #[serde(default)]
    pub direction: RampDirection,
    #[serde(default)]
    pub cost: Option<f64>,
}

/// One level of a facility map as delivered by the document store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelMap {
    #[serde(default)]
    pub building_name: String,
    pub level: i32,
    #[serde(default)]
    pub grid_size: Option<GridSize>,
    #[serde(default)]
    pub entrances: Vec<Entrance>,
    #[serde(default)]
    pub exits: Vec<Exit>,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default)]
    pub corridors: Vec<Corridor>,
    #[serde(default)]
    pub ramps: Vec<Ramp>,
}

/// Something with a position on its level.
pub trait Located {
    fn coord(&self) -> Coord;
}

impl Located for Entrance {
    fn coord(&self) -> Coord {
        (self.x, self.y)
    }
}

impl Located for Exit {
    fn coord(&self) -> Coord {
        (self.x, self.y)
    }
}

impl Located for Slot {
    fn coord(&self) -> Coord {
        (self.x, self.y)
    }
}

impl Located for Coord {
    fn coord(&self) -> Coord {
        *self
    }
}

impl<T: Located> Located for &T {
    fn coord(&self) -> Coord {
        (**self).coord()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_direction_follows_levels() {
        assert_eq!(RampDirection::Up.as_corridor_direction(1, 2), CorridorDirection::Forward);
        assert_eq!(RampDirection::Up.as_corridor_direction(2, 1), CorridorDirection::Backward);
        assert_eq!(RampDirection::Down.as_corridor_direction(2, 1), CorridorDirection::Forward);
        assert_eq!(RampDirection::Down.as_corridor_direction(1, 2), CorridorDirection::Backward);
        assert_eq!(RampDirection::Both.as_corridor_direction(3, 1), CorridorDirection::Both);
    }

    #[test]
    fn level_map_parses_with_defaults() {
        let raw = r#"{
            "building_name": "North",
            "level": 1,
            "grid_size": 6,
            "slots": [{"id": "1A", "x": 1, "y": 1, "status": "occupied", "vehicle_id": "V9"}],
            "corridors": [{"id": "C1", "points": [[0,0],[1,0]]}],
            "ramps": [{"id": "R1", "x": 0, "y": 0, "to_level": 2, "to_x": 0, "to_y": 1, "direction": "up"}]
        }"#;
        let lvl: LevelMap = serde_json::from_str(raw).unwrap();
        assert_eq!(lvl.grid_size.map(|g| g.dims()), Some((6, 6)));
        assert!(lvl.entrances.is_empty());
        assert_eq!(lvl.slots[0].status, SlotStatus::Occupied);
        assert_eq!(lvl.slots[0].vehicle_id.as_deref(), Some("V9"));
        assert_eq!(lvl.corridors[0].direction, CorridorDirection::Both);
        assert_eq!(lvl.corridors[0].points, vec![(0, 0), (1, 0)]);
        assert_eq!(lvl.ramps[0].direction, RampDirection::Up);
        assert_eq!(lvl.ramps[0].cost, None);
    }

    #[test]
    fn grid_size_rect_form() {
        let g: GridSize = serde_json::from_str(r#"{"width": 4, "height": 2}"#).unwrap();
        assert_eq!(g.dims(), (4, 2));
        assert!(g.contains((3, 1)));
        assert!(!g.contains((4, 0)));
        assert!(!g.contains((-1, 0)));
    }
}
