//! Shape checks over raw map data.
//!
//! Nothing here rejects a map: the builder already drops what it cannot use.
//! The report tells map authors what was dropped or looks suspicious.

use log::warn;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use super::geometry::is_grid_adjacent;
use super::models::{Coord, LevelMap};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum MapIssue {
    ShortCorridor { level: i32, corridor: String, points: usize },
    NonAdjacentPair { level: i32, corridor: String, from: Coord, to: Coord },
    OutsideGrid { level: i32, id: String, at: Coord },
    DuplicateId { level: i32, id: String },
    DuplicateLevel { level: i32 },
    UnknownRampTarget { level: i32, ramp: String, to_level: i32 },
    InvalidRampCost { level: i32, ramp: String },
}

pub fn validate_levels(levels: &[LevelMap]) -> Vec<MapIssue> {
    let mut issues = Vec::new();
    let mut seen_levels = BTreeSet::new();
    for l in levels {
        if !seen_levels.insert(l.level) {
            issues.push(MapIssue::DuplicateLevel { level: l.level });
        }
    }

    let mut ids: HashSet<&str> = HashSet::new();
    for l in levels {
        let lvl = l.level;
        let in_grid = |id: &str, at: Coord, issues: &mut Vec<MapIssue>| {
            if let Some(g) = l.grid_size {
                if !g.contains(at) {
                    issues.push(MapIssue::OutsideGrid { level: lvl, id: id.to_string(), at });
                }
            }
        };

        for c in &l.corridors {
            if c.points.len() < 2 {
                issues.push(MapIssue::ShortCorridor { level: lvl, corridor: c.id.clone(), points: c.points.len() });
            }
            for w in c.points.windows(2) {
                if !is_grid_adjacent(w[0], w[1]) {
                    issues.push(MapIssue::NonAdjacentPair { level: lvl, corridor: c.id.clone(), from: w[0], to: w[1] });
                }
            }
            for &p in &c.points {
                in_grid(&c.id, p, &mut issues);
            }
        }

        let pois = l
            .entrances
            .iter()
            .map(|e| (e.id.as_str(), (e.x, e.y)))
            .chain(l.exits.iter().map(|x| (x.id.as_str(), (x.x, x.y))))
            .chain(l.slots.iter().map(|s| (s.id.as_str(), (s.x, s.y))));
        for (id, at) in pois {
            if !ids.insert(id) {
                issues.push(MapIssue::DuplicateId { level: lvl, id: id.to_string() });
            }
            in_grid(id, at, &mut issues);
        }

        for r in &l.ramps {
            if !seen_levels.contains(&r.to_level) {
                issues.push(MapIssue::UnknownRampTarget { level: lvl, ramp: r.id.clone(), to_level: r.to_level });
            }
            if r.cost.map_or(false, |c| !c.is_finite() || c < 0.0) {
                issues.push(MapIssue::InvalidRampCost { level: lvl, ramp: r.id.clone() });
            }
        }
    }

    for issue in &issues {
        warn!("validate: {:?}", issue);
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::models::{Corridor, CorridorDirection, Entrance, GridSize, Ramp, RampDirection};

    fn empty(level: i32) -> LevelMap {
        LevelMap {
            building_name: String::new(),
            level,
            grid_size: Some(GridSize::Square(4)),
            entrances: vec![],
            exits: vec![],
            slots: vec![],
            corridors: vec![],
            ramps: vec![],
        }
    }

    #[test]
    fn clean_map_has_no_issues() {
        let mut l = empty(1);
        l.corridors.push(Corridor { id: "C".into(), points: vec![(0, 0), (1, 1)], direction: CorridorDirection::Both });
        assert!(validate_levels(&[l]).is_empty());
    }

    #[test]
    fn reports_each_problem() {
        let mut l = empty(1);
        l.corridors.push(Corridor { id: "J".into(), points: vec![(0, 0), (3, 3)], direction: CorridorDirection::Both });
        l.corridors.push(Corridor { id: "S".into(), points: vec![(1, 1)], direction: CorridorDirection::Both });
        l.entrances.push(Entrance { id: "E".into(), x: 9, y: 0, kind: None });
        l.entrances.push(Entrance { id: "E".into(), x: 0, y: 0, kind: None });
        l.ramps.push(Ramp { id: "R".into(), x: 0, y: 0, to_level: 5, to_x: 0, to_y: 0, direction: RampDirection::Up, cost: Some(f64::NAN) });
        let issues = validate_levels(&[l, empty(1)]);
        assert!(issues.contains(&MapIssue::DuplicateLevel { level: 1 }));
        assert!(issues.contains(&MapIssue::NonAdjacentPair { level: 1, corridor: "J".into(), from: (0, 0), to: (3, 3) }));
        assert!(issues.contains(&MapIssue::ShortCorridor { level: 1, corridor: "S".into(), points: 1 }));
        assert!(issues.contains(&MapIssue::OutsideGrid { level: 1, id: "E".into(), at: (9, 0) }));
        assert!(issues.contains(&MapIssue::DuplicateId { level: 1, id: "E".into() }));
        assert!(issues.contains(&MapIssue::UnknownRampTarget { level: 1, ramp: "R".into(), to_level: 5 }));
        assert!(issues.contains(&MapIssue::InvalidRampCost { level: 1, ramp: "R".into() }));
    }
}
