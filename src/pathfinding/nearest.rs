//! Linear nearest-candidate search.
//!
//! Every finder scans candidates in the order given and only replaces the
//! current best on a strictly smaller distance, so the first-seen candidate
//! wins ties.

use serde::{Deserialize, Serialize};

use super::geometry::euclidean_distance;
use super::models::{Coord, Entrance, LevelMap, Located, Slot};

pub fn find_nearest_point<T: Located>(
    target: Coord,
    candidates: impl IntoIterator<Item = T>,
) -> (Option<T>, f64) {
    find_nearest_point_by(target, candidates, euclidean_distance)
}

pub fn find_nearest_point_by<T: Located>(
    target: Coord,
    candidates: impl IntoIterator<Item = T>,
    distance_fn: impl Fn(Coord, Coord) -> f64,
) -> (Option<T>, f64) {
    let mut best: Option<T> = None;
    let mut best_dist = f64::INFINITY;
    for c in candidates {
        let d = distance_fn(target, c.coord());
        if d < best_dist {
            best_dist = d;
            best = Some(c);
        }
    }
    (best, best_dist)
}

pub fn find_nearest_slot<'a>(
    target: Coord,
    slots: &'a [Slot],
    available_only: bool,
) -> (Option<&'a Slot>, f64) {
    find_nearest_point(target, slots.iter().filter(|s| !available_only || s.is_available()))
}

/// Nearest entrance, optionally restricted to one entrance `type`.
pub fn find_nearest_entrance<'a>(
    target: Coord,
    entrances: &'a [Entrance],
    entrance_type: Option<&str>,
) -> (Option<&'a Entrance>, f64) {
    find_nearest_point(
        target,
        entrances
            .iter()
            .filter(|e| entrance_type.map_or(true, |t| e.kind.as_deref() == Some(t))),
    )
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiKind {
    Entrance,
    Exit,
    Slot,
    AvailableSlot,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PoiMatch {
    pub kind: PoiKind,
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub distance: f64,
}

/// Nearest point of interest of `kind` on one level.
pub fn find_nearest_of_kind(target: Coord, level: &LevelMap, kind: PoiKind) -> Option<PoiMatch> {
    let (hit, distance) = match kind {
        PoiKind::Entrance => {
            let (e, d) = find_nearest_entrance(target, &level.entrances, None);
            (e.map(|e| (e.id.clone(), e.coord())), d)
        }
        PoiKind::Exit => {
            let (e, d) = find_nearest_point(target, level.exits.iter());
            (e.map(|e| (e.id.clone(), e.coord())), d)
        }
        PoiKind::Slot | PoiKind::AvailableSlot => {
            let (s, d) = find_nearest_slot(target, &level.slots, kind == PoiKind::AvailableSlot);
            (s.map(|s| (s.id.clone(), s.coord())), d)
        }
    };
    hit.map(|(id, (x, y))| PoiMatch { kind, id, x, y, distance })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::geometry::manhattan_distance;
    use crate::pathfinding::models::{Exit, SlotStatus};

    fn slot(id: &str, x: i32, y: i32, status: SlotStatus) -> Slot {
        Slot { id: id.into(), x, y, status, vehicle_id: None, reserved_by: None }
    }

    #[test]
    fn empty_candidates() {
        let (p, d) = find_nearest_point((0, 0), Vec::<Coord>::new());
        assert!(p.is_none());
        assert_eq!(d, f64::INFINITY);
    }

    #[test]
    fn single_candidate_returns_its_distance() {
        let (p, d) = find_nearest_point((0, 0), vec![(3, 4)]);
        assert_eq!(p, Some((3, 4)));
        assert_eq!(d, 5.0);
    }

    #[test]
    fn first_seen_wins_ties() {
        let (p, _) = find_nearest_point((0, 0), vec![(1, 0), (0, 1), (-1, 0)]);
        assert_eq!(p, Some((1, 0)));
        let (p, _) = find_nearest_point((0, 0), vec![(0, 1), (1, 0)]);
        assert_eq!(p, Some((0, 1)));
    }

    #[test]
    fn metric_is_pluggable() {
        // euclid prefers the diagonal (1.41 < 2), manhattan sees a tie and keeps the first
        let cands = vec![(2, 0), (1, 1)];
        let (p, _) = find_nearest_point((0, 0), cands.clone());
        assert_eq!(p, Some((1, 1)));
        let (p, d) = find_nearest_point_by((0, 0), cands, manhattan_distance);
        assert_eq!(p, Some((2, 0)));
        assert_eq!(d, 2.0);
    }

    #[test]
    fn slot_status_filter() {
        let slots = vec![
            slot("A", 1, 0, SlotStatus::Occupied),
            slot("B", 3, 0, SlotStatus::Available),
            slot("C", 2, 0, SlotStatus::Allocated),
        ];
        let (s, _) = find_nearest_slot((0, 0), &slots, false);
        assert_eq!(s.map(|s| s.id.as_str()), Some("A"));
        let (s, d) = find_nearest_slot((0, 0), &slots, true);
        assert_eq!(s.map(|s| s.id.as_str()), Some("B"));
        assert_eq!(d, 3.0);
    }

    #[test]
    fn entrance_type_filter() {
        let entrances = vec![
            Entrance { id: "E1".into(), x: 0, y: 0, kind: Some("main".into()) },
            Entrance { id: "E2".into(), x: 5, y: 0, kind: Some("vip".into()) },
        ];
        let (e, _) = find_nearest_entrance((4, 0), &entrances, Some("main"));
        assert_eq!(e.map(|e| e.id.as_str()), Some("E1"));
        let (e, _) = find_nearest_entrance((4, 0), &entrances, None);
        assert_eq!(e.map(|e| e.id.as_str()), Some("E2"));
        let (e, d) = find_nearest_entrance((4, 0), &entrances, Some("staff"));
        assert!(e.is_none());
        assert!(d.is_infinite());
    }

    #[test]
    fn nearest_of_kind_on_level() {
        let level = LevelMap {
            building_name: "B".into(),
            level: 1,
            grid_size: None,
            entrances: vec![],
            exits: vec![Exit { id: "X1".into(), x: 5, y: 5 }],
            slots: vec![slot("1A", 1, 1, SlotStatus::Occupied), slot("1B", 4, 4, SlotStatus::Available)],
            corridors: vec![],
            ramps: vec![],
        };
        let m = find_nearest_of_kind((0, 0), &level, PoiKind::AvailableSlot).unwrap();
        assert_eq!(m.id, "1B");
        let m = find_nearest_of_kind((0, 0), &level, PoiKind::Slot).unwrap();
        assert_eq!(m.id, "1A");
        assert_eq!(find_nearest_of_kind((0, 0), &level, PoiKind::Exit).unwrap().id, "X1");
        assert!(find_nearest_of_kind((0, 0), &level, PoiKind::Entrance).is_none());
    }
}
