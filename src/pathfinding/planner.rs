use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::dijkstra::{dijkstra, dijkstra_with_deadline, shortest_path_tree, ShortestPathTree};
use super::error::{PlannerError, Result, TargetKind};
use super::geometry::DistanceMetric;
use super::graph_builder::{build_map_graph, MapGraph, PoiEntry, PoiTable};
use super::guidance::{instructions, Instruction};
use super::models::{LevelMap, Node};
use super::nearest::find_nearest_point_by;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PlannerOptions {
    /// Metric used when snapping free points onto the corridor network.
    pub metric: DistanceMetric,
    /// Per-search time budget.
    pub deadline: Option<Duration>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub waypoints: Vec<Node>,
    pub distance: f64,
    pub instructions: Vec<Instruction>,
}

/// Result of a nearest-resource query.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NearestMatch {
    pub id: String,
    pub level: i32,
    pub x: i32,
    pub y: i32,
    pub distance: f64,
    pub route: Route,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyRequest {
    pub entrance_id: String,
    #[serde(default)]
    pub slot_id: Option<String>,
    #[serde(default)]
    pub exit_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Leg {
    pub from: String,
    pub to: String,
    pub route: Route,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Journey {
    pub entrance_id: String,
    pub slot_id: String,
    pub exit_id: String,
    pub legs: Vec<Leg>,
    pub waypoints: Vec<Node>,
    pub total_distance: f64,
}

/// Answers routing queries over one immutable map graph.
///
/// The graph is shared (`Arc`) and never mutated, so a planner can be cloned
/// into as many concurrent queries as needed.
#[derive(Clone, Debug)]
pub struct PathPlanner {
    map: Arc<MapGraph>,
    opts: PlannerOptions,
}

impl PathPlanner {
    pub fn new(levels: &[LevelMap]) -> Self {
        Self::from_graph(Arc::new(build_map_graph(levels)))
    }

    pub fn from_graph(map: Arc<MapGraph>) -> Self {
        Self { map, opts: PlannerOptions::default() }
    }

    pub fn with_options(mut self, opts: PlannerOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn map(&self) -> &MapGraph {
        &self.map
    }

    fn deadline(&self) -> Option<Instant> {
        self.opts.deadline.map(|d| Instant::now() + d)
    }

    /// Shortest path between two nodes already on the graph.
    pub fn find_path(&self, start: Node, end: Node) -> (Option<Vec<Node>>, f64) {
        dijkstra(&self.map.graph, start, end)
    }

    fn solve(&self, start: Node, end: Node) -> Result<(Vec<Node>, f64)> {
        match dijkstra_with_deadline(&self.map.graph, start, end, self.deadline())? {
            (Some(path), d) => Ok((path, d)),
            (None, _) => Err(PlannerError::unreachable(start, end)),
        }
    }

    fn tree_from(&self, origin: Node) -> Result<ShortestPathTree<Node>> {
        Ok(shortest_path_tree(&self.map.graph, origin, self.deadline())?)
    }

    fn hop_weight(&self, a: Node, b: Node) -> f64 {
        self.map
            .graph
            .edge_weight(&a, &b)
            .unwrap_or_else(|| self.opts.metric.distance(a.coord(), b.coord()))
    }

    fn route(&self, waypoints: Vec<Node>, distance: f64) -> Route {
        let instructions = instructions(&waypoints, |a, b| self.hop_weight(a, b));
        Route { waypoints, distance, instructions }
    }

    /// Nearest corridor node on the point's level and the distance to it.
    pub fn snap(&self, point: Node) -> Result<(Node, f64)> {
        let candidates = self.map.corridor_nodes_on(point.level);
        let metric = self.opts.metric;
        match find_nearest_point_by(point.coord(), candidates.iter().map(|n| n.coord()), |a, b| metric.distance(a, b)) {
            (Some(c), d) => Ok((Node::at(point.level, c), d)),
            (None, _) => Err(PlannerError::not_found(TargetKind::Point, point.to_string())),
        }
    }

    /// Routes between two arbitrary points by snapping each onto the graph.
    /// The reported distance includes both snap legs.
    pub fn find_path_between_points(&self, p1: Node, p2: Node) -> Result<Route> {
        let (s1, d1) = self.snap(p1)?;
        let (s2, d2) = self.snap(p2)?;
        let (path, d) = self.solve(s1, s2).map_err(|e| match e {
            PlannerError::Unreachable { .. } => PlannerError::unreachable(p1, p2),
            other => other,
        })?;

        let mut waypoints = Vec::with_capacity(path.len() + 2);
        if p1 != s1 {
            waypoints.push(p1);
        }
        waypoints.extend(path);
        if p2 != s2 {
            waypoints.push(p2);
        }
        Ok(self.route(waypoints, d1 + d + d2))
    }

    fn lookup<'a>(&self, table: &'a PoiTable, kind: TargetKind, id: &str) -> Result<&'a PoiEntry> {
        table.get(id).ok_or_else(|| PlannerError::not_found(kind, id))
    }

    /// Path-distance nearest candidate from `origin`, ties going to the
    /// candidate listed first in the map.
    fn nearest_by_path<'a>(
        &self,
        origin: Node,
        prefix: Option<(Node, f64)>,
        candidates: impl Iterator<Item = &'a PoiEntry>,
        what: &str,
    ) -> Result<NearestMatch> {
        let tree = self.tree_from(origin)?;
        let mut best: Option<(&PoiEntry, f64)> = None;
        for c in candidates {
            let d = tree.distance_to(&c.node);
            if d.is_finite() && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((c, d));
            }
        }
        let from = prefix.map(|(p, _)| p).unwrap_or(origin);
        let Some((hit, d)) = best else {
            return Err(PlannerError::unreachable(from, what));
        };
        let path = tree.path_to(&hit.node).ok_or_else(|| PlannerError::unreachable(from, &hit.id))?;
        let offset = prefix.map(|(_, d)| d).unwrap_or(0.0);
        let mut waypoints = Vec::with_capacity(path.len() + 1);
        if let Some((p, _)) = prefix {
            if p != origin {
                waypoints.push(p);
            }
        }
        waypoints.extend(path);
        debug!("planner: nearest {} from {} is {} at {:.3}", what, from, hit.id, offset + d);
        Ok(NearestMatch {
            id: hit.id.clone(),
            level: hit.node.level,
            x: hit.node.x,
            y: hit.node.y,
            distance: offset + d,
            route: self.route(waypoints, offset + d),
        })
    }

    fn available_slots(&self) -> impl Iterator<Item = &PoiEntry> {
        self.map.index.slots.iter().filter(|s| s.is_available_slot())
    }

    pub fn find_nearest_slot_to_entrance(&self, entrance_id: &str) -> Result<NearestMatch> {
        let entrance = self.lookup(&self.map.index.entrances, TargetKind::Entrance, entrance_id)?;
        self.nearest_by_path(entrance.node, None, self.available_slots(), "available slot")
    }

    pub fn find_nearest_slot_to_point(&self, point: Node) -> Result<NearestMatch> {
        let (origin, d) = self.snap(point)?;
        self.nearest_by_path(origin, Some((point, d)), self.available_slots(), "available slot")
    }

    /// Nearest exit when leaving `slot_id`.
    pub fn find_nearest_exit_to_slot(&self, slot_id: &str) -> Result<NearestMatch> {
        let slot = self.lookup(&self.map.index.slots, TargetKind::Slot, slot_id)?;
        let access = slot.access.ok_or_else(|| PlannerError::unreachable(&slot.id, "exit"))?;
        self.nearest_by_path(access, Some((slot.node, slot.access_distance)), self.map.index.exits.iter(), "exit")
    }

    /// Route out of a slot: slots have no outgoing edges, so leave through
    /// the lane node they were linked from.
    fn leave_slot(&self, slot: &PoiEntry, target: Node) -> Result<(Vec<Node>, f64)> {
        let access = slot.access.ok_or_else(|| PlannerError::unreachable(&slot.id, target))?;
        let (path, d) = self.solve(access, target).map_err(|e| match e {
            PlannerError::Unreachable { .. } => PlannerError::unreachable(&slot.id, target),
            other => other,
        })?;
        let mut waypoints = Vec::with_capacity(path.len() + 1);
        if access != slot.node {
            waypoints.push(slot.node);
        }
        waypoints.extend(path);
        Ok((waypoints, slot.access_distance + d))
    }

    /// Entrance -> slot -> exit as two independently optimal legs. Missing
    /// slot or exit ids are filled with the nearest match by path distance.
    pub fn plan_journey(&self, req: &JourneyRequest) -> Result<Journey> {
        let index = &self.map.index;
        let entrance = self.lookup(&index.entrances, TargetKind::Entrance, &req.entrance_id)?;

        let slot = match req.slot_id.as_deref() {
            Some(id) => self.lookup(&index.slots, TargetKind::Slot, id)?,
            None => {
                let m = self.find_nearest_slot_to_entrance(&entrance.id)?;
                self.lookup(&index.slots, TargetKind::Slot, &m.id)?
            }
        };
        if !slot.is_available_slot() {
            debug!("planner: journey targets slot {} with status {:?}", slot.id, slot.status);
        }

        let (p1, d1) = self.solve(entrance.node, slot.node).map_err(|e| match e {
            PlannerError::Unreachable { .. } => PlannerError::unreachable(&entrance.id, &slot.id),
            other => other,
        })?;

        let exit = match req.exit_id.as_deref() {
            Some(id) => self.lookup(&index.exits, TargetKind::Exit, id)?,
            None => {
                let m = self.find_nearest_exit_to_slot(&slot.id)?;
                self.lookup(&index.exits, TargetKind::Exit, &m.id)?
            }
        };
        let (p2, d2) = self.leave_slot(slot, exit.node)?;

        let mut waypoints = p1.clone();
        waypoints.extend(p2.iter().skip(1).copied());
        let legs = vec![
            Leg { from: entrance.id.clone(), to: slot.id.clone(), route: self.route(p1, d1) },
            Leg { from: slot.id.clone(), to: exit.id.clone(), route: self.route(p2, d2) },
        ];
        Ok(Journey {
            entrance_id: entrance.id.clone(),
            slot_id: slot.id.clone(),
            exit_id: exit.id.clone(),
            legs,
            waypoints,
            total_distance: d1 + d2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::models::{Corridor, CorridorDirection, Entrance, Exit, Slot, SlotStatus};

    fn slot(id: &str, x: i32, y: i32, status: SlotStatus) -> Slot {
        Slot { id: id.into(), x, y, status, vehicle_id: None, reserved_by: None }
    }

    // lane along y=0 from x=0..=4, slots above it, entrance at the west end, exit at the east end
    fn lane_level() -> LevelMap {
        LevelMap {
            building_name: "Lane".into(),
            level: 1,
            grid_size: None,
            entrances: vec![Entrance { id: "E1".into(), x: -1, y: 0, kind: None }],
            exits: vec![Exit { id: "X1".into(), x: 5, y: 0 }],
            slots: vec![
                slot("S1", 1, 1, SlotStatus::Occupied),
                slot("S2", 3, 1, SlotStatus::Available),
                slot("S3", 4, 1, SlotStatus::Available),
            ],
            corridors: vec![Corridor {
                id: "C".into(),
                points: vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)],
                direction: CorridorDirection::Both,
            }],
            ramps: vec![],
        }
    }

    #[test]
    fn nearest_slot_skips_occupied() {
        let planner = PathPlanner::new(&[lane_level()]);
        let m = planner.find_nearest_slot_to_entrance("E1").unwrap();
        assert_eq!(m.id, "S2");
        // E1 -> (0,0) 1, lane 3, into slot 1
        assert!((m.distance - 5.0).abs() < 1e-9);
        assert_eq!(m.route.waypoints.first(), Some(&Node::new(1, -1, 0)));
        assert_eq!(m.route.waypoints.last(), Some(&Node::new(1, 3, 1)));
    }

    #[test]
    fn unknown_entrance_is_not_found() {
        let planner = PathPlanner::new(&[lane_level()]);
        let err = planner.find_nearest_slot_to_entrance("nope").unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn no_available_slot_is_unreachable() {
        let mut lvl = lane_level();
        for s in lvl.slots.iter_mut() {
            s.status = SlotStatus::Allocated;
        }
        let planner = PathPlanner::new(&[lvl]);
        let err = planner.find_nearest_slot_to_entrance("E1").unwrap_err();
        assert_eq!(err.kind(), "unreachable");
    }

    #[test]
    fn nearest_slot_to_free_point_adds_snap() {
        let planner = PathPlanner::new(&[lane_level()]);
        let m = planner.find_nearest_slot_to_point(Node::new(1, 4, -2)).unwrap();
        assert_eq!(m.id, "S3");
        // snap 2, into slot 1
        assert!((m.distance - 3.0).abs() < 1e-9);
        assert_eq!(m.route.waypoints[0], Node::new(1, 4, -2));
        let err = planner.find_nearest_slot_to_point(Node::new(7, 0, 0)).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn points_snap_on_both_ends() {
        let planner = PathPlanner::new(&[lane_level()]);
        let r = planner.find_path_between_points(Node::new(1, 0, -1), Node::new(1, 4, -1)).unwrap();
        assert!((r.distance - 6.0).abs() < 1e-9);
        assert_eq!(r.waypoints.first(), Some(&Node::new(1, 0, -1)));
        assert_eq!(r.waypoints.last(), Some(&Node::new(1, 4, -1)));
        assert_eq!(r.instructions.last().map(|i| i.at), Some(Node::new(1, 4, -1)));
    }

    #[test]
    fn journey_fills_missing_slot_and_exit() {
        let planner = PathPlanner::new(&[lane_level()]);
        let j = planner.plan_journey(&JourneyRequest { entrance_id: "E1".into(), ..Default::default() }).unwrap();
        assert_eq!(j.slot_id, "S2");
        assert_eq!(j.exit_id, "X1");
        assert_eq!(j.legs.len(), 2);
        // leg two: slot -> (3,0) 1, lane 1, -> exit 1
        assert!((j.legs[1].route.distance - 3.0).abs() < 1e-9);
        assert!((j.total_distance - 8.0).abs() < 1e-9);
        assert_eq!(j.waypoints.first(), Some(&Node::new(1, -1, 0)));
        assert_eq!(j.waypoints.last(), Some(&Node::new(1, 5, 0)));
        // the slot appears exactly once where the legs meet
        assert_eq!(j.waypoints.iter().filter(|n| **n == Node::new(1, 3, 1)).count(), 1);
    }

    #[test]
    fn journey_with_unknown_exit() {
        let planner = PathPlanner::new(&[lane_level()]);
        let req = JourneyRequest { entrance_id: "E1".into(), slot_id: Some("S3".into()), exit_id: Some("X9".into()) };
        let err = planner.plan_journey(&req).unwrap_err();
        assert_eq!(err, PlannerError::not_found(TargetKind::Exit, "X9"));
    }

    #[test]
    fn one_way_lane_makes_exit_unreachable() {
        let mut lvl = lane_level();
        lvl.corridors[0].direction = CorridorDirection::Backward;
        let planner = PathPlanner::new(&[lvl]);
        let err = planner.find_nearest_slot_to_entrance("E1").unwrap_err();
        assert_eq!(err.kind(), "unreachable");
        let err = planner.find_nearest_exit_to_slot("S2").unwrap_err();
        assert_eq!(err.kind(), "unreachable");
    }

    #[test]
    fn lone_corridor_point_is_not_a_snap_target() {
        let mut lvl = lane_level();
        for s in lvl.slots.iter_mut() {
            s.status = SlotStatus::Allocated;
        }
        lvl.slots.push(slot("S9", 5, 1, SlotStatus::Available));
        // closer to S9 than the lane end, but connected to nothing
        lvl.corridors.push(Corridor { id: "stub".into(), points: vec![(5, 2)], direction: CorridorDirection::Both });
        let planner = PathPlanner::new(&[lvl]);
        assert_eq!(planner.map().index.slots.get("S9").and_then(|s| s.access), Some(Node::new(1, 4, 0)));
        let m = planner.find_nearest_slot_to_entrance("E1").unwrap();
        assert_eq!(m.id, "S9");
        // E1 -> (0,0) 1, lane 4, diagonal into the slot
        assert!((m.distance - (5.0 + 2f64.sqrt())).abs() < 1e-9);
    }

    #[test]
    fn expired_budget_reports_timeout() {
        let planner = PathPlanner::new(&[lane_level()])
            .with_options(PlannerOptions { deadline: Some(Duration::ZERO), ..Default::default() });
        let err = planner.find_nearest_slot_to_entrance("E1").unwrap_err();
        assert_eq!(err, PlannerError::Timeout);
    }
}
