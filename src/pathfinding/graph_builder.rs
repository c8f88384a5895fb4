use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::geometry::{euclidean_distance, is_grid_adjacent};
use super::graph::Graph;
use super::models::{Coord, Corridor, Entrance, Exit, LevelMap, Located, Node, Ramp, Slot, SlotStatus};
use super::nearest::find_nearest_point;

/// Weight of a ramp edge when the map does not give one.
pub const DEFAULT_RAMP_WEIGHT: f64 = 1.0;

pub type LevelGraph = Graph<Coord>;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BuildStats {
    pub levels: usize,
    pub corridors: usize,
    pub corridor_edges: usize,
    pub skipped_pairs: usize,
    pub short_corridors: usize,
    pub poi_links: usize,
    pub unlinked_pois: usize,
    pub ramps_linked: usize,
    pub ramps_dropped: usize,
    pub dangling_ramp_ends: usize,
}

impl BuildStats {
    fn absorb(&mut self, other: &BuildStats) {
        self.levels += other.levels;
        self.corridors += other.corridors;
        self.corridor_edges += other.corridor_edges;
        self.skipped_pairs += other.skipped_pairs;
        self.short_corridors += other.short_corridors;
        self.poi_links += other.poi_links;
        self.unlinked_pois += other.unlinked_pois;
        self.ramps_linked += other.ramps_linked;
        self.ramps_dropped += other.ramps_dropped;
        self.dangling_ramp_ends += other.dangling_ramp_ends;
    }
}

/// Where a point of interest joins the corridor network.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Snap {
    pub point: Coord,
    /// Nearest corridor node, `None` when the level has no corridors.
    pub access: Option<Coord>,
    pub distance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PoiEntry {
    pub id: String,
    pub node: Node,
    pub access: Option<Node>,
    pub access_distance: f64,
    /// Entrance `type`, if any.
    pub label: Option<String>,
    /// Set for slots only.
    pub status: Option<SlotStatus>,
    pub vehicle_id: Option<String>,
    pub reserved_by: Option<String>,
}

impl PoiEntry {
    fn new(id: &str, level: i32, snap: &Snap) -> Self {
        Self {
            id: id.to_string(),
            node: Node::at(level, snap.point),
            access: snap.access.map(|c| Node::at(level, c)),
            access_distance: snap.distance,
            label: None,
            status: None,
            vehicle_id: None,
            reserved_by: None,
        }
    }

    pub fn is_available_slot(&self) -> bool {
        self.status == Some(SlotStatus::Available)
    }
}

/// Id-keyed lookup over points of interest. Iteration follows map order.
#[derive(Clone, Debug, Default)]
pub struct PoiTable {
    entries: Vec<PoiEntry>,
    by_id: HashMap<String, usize>,
}

impl PoiTable {
    fn insert(&mut self, entry: PoiEntry, what: &str) {
        if self.by_id.contains_key(&entry.id) {
            warn!("graph: duplicate {} id {} at {} ignored", what, entry.id, entry.node);
            return;
        }
        self.by_id.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
    }

    pub fn get(&self, id: &str) -> Option<&PoiEntry> {
        self.by_id.get(id).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoiEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct PoiIndex {
    pub entrances: PoiTable,
    pub exits: PoiTable,
    pub slots: PoiTable,
}

/// Merged multi-level graph plus everything needed to resolve queries on it.
#[derive(Clone, Debug, Default)]
pub struct MapGraph {
    pub graph: Graph<Node>,
    pub index: PoiIndex,
    /// Snap targets per level, in graph order.
    pub corridor_nodes: BTreeMap<i32, Vec<Node>>,
    pub stats: BuildStats,
}

impl MapGraph {
    pub fn corridor_nodes_on(&self, level: i32) -> &[Node] {
        self.corridor_nodes.get(&level).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Builds the directed corridor network for one level.
///
/// Only consecutive points of a corridor are joined, and a pair further apart
/// than one (diagonal) grid step is dropped.
pub fn build_graph_from_corridors(corridors: &[Corridor]) -> LevelGraph {
    let mut stats = BuildStats::default();
    build_corridors(corridors, &mut stats)
}

fn build_corridors(corridors: &[Corridor], stats: &mut BuildStats) -> LevelGraph {
    let mut graph = LevelGraph::new();
    for corridor in corridors {
        stats.corridors += 1;
        if corridor.points.len() < 2 {
            debug!("graph: corridor {} has {} point(s), no edges", corridor.id, corridor.points.len());
            stats.short_corridors += 1;
            continue;
        }
        for pair in corridor.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if !is_grid_adjacent(a, b) {
                debug!("graph: corridor {} skips non-adjacent pair {:?} -> {:?}", corridor.id, a, b);
                stats.skipped_pairs += 1;
                continue;
            }
            let w = euclidean_distance(a, b);
            graph.add_node(a);
            stats.corridor_edges += graph.add_directed(a, b, w, corridor.direction);
        }
    }
    graph
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Link {
    Bidirectional,
    IntoPoint,
}

fn snap_and_link(graph: &mut LevelGraph, corridor_nodes: &[Coord], point: Coord, link: Link) -> Snap {
    let (nearest, distance) = find_nearest_point(point, corridor_nodes.iter().copied());
    graph.add_node(point);
    let Some(access) = nearest else {
        return Snap { point, access: None, distance };
    };
    match link {
        Link::Bidirectional => {
            graph.add_edge(access, point, distance);
            graph.add_edge(point, access, distance);
        }
        Link::IntoPoint => {
            graph.add_edge(access, point, distance);
        }
    }
    Snap { point, access: Some(access), distance }
}

fn link_all<T: Located>(graph: &mut LevelGraph, corridor_nodes: &[Coord], points: &[T], link: Link) -> Vec<Snap> {
    points.iter().map(|p| snap_and_link(graph, corridor_nodes, p.coord(), link)).collect()
}

fn tally(snaps: &[Snap], stats: &mut BuildStats) {
    for snap in snaps {
        if snap.access.is_some() {
            stats.poi_links += 1;
        } else {
            stats.unlinked_pois += 1;
        }
    }
}

/// Links every entrance and exit both ways to its nearest corridor node.
pub fn connect_entrances_exits_to_corridors(
    graph: &mut LevelGraph,
    corridor_nodes: &[Coord],
    entrances: &[Entrance],
    exits: &[Exit],
) -> (Vec<Snap>, Vec<Snap>) {
    let e = link_all(graph, corridor_nodes, entrances, Link::Bidirectional);
    let x = link_all(graph, corridor_nodes, exits, Link::Bidirectional);
    (e, x)
}

/// Links every slot from its nearest corridor node. Slots are entered from
/// their lane only, so no edge leaves a slot.
pub fn connect_slots_to_corridors(graph: &mut LevelGraph, corridor_nodes: &[Coord], slots: &[Slot]) -> Vec<Snap> {
    link_all(graph, corridor_nodes, slots, Link::IntoPoint)
}

struct LevelBuild {
    level: i32,
    graph: LevelGraph,
    corridor_nodes: Vec<Coord>,
    entrances: Vec<Snap>,
    exits: Vec<Snap>,
    slots: Vec<Snap>,
    stats: BuildStats,
}

fn build_level(level: &LevelMap) -> LevelBuild {
    let mut stats = BuildStats { levels: 1, ..Default::default() };
    let mut graph = build_corridors(&level.corridors, &mut stats);
    let corridor_nodes: Vec<Coord> = graph.nodes().copied().collect();

    let (entrances, exits) =
        connect_entrances_exits_to_corridors(&mut graph, &corridor_nodes, &level.entrances, &level.exits);
    let slots = connect_slots_to_corridors(&mut graph, &corridor_nodes, &level.slots);
    for snaps in [&entrances, &exits, &slots] {
        tally(snaps, &mut stats);
    }

    debug!(
        "graph: level {} -> nodes={} edges={} skipped_pairs={}",
        level.level,
        graph.node_count(),
        graph.edge_count(),
        stats.skipped_pairs
    );
    LevelBuild { level: level.level, graph, corridor_nodes, entrances, exits, slots, stats }
}

/// A ramp together with the level it was declared on.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelRamp {
    pub level: i32,
    pub ramp: Ramp,
}

pub fn collect_ramps(levels: &[LevelMap]) -> Vec<LevelRamp> {
    levels
        .iter()
        .flat_map(|l| l.ramps.iter().map(move |r| LevelRamp { level: l.level, ramp: r.clone() }))
        .collect()
}

/// Builds every level, lifts each into the level-qualified keyspace and
/// splices levels together with ramp edges.
pub fn build_full_map_graph(levels: &[LevelMap], ramps: &[LevelRamp]) -> MapGraph {
    let built: Vec<LevelBuild> = levels.par_iter().map(build_level).collect();

    let mut map = MapGraph::default();
    for (src, lb) in levels.iter().zip(built) {
        let lvl = lb.level;
        map.stats.absorb(&lb.stats);
        map.graph.merge(lb.graph.map_nodes(|c| Node::at(lvl, c)));
        map.corridor_nodes
            .entry(lvl)
            .or_default()
            .extend(lb.corridor_nodes.iter().map(|&c| Node::at(lvl, c)));

        for (e, snap) in src.entrances.iter().zip(lb.entrances.iter()) {
            let mut entry = PoiEntry::new(&e.id, lvl, snap);
            entry.label = e.kind.clone();
            map.index.entrances.insert(entry, "entrance");
        }
        for (x, snap) in src.exits.iter().zip(lb.exits.iter()) {
            map.index.exits.insert(PoiEntry::new(&x.id, lvl, snap), "exit");
        }
        for (s, snap) in src.slots.iter().zip(lb.slots.iter()) {
            let mut entry = PoiEntry::new(&s.id, lvl, snap);
            entry.status = Some(s.status);
            entry.vehicle_id = s.vehicle_id.clone();
            entry.reserved_by = s.reserved_by.clone();
            map.index.slots.insert(entry, "slot");
        }
    }

    for lr in ramps {
        link_ramp(&mut map, lr);
    }

    info!(
        "graph: built {} level(s) -> nodes={} edges={} ramps_linked={} skipped_pairs={}",
        map.stats.levels,
        map.graph.node_count(),
        map.graph.edge_count(),
        map.stats.ramps_linked,
        map.stats.skipped_pairs
    );
    map
}

/// Builds the full graph using the ramps declared on the levels themselves.
pub fn build_map_graph(levels: &[LevelMap]) -> MapGraph {
    build_full_map_graph(levels, &collect_ramps(levels))
}

fn link_ramp(map: &mut MapGraph, lr: &LevelRamp) {
    let r = &lr.ramp;
    let weight = r.cost.unwrap_or(DEFAULT_RAMP_WEIGHT);
    if !weight.is_finite() || weight < 0.0 {
        warn!("graph: ramp {} has invalid cost {}, dropped", r.id, weight);
        map.stats.ramps_dropped += 1;
        return;
    }
    let from = Node::new(lr.level, r.x, r.y);
    let to = Node::new(r.to_level, r.to_x, r.to_y);
    for end in [from, to] {
        if !map.graph.contains(&end) {
            warn!("graph: ramp {} endpoint {} is not on any corridor", r.id, end);
            map.stats.dangling_ramp_ends += 1;
        }
    }
    let dir = r.direction.as_corridor_direction(lr.level, r.to_level);
    map.graph.add_directed(from, to, weight, dir);
    map.stats.ramps_linked += 1;
}
