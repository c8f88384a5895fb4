use anyhow::Result;
use serde_json::{json, Value};

use crate::pathfinding::graph_builder::build_map_graph;
use crate::pathfinding::map_loader::MapDocument;
use crate::pathfinding::validate::validate_levels;

/// Graph size per level, build counters and the validation report.
pub fn inspect(doc: &MapDocument) -> Result<Value> {
    let issues = validate_levels(&doc.levels);
    let map = build_map_graph(&doc.levels);
    let levels: Vec<Value> = doc
        .levels
        .iter()
        .map(|l| {
            json!({
                "level": l.level,
                "building_name": l.building_name,
                "graph_nodes": map.graph.nodes_on_level(l.level).count(),
                "corridor_nodes": map.corridor_nodes_on(l.level).len(),
                "slots": l.slots.len(),
                "available_slots": l.slots.iter().filter(|s| s.is_available()).count(),
            })
        })
        .collect();
    Ok(json!({
        "success": true,
        "data": {
            "map_id": doc.map_id,
            "version": doc.version,
            "nodes": map.graph.node_count(),
            "edges": map.graph.edge_count(),
            "stats": serde_json::to_value(&map.stats)?,
            "levels": levels,
            "issues": serde_json::to_value(&issues)?,
        }
    }))
}
