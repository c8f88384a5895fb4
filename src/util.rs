use std::path::PathBuf;

use crate::pathfinding::models::Node;

pub const SAMPLE_MAP_REL_PATH: &str = "maps/sample_level1.json";

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn default_map_path() -> PathBuf {
    repo_root().join(SAMPLE_MAP_REL_PATH)
}

/// Parses `level,x,y`.
pub fn parse_node(s: &str) -> Option<Node> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 { return None; }
    let level = parts[0].trim().parse::<i32>().ok()?;
    let x = parts[1].trim().parse::<i32>().ok()?;
    let y = parts[2].trim().parse::<i32>().ok()?;
    Some(Node::new(level, x, y))
}
