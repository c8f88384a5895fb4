//! Route planning over discretized multi-level parking maps.
//!
//! Map data is turned into one immutable level-qualified graph
//! (`graph_builder`), which a `PathPlanner` queries for point-to-point
//! routes, nearest free slots and entrance -> slot -> exit journeys.

pub mod cache;
pub mod config;
pub mod dijkstra;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod graph_builder;
pub mod guidance;
pub mod logging;
pub mod map_loader;
pub mod models;
pub mod nearest;
pub mod planner;
pub mod validate;

pub use error::{ApiResponse, PlannerError};
pub use graph_builder::{build_full_map_graph, build_map_graph, MapGraph};
pub use models::{LevelMap, Node};
pub use planner::{JourneyRequest, PathPlanner, PlannerOptions};
