use anyhow::Result;
use log::info;
use serde::Serialize;
use serde_json::Value;

use super::PlanCommand;
use crate::pathfinding::cache::{GraphCache, MapKey};
use crate::pathfinding::config::Config;
use crate::pathfinding::error::ApiResponse;
use crate::pathfinding::map_loader::MapDocument;
use crate::pathfinding::planner::{JourneyRequest, PathPlanner};

fn envelope<T: Serialize>(r: crate::pathfinding::error::Result<T>) -> Result<Value> {
    if let Err(e) = &r {
        info!("query: {} ({})", e, e.kind());
    }
    Ok(serde_json::to_value(ApiResponse::from(r))?)
}

pub fn planner_for(cache: &GraphCache, doc: &MapDocument, cfg: &Config) -> PathPlanner {
    let key = MapKey::new(
        cfg.map_id.clone().unwrap_or_else(|| doc.map_id.clone()),
        cfg.map_version.unwrap_or(doc.version),
    );
    cache.planner(&key, &doc.levels, cfg.planner_options())
}

/// Runs one routing query and wraps the outcome in an `ApiResponse`.
/// Planner failures become `success: false` payloads, not errors.
pub fn run_query(doc: &MapDocument, cfg: &Config, cmd: &PlanCommand) -> Result<Value> {
    let cache = GraphCache::new();
    let planner = planner_for(&cache, doc, cfg);
    match cmd {
        PlanCommand::Route { from, to } => envelope(planner.find_path_between_points(*from, *to)),
        PlanCommand::NearestSlot { entrance: Some(id), .. } => envelope(planner.find_nearest_slot_to_entrance(id)),
        PlanCommand::NearestSlot { point: Some(p), .. } => envelope(planner.find_nearest_slot_to_point(*p)),
        PlanCommand::NearestSlot { .. } => envelope::<()>(Err(
            crate::pathfinding::PlannerError::MalformedInput("need --entrance or --point".into()),
        )),
        PlanCommand::NearestExit { slot } => envelope(planner.find_nearest_exit_to_slot(slot)),
        PlanCommand::Journey { entrance, slot, exit } => envelope(planner.plan_journey(&JourneyRequest {
            entrance_id: entrance.clone(),
            slot_id: slot.clone(),
            exit_id: exit.clone(),
        })),
        PlanCommand::Inspect => super::inspect::inspect(doc),
    }
}
