use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::pathfinding::config::Config;
use crate::pathfinding::geometry::DistanceMetric;
use crate::pathfinding::map_loader;
use crate::pathfinding::models::Node;
use crate::pathfinding::logging;

pub mod inspect;
pub mod query;

#[derive(Args, Debug, Clone, Default)]
pub struct CommonOpts {
    /// Map document or directory of level files (default: maps/sample_level1.json or PARKING_MAP)
    #[arg(long = "map", global = true)]
    pub map: Option<PathBuf>,
    /// Cache key: map id (defaults to the id in the document)
    #[arg(long = "map-id", global = true)]
    pub map_id: Option<String>,
    /// Cache key: map version (defaults to the version in the document)
    #[arg(long = "map-version", global = true)]
    pub map_version: Option<u64>,
    /// Snap metric for free points (euclidean|manhattan)
    #[arg(long = "metric", global = true)]
    pub metric: Option<String>,
    /// Per-search time budget in milliseconds
    #[arg(long = "deadline-ms", global = true)]
    pub deadline_ms: Option<u64>,
    /// Number of worker threads (rayon) used while building level graphs
    #[arg(long = "threads", global = true)]
    pub threads: Option<usize>,
    /// Log level (trace|debug|info|warn|error)
    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PlanCommand {
    /// Shortest route between two points given as level,x,y
    #[command(name = "route")]
    Route {
        #[arg(long, value_parser = parse_node_arg)]
        from: Node,
        #[arg(long, value_parser = parse_node_arg)]
        to: Node,
    },
    /// Nearest available slot by driving distance
    #[command(name = "nearest-slot")]
    NearestSlot {
        /// Start at this entrance id
        #[arg(long, conflicts_with = "point", required_unless_present = "point")]
        entrance: Option<String>,
        /// Start at this point (level,x,y)
        #[arg(long, value_parser = parse_node_arg)]
        point: Option<Node>,
    },
    /// Nearest exit when leaving a slot
    #[command(name = "nearest-exit")]
    NearestExit {
        #[arg(long)]
        slot: String,
    },
    /// Entrance -> slot -> exit, filling in the nearest slot/exit when omitted
    #[command(name = "journey")]
    Journey {
        #[arg(long)]
        entrance: String,
        #[arg(long)]
        slot: Option<String>,
        #[arg(long)]
        exit: Option<String>,
    },
    /// Graph statistics and map validation report
    #[command(name = "inspect")]
    Inspect,
}

fn parse_node_arg(s: &str) -> std::result::Result<Node, String> {
    crate::util::parse_node(s).ok_or_else(|| format!("expected level,x,y but got '{}'", s))
}

/// CLI values first, environment on top (env wins when set).
pub fn resolve_config(common: &CommonOpts) -> Result<Config> {
    let metric = match common.metric.as_deref() {
        Some(m) => Some(DistanceMetric::parse(m).ok_or_else(|| anyhow!("unknown metric '{}'", m))?),
        None => None,
    };
    let cli = Config {
        map_path: common.map.clone(),
        map_id: common.map_id.clone(),
        map_version: common.map_version,
        metric,
        deadline_ms: common.deadline_ms,
        threads: common.threads,
        log_level: common.log_level.clone(),
    };
    Ok(cli.overlay(Config::from_env_defaults()))
}

pub fn cmd_plan(common: CommonOpts, sub: PlanCommand) -> Result<()> {
    let cfg = resolve_config(&common)?;

    // Init logging and thread pool
    logging::init(cfg.log_level.as_deref());
    if let Some(n) = cfg.threads {
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    }

    let map_path = cfg.map_path.clone().unwrap_or_else(crate::util::default_map_path);
    let doc = map_loader::load_map(&map_path)?;

    let out = match sub {
        PlanCommand::Inspect => inspect::inspect(&doc)?,
        other => query::run_query(&doc, &cfg, &other)?,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
