use std::{env, path::PathBuf, time::Duration};

use super::geometry::DistanceMetric;
use super::planner::PlannerOptions;

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub map_path: Option<PathBuf>,
    pub map_id: Option<String>,
    pub map_version: Option<u64>,
    pub metric: Option<DistanceMetric>,
    pub deadline_ms: Option<u64>,
    pub threads: Option<usize>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn from_env_defaults() -> Self {
        let map_path = env::var("PARKING_MAP").ok().map(PathBuf::from);
        let map_id = env::var("PARKING_MAP_ID").ok().filter(|s| !s.trim().is_empty());
        let map_version = env::var("PARKING_MAP_VERSION").ok().and_then(|s| s.trim().parse::<u64>().ok());
        let metric = env::var("PARKING_METRIC").ok().and_then(|s| DistanceMetric::parse(&s));
        let deadline_ms = env::var("PARKING_DEADLINE_MS").ok().and_then(|s| s.trim().parse::<u64>().ok());
        let threads = env::var("PARKING_THREADS").ok().and_then(|s| s.trim().parse::<usize>().ok());
        let log_level = env::var("PARKING_LOG_LEVEL").ok();
        Self { map_path, map_id, map_version, metric, deadline_ms, threads, log_level }
    }

    /// Fields set in `other` replace ours.
    pub fn overlay(mut self, other: Config) -> Self {
        if other.map_path.is_some() { self.map_path = other.map_path; }
        if other.map_id.is_some() { self.map_id = other.map_id; }
        if other.map_version.is_some() { self.map_version = other.map_version; }
        if other.metric.is_some() { self.metric = other.metric; }
        if other.deadline_ms.is_some() { self.deadline_ms = other.deadline_ms; }
        if other.threads.is_some() { self.threads = other.threads; }
        if other.log_level.is_some() { self.log_level = other.log_level; }
        self
    }

    pub fn planner_options(&self) -> PlannerOptions {
        PlannerOptions {
            metric: self.metric.unwrap_or_default(),
            deadline: self.deadline_ms.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_prefers_set_fields() {
        let cli = Config { map_id: Some("cli".into()), deadline_ms: Some(10), ..Default::default() };
        let env = Config { map_id: Some("env".into()), threads: Some(2), ..Default::default() };
        let cfg = cli.overlay(env);
        assert_eq!(cfg.map_id.as_deref(), Some("env"));
        assert_eq!(cfg.deadline_ms, Some(10));
        assert_eq!(cfg.threads, Some(2));
    }

    #[test]
    fn planner_options_from_config() {
        let cfg = Config { metric: Some(DistanceMetric::Manhattan), deadline_ms: Some(250), ..Default::default() };
        let opts = cfg.planner_options();
        assert_eq!(opts.metric, DistanceMetric::Manhattan);
        assert_eq!(opts.deadline, Some(Duration::from_millis(250)));
        assert_eq!(Config::default().planner_options(), PlannerOptions::default());
    }

    #[test]
    fn test_from_env_defaults_reads_values() {
        std::env::set_var("PARKING_MAP", "/tmp/garage.json");
        std::env::set_var("PARKING_MAP_ID", "garage-7");
        std::env::set_var("PARKING_MAP_VERSION", "4");
        std::env::set_var("PARKING_METRIC", "manhattan");
        std::env::set_var("PARKING_DEADLINE_MS", "1500");
        std::env::set_var("PARKING_THREADS", "8");
        std::env::set_var("PARKING_LOG_LEVEL", "debug");

        let cfg = Config::from_env_defaults();
        assert_eq!(cfg.map_path.as_ref().unwrap().to_string_lossy(), "/tmp/garage.json");
        assert_eq!(cfg.map_id.as_deref(), Some("garage-7"));
        assert_eq!(cfg.map_version, Some(4));
        assert_eq!(cfg.metric, Some(DistanceMetric::Manhattan));
        assert_eq!(cfg.deadline_ms, Some(1500));
        assert_eq!(cfg.threads, Some(8));
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));

        // cleanup
        std::env::remove_var("PARKING_MAP");
        std::env::remove_var("PARKING_MAP_ID");
        std::env::remove_var("PARKING_MAP_VERSION");
        std::env::remove_var("PARKING_METRIC");
        std::env::remove_var("PARKING_DEADLINE_MS");
        std::env::remove_var("PARKING_THREADS");
        std::env::remove_var("PARKING_LOG_LEVEL");
    }
}
