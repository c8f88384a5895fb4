use anyhow::{bail, Context, Result};
use log::info;
use rayon::prelude::*;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use super::models::LevelMap;

pub const DEFAULT_MAP_ID: &str = "default";

/// A whole facility as stored by the document store.
#[derive(Clone, Debug, PartialEq)]
pub struct MapDocument {
    pub map_id: String,
    pub version: u64,
    pub levels: Vec<LevelMap>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Wrapped {
        #[serde(default)]
        map_id: Option<String>,
        #[serde(default)]
        version: Option<u64>,
        levels: Vec<LevelMap>,
    },
    Bare(Vec<LevelMap>),
}

impl From<RawDocument> for MapDocument {
    fn from(raw: RawDocument) -> Self {
        match raw {
            RawDocument::Wrapped { map_id, version, levels } => MapDocument {
                map_id: map_id.unwrap_or_else(|| DEFAULT_MAP_ID.to_string()),
                version: version.unwrap_or(0),
                levels,
            },
            RawDocument::Bare(levels) => MapDocument { map_id: DEFAULT_MAP_ID.to_string(), version: 0, levels },
        }
    }
}

pub fn parse_map(json: &str) -> Result<MapDocument> {
    let raw: RawDocument = serde_json::from_str(json).context("parse map document")?;
    Ok(raw.into())
}

/// Loads a map from a JSON document, or from a directory holding one level
/// per `*.json` file.
pub fn load_map(path: &Path) -> Result<MapDocument> {
    if !path.exists() {
        bail!("Map not found: {}", path.display());
    }
    let doc = if path.is_dir() {
        let levels = load_level_dir(path)?;
        let map_id = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_MAP_ID.to_string());
        MapDocument { map_id, version: 0, levels }
    } else {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let raw: RawDocument = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse JSON {}", path.display()))?;
        raw.into()
    };
    info!(
        "map: loaded {}@{} with {} level(s) from {}",
        doc.map_id,
        doc.version,
        doc.levels.len(),
        path.display()
    );
    Ok(doc)
}

fn load_level_dir(folder: &Path) -> Result<Vec<LevelMap>> {
    let mut files: Vec<_> = fs::read_dir(folder)
        .with_context(|| format!("read dir {}", folder.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
        .collect();
    files.sort();
    if files.is_empty() {
        bail!("No level files (*.json) in {}", folder.display());
    }

    files
        .par_iter()
        .map(|path| -> Result<LevelMap> {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let level: LevelMap = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("parse JSON {}", path.display()))?;
            Ok(level)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn bare_array_gets_default_identity() -> Result<()> {
        let doc = parse_map(r#"[{"level": 1}, {"level": 2}]"#)?;
        assert_eq!(doc.map_id, DEFAULT_MAP_ID);
        assert_eq!(doc.version, 0);
        assert_eq!(doc.levels.len(), 2);
        Ok(())
    }

    #[test]
    fn wrapped_document() -> Result<()> {
        let doc = parse_map(r#"{"map_id": "north", "version": 3, "levels": [{"level": -1}]}"#)?;
        assert_eq!(doc.map_id, "north");
        assert_eq!(doc.version, 3);
        assert_eq!(doc.levels[0].level, -1);
        Ok(())
    }

    #[test]
    fn directory_of_levels_in_name_order() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("b_level2.json"), r#"{"level": 2}"#)?;
        fs::write(dir.path().join("a_level1.json"), r#"{"level": 1}"#)?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;
        let doc = load_map(dir.path())?;
        let levels: Vec<i32> = doc.levels.iter().map(|l| l.level).collect();
        assert_eq!(levels, vec![1, 2]);
        Ok(())
    }

    #[test]
    fn bad_json_names_the_file() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("broken.json");
        fs::write(&bad, "{ nope").unwrap();
        let err = load_map(&bad).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
        assert!(load_map(&dir.path().join("missing.json")).is_err());
    }
}
