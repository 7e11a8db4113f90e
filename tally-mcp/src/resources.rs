//! Calculator config files under the data path

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_URI_PREFIX: &str = "tally://configs/";

#[derive(Debug, Clone, Serialize)]
pub struct ConfigFileInfo {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// All `*.json` files in the data path and its `configs` subdirectory,
/// sorted by name
pub fn list_config_files(data_path: &Path) -> Vec<ConfigFileInfo> {
    let mut files = Vec::new();

    for dir in [data_path.to_path_buf(), data_path.join("configs")] {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let file_path = entry.path();
            if !file_path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            if let Some(name) = file_path.file_stem().and_then(|s| s.to_str()) {
                files.push(ConfigFileInfo {
                    name: name.to_string(),
                    path: file_path.to_string_lossy().to_string(),
                    size: fs::metadata(&file_path).ok().map(|m| m.len()),
                    title: extract_title(&file_path),
                });
            }
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    files
}

/// `metadata.title` of a config file, if it has one
fn extract_title(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let json: JsonValue = serde_json::from_str(&content).ok()?;
    json.get("metadata")?.get("title")?.as_str().map(str::to_string)
}

/// Load a config file by name (without extension)
pub fn load_config_file(data_path: &Path, name: &str) -> Result<String, String> {
    if name.is_empty() || name.contains(&['/', '\\'][..]) || name.contains("..") {
        return Err(format!("Invalid config name '{}'", name));
    }

    let candidates: [PathBuf; 2] = [
        data_path.join(format!("{}.json", name)),
        data_path.join("configs").join(format!("{}.json", name)),
    ];

    for path in candidates {
        if path.exists() {
            return fs::read_to_string(&path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e));
        }
    }

    let available: Vec<String> = list_config_files(data_path).into_iter().map(|f| f.name).collect();
    Err(format!("Config '{}' not found. Available: {:?}", name, available))
}
