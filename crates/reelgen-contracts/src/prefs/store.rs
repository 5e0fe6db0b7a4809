use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Key-value preference file. Every write re-reads the file and merges the
/// changed key in, so separate writers never drop each other's keys; the
/// last write to a key wins.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    payload: Option<Map<String, Value>>,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            payload: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads a boolean flag. Booleans and the strings `"true"`/`"false"`
    /// are accepted; anything else reads as unset.
    pub fn get_flag(&mut self, key: &str) -> Option<bool> {
        let payload = self.ensure_loaded(false);
        match payload.get(key)? {
            Value::Bool(value) => Some(*value),
            Value::String(raw) => match raw.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn set_flag(&mut self, key: &str, value: bool) -> anyhow::Result<()> {
        let mut on_disk = read_json_object(&self.path).unwrap_or_default();
        on_disk.insert(key.to_string(), Value::Bool(value));
        write_json_object(&self.path, &on_disk)?;
        self.payload = Some(on_disk);
        Ok(())
    }

    pub fn snapshot(&mut self) -> Map<String, Value> {
        self.ensure_loaded(true).clone()
    }

    fn ensure_loaded(&mut self, refresh: bool) -> &mut Map<String, Value> {
        if refresh || self.payload.is_none() {
            self.payload = Some(read_json_object(&self.path).unwrap_or_default());
        }
        self.payload.get_or_insert_with(Map::new)
    }
}

fn read_json_object(path: &Path) -> Option<Map<String, Value>> {
    let raw = std::fs::read_to_string(path).ok()?;
    let parsed: Value = serde_json::from_str(&raw).ok()?;
    parsed.as_object().cloned()
}

fn write_json_object(path: &Path, payload: &Map<String, Value>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(
        path,
        serde_json::to_string_pretty(&Value::Object(payload.clone()))?,
    )?;
    Ok(())
}
