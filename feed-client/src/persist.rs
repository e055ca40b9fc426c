use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use zenith_core::CoreError;

pub const DEFAULT_SELECTION_FILE: &str = "zenith-feed-storage.json";

/// Durable home of the last selected monitor id. Nothing else is persisted.
pub trait SelectionStorage: Send + Sync {
    fn load(&self) -> Result<Option<String>, CoreError>;
    fn save(&self, selected_monitor_id: Option<&str>) -> Result<(), CoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSelection {
    #[serde(default)]
    selected_monitor_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JsonFileSelection {
    path: PathBuf,
}

impl JsonFileSelection {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileSelection {
    fn default() -> Self {
        Self::new(DEFAULT_SELECTION_FILE)
    }
}

impl SelectionStorage for JsonFileSelection {
    fn load(&self) -> Result<Option<String>, CoreError> {
        if !self.path.exists() {
            debug!("No persisted selection at {}", self.path.display());
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let persisted: PersistedSelection = serde_json::from_str(&contents)?;
        Ok(persisted.selected_monitor_id)
    }

    fn save(&self, selected_monitor_id: Option<&str>) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let persisted = PersistedSelection {
            selected_monitor_id: selected_monitor_id.map(str::to_string),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&persisted)?)?;
        debug!("Persisted selection {:?} to {}", selected_monitor_id, self.path.display());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySelection {
    selected: Mutex<Option<String>>,
}

impl MemorySelection {
    pub fn new(selected_monitor_id: Option<String>) -> Self {
        Self {
            selected: Mutex::new(selected_monitor_id),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.selected.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl SelectionStorage for MemorySelection {
    fn load(&self) -> Result<Option<String>, CoreError> {
        Ok(self.get())
    }

    fn save(&self, selected_monitor_id: Option<&str>) -> Result<(), CoreError> {
        let mut selected = self.selected.lock().map_err(|_| CoreError::Internal {
            message: "selection lock poisoned".to_string(),
        })?;
        *selected = selected_monitor_id.map(str::to_string);
        Ok(())
    }
}
