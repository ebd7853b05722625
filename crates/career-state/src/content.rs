//! Content Pack Loading
//!
//! Authored scenarios and narrative threads arrive as one JSON document.
//! The engine treats the result as validated input; only structural checks
//! that would otherwise make lookups ambiguous are done here.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::narrative::NarrativeThread;
use crate::scenario::Scenario;

/// Errors raised while loading content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate scenario id: {0}")]
    DuplicateScenario(String),
    #[error("duplicate thread id: {0}")]
    DuplicateThread(String),
}

/// Scenarios plus the narrative threads layered over them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPack {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub threads: Vec<NarrativeThread>,
}

impl ContentPack {
    /// Parses and checks a content pack from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ContentError> {
        let pack: ContentPack = serde_json::from_str(json)?;
        pack.check_unique_ids()?;
        Ok(pack)
    }

    /// Loads a content pack from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ContentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Finds a scenario by id.
    pub fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    fn check_unique_ids(&self) -> Result<(), ContentError> {
        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if !seen.insert(scenario.id.as_str()) {
                return Err(ContentError::DuplicateScenario(scenario.id.clone()));
            }
        }
        let mut seen = HashSet::new();
        for thread in &self.threads {
            if !seen.insert(thread.id.as_str()) {
                return Err(ContentError::DuplicateThread(thread.id.clone()));
            }
        }
        Ok(())
    }
}
