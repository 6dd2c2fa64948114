//! Ordered log of generation steps.
//!
//! A trace is appended to in execution order and written once at the end of
//! a run as a JSON array of `{"fn": name, "args": {...}}` objects.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TraceError;

/// One recorded step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Step name.
    #[serde(rename = "fn")]
    pub name: String,
    /// Step arguments.
    #[serde(default)]
    pub args: Map<String, Value>,
}

/// Append-only list of steps for one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallTrace {
    entries: Vec<TraceEntry>,
}

impl CallTrace {
    /// An empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn record(&mut self, name: impl Into<String>, args: Map<String, Value>) {
        self.entries.push(TraceEntry {
            name: name.into(),
            args,
        });
    }

    /// Steps in the order they were recorded.
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the trace as pretty JSON, consuming it.
    pub fn save(self, path: &Path) -> Result<(), TraceError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("trace with {} steps saved to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Read a trace written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self, TraceError> {
        let text = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries = serde_json::from_str(&text)?;
        Ok(Self { entries })
    }
}
