//! Named post-process steps that preset calls can invoke.
//!
//! The registry is filled before a run and only read during it. Each step
//! carries a JSON schema describing its arguments, published through
//! [`PostProcessRegistry::schemas`] for external documentation.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::error::{PostProcessError, RegistryError};
use crate::voxelizer::ChunkSet;

/// Callback run for a preset call: receives the written chunks and the
/// call's arguments.
pub type PostProcessFn =
    dyn Fn(&ChunkSet, &Map<String, Value>) -> Result<(), PostProcessError> + Send + Sync;

/// A registered step.
pub struct PostProcessStep {
    name: String,
    schema: Value,
    callback: Box<PostProcessFn>,
}

impl PostProcessStep {
    /// Step name, as used in preset calls.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// JSON schema of the step's arguments.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Run the step.
    pub fn invoke(&self, chunks: &ChunkSet, args: &Map<String, Value>) -> Result<(), PostProcessError> {
        (self.callback)(chunks, args)
    }
}

impl std::fmt::Debug for PostProcessStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostProcessStep")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Name-indexed set of post-process steps.
#[derive(Debug, Default)]
pub struct PostProcessRegistry {
    steps: Vec<PostProcessStep>,
    by_name: FxHashMap<String, usize>,
}

impl PostProcessRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Duplicate`] if the name is taken,
    /// [`RegistryError::EmptyName`] if it is empty.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        schema: Value,
        callback: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&ChunkSet, &Map<String, Value>) -> Result<(), PostProcessError> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.by_name.insert(name.clone(), self.steps.len());
        self.steps.push(PostProcessStep {
            name,
            schema,
            callback: Box::new(callback),
        });
        Ok(())
    }

    /// Look up a step by name.
    pub fn get(&self, name: &str) -> Option<&PostProcessStep> {
        self.by_name.get(name).map(|&i| &self.steps[i])
    }

    /// Returns `true` if a step named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Argument schemas keyed by step name, sorted by name.
    pub fn schemas(&self) -> Map<String, Value> {
        self.steps
            .iter()
            .map(|step| (step.name.clone(), step.schema.clone()))
            .collect()
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop(_: &ChunkSet, _: &Map<String, Value>) -> Result<(), PostProcessError> {
        Ok(())
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = PostProcessRegistry::new();
        registry
            .register("carve", json!({"type": "object"}), noop)
            .unwrap();
        assert_eq!(registry.len(), 1);
        let step = registry.get("carve").unwrap();
        assert_eq!(step.name(), "carve");
        assert_eq!(step.schema(), &json!({"type": "object"}));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = PostProcessRegistry::new();
        registry.register("smooth", json!({}), noop).unwrap();
        let err = registry.register("smooth", json!({}), noop).unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(ref n) if n == "smooth"));
        assert_eq!(registry.len(), 1, "failed registration must not add a step");
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = PostProcessRegistry::new();
        assert!(matches!(
            registry.register("", json!({}), noop),
            Err(RegistryError::EmptyName)
        ));
    }

    #[test]
    fn test_schemas_sorted_by_name() {
        let mut registry = PostProcessRegistry::new();
        registry.register("zeta", json!({"z": 1}), noop).unwrap();
        registry.register("alpha", json!({"a": 1}), noop).unwrap();
        let schemas = registry.schemas();
        let names: Vec<_> = schemas.keys().cloned().collect();
        assert_eq!(names, ["alpha", "zeta"]);
        assert_eq!(schemas["zeta"], json!({"z": 1}));
    }
}
