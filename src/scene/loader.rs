//! Object-spec documents: a JSON mapping from composite key to object spec.

use std::path::Path;

use crate::foundation::error::{StagehandError, StagehandResult};
use crate::scene::registry::Registry;

/// Read and decode a JSON document, keeping key order.
pub fn read_document(path: &Path) -> StagehandResult<serde_json::Value> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        StagehandError::load_with(format!("failed to read `{}`", path.display()), e)
    })?;
    parse_document(&text)
}

/// Decode a JSON document from text.
pub fn parse_document(text: &str) -> StagehandResult<serde_json::Value> {
    serde_json::from_str(text)
        .map_err(|e| StagehandError::load_with("error while deserializing json object", e))
}

impl Registry {
    /// Register every entry of an object-spec document without building it.
    pub fn register_document(&mut self, doc: &serde_json::Value) -> StagehandResult<()> {
        let map = doc
            .as_object()
            .ok_or_else(|| StagehandError::load("an object document must be a mapping"))?;
        for (key, raw) in map {
            self.add_key(key, raw.clone())?;
        }
        tracing::debug!(objects = map.len(), "registered object document");
        Ok(())
    }

    /// Register and build an object-spec document given as text.
    pub fn from_document_str(text: &str) -> StagehandResult<Self> {
        let mut registry = Self::new();
        registry.register_document(&parse_document(text)?)?;
        registry.build_all()?;
        Ok(registry)
    }
}

/// Load, register and build an object-spec document into a fresh registry.
pub fn load_objects(path: &Path) -> StagehandResult<Registry> {
    let mut registry = Registry::new();
    load_objects_into(&mut registry, path)?;
    Ok(registry)
}

/// Load, register and build an object-spec document into `registry`, which may already
/// carry user kinds.
pub fn load_objects_into(registry: &mut Registry, path: &Path) -> StagehandResult<()> {
    let doc = read_document(path)?;
    registry.register_document(&doc)?;
    registry.build_all()
}
