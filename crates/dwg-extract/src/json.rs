//! JSON-backed document adapter.
//!
//! Real drawings come from an external CAD reader implementing
//! [`DocumentSource`]; this adapter reads the same entity model from a
//! JSON file instead. It is what the CLI and the integration tests feed
//! on, and doubles as the reference shape for writing new adapters.
//!
//! ```json
//! {
//!   "layers": ["0", "TITLE_BLOCK"],
//!   "model": [
//!     {"kind": "text", "layer": "0", "text": "R1", "x": 1.0, "y": 2.0}
//!   ],
//!   "layouts": {"Sheet2": []}
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    DocumentSource, Entity, ExtractError, Extraction, ExtractOptions, ResolverConfig,
    extract_labels,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonDocument {
    /// Layer names; derived from the entities when absent.
    #[serde(default)]
    pub layers: Vec<String>,
    /// Entities of the model layout.
    #[serde(default)]
    pub model: Vec<Entity>,
    /// Secondary layouts by name.
    #[serde(default)]
    pub layouts: BTreeMap<String, Vec<Entity>>,
}

impl JsonDocument {
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Distinct layers observed on entities, sorted, including nested
    /// reference contents.
    fn observed_layers(&self) -> Vec<String> {
        fn visit(entities: &[Entity], out: &mut BTreeMap<String, ()>) {
            for entity in entities {
                out.insert(entity.layer().to_string(), ());
                if let Entity::Reference { entities, .. } = entity {
                    visit(entities, out);
                }
            }
        }
        let mut layers = BTreeMap::new();
        visit(&self.model, &mut layers);
        for entities in self.layouts.values() {
            visit(entities, &mut layers);
        }
        layers.into_keys().collect()
    }
}

impl DocumentSource for JsonDocument {
    fn layer_names(&self) -> Result<Vec<String>, ExtractError> {
        if self.layers.is_empty() {
            Ok(self.observed_layers())
        } else {
            Ok(self.layers.clone())
        }
    }

    fn model_entities(&self) -> Result<Vec<Entity>, ExtractError> {
        Ok(self.model.clone())
    }

    fn secondary_layouts(&self) -> Result<Vec<(String, Vec<Entity>)>, ExtractError> {
        Ok(self
            .layouts
            .iter()
            .map(|(name, entities)| (name.clone(), entities.clone()))
            .collect())
    }
}

/// Open a JSON document and extract its labels in one step.
///
/// Open/parse failures land in `info.error` like any other extraction
/// failure, so batch callers get a uniform per-file result. The parsed
/// document is dropped before this returns.
pub fn extract_from_path(
    path: &Path,
    options: &ExtractOptions,
    config: &ResolverConfig,
) -> Extraction {
    let mut options = options.clone();
    if options.filename.is_none() {
        options.filename = Some(path.display().to_string());
    }
    match JsonDocument::from_path(path) {
        Ok(document) => extract_labels(&document, &options, config),
        Err(err) => {
            log::warn!("cannot open {}: {err}", path.display());
            let mut extraction = Extraction {
                labels: Vec::new(),
                info: Default::default(),
            };
            extraction.info.filename = options.filename.unwrap_or_default();
            extraction.info.error = Some(err.to_string());
            extraction
        }
    }
}
