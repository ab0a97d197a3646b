//! The seam between this crate and whatever parses the drawing format.

use serde::{Deserialize, Serialize};

use crate::ExtractError;

/// One annotation-bearing entity of a drawing layout.
///
/// This is a closed set on purpose: the loosely-typed records a CAD
/// reader produces are mapped onto these variants at the boundary, and
/// nothing downstream ever sees a raw entity shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    /// Single-line annotation. Plain text, no inline markup.
    #[serde(rename = "text")]
    TextRun {
        layer: String,
        text: String,
        x: f64,
        y: f64,
    },
    /// Multi-line annotation whose text may carry inline formatting codes.
    #[serde(rename = "rich_text")]
    RichTextRun {
        layer: String,
        text: String,
        x: f64,
        y: f64,
    },
    /// Block reference, already expanded to its constituent entities.
    Reference {
        layer: String,
        x: f64,
        y: f64,
        entities: Vec<Entity>,
    },
}

impl Entity {
    pub fn layer(&self) -> &str {
        match self {
            Entity::TextRun { layer, .. }
            | Entity::RichTextRun { layer, .. }
            | Entity::Reference { layer, .. } => layer,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        match self {
            Entity::TextRun { x, y, .. }
            | Entity::RichTextRun { x, y, .. }
            | Entity::Reference { x, y, .. } => (*x, *y),
        }
    }

    /// Stable tag used in the traversal-dedup key.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            Entity::TextRun { .. } => "text",
            Entity::RichTextRun { .. } => "rich_text",
            Entity::Reference { .. } => "reference",
        }
    }
}

/// A parsed drawing document.
///
/// Implementations must fail closed: malformed input raises an
/// [`ExtractError`] rather than returning partial data silently.
pub trait DocumentSource {
    /// All layer names the document defines.
    fn layer_names(&self) -> Result<Vec<String>, ExtractError>;

    /// Entities of the model layout.
    fn model_entities(&self) -> Result<Vec<Entity>, ExtractError>;

    /// Secondary (non-model) layouts, as `(name, entities)` pairs.
    fn secondary_layouts(&self) -> Result<Vec<(String, Vec<Entity>)>, ExtractError>;
}
