//! Walking a document into a flat, normalized label list.

use std::collections::HashSet;

use serde::Serialize;

use dwg_label::{TextLabel, mtext};

use crate::metadata::{self, DrawingMetadata, NumberCandidate};
use crate::{DocumentSource, Entity, ExtractError, ResolverConfig};

/// Sort order applied to the final label list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Layers to process; empty means every layer.
    pub selected_layers: Vec<String>,
    pub sort_order: SortOrder,
    /// Find drawing-number candidates and assign main/source roles.
    pub resolve_drawing_numbers: bool,
    /// Run the title/subtitle heuristics.
    pub resolve_title: bool,
    /// Display name of the document; its stem also feeds the
    /// drawing-number filename match.
    pub filename: Option<String>,
}

/// Counters and resolved metadata accompanying one extraction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionInfo {
    pub filename: String,
    pub total_extracted: usize,
    pub final_count: usize,
    pub processed_layers: usize,
    pub total_layers: usize,
    /// Every drawing-number candidate seen, in extraction order.
    pub all_drawing_numbers: Vec<String>,
    pub metadata: DrawingMetadata,
    /// Set when the document could not be read; labels are empty then.
    pub error: Option<String>,
}

/// Result of extracting one document. Always produced — read failures
/// surface as `info.error`, never as a panic or a propagated error.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub labels: Vec<TextLabel>,
    pub info: ExtractionInfo,
}

impl Extraction {
    pub fn is_err(&self) -> bool {
        self.info.error.is_some()
    }
}

/// Extract normalized text labels from a document.
pub fn extract_labels<S: DocumentSource>(
    source: &S,
    options: &ExtractOptions,
    config: &ResolverConfig,
) -> Extraction {
    let mut info = ExtractionInfo {
        filename: options.filename.clone().unwrap_or_default(),
        ..Default::default()
    };
    match extract_inner(source, options, config, &mut info) {
        Ok(labels) => Extraction { labels, info },
        Err(err) => {
            log::warn!("extraction failed for {:?}: {err}", info.filename);
            info.error = Some(err.to_string());
            Extraction {
                labels: Vec::new(),
                info,
            }
        }
    }
}

fn extract_inner<S: DocumentSource>(
    source: &S,
    options: &ExtractOptions,
    config: &ResolverConfig,
    info: &mut ExtractionInfo,
) -> Result<Vec<TextLabel>, ExtractError> {
    let all_layers = source.layer_names()?;
    info.total_layers = all_layers.len();

    let selected: Vec<String> = if options.selected_layers.is_empty() {
        all_layers
    } else {
        options.selected_layers.clone()
    };
    info.processed_layers = selected.len();
    let selected_set: HashSet<&str> = selected.iter().map(String::as_str).collect();

    let model = source.model_entities()?;
    let layouts = source.secondary_layouts()?;

    // Text entities from the model layout and every secondary layout,
    // then the contents of block references on a selected layer. The
    // same entity can be reachable through several of these paths.
    let mut pending: Vec<Entity> = Vec::new();
    let direct = model
        .iter()
        .chain(layouts.iter().flat_map(|(_, entities)| entities.iter()));
    for entity in direct.clone() {
        if !matches!(entity, Entity::Reference { .. }) {
            pending.push(entity.clone());
        }
    }
    for entity in direct {
        if let Entity::Reference {
            layer, entities, ..
        } = entity
            && selected_set.contains(layer.as_str())
        {
            expand_into(entities, &mut pending);
        }
    }

    // Collapse duplicate traversal paths. Keyed on kind/layer/raw
    // position, so independently repeated annotations elsewhere survive.
    let mut seen: HashSet<(&'static str, String, u64, u64)> = HashSet::new();
    let mut unique: Vec<Entity> = Vec::new();
    for entity in pending {
        let (x, y) = entity.position();
        let key = (
            entity.kind_tag(),
            entity.layer().to_string(),
            x.to_bits(),
            y.to_bits(),
        );
        if seen.insert(key) {
            unique.push(entity);
        }
    }

    let mut labels: Vec<TextLabel> = Vec::new();
    let mut candidates: Vec<NumberCandidate> = Vec::new();
    for entity in &unique {
        if !selected_set.contains(entity.layer()) {
            continue;
        }
        let clean = match entity {
            Entity::TextRun { text, .. } => text.trim().to_string(),
            Entity::RichTextRun { text, .. } => mtext::normalize(text),
            Entity::Reference { .. } => continue,
        };
        if clean.is_empty() {
            continue;
        }
        let (x, y) = entity.position();
        let label = TextLabel::new(clean, x, y);
        if options.resolve_drawing_numbers {
            candidates.extend(metadata::candidates_in_label(&label, config));
        }
        labels.push(label);
    }
    info.total_extracted = labels.len();

    if options.resolve_drawing_numbers && !candidates.is_empty() {
        let (main, source_number) = metadata::resolve_number_roles(
            &candidates,
            &labels,
            options.filename.as_deref(),
            config,
        );
        info.metadata.main_drawing_number = main;
        info.metadata.source_drawing_number = source_number;
        info.all_drawing_numbers = candidates.iter().map(|c| c.value.clone()).collect();
    }

    if options.resolve_title && !labels.is_empty() {
        let numbers: &[NumberCandidate] = if options.resolve_drawing_numbers {
            &candidates
        } else {
            &[]
        };
        let (title, subtitle) = metadata::resolve_title_and_subtitle(&labels, numbers, config);
        info.metadata.title = title;
        info.metadata.subtitle = subtitle;
    }

    match options.sort_order {
        SortOrder::Ascending => labels.sort_by(|a, b| a.cmp_text_then_position(b)),
        SortOrder::Descending => labels.sort_by(|a, b| b.cmp_text_then_position(a)),
        SortOrder::Unsorted => {}
    }
    info.final_count = labels.len();
    Ok(labels)
}

/// Recursively collect the text entities inside an expanded reference.
fn expand_into(entities: &[Entity], out: &mut Vec<Entity>) {
    for entity in entities {
        match entity {
            Entity::Reference { entities, .. } => expand_into(entities, out),
            _ => out.push(entity.clone()),
        }
    }
}
