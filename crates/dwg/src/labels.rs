use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use dwg_extract::json::extract_from_path;
use dwg_extract::{ExtractOptions, Extraction, ResolverConfig, SortOrder};

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum SortMode {
    #[default]
    None,
    Asc,
    Desc,
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortMode::None => write!(f, "none"),
            SortMode::Asc => write!(f, "asc"),
            SortMode::Desc => write!(f, "desc"),
        }
    }
}

impl From<SortMode> for SortOrder {
    fn from(mode: SortMode) -> Self {
        match mode {
            SortMode::None => SortOrder::Unsorted,
            SortMode::Asc => SortOrder::Ascending,
            SortMode::Desc => SortOrder::Descending,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum LabelFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for LabelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelFormat::Text => write!(f, "text"),
            LabelFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "Extract text labels from a drawing")]
pub struct LabelsArgs {
    /// Drawing document to process
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Layer to process; repeat for several (default: all layers)
    #[arg(short, long = "layer", value_name = "NAME")]
    pub layers: Vec<String>,

    /// Sort order for the label list
    #[arg(short, long, default_value_t = SortMode::None)]
    pub sort: SortMode,

    /// Print label coordinates
    #[arg(short, long)]
    pub coordinates: bool,

    /// Resolve title, subtitle and drawing numbers from the title block
    #[arg(short, long)]
    pub metadata: bool,

    /// Output format
    #[arg(short, long, default_value_t = LabelFormat::Text)]
    pub format: LabelFormat,
}

pub fn execute(args: LabelsArgs) -> Result<()> {
    let options = ExtractOptions {
        selected_layers: args.layers.clone(),
        sort_order: args.sort.into(),
        resolve_drawing_numbers: args.metadata,
        resolve_title: args.metadata,
        filename: None,
    };
    let extraction = extract_from_path(&args.file, &options, &ResolverConfig::default());
    if let Some(error) = &extraction.info.error {
        anyhow::bail!("cannot extract {}: {error}", args.file.display());
    }

    let mut writer = io::stdout().lock();
    match args.format {
        LabelFormat::Json => writeln!(writer, "{}", serde_json::to_string_pretty(&extraction)?)?,
        LabelFormat::Text => {
            write_text(&extraction, args.coordinates, args.metadata, &mut writer)?
        }
    }
    Ok(())
}

fn write_text<W: Write>(
    extraction: &Extraction,
    coordinates: bool,
    metadata: bool,
    writer: &mut W,
) -> io::Result<()> {
    let info = &extraction.info;
    writeln!(
        writer,
        "{}: {} labels ({} of {} layers)",
        info.filename, info.final_count, info.processed_layers, info.total_layers
    )?;

    if metadata {
        let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        writeln!(writer, "Title:          {}", or_dash(&info.metadata.title))?;
        writeln!(writer, "Subtitle:       {}", or_dash(&info.metadata.subtitle))?;
        writeln!(
            writer,
            "Drawing number: {}",
            or_dash(&info.metadata.main_drawing_number)
        )?;
        writeln!(
            writer,
            "Source number:  {}",
            or_dash(&info.metadata.source_drawing_number)
        )?;
    }

    for label in &extraction.labels {
        if coordinates {
            writeln!(writer, "{}\t({:.3}, {:.3})", label.text, label.x, label.y)?;
        } else {
            writeln!(writer, "{}", label.text)?;
        }
    }
    Ok(())
}
