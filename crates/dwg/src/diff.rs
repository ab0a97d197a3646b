use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL_CONDENSED;

use dwg_diff::{LabelDiff, diff_labels, translate};
use dwg_extract::json::extract_from_path;
use dwg_extract::{ExtractOptions, ResolverConfig};
use dwg_label::TextLabel;

#[derive(ValueEnum, Debug, Clone, Default)]
pub enum DiffFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl std::fmt::Display for DiffFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffFormat::Table => write!(f, "table"),
            DiffFormat::Json => write!(f, "json"),
            DiffFormat::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "Compare the labels of two drawing versions")]
pub struct DiffArgs {
    /// Drawing pairs: OLD NEW [OLD NEW ...]
    #[arg(value_name = "FILE", required = true, num_args = 2..)]
    pub files: Vec<PathBuf>,

    /// Coordinate tolerance for matching label positions
    #[arg(short, long, default_value_t = 0.01)]
    pub tolerance: f64,

    /// Pre-translate the new drawing by this offset before diffing
    #[arg(long, value_name = "DX,DY", value_parser = parse_offset, allow_hyphen_values = true)]
    pub offset: Option<(f64, f64)>,

    /// Output format
    #[arg(short, long, default_value_t = DiffFormat::Table)]
    pub format: DiffFormat,

    /// Include unchanged labels in the output
    #[arg(short, long)]
    pub unchanged: bool,

    /// Layer to process; repeat for several (default: all layers)
    #[arg(short, long = "layer", value_name = "NAME")]
    pub layers: Vec<String>,
}

fn parse_offset(raw: &str) -> Result<(f64, f64), String> {
    let (dx, dy) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got '{raw}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|e| format!("bad offset component '{part}': {e}"))
    };
    Ok((parse(dx)?, parse(dy)?))
}

pub fn execute(args: DiffArgs) -> Result<()> {
    if args.files.len() % 2 != 0 {
        anyhow::bail!(
            "expected an even number of files (OLD NEW pairs), got {}",
            args.files.len()
        );
    }

    let config = ResolverConfig::default();
    let options = ExtractOptions {
        selected_layers: args.layers.clone(),
        ..Default::default()
    };
    let pair_count = args.files.len() / 2;

    let mut failures = 0usize;
    for pair in args.files.chunks(2) {
        let (old_path, new_path) = (&pair[0], &pair[1]);
        if let Err(e) = diff_pair(old_path, new_path, &args, &options, &config, pair_count > 1) {
            failures += 1;
            eprintln!(
                "{} {}: {e:#}",
                "Failed:".red(),
                format!("{} -> {}", old_path.display(), new_path.display())
            );
        }
    }
    if failures > 0 {
        anyhow::bail!("{failures} of {pair_count} pairs failed");
    }
    Ok(())
}

fn extract(path: &Path, options: &ExtractOptions, config: &ResolverConfig) -> Result<Vec<TextLabel>> {
    let extraction = extract_from_path(path, options, config);
    if let Some(error) = extraction.info.error {
        anyhow::bail!("cannot extract {}: {error}", path.display());
    }
    log::debug!(
        "{}: {} labels extracted",
        path.display(),
        extraction.labels.len()
    );
    Ok(extraction.labels)
}

fn diff_pair(
    old_path: &Path,
    new_path: &Path,
    args: &DiffArgs,
    options: &ExtractOptions,
    config: &ResolverConfig,
    batch: bool,
) -> Result<()> {
    let old = extract(old_path, options, config)?;
    let mut new = extract(new_path, options, config)?;
    if let Some((dx, dy)) = args.offset {
        translate(&mut new, dx, dy);
    }

    let mut diff = diff_labels(&old, &new, args.tolerance);
    if !args.unchanged {
        diff.unchanged.clear();
    }

    let mut writer = io::stdout().lock();
    if batch && !matches!(args.format, DiffFormat::Json) {
        writeln!(writer, "== {} -> {}", old_path.display(), new_path.display())?;
    }
    match args.format {
        DiffFormat::Json => writeln!(writer, "{}", serde_json::to_string_pretty(&diff)?)?,
        DiffFormat::Csv => write_csv(&diff, &mut writer)?,
        DiffFormat::Table => write_table(&diff, &mut writer)?,
    }
    Ok(())
}

fn write_table<W: Write>(diff: &LabelDiff, writer: &mut W) -> io::Result<()> {
    if diff.changes.is_empty() {
        writeln!(writer, "No label changes.")?;
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["Coordinate X", "Coordinate Y", "Old Label", "New Label"]);
        for change in &diff.changes {
            table.add_row(vec![
                format!("{:.3}", change.x),
                format!("{:.3}", change.y),
                change.old_label.clone().unwrap_or_default(),
                change.new_label.clone().unwrap_or_default(),
            ]);
        }
        writeln!(writer, "{table}")?;
    }

    if !diff.unchanged.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["Label", "Count", "Coordinate X", "Coordinate Y"]);
        for entry in &diff.unchanged {
            table.add_row(vec![
                entry.label.clone(),
                entry.count.to_string(),
                format!("{:.3}", entry.x),
                format!("{:.3}", entry.y),
            ]);
        }
        writeln!(writer, "{table}")?;
    }

    writeln!(
        writer,
        "{} changes, {} unchanged",
        diff.changes.len(),
        diff.unchanged.iter().map(|u| u.count).sum::<usize>()
    )?;
    Ok(())
}

fn write_csv<W: Write>(diff: &LabelDiff, writer: &mut W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(&mut *writer);
    csv.write_record(["Coordinate X", "Coordinate Y", "Old Label", "New Label"])
        .context("writing csv header")?;
    for change in &diff.changes {
        csv.write_record([
            format!("{:.3}", change.x),
            format!("{:.3}", change.y),
            change.old_label.clone().unwrap_or_default(),
            change.new_label.clone().unwrap_or_default(),
        ])?;
    }
    csv.flush()?;
    drop(csv);

    if !diff.unchanged.is_empty() {
        writeln!(writer)?;
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["Label", "Count", "Coordinate X", "Coordinate Y"])?;
        for entry in &diff.unchanged {
            csv.write_record([
                entry.label.clone(),
                entry.count.to_string(),
                format!("{:.3}", entry.x),
                format!("{:.3}", entry.y),
            ])?;
        }
        csv.flush()?;
    }
    Ok(())
}
