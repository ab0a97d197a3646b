use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL_CONDENSED;

use dwg_diff::{OffsetReport, analyze_offsets};
use dwg_extract::json::extract_from_path;
use dwg_extract::{ExtractOptions, ResolverConfig};

#[derive(Args, Debug, Clone)]
#[command(about = "Detect a dominant positional shift between two drawings")]
pub struct OffsetArgs {
    /// Reference drawing (A)
    #[arg(value_name = "FILE_A", value_hint = clap::ValueHint::FilePath)]
    pub file_a: PathBuf,

    /// Comparison drawing (B)
    #[arg(value_name = "FILE_B", value_hint = clap::ValueHint::FilePath)]
    pub file_b: PathBuf,

    /// Clustering tolerance for offset values
    #[arg(short, long, default_value_t = 0.1)]
    pub tolerance: f64,

    /// Number of top clusters to show
    #[arg(short = 'n', long, default_value_t = 10)]
    pub top_n: usize,

    /// Show every cluster instead of the top N
    #[arg(short, long)]
    pub all: bool,

    /// Layer to process; repeat for several (default: all layers)
    #[arg(short, long = "layer", value_name = "NAME")]
    pub layers: Vec<String>,
}

pub fn execute(args: OffsetArgs) -> Result<()> {
    let config = ResolverConfig::default();
    let options = ExtractOptions {
        selected_layers: args.layers.clone(),
        ..Default::default()
    };

    let extract = |path: &PathBuf| -> Result<Vec<dwg_label::TextLabel>> {
        let extraction = extract_from_path(path, &options, &config);
        if let Some(error) = extraction.info.error {
            anyhow::bail!("cannot extract {}: {error}", path.display());
        }
        Ok(extraction.labels)
    };
    let a = extract(&args.file_a)?;
    let b = extract(&args.file_b)?;

    let report = analyze_offsets(&a, &b, args.tolerance);

    let mut writer = io::stdout().lock();
    writeln!(writer, "File A: {}", args.file_a.display())?;
    writeln!(writer, "File B: {}", args.file_b.display())?;
    writeln!(writer, "Tolerance: {}", report.tolerance)?;
    write_report(&report, args.top_n, args.all, &mut writer)?;
    Ok(())
}

fn write_report<W: Write>(
    report: &OffsetReport,
    top_n: usize,
    all: bool,
    writer: &mut W,
) -> io::Result<()> {
    writeln!(writer, "Samples: {}", report.total_samples)?;
    writeln!(writer, "Clusters: {}", report.clusters.len())?;

    if report.total_samples == 0 {
        writeln!(writer, "No common labels between the two drawings.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "\nUnmoved labels (offset ~ 0, 0): {} ({:.2}%)",
        report.no_change_members, report.no_change_share
    )?;
    if let Some(dominant) = &report.dominant {
        writeln!(
            writer,
            "Dominant shift ({:.2}, {:.2}): {} ({:.2}%)",
            dominant.dx, dominant.dy, dominant.members, dominant.share
        )?;
        writeln!(writer, "Other offsets: {:.2}%", report.residual_share)?;

        if dominant.is_significant() {
            writeln!(
                writer,
                "\nVerdict: a dominant shift pattern exists; translating drawing B by \
                 ({:.2}, {:.2}) would cancel {:.2}% of the positional differences.",
                dominant.dx, dominant.dy, dominant.share
            )?;
        } else {
            writeln!(
                writer,
                "\nVerdict: no single shift explains the differences; they look like \
                 real content or per-element changes."
            )?;
        }
    } else {
        writeln!(writer, "\nVerdict: no positional shift detected.")?;
    }

    let shown = if all {
        report.clusters.len()
    } else {
        top_n.min(report.clusters.len())
    };
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Rank", "dx", "dy", "Count", "Share"]);
    for (rank, cluster) in report.clusters.iter().take(shown).enumerate() {
        let share = cluster.members.len() as f64 / report.total_samples as f64 * 100.0;
        table.add_row(vec![
            (rank + 1).to_string(),
            format!("{:.2}", cluster.dx),
            format!("{:.2}", cluster.dy),
            cluster.members.len().to_string(),
            format!("{share:.2}%"),
        ]);
    }
    writeln!(writer, "\n{table}")?;

    if !all && report.clusters.len() > shown {
        writeln!(
            writer,
            "... {} more clusters (use --all to show them)",
            report.clusters.len() - shown
        )?;
    }
    Ok(())
}
