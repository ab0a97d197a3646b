use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod diff;
mod labels;
mod offset;

#[derive(Parser)]
#[command(name = "dwg")]
#[command(about = "Text-label extraction and diffing for CAD drawings", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text labels from a drawing
    #[command(alias = "l")]
    Labels(labels::LabelsArgs),

    /// Compare the labels of two drawing versions
    #[command(alias = "d")]
    Diff(diff::DiffArgs),

    /// Detect a dominant positional shift between two drawings
    Offset(offset::OffsetArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger with default level depending on --debug (overridden by RUST_LOG)
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Labels(args) => labels::execute(args),
        Commands::Diff(args) => diff::execute(args),
        Commands::Offset(args) => offset::execute(args),
    }
}
