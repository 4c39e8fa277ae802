//! `pagediff` CLI - Highlight what a new PDF adds over an old one

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pagediff::{DiffOptions, Granularity, Rgb};

#[derive(Parser)]
#[command(name = "pagediff")]
#[command(about = "Visual diff for paginated documents: highlights additions in the new version")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.config/pagediff/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two PDFs and write the new one with additions highlighted
    Compare(CompareArgs),

    /// Print the reconstructed text units of a PDF as JSON lines
    Units {
        /// PDF to inspect
        file: PathBuf,

        /// Unit granularity
        #[arg(short, long, value_enum)]
        granularity: Option<GranularityArg>,

        /// Directory containing the pdfium library
        #[arg(long, value_name = "DIR")]
        pdfium_dir: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct CompareArgs {
    /// Old version of the document
    pub old: PathBuf,

    /// New version of the document
    pub new: PathBuf,

    /// Output file (default: <NEW stem>.highlighted.pdf)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Diff word by word, or line by line at character level
    #[arg(short, long, value_enum)]
    pub granularity: Option<GranularityArg>,

    /// Highlight colour as #RRGGBB
    #[arg(long, value_name = "HEX")]
    pub color: Option<Rgb>,

    /// Highlight fill opacity (0.0 - 1.0)
    #[arg(long)]
    pub opacity: Option<f32>,

    /// Padding around word highlights
    #[arg(long)]
    pub padding: Option<f32>,

    /// Max vertical distance between runs of one line (line mode)
    #[arg(long)]
    pub y_tolerance: Option<f32>,

    /// Gap above which runs are joined with a space (line mode)
    #[arg(long)]
    pub join_gap: Option<f32>,

    /// Ignore letter case when comparing
    #[arg(long)]
    pub fold_case: bool,

    /// Ignore diacritics when comparing
    #[arg(long)]
    pub fold_diacritics: bool,

    /// Fold compatibility forms (NFKC) when comparing
    #[arg(long)]
    pub fold_compatibility: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Directory containing the pdfium library
    #[arg(long, value_name = "DIR")]
    pub pdfium_dir: Option<PathBuf>,
}

impl CompareArgs {
    /// Apply command-line overrides on top of file options.
    pub fn apply(&self, mut options: DiffOptions) -> DiffOptions {
        if let Some(granularity) = self.granularity {
            options.granularity = granularity.into();
        }
        if let Some(color) = self.color {
            options.style.color = color;
        }
        if let Some(opacity) = self.opacity {
            options.style.opacity = opacity;
        }
        if let Some(padding) = self.padding {
            options.padding = padding;
        }
        if let Some(tolerance) = self.y_tolerance {
            options.y_cluster_tolerance = tolerance;
        }
        if let Some(gap) = self.join_gap {
            options.join_gap_threshold = gap;
        }
        options.keys.fold_case |= self.fold_case;
        options.keys.fold_diacritics |= self.fold_diacritics;
        options.keys.fold_compatibility |= self.fold_compatibility;
        if let Some(dir) = &self.pdfium_dir {
            options.pdfium_dir = Some(dir.clone());
        }
        options
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GranularityArg {
    /// One unit per word
    Token,
    /// One unit per line, diffed by character
    Line,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Token => Granularity::Token,
            GranularityArg::Line => Granularity::LineCharacter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Compare(args) => {
            cmd::compare::cmd_compare(&args, cli.config.as_deref()).await?;
        }
        Commands::Units {
            file,
            granularity,
            pdfium_dir,
        } => {
            cmd::units::cmd_units(&file, granularity.map(Into::into), pdfium_dir, cli.config.as_deref()).await?;
        }
    }

    Ok(())
}
