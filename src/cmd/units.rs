use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use pagediff::{load_options, DiffPipeline, Granularity};

pub async fn cmd_units(
    file: &Path,
    granularity: Option<Granularity>,
    pdfium_dir: Option<PathBuf>,
    config: Option<&Path>,
) -> Result<()> {
    let mut options = load_options(config)?;
    if let Some(granularity) = granularity {
        options.granularity = granularity;
    }
    if pdfium_dir.is_some() {
        options.pdfium_dir = pdfium_dir;
    }

    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let document = DiffPipeline::pdfium(options).reconstruct(bytes).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for unit in &document.units {
        writeln!(out, "{}", serde_json::to_string(unit)?)?;
    }

    eprintln!("📝 {} units on {} pages", document.units.len(), document.pages.len());
    Ok(())
}
