use std::path::Path;

use anyhow::{Context, Result};

use pagediff::{load_options, DiffOutcome, DiffPipeline};

use super::output::{default_output_path, print_report};
use crate::CompareArgs;

pub async fn cmd_compare(args: &CompareArgs, config: Option<&Path>) -> Result<()> {
    let options = args.apply(load_options(config)?);
    options.validate()?;

    let old = std::fs::read(&args.old).with_context(|| format!("failed to read {}", args.old.display()))?;
    let new = std::fs::read(&args.new).with_context(|| format!("failed to read {}", args.new.display()))?;

    eprintln!("📄 Old: {}", args.old.display());
    eprintln!("📄 New: {}", args.new.display());
    eprintln!("   Granularity: {:?}", options.granularity);

    let pipeline = DiffPipeline::pdfium(options);
    let outcome = pipeline.diff_and_highlight(&old, &new).await?;

    match &outcome {
        DiffOutcome::NoDifferences(report) => {
            eprintln!("\n✅ No differences: nothing was added ({} units compared)", report.target_units);
            print_report(report, None, args.json)?;
        }
        DiffOutcome::Highlighted { bytes, report } => {
            let output = args.output.clone().unwrap_or_else(|| default_output_path(&args.new));
            std::fs::write(&output, bytes).with_context(|| format!("failed to write {}", output.display()))?;

            eprintln!("\n🖍️  {} additions, {} highlights drawn", report.added, report.drawn);
            if report.dropped > 0 {
                eprintln!("   ⚠️  {} highlights fell outside the document", report.dropped);
            }
            eprintln!("💾 Saved {} bytes to {}", bytes.len(), output.display());
            print_report(report, Some(&output), args.json)?;
        }
    }

    Ok(())
}
