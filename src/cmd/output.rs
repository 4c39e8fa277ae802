use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use pagediff::DiffReport;

#[derive(Serialize)]
struct CompareSummary<'a> {
    differences: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
    #[serde(flatten)]
    report: &'a DiffReport,
}

/// `<dir>/<stem>.highlighted.pdf` next to the new document.
pub fn default_output_path(new: &Path) -> PathBuf {
    let stem = new.file_stem().map_or_else(|| "output".into(), |s| s.to_string_lossy());
    new.with_file_name(format!("{stem}.highlighted.pdf"))
}

/// Print the report as a single JSON line on stdout, when requested.
pub fn print_report(report: &DiffReport, output: Option<&Path>, json: bool) -> Result<()> {
    if json {
        let summary = CompareSummary {
            differences: output.is_some(),
            output,
            report,
        };
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        eprintln!("   Took {:.1}ms", report.elapsed_ms);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_sits_next_to_new_document() {
        assert_eq!(
            default_output_path(Path::new("/tmp/docs/report-v2.pdf")),
            PathBuf::from("/tmp/docs/report-v2.highlighted.pdf")
        );
        assert_eq!(default_output_path(Path::new("new.pdf")), PathBuf::from("new.highlighted.pdf"));
    }
}
