//! Diff options, optionally loaded from `~/.config/pagediff/config.toml`.
//!
//! ```toml
//! granularity = "line-character"
//! y_cluster_tolerance = 2.5
//! padding = 1.0
//!
//! [keys]
//! fold_case = true
//!
//! [style]
//! color = "#FFFF00"
//! opacity = 0.35
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::align::KeyOptions;
use crate::error::{DiffError, Result};
use crate::highlight::CoalesceOptions;
use crate::project::HighlightStyle;
use crate::reconstruct::{Granularity, ReconstructOptions};

/// Options for one diff-and-highlight run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    pub granularity: Granularity,
    /// Max vertical distance between runs of one line (line mode).
    pub y_cluster_tolerance: f32,
    /// Gap above which runs of one line are joined with a space (line mode).
    pub join_gap_threshold: f32,
    /// Padding added around token boxes.
    pub padding: f32,
    /// Max vertical distance between boxes merged into one row.
    pub row_tolerance: f32,
    /// Max horizontal gap bridged when merging boxes.
    pub gap_tolerance: f32,
    pub keys: KeyOptions,
    pub style: HighlightStyle,
    /// Directory holding the pdfium library, searched before the system path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdfium_dir: Option<PathBuf>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        let reconstruct = ReconstructOptions::default();
        let coalesce = CoalesceOptions::default();
        Self {
            granularity: reconstruct.granularity,
            y_cluster_tolerance: reconstruct.y_cluster_tolerance,
            join_gap_threshold: reconstruct.join_gap_threshold,
            padding: 1.0,
            row_tolerance: coalesce.row_tolerance,
            gap_tolerance: coalesce.gap_tolerance,
            keys: KeyOptions::default(),
            style: HighlightStyle::default(),
            pdfium_dir: None,
        }
    }
}

impl DiffOptions {
    #[must_use]
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub fn with_keys(mut self, keys: KeyOptions) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: HighlightStyle) -> Self {
        self.style = style;
        self
    }

    pub fn reconstruct_options(&self) -> ReconstructOptions {
        ReconstructOptions {
            granularity: self.granularity,
            y_cluster_tolerance: self.y_cluster_tolerance,
            join_gap_threshold: self.join_gap_threshold,
        }
    }

    pub fn coalesce_options(&self) -> CoalesceOptions {
        CoalesceOptions {
            row_tolerance: self.row_tolerance,
            gap_tolerance: self.gap_tolerance,
        }
    }

    /// Reject values that would make geometry meaningless.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("y_cluster_tolerance", self.y_cluster_tolerance),
            ("join_gap_threshold", self.join_gap_threshold),
            ("padding", self.padding),
            ("row_tolerance", self.row_tolerance),
            ("gap_tolerance", self.gap_tolerance),
            ("style.border_width", self.style.border_width),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| !(v.is_finite() && *v >= 0.0)) {
            return Err(DiffError::Config(format!("{name} must be a non-negative number, got {value}")));
        }
        if !(0.0..=1.0).contains(&self.style.opacity) {
            return Err(DiffError::Config(format!(
                "style.opacity must be within 0..=1, got {}",
                self.style.opacity
            )));
        }
        Ok(())
    }
}

/// Load options from `path`, or from the default config location.
///
/// Returns defaults if the default file doesn't exist (config is optional).
/// An explicitly given path must exist.
pub fn load_options(path: Option<&Path>) -> Result<DiffOptions> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (config_path(), false),
    };
    if !explicit && !path.exists() {
        return Ok(DiffOptions::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let options = parse_options(&content)
        .map_err(|e| DiffError::Config(format!("invalid config {}: {e}", path.display())))?;
    Ok(options)
}

/// Parse and validate options from TOML text.
pub fn parse_options(content: &str) -> Result<DiffOptions> {
    let options: DiffOptions = toml::from_str(content).map_err(|e| DiffError::Config(e.to_string()))?;
    options.validate()?;
    Ok(options)
}

/// Return the path to the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pagediff")
        .join("config.toml")
}
