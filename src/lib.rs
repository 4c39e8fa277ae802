//! `pagediff` - Visual diffing of paginated documents
//!
//! # Features
//!
//! - **Layout Reconstruction**: Words or visual lines rebuilt from raw glyph runs
//! - **Sequence Alignment**: Myers shortest-edit-script diff over tokens or characters
//! - **Highlight Synthesis**: Padded, coalesced boxes around every addition
//! - **Projection**: Boxes rescaled, flipped and clipped onto the target pages
//! - **PDF Backend**: pdfium-backed extraction and rendering (`pdf` feature)
//!
//! # Example
//!
//! ```rust,no_run
//! use pagediff::{DiffOptions, DiffPipeline, Granularity};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let options = DiffOptions::default().with_granularity(Granularity::LineCharacter);
//!     let pipeline = DiffPipeline::pdfium(options);
//!     let outcome = pipeline
//!         .diff_and_highlight(&std::fs::read("old.pdf")?, &std::fs::read("new.pdf")?)
//!         .await?;
//!     println!("{} additions", outcome.report().added);
//!     Ok(())
//! }
//! ```

pub mod align;
pub mod config;
pub mod error;
pub mod highlight;
pub mod layout;
pub mod pipeline;
pub mod project;
pub mod reconstruct;
pub mod render;

pub use align::{comparison_key, KeyOptions, MyersAligner, SequenceAligner};
pub use config::{load_options, DiffOptions};
pub use error::{DiffError, Result};
pub use highlight::HighlightBox;
pub use layout::{GlyphRun, LayoutExtractor, Origin, PageLayout, PageSize, Placement};
pub use pipeline::{DiffOutcome, DiffPipeline, DiffReport, HighlightPlan, ReconstructedDocument};
pub use project::{HighlightStyle, Renderer, Rgb};
pub use reconstruct::{BBox, Granularity, TextUnit};
#[cfg(feature = "pdf")]
pub use layout::pdf::PdfiumExtractor;
#[cfg(feature = "pdf")]
pub use render::pdf::PdfiumRenderer;

/// Version of pagediff
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
