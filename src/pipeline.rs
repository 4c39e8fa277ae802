//! Full diff pipeline: extract → reconstruct → align → highlight → render.
//!
//! Orchestrates the complete workflow from two documents' bytes to the
//! highlighted target document.
//!
//! ```text
//! source bytes ─► extract ─► reconstruct ─┐
//!                                         ├─► align ─► highlight ─► coalesce ─► project + render
//! target bytes ─► extract ─► reconstruct ─┘
//! ```
//!
//! The two documents are extracted on separate blocking tasks, each with its
//! own copy of the bytes, and joined before alignment. Alignment and
//! highlighting are pure and run on the calling task; rendering gets a third
//! byte copy on another blocking task.
//!
//! # Example
//!
//! ```rust,no_run
//! use pagediff::{DiffOptions, DiffOutcome, DiffPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = DiffPipeline::pdfium(DiffOptions::default());
//!     let old = std::fs::read("old.pdf")?;
//!     let new = std::fs::read("new.pdf")?;
//!     match pipeline.diff_and_highlight(&old, &new).await? {
//!         DiffOutcome::Highlighted { bytes, .. } => std::fs::write("new.highlighted.pdf", bytes)?,
//!         DiffOutcome::NoDifferences(_) => println!("no additions"),
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::align::{align_line_pairs, align_tokens, pair_lines, MyersAligner, SequenceAligner};
use crate::config::DiffOptions;
use crate::error::{DiffError, Result};
use crate::highlight::{coalesce, line_boxes, token_boxes, HighlightBox};
use crate::layout::{LayoutExtractor, PageLayout};
use crate::project::{PaintSummary, Renderer};
use crate::reconstruct::{reconstruct_document, Granularity, ReconstructOptions, TextUnit};

/// One document's pages and the units reconstructed from them.
#[derive(Debug, Clone)]
pub struct ReconstructedDocument {
    pub pages: Vec<PageLayout>,
    pub units: Vec<TextUnit>,
}

impl ReconstructedDocument {
    pub fn from_pages(pages: Vec<PageLayout>, options: &ReconstructOptions) -> Self {
        let units = reconstruct_document(&pages, options);
        Self { pages, units }
    }
}

/// Output of the pure alignment + highlight stages.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightPlan {
    pub source_units: usize,
    pub target_units: usize,
    /// Added tokens (token mode) or added character ranges (line mode).
    pub added: usize,
    /// Coalesced boxes in target extraction coordinates.
    pub boxes: Vec<HighlightBox>,
}

/// Summary of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffReport {
    pub source_units: usize,
    pub target_units: usize,
    pub added: usize,
    pub boxes: usize,
    pub drawn: usize,
    pub dropped: usize,
    pub elapsed_ms: f64,
}

/// Result of [`DiffPipeline::diff_and_highlight`].
#[derive(Debug, Clone)]
pub enum DiffOutcome {
    /// Nothing was added; no document was produced.
    NoDifferences(DiffReport),
    /// The target document with additions highlighted.
    Highlighted { bytes: Vec<u8>, report: DiffReport },
}

impl DiffOutcome {
    pub fn report(&self) -> &DiffReport {
        match self {
            Self::NoDifferences(report) | Self::Highlighted { report, .. } => report,
        }
    }

    pub fn has_differences(&self) -> bool {
        matches!(self, Self::Highlighted { .. })
    }
}

/// Compares two documents and highlights the target's additions.
pub struct DiffPipeline<A: SequenceAligner = MyersAligner> {
    extractor: Arc<dyn LayoutExtractor>,
    renderer: Arc<dyn Renderer>,
    aligner: A,
    options: DiffOptions,
}

impl DiffPipeline<MyersAligner> {
    pub fn new(extractor: Arc<dyn LayoutExtractor>, renderer: Arc<dyn Renderer>, options: DiffOptions) -> Self {
        Self {
            extractor,
            renderer,
            aligner: MyersAligner,
            options,
        }
    }

    /// Pipeline backed by pdfium for both extraction and rendering.
    #[cfg(feature = "pdf")]
    pub fn pdfium(options: DiffOptions) -> Self {
        use crate::layout::pdf::PdfiumExtractor;
        use crate::render::pdf::PdfiumRenderer;

        let (mut extractor, mut renderer) = (PdfiumExtractor::new(), PdfiumRenderer::new());
        if let Some(dir) = &options.pdfium_dir {
            extractor = extractor.with_library_dir(dir);
            renderer = renderer.with_library_dir(dir);
        }
        Self::new(Arc::new(extractor), Arc::new(renderer), options)
    }
}

impl<A: SequenceAligner> DiffPipeline<A> {
    /// Swap the alignment implementation.
    pub fn with_aligner<B: SequenceAligner>(self, aligner: B) -> DiffPipeline<B> {
        DiffPipeline {
            extractor: self.extractor,
            renderer: self.renderer,
            aligner,
            options: self.options,
        }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Extract and reconstruct one document on a blocking task.
    pub async fn reconstruct(&self, bytes: Vec<u8>) -> Result<ReconstructedDocument> {
        let extractor = Arc::clone(&self.extractor);
        let options = self.options.reconstruct_options();

        tokio::task::spawn_blocking(move || {
            let pages = extractor.extract(&bytes)?;
            if pages.is_empty() {
                return Err(DiffError::Input("document has no pages".to_string()));
            }
            Ok(ReconstructedDocument::from_pages(pages, &options))
        })
        .await?
    }

    /// Align two reconstructed documents and compute the target's boxes.
    pub fn plan(&self, source: &ReconstructedDocument, target: &ReconstructedDocument) -> HighlightPlan {
        let keys = &self.options.keys;

        let (added, boxes) = match self.options.granularity {
            Granularity::Token => {
                let alignment = align_tokens(&self.aligner, &source.units, &target.units, keys);
                let boxes = token_boxes(&target.units, &alignment.added, &target.pages, self.options.padding);
                (alignment.added_count(), boxes)
            }
            Granularity::LineCharacter => {
                let pairings = pair_lines(&source.units, &target.units);
                let edits = align_line_pairs(&self.aligner, &source.units, &target.units, &pairings, keys);
                let boxes = line_boxes(&target.units, &edits, &target.pages);
                (edits.iter().map(|edit| edit.added.len()).sum(), boxes)
            }
        };

        let raw = boxes.len();
        let boxes = coalesce(&boxes, &self.options.coalesce_options());
        debug!(raw, coalesced = boxes.len(), "coalesced highlight boxes");

        HighlightPlan {
            source_units: source.units.len(),
            target_units: target.units.len(),
            added,
            boxes,
        }
    }

    /// Diff `source` against `target` and highlight what `target` added.
    pub async fn diff_and_highlight(&self, source: &[u8], target: &[u8]) -> Result<DiffOutcome> {
        let start = Instant::now();

        let (source_doc, target_doc) =
            tokio::try_join!(self.reconstruct(source.to_vec()), self.reconstruct(target.to_vec()))?;
        info!(
            source_units = source_doc.units.len(),
            target_units = target_doc.units.len(),
            granularity = ?self.options.granularity,
            "reconstructed documents"
        );

        let plan = self.plan(&source_doc, &target_doc);
        info!(added = plan.added, boxes = plan.boxes.len(), "aligned documents");

        let mut report = DiffReport {
            source_units: plan.source_units,
            target_units: plan.target_units,
            added: plan.added,
            boxes: plan.boxes.len(),
            ..DiffReport::default()
        };

        if plan.added == 0 {
            report.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            return Ok(DiffOutcome::NoDifferences(report));
        }

        let renderer = Arc::clone(&self.renderer);
        let style = self.options.style;
        let bytes = target.to_vec();
        let boxes = plan.boxes;
        let output = tokio::task::spawn_blocking(move || renderer.render(bytes, &boxes, &style)).await??;

        let PaintSummary { drawn, dropped } = output.summary;
        report.drawn = drawn;
        report.dropped = dropped;
        report.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        info!(drawn, dropped, elapsed_ms = report.elapsed_ms, "rendered highlights");

        Ok(DiffOutcome::Highlighted {
            bytes: output.bytes,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{AlignmentSegment, KeyOptions, SegmentKind};
    use crate::layout::{GlyphRun, Origin, PageSize, Placement};
    use crate::project::{paint, HighlightStyle, RenderOutput, RenderSurface};
    use crate::reconstruct::BBox;

    const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    /// Reads pages from JSON; anything else is malformed input.
    struct JsonExtractor;

    impl LayoutExtractor for JsonExtractor {
        fn extract(&self, bytes: &[u8]) -> Result<Vec<PageLayout>> {
            serde_json::from_slice(bytes).map_err(|e| DiffError::Input(e.to_string()))
        }
    }

    /// Pages sized from the JSON layout; drawn rectangles become the output.
    struct JsonSurface {
        sizes: Vec<PageSize>,
        drawn: Vec<(usize, BBox)>,
    }

    impl RenderSurface for JsonSurface {
        fn page_count(&self) -> usize {
            self.sizes.len()
        }

        fn page_size(&self, page: usize) -> Option<PageSize> {
            self.sizes.get(page).copied()
        }

        fn draw_rectangle(&mut self, page: usize, rect: &BBox, _style: &HighlightStyle) -> Result<()> {
            self.drawn.push((page, *rect));
            Ok(())
        }
    }

    struct JsonRenderer;

    impl Renderer for JsonRenderer {
        fn render(&self, bytes: Vec<u8>, boxes: &[HighlightBox], style: &HighlightStyle) -> Result<RenderOutput> {
            let pages: Vec<PageLayout> = serde_json::from_slice(&bytes).map_err(|e| DiffError::Input(e.to_string()))?;
            let mut surface = JsonSurface {
                sizes: pages.iter().map(|p| p.viewport).collect(),
                drawn: Vec::new(),
            };
            let summary = paint(&mut surface, boxes, style)?;
            let bytes = serde_json::to_vec(&surface.drawn).map_err(|e| DiffError::Render(e.to_string()))?;
            Ok(RenderOutput { bytes, summary })
        }
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&self, _bytes: Vec<u8>, _boxes: &[HighlightBox], _style: &HighlightStyle) -> Result<RenderOutput> {
            Err(DiffError::Render("disk full".to_string()))
        }
    }

    /// Treats every target value as new.
    struct ReplaceAll;

    impl SequenceAligner for ReplaceAll {
        fn align<T: PartialEq + Clone>(&self, source: &[T], target: &[T]) -> Vec<AlignmentSegment<T>> {
            [(SegmentKind::Removed, source), (SegmentKind::Added, target)]
                .into_iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(kind, values)| AlignmentSegment::new(kind, values.to_vec()))
                .collect()
        }
    }

    fn pipeline(options: DiffOptions) -> DiffPipeline {
        DiffPipeline::new(Arc::new(JsonExtractor), Arc::new(JsonRenderer), options)
    }

    fn run(text: &str, x: f32, width: f32) -> GlyphRun {
        GlyphRun::new(text, Placement::at(x, 700.0, 10.0)).with_width(width)
    }

    fn doc(runs: Vec<GlyphRun>) -> Vec<u8> {
        serde_json::to_vec(&vec![PageLayout::new(0, LETTER, runs)]).unwrap()
    }

    fn drawn(outcome: &DiffOutcome) -> Vec<(usize, BBox)> {
        match outcome {
            DiffOutcome::Highlighted { bytes, .. } => serde_json::from_slice(bytes).unwrap(),
            DiffOutcome::NoDifferences(_) => Vec::new(),
        }
    }

    #[tokio::test]
    async fn hello_brave_world_highlights_one_word() {
        let old = doc(vec![run("Hello", 10.0, 25.0), run(" ", 35.0, 3.0), run("world", 38.0, 25.0)]);
        let new = doc(vec![
            run("Hello", 10.0, 25.0),
            run(" ", 35.0, 3.0),
            run("brave", 38.0, 25.0),
            run(" ", 63.0, 3.0),
            run("world", 66.0, 25.0),
        ]);

        let outcome = pipeline(DiffOptions::default()).diff_and_highlight(&old, &new).await.unwrap();
        assert!(outcome.has_differences());
        assert_eq!(outcome.report().added, 1);

        let rects = drawn(&outcome);
        assert_eq!(rects.len(), 1);
        // "brave" bbox (38, 698, 25, 10) padded by 1
        assert_eq!(rects[0], (0, BBox::new(37.0, 697.0, 27.0, 12.0)));
    }

    #[tokio::test]
    async fn identical_documents_report_no_differences() {
        let bytes = doc(vec![run("Same text on both sides", 10.0, 120.0)]);
        for granularity in [Granularity::Token, Granularity::LineCharacter] {
            let outcome = pipeline(DiffOptions::default().with_granularity(granularity))
                .diff_and_highlight(&bytes, &bytes)
                .await
                .unwrap();
            assert!(!outcome.has_differences());
            assert_eq!(outcome.report().boxes, 0);
            assert_eq!(outcome.report().drawn, 0);
        }
    }

    #[tokio::test]
    async fn line_edit_highlights_inserted_characters() {
        let old = doc(vec![run("The cat sat.", 10.0, 120.0)]);
        let new = doc(vec![run("The black cat sat.", 10.0, 180.0)]);

        let outcome = pipeline(DiffOptions::default().with_granularity(Granularity::LineCharacter))
            .diff_and_highlight(&old, &new)
            .await
            .unwrap();
        let rects = drawn(&outcome);
        assert_eq!(rects.len(), 1);

        let (_, rect) = rects[0];
        assert!((rect.x - (10.0 + 180.0 * 4.0 / 18.0)).abs() < 1e-3);
        assert!((rect.width - 180.0 * 6.0 / 18.0).abs() < 1e-3);
        assert!((rect.y - 698.0).abs() < 1e-3);
        assert!((rect.height - 10.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn empty_source_page_highlights_everything() {
        let old = doc(vec![]);
        let new = doc(vec![run("all new words", 10.0, 90.0)]);
        let outcome = pipeline(DiffOptions::default()).diff_and_highlight(&old, &new).await.unwrap();
        assert_eq!(outcome.report().added, 3);
        // Three evenly split words, 30 wide each with 1pt padding, merge into one row box
        assert_eq!(drawn(&outcome), vec![(0, BBox::new(9.0, 697.0, 92.0, 12.0))]);
    }

    #[tokio::test]
    async fn top_left_viewport_is_projected_onto_page() {
        let viewport = PageSize::new(1224.0, 1584.0);
        let page = |runs| {
            serde_json::to_vec(&vec![PageLayout::new(0, viewport, runs).with_origin(Origin::TopLeft)]).unwrap()
        };
        let run_at = |text: &str, x: f32| GlyphRun::new(text, Placement::at(x, 100.0, 20.0)).with_width(60.0);

        let old = page(vec![run_at("alpha", 100.0)]);
        let new = page(vec![run_at("alpha", 100.0), run_at(" ", 160.0), run_at("beta", 200.0)]);

        // The renderer sizes pages from the same JSON, so the viewport is the
        // page and projection is a flip only.
        let outcome = pipeline(DiffOptions::default().with_padding(0.0))
            .diff_and_highlight(&old, &new)
            .await
            .unwrap();
        let rects = drawn(&outcome);
        assert_eq!(rects.len(), 1);
        // Box spans y in [84, 104] top-left, i.e. [1480, 1500] bottom-left
        assert_eq!(rects[0], (0, BBox::new(200.0, 1480.0, 60.0, 20.0)));
    }

    #[tokio::test]
    async fn malformed_input_is_an_input_error() {
        let good = doc(vec![run("text", 0.0, 20.0)]);
        let err = pipeline(DiffOptions::default())
            .diff_and_highlight(b"%PDF-garbage", &good)
            .await
            .unwrap_err();
        assert!(matches!(err, DiffError::Input(_)));
    }

    #[tokio::test]
    async fn document_without_pages_is_an_input_error() {
        let good = doc(vec![run("text", 0.0, 20.0)]);
        let err = pipeline(DiffOptions::default())
            .diff_and_highlight(&good, b"[]")
            .await
            .unwrap_err();
        assert!(matches!(err, DiffError::Input(_)));
    }

    #[tokio::test]
    async fn render_failure_is_surfaced() {
        let old = doc(vec![run("a", 0.0, 5.0)]);
        let new = doc(vec![run("a b", 0.0, 10.0)]);
        let pipeline = DiffPipeline::new(Arc::new(JsonExtractor), Arc::new(FailingRenderer), DiffOptions::default());
        let err = pipeline.diff_and_highlight(&old, &new).await.unwrap_err();
        assert!(matches!(err, DiffError::Render(_)));
    }

    #[tokio::test]
    async fn repeated_runs_are_byte_identical() {
        let old = doc(vec![run("one two three", 10.0, 90.0)]);
        let new = doc(vec![run("one two 2.5 three four", 10.0, 150.0)]);
        let pipeline = pipeline(DiffOptions::default());

        let first = pipeline.diff_and_highlight(&old, &new).await.unwrap();
        let second = pipeline.diff_and_highlight(&old, &new).await.unwrap();
        assert_eq!(drawn(&first), drawn(&second));
        assert!(!drawn(&first).is_empty());
    }

    #[tokio::test]
    async fn swapped_aligner_drives_the_diff() {
        let bytes = doc(vec![run("Same text on both sides", 10.0, 120.0)]);
        let pipeline = pipeline(DiffOptions::default()).with_aligner(ReplaceAll);
        assert_eq!(pipeline.options(), &DiffOptions::default());

        let outcome = pipeline.diff_and_highlight(&bytes, &bytes).await.unwrap();
        assert!(outcome.has_differences());
        assert_eq!(outcome.report().added, 5);
    }

    #[tokio::test]
    async fn case_folded_keys_ignore_capitalisation() {
        let old = doc(vec![run("hello world", 10.0, 60.0)]);
        let new = doc(vec![run("Hello World", 10.0, 60.0)]);

        let strict = pipeline(DiffOptions::default()).diff_and_highlight(&old, &new).await.unwrap();
        assert_eq!(strict.report().added, 2);

        let keys = KeyOptions {
            fold_case: true,
            ..KeyOptions::default()
        };
        let folded = pipeline(DiffOptions::default().with_keys(keys));
        assert!(folded.options().keys.fold_case);
        let outcome = folded.diff_and_highlight(&old, &new).await.unwrap();
        assert!(!outcome.has_differences());
    }

    #[test]
    fn plan_boxes_are_coalesced() {
        let options = ReconstructOptions::default();
        let source = ReconstructedDocument::from_pages(vec![PageLayout::new(0, LETTER, vec![])], &options);
        let target = ReconstructedDocument::from_pages(
            vec![PageLayout::new(0, LETTER, vec![run("a b c d", 0.0, 40.0)])],
            &options,
        );
        let plan = pipeline(DiffOptions::default()).plan(&source, &target);
        assert_eq!(plan.added, 4);
        assert_eq!(plan.boxes.len(), 1);
        assert_eq!(coalesce(&plan.boxes, &DiffOptions::default().coalesce_options()), plan.boxes);
    }
}
