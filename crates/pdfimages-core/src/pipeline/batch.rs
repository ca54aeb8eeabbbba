//! Batch orchestration: per-PDF pipeline and the concurrent runner.
//!
//! Each PDF runs `validate → extract → filter → dedup → transform → write`
//! on a blocking worker. Up to `processing.parallel_workers` PDFs run at
//! once; their reports flow over a bounded channel to a single aggregator
//! that owns the [`BatchResult`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::Semaphore;

use super::channel::{bounded_channel, drain};
use super::dedup::DedupIndex;
use super::discovery;
use super::extract::{ExtractOptions, ImageExtractor};
use super::filter;
use super::output::{OutputWriter, PathRegistry};
use super::transform::Transformer;
use super::validate::Validator;
use crate::config::{Config, PipelineConfig};
use crate::error::{ConfigError, PipelineError};
use crate::types::{BatchResult, DedupConfig, ExtractedImage, FilterCriteria, PdfReport};

/// Shared cooperative cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Running PDFs stop at the next image.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lifecycle of a [`BatchRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Discovering,
    Processing { done: usize, total: usize },
    Done,
}

/// Progress hooks called from the aggregator.
pub trait BatchObserver: Send + Sync {
    /// Discovery finished with `total` PDFs.
    fn on_start(&self, _total: usize) {}

    /// One PDF finished (successfully or not).
    fn on_pdf_done(&self, _report: &PdfReport) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// The full pipeline for a single PDF.
pub struct PdfPipeline {
    validator: Validator,
    extractor: ImageExtractor,
    criteria: FilterCriteria,
    dedup: DedupConfig,
    transformer: Transformer,
    writer: OutputWriter,
}

impl PdfPipeline {
    /// Build the pipeline from a validated configuration.
    pub fn new(config: &Config, registry: Arc<PathRegistry>) -> Result<Self, ConfigError> {
        let extract = ExtractOptions {
            dpi: config.processing.dpi,
            kinds: config.object_kinds()?,
            split_regions: config.processing.split_regions,
            max_image_dimension: config.limits.max_image_dimension,
        };
        Ok(Self {
            validator: Validator::new(config.limits.clone()),
            extractor: ImageExtractor::new(extract),
            criteria: config.filter_criteria(),
            dedup: config.dedup(),
            transformer: Transformer::new(
                config.processing.scaling,
                config.processing.quality,
                config.output.format,
            ),
            writer: OutputWriter::new(
                config.output_dir(),
                config.output.maintain_structure,
                config.naming()?,
                config.output.format,
                registry,
            ),
        })
    }

    /// Process one PDF. Never fails: problems are recorded in the report.
    pub fn process(&self, pdf: &Path, input_root: &Path, cancel: &CancelFlag) -> PdfReport {
        let start = Instant::now();
        let mut report = PdfReport::new(pdf);

        if cancel.is_cancelled() {
            mark_cancelled(&mut report);
            return report;
        }

        if let Err(e) = self.run(pdf, input_root, cancel, &mut report) {
            tracing::error!("{}", e);
            report.failed = e.is_fatal_for_pdf() && !matches!(e, PipelineError::Cancelled(_));
            report.errors.push(e.to_string());
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "{}: {} extracted, {} written, {} skipped in {}ms",
            pdf.display(),
            report.images_extracted,
            report.images_written,
            report.images_skipped,
            report.elapsed_ms
        );
        report
    }

    fn run(
        &self,
        pdf: &Path,
        input_root: &Path,
        cancel: &CancelFlag,
        report: &mut PdfReport,
    ) -> Result<(), PipelineError> {
        self.validator.validate(pdf)?;
        let images = self.extractor.open(pdf)?;

        let dir = self.writer.target_dir(pdf, input_root);
        let name = pdf
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut index = DedupIndex::new(self.dedup);

        for item in images {
            if cancel.is_cancelled() {
                mark_cancelled(report);
                break;
            }
            match item {
                Ok(image) => self.handle_image(image, &dir, &name, &mut index, report),
                Err(e) => record_image_error(e, report),
            }
        }
        Ok(())
    }

    fn handle_image(
        &self,
        image: ExtractedImage,
        dir: &Path,
        name: &str,
        index: &mut DedupIndex,
        report: &mut PdfReport,
    ) {
        report.images_extracted += 1;

        if !filter::accepts(&image, &self.criteria) {
            tracing::debug!(
                "Page {} image {}: filtered ({}x{}, {} bytes)",
                image.page,
                image.index,
                image.width,
                image.height,
                image.byte_size
            );
            report.images_filtered += 1;
            report.images_skipped += 1;
            return;
        }

        let admission = index.admit(&image.fingerprint);
        if !admission.is_representative() {
            tracing::debug!(
                "Page {} image {}: duplicate of group {}",
                image.page,
                image.index,
                admission.group()
            );
            report.images_duplicate += 1;
            report.images_skipped += 1;
            return;
        }

        let encoded = match self.transformer.apply(&image) {
            Ok(encoded) => encoded,
            Err(message) => {
                let path = self.writer.candidate_path(dir, image.page, image.index, name);
                record_image_error(PipelineError::WriteError { path, message }, report);
                return;
            }
        };

        let path = self.writer.file_path(dir, image.page, image.index, name);
        match self.writer.write(&path, &encoded.bytes) {
            Ok(()) => {
                report.images_written += 1;
                report.outputs.push(path);
            }
            Err(e) => record_image_error(e, report),
        }
    }
}

fn mark_cancelled(report: &mut PdfReport) {
    report.cancelled = true;
    report
        .errors
        .push(PipelineError::Cancelled(report.path.clone()).to_string());
}

/// Per-image failures never stop the PDF.
fn record_image_error(error: PipelineError, report: &mut PdfReport) {
    report.images_skipped += 1;
    match &error {
        PipelineError::UnsupportedImage { .. } => {
            tracing::debug!("{}", error);
            report.images_unsupported += 1;
        }
        _ => {
            tracing::warn!("{}", error);
            report.errors.push(error.to_string());
        }
    }
}

/// Runs the pipeline over every PDF under an input path.
pub struct BatchRunner {
    pipeline: Arc<PdfPipeline>,
    workers: usize,
    channel: PipelineConfig,
    cancel: CancelFlag,
    phase: Arc<Mutex<BatchPhase>>,
}

impl BatchRunner {
    /// Create a runner. The configuration is validated first.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = Arc::new(PathRegistry::new());
        Ok(Self {
            pipeline: Arc::new(PdfPipeline::new(config, registry)?),
            workers: config.processing.parallel_workers,
            channel: config.pipeline.clone(),
            cancel: CancelFlag::new(),
            phase: Arc::new(Mutex::new(BatchPhase::Idle)),
        })
    }

    /// Flag that cancels this runner when set.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> BatchPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(phase: &Mutex<BatchPhase>, value: BatchPhase) {
        *phase.lock().unwrap_or_else(|e| e.into_inner()) = value;
    }

    /// Process `input` (a PDF or a directory of PDFs).
    pub async fn run(&self, input: &Path) -> BatchResult {
        self.run_with_observer(input, Arc::new(NoopObserver)).await
    }

    /// Process `input`, reporting progress to `observer`.
    pub async fn run_with_observer(
        &self,
        input: &Path,
        observer: Arc<dyn BatchObserver>,
    ) -> BatchResult {
        Self::set_phase(&self.phase, BatchPhase::Discovering);
        let files = discovery::discover(input);
        let total = files.len();
        tracing::info!(
            "Found {} PDF(s) in {:?} ({} bytes)",
            total,
            input,
            discovery::total_size(&files)
        );

        observer.on_start(total);
        Self::set_phase(&self.phase, BatchPhase::Processing { done: 0, total });

        let (tx, rx) = bounded_channel::<PdfReport>(&self.channel);
        let phase = self.phase.clone();
        let aggregator = tokio::spawn(async move {
            let mut result = BatchResult::default();
            drain(rx, |report| {
                observer.on_pdf_done(&report);
                result.insert(report);
                Self::set_phase(
                    &phase,
                    BatchPhase::Processing {
                        done: result.pdf_count(),
                        total,
                    },
                );
            })
            .await;
            result
        });

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let input_root: PathBuf = input.to_path_buf();
        let mut handles = Vec::with_capacity(total);

        for file in files {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::warn!("Worker semaphore closed unexpectedly; stopping batch");
                    break;
                }
            };

            let pipeline = self.pipeline.clone();
            let cancel = self.cancel.clone();
            let root = input_root.clone();
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                let path = file.path.clone();
                let report = match tokio::task::spawn_blocking(move || {
                    pipeline.process(&file.path, &root, &cancel)
                })
                .await
                {
                    Ok(report) => report,
                    Err(e) => {
                        tracing::error!("Worker for {:?} panicked: {e}", path);
                        let mut report = PdfReport::new(&path);
                        report.failed = true;
                        report.errors.push(format!("worker panicked: {e}"));
                        report
                    }
                };
                drop(permit);
                if tx.send(report).await.is_err() {
                    tracing::error!("Report aggregator stopped before {:?}", path);
                }
            }));
        }
        drop(tx);

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Batch task failed: {e}");
            }
        }

        let result = match aggregator.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Report aggregator failed: {e}");
                BatchResult::default()
            }
        };
        Self::set_phase(&self.phase, BatchPhase::Done);
        result
    }
}
