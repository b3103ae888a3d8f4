//! Batch pipeline: runs every resume through load → extract → normalize → enrich → score
//! on a bounded pool of workers and assembles the batch report.
//!
//! Each worker owns its own `Extractor` and `FieldNormalizer` built from the shared
//! model handle. The CPU-bound stages run on the blocking pool; only enrichment awaits
//! the network. Results come back over a channel and are re-ordered by input index, so
//! the report never depends on scheduling.

pub mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::enrichment::{merge, Enricher};
use crate::errors::{AppError, DocumentError};
use crate::extraction::{Extractor, LanguageModel, ModelError};
use crate::ingest::{load_document, normalize_document};
use crate::matching::{rank, CoverageScorer, FitScorer, JobRequirement, MatchResult};
use crate::models::applicant::ApplicantRecord;
use crate::models::document::NormalizedText;
use crate::normalizer::FieldNormalizer;
use crate::store::ApplicantStore;

pub use report::{BatchReport, DocumentIssue};

pub struct Pipeline {
    model: Arc<LanguageModel>,
    workers: usize,
    as_of: NaiveDate,
    enricher: Option<Arc<dyn Enricher>>,
    job: Option<Arc<JobRequirement>>,
    scorer: Arc<dyn FitScorer>,
    store: Option<ApplicantStore>,
}

/// State every worker reads but never mutates.
struct Shared {
    model: Arc<LanguageModel>,
    enricher: Option<Arc<dyn Enricher>>,
    job: Option<Arc<JobRequirement>>,
    scorer: Arc<dyn FitScorer>,
    as_of: NaiveDate,
}

struct WorkItem {
    index: usize,
    path: PathBuf,
}

struct ScannedDocument {
    record: ApplicantRecord,
    match_result: Option<MatchResult>,
}

struct DocumentOutcome {
    index: usize,
    source: PathBuf,
    result: Result<ScannedDocument, DocumentError>,
    warnings: Vec<String>,
}

/// The synchronous half of the per-document work, owned by exactly one worker.
struct Stage {
    extractor: Extractor,
    normalizer: FieldNormalizer,
}

impl Stage {
    fn new(model: Arc<LanguageModel>) -> Result<Self, ModelError> {
        Ok(Self {
            extractor: Extractor::new(model.clone())?,
            normalizer: FieldNormalizer::new(model)?,
        })
    }

    fn process(&self, path: &Path) -> Result<(ApplicantRecord, NormalizedText), DocumentError> {
        let doc = load_document(path)?;
        let text = normalize_document(&doc)?;
        let spans = self.extractor.extract(&text);
        debug!("{}: {} entity spans", doc.display_name(), spans.len());
        let record = self.normalizer.normalize(&doc, &text, &spans);
        Ok((record, text))
    }
}

impl Pipeline {
    pub fn new(model: Arc<LanguageModel>, workers: usize, as_of: NaiveDate) -> Self {
        Self {
            model,
            workers: workers.max(1),
            as_of,
            enricher: None,
            job: None,
            scorer: Arc::new(CoverageScorer),
            store: None,
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_job(mut self, job: JobRequirement) -> Self {
        self.job = Some(Arc::new(job));
        self
    }

    pub fn with_store(mut self, store: ApplicantStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Processes `paths` and returns the batch report. Per-document problems end up
    /// in the report; only failing to build the workers is an error.
    pub async fn run(&self, paths: Vec<PathBuf>) -> Result<BatchReport, AppError> {
        let total = paths.len();
        if total == 0 {
            info!("No resumes to process");
            return Ok(BatchReport::empty(self.model.tag()));
        }

        let worker_count = self.workers.min(total);
        let mut stages = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            stages.push(Stage::new(self.model.clone())?);
        }
        info!("Processing {} resumes with {} workers", total, worker_count);

        let shared = Arc::new(Shared {
            model: self.model.clone(),
            enricher: self.enricher.clone(),
            job: self.job.clone(),
            scorer: self.scorer.clone(),
            as_of: self.as_of,
        });

        let (work_tx, work_rx) = mpsc::channel::<WorkItem>(worker_count * 2);
        let queue = Arc::new(Mutex::new(work_rx));
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<DocumentOutcome>();

        let mut handles = Vec::with_capacity(worker_count);
        for (worker_id, stage) in stages.into_iter().enumerate() {
            handles.push(tokio::spawn(run_worker(
                worker_id,
                stage,
                queue.clone(),
                result_tx.clone(),
                shared.clone(),
            )));
        }
        drop(result_tx);

        let sources = paths.clone();
        let feeder = tokio::spawn(async move {
            for (index, path) in paths.into_iter().enumerate() {
                if work_tx.send(WorkItem { index, path }).await.is_err() {
                    break;
                }
            }
        });

        let mut slots: Vec<Option<DocumentOutcome>> = (0..total).map(|_| None).collect();
        while let Some(outcome) = result_rx.recv().await {
            let index = outcome.index;
            slots[index] = Some(outcome);
        }

        if let Err(e) = feeder.await {
            error!("Work feeder task failed: {}", e);
        }
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Worker task failed: {}", e);
            }
        }

        let outcomes = slots
            .into_iter()
            .zip(sources)
            .enumerate()
            .map(|(index, (slot, source))| {
                slot.unwrap_or_else(|| DocumentOutcome {
                    index,
                    source,
                    result: Err(DocumentError::Worker("document was not processed".to_string())),
                    warnings: Vec::new(),
                })
            });

        let report = self.assemble(outcomes).await;
        info!(
            "Batch complete: {} processed, {} failed, {} warnings",
            report.processed.len(),
            report.failures.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Builds the report in input order and writes records to the store, if any.
    async fn assemble(&self, outcomes: impl Iterator<Item = DocumentOutcome>) -> BatchReport {
        let mut report = BatchReport::empty(self.model.tag());
        report.job_title = self.job.as_ref().and_then(|j| j.title.clone());

        for outcome in outcomes {
            for message in outcome.warnings {
                report.warnings.push(DocumentIssue::new(&outcome.source, message));
            }

            let scanned = match outcome.result {
                Ok(scanned) => scanned,
                Err(e) => {
                    report.failures.push(DocumentIssue::new(&outcome.source, e.to_string()));
                    continue;
                }
            };

            if let Some(store) = &self.store {
                let score = scanned.match_result.as_ref().map(|m| m.score);
                match store.save(&scanned.record, score).await {
                    Ok(saved) => {
                        debug!("{}: stored ({:?})", outcome.source.display(), saved);
                        report.persisted += 1;
                    }
                    Err(e) => {
                        warn!("Failed to store {}: {}", outcome.source.display(), e);
                        report
                            .warnings
                            .push(DocumentIssue::new(&outcome.source, format!("store write failed: {e}")));
                    }
                }
            }

            if let Some(result) = scanned.match_result {
                report.ranking.push(result);
            }
            report.processed.push(scanned.record);
        }

        rank(&mut report.ranking);
        report
    }
}

async fn run_worker(
    worker_id: usize,
    mut stage: Stage,
    queue: Arc<Mutex<mpsc::Receiver<WorkItem>>>,
    results: mpsc::UnboundedSender<DocumentOutcome>,
    shared: Arc<Shared>,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(item) = next else {
            break;
        };

        let path = item.path.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let result = stage.process(&path);
            (stage, result)
        })
        .await;

        let (returned, result) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                // The stage went down with the blocking task; build a fresh one.
                error!("Worker {} failed on {}: {}", worker_id, item.path.display(), e);
                let _ = results.send(DocumentOutcome {
                    index: item.index,
                    source: item.path,
                    result: Err(DocumentError::Worker(e.to_string())),
                    warnings: Vec::new(),
                });
                match Stage::new(shared.model.clone()) {
                    Ok(fresh) => {
                        stage = fresh;
                        continue;
                    }
                    Err(e) => {
                        error!("Worker {} could not rebuild its stage: {}", worker_id, e);
                        return;
                    }
                }
            }
        };
        stage = returned;

        let outcome = finish(item, result, &shared).await;
        if results.send(outcome).is_err() {
            return;
        }
    }
    debug!("Worker {} finished", worker_id);
}

/// Enrichment and scoring for one document that made it through the CPU stage.
async fn finish(
    item: WorkItem,
    result: Result<(ApplicantRecord, NormalizedText), DocumentError>,
    shared: &Shared,
) -> DocumentOutcome {
    let mut warnings = Vec::new();

    let (mut record, text) = match result {
        Ok(pair) => pair,
        Err(e) => {
            warn!("Skipping {}: {}", item.path.display(), e);
            return DocumentOutcome {
                index: item.index,
                source: item.path,
                result: Err(e),
                warnings,
            };
        }
    };

    if let Some(enricher) = &shared.enricher {
        match enricher.suggest(&record, text.as_str()).await {
            Ok(suggestion) => merge(&mut record, suggestion, text.as_str(), enricher.backend()),
            Err(e) => {
                warn!("Enrichment failed for {}: {}", item.path.display(), e);
                warnings.push(format!("enrichment failed: {e}"));
            }
        }
    }

    let match_result = shared
        .job
        .as_ref()
        .map(|job| shared.scorer.score(&record, job, shared.as_of));

    info!(
        "Parsed {}: {} skills, {} experience entries",
        item.path.display(),
        record.skills.len(),
        record.experience.len()
    );

    DocumentOutcome {
        index: item.index,
        source: item.path,
        result: Ok(ScannedDocument {
            record,
            match_result,
        }),
        warnings,
    }
}
