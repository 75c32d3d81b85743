//! End-to-end run: ingest, fetch and score, rank, extract and standardize,
//! export.
//!
//! Per-URL failures never abort a run. Each one is recorded once in the
//! failure ledger with the stage it happened at, and the URL is dropped.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ErrorKind, ExportError, ExportResult, Failure, Stage};
use crate::exporters::ExportSummary;
use crate::fetchers::HttpFetcher;
use crate::labelers::RuleLabeler;
use crate::pipeline::extract::Extractor;
use crate::pipeline::rank::rank_entries;
use crate::pipeline::standardize::Standardizer;
use crate::scorers::{score_text_capped, KeywordScorer};
use crate::traits::{exporter::Exporter, fetcher::Fetcher, labeler::Labeler, scorer::Scorer};
use crate::types::{
    config::PipelineConfig,
    record::CanonicalRecord,
    run::{RunOutcome, RunReport, RunResult, RunState},
    score::ScoreEntry,
    source::SourceUrl,
};

type StageResult<T> = Result<T, (Stage, ErrorKind)>;

/// Per-run controls supplied by a driver.
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Cancels every outstanding task of the run
    pub cancel: CancellationToken,
    /// Receives each state transition
    pub progress: Option<watch::Sender<RunState>>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: watch::Sender<RunState>) -> Self {
        self.progress = Some(progress);
        self
    }

    fn publish(&self, state: RunState) {
        info!(state = %state, "Pipeline state");
        if let Some(tx) = &self.progress {
            tx.send_replace(state);
        }
    }
}

/// Resolves outstanding work as `Cancelled` once the token fires or the
/// deadline passes.
struct Stop {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl Stop {
    async fn stopped(&self) {
        match self.deadline {
            Some(at) => tokio::select! {
                _ = self.cancel.cancelled() => {}
                _ = tokio::time::sleep_until(at) => {}
            },
            None => self.cancel.cancelled().await,
        }
    }

    async fn guard<F: Future>(&self, stage: Stage, work: F) -> StageResult<F::Output> {
        tokio::select! {
            biased;
            _ = self.stopped() => Err((stage, ErrorKind::Cancelled)),
            output = work => Ok(output),
        }
    }
}

/// The discovery pipeline.
///
/// Cheap to share behind an `Arc`; a single instance can serve many runs.
pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    scorer: Arc<dyn Scorer>,
    extractor: Extractor,
    standardizer: Standardizer,
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with the default rule labeler.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        scorer: Arc<dyn Scorer>,
        config: PipelineConfig,
    ) -> Result<Self, ConfigError> {
        Self::builder()
            .fetcher(fetcher)
            .scorer(scorer)
            .config(config)
            .build()
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run without a progress channel or external cancellation.
    pub async fn run<I, S>(&self, urls: I) -> RunResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.run_with(urls, RunOptions::default()).await
    }

    /// Run with driver-supplied cancellation and progress reporting.
    pub async fn run_with<I, S>(&self, urls: I, options: RunOptions) -> RunResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let result = self.execute(urls, &options).await;
        options.publish(result.final_state());
        result
    }

    /// Run, then hand the records to `exporter`.
    ///
    /// An empty record set is not exported and is reported as
    /// [`RunOutcome::Empty`]. Export errors are returned. The export itself
    /// runs on the blocking thread pool.
    pub async fn run_and_export<I, S>(
        &self,
        urls: I,
        exporter: Arc<dyn Exporter>,
    ) -> ExportResult<RunReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.run_and_export_with(urls, exporter, RunOptions::default())
            .await
    }

    pub async fn run_and_export_with<I, S>(
        &self,
        urls: I,
        exporter: Arc<dyn Exporter>,
        options: RunOptions,
    ) -> ExportResult<RunReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let result = self.execute(urls, &options).await;

        if result.records.is_empty() {
            warn!(
                failures = result.failures.len(),
                "Run produced no records, skipping export"
            );
            options.publish(result.final_state());
            return Ok(RunReport {
                outcome: RunOutcome::Empty,
                result,
                export: None,
            });
        }

        options.publish(RunState::Exporting);
        let (result, export) = export_blocking(exporter, result).await?;
        options.publish(result.final_state());

        Ok(RunReport {
            outcome: result.outcome(),
            result,
            export: Some(export),
        })
    }

    async fn execute<I, S>(&self, urls: I, options: &RunOptions) -> RunResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let started_at = Utc::now();
        let mut failures = Vec::new();

        let sources = ingest(urls, &mut failures);
        info!(
            candidates = sources.len(),
            rejected = failures.len(),
            concurrency = self.config.concurrency,
            "Starting run"
        );

        // Fetch and score every candidate. The deadline only bounds this stage.
        options.publish(RunState::Fetching);
        let stop = Stop {
            cancel: options.cancel.clone(),
            deadline: self.config.run_deadline.map(|d| Instant::now() + d),
        };
        let scored = self
            .bounded(sources.iter(), |source| self.score_one(source, &stop))
            .await;

        let mut entries = Vec::new();
        for (source, outcome) in sources.iter().zip(scored) {
            match outcome {
                Ok(entry) => entries.push(entry),
                Err((stage, kind)) => record_failure(&mut failures, source.input(), stage, kind),
            }
        }

        // Barrier: ranking needs the whole candidate set.
        options.publish(RunState::Ranking);
        let ranking = rank_entries(&entries, self.config.top_k);
        info!(
            scored = entries.len(),
            survivors = ranking.len(),
            top_k = self.config.top_k,
            "Ranked candidates"
        );
        for (position, entry) in ranking.iter().enumerate() {
            debug!(position, url = %entry.url, score = entry.score, "Survivor");
        }

        options.publish(RunState::ExtractingStandardizing);
        let stop = Stop {
            cancel: options.cancel.clone(),
            deadline: None,
        };
        let built = self
            .bounded(ranking.iter(), |entry| self.build_record(&entry.url, &stop))
            .await;

        let mut records = Vec::new();
        for (entry, outcome) in ranking.iter().zip(built) {
            match outcome {
                Ok(record) => records.push(record),
                Err((stage, kind)) => record_failure(&mut failures, &entry.url, stage, kind),
            }
        }

        let finished_at = Utc::now();
        info!(
            records = records.len(),
            failures = failures.len(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "Run finished"
        );

        RunResult {
            records,
            failures,
            ranking,
            started_at,
            finished_at,
        }
    }

    /// Run `task` over `items` with at most `concurrency` in flight.
    ///
    /// Results come back in the order of `items` regardless of completion
    /// order.
    async fn bounded<'a, T, O, F, Fut>(
        &self,
        items: impl Iterator<Item = &'a T>,
        task: F,
    ) -> Vec<O>
    where
        T: 'a,
        F: Fn(&'a T) -> Fut,
        Fut: Future<Output = O>,
    {
        let pending: Vec<_> = items
            .enumerate()
            .map(|(index, item)| {
                let work = task(item);
                async move { (index, work.await) }
            })
            .collect();
        let mut indexed: Vec<(usize, O)> = stream::iter(pending)
        .buffer_unordered(self.config.concurrency.max(1))
        .collect()
        .await;

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, output)| output).collect()
    }

    async fn score_one(&self, source: &SourceUrl, stop: &Stop) -> StageResult<ScoreEntry> {
        let text = stop
            .guard(Stage::FetchText, self.fetcher.fetch_text(source.as_str()))
            .await?
            .into_body()
            .map_err(|kind| (Stage::FetchText, kind))?;

        let summary = stop
            .guard(
                Stage::Score,
                score_text_capped(self.scorer.as_ref(), &text, self.config.max_input_tokens),
            )
            .await?
            .map_err(|kind| (Stage::Score, kind))?;

        let entry = ScoreEntry::new(source.input(), summary);
        debug!(url = %source, score = entry.score, "Scored");
        Ok(entry)
    }

    /// `url` is the caller's input; it is fetched trimmed and recorded as is.
    async fn build_record(&self, url: &str, stop: &Stop) -> StageResult<CanonicalRecord> {
        let html = stop
            .guard(Stage::FetchHtml, self.fetcher.fetch_html(url.trim()))
            .await?
            .into_body()
            .map_err(|kind| (Stage::FetchHtml, kind))?;

        let metadata = self
            .extractor
            .extract(&html)
            .map_err(|kind| (Stage::Extract, kind))?;

        let (title, description) = metadata
            .require_title_and_description()
            .map_err(|kind| (Stage::Standardize, kind))?;

        Ok(self
            .standardizer
            .standardize(title, description, &metadata.attributes, None, url))
    }
}

async fn export_blocking(
    exporter: Arc<dyn Exporter>,
    result: RunResult,
) -> ExportResult<(RunResult, ExportSummary)> {
    tokio::task::spawn_blocking(move || {
        let summary = exporter.export(&result.records)?;
        Ok((result, summary))
    })
    .await
    .map_err(|e| ExportError::Io(std::io::Error::other(e.to_string())))?
}

/// Parse and de-duplicate candidate URLs, keeping first occurrences.
fn ingest<I, S>(urls: I, failures: &mut Vec<Failure>) -> Vec<SourceUrl>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for raw in urls {
        let raw = raw.as_ref();
        match SourceUrl::parse(raw) {
            Ok(source) => {
                if seen.insert(source.clone()) {
                    sources.push(source);
                } else {
                    debug!(url = %source, "Dropping duplicate URL");
                }
            }
            Err(kind) => record_failure(failures, raw, Stage::Ingest, kind),
        }
    }

    sources
}

fn record_failure(failures: &mut Vec<Failure>, url: &str, stage: Stage, kind: ErrorKind) {
    warn!(url = %url, stage = %stage, error = %kind, "Dropping URL");
    failures.push(Failure::new(url, stage, kind));
}

/// Builder for [`Pipeline`].
///
/// Unset collaborators fall back to [`HttpFetcher`], [`KeywordScorer`] and
/// [`RuleLabeler`], all configured from the [`PipelineConfig`].
#[derive(Default)]
pub struct PipelineBuilder {
    fetcher: Option<Arc<dyn Fetcher>>,
    scorer: Option<Arc<dyn Scorer>>,
    labeler: Option<Arc<dyn Labeler>>,
    config: PipelineConfig,
}

impl PipelineBuilder {
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn labeler(mut self, labeler: Arc<dyn Labeler>) -> Self {
        self.labeler = Some(labeler);
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Pipeline, ConfigError> {
        let config = self.config;
        config.validate()?;

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(&config.fetch)?),
        };
        let scorer: Arc<dyn Scorer> = self.scorer.unwrap_or_else(|| {
            Arc::new(KeywordScorer::new().with_max_input_tokens(config.max_input_tokens))
        });
        let labeler: Arc<dyn Labeler> = self
            .labeler
            .unwrap_or_else(|| Arc::new(RuleLabeler::new(config.defaults.clone())));

        info!(
            fetcher = fetcher.name(),
            scorer = scorer.name(),
            labeler = labeler.name(),
            top_k = config.top_k,
            "Pipeline ready"
        );

        Ok(Pipeline {
            fetcher,
            scorer,
            extractor: Extractor::new(),
            standardizer: Standardizer::new(
                config.defaults.clone(),
                config.placeholders.clone(),
                labeler,
            ),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFetcher, MockFetcherCall, MockScorer};
    use std::time::Duration;

    fn page(title: &str, description: &str, body: &str) -> String {
        format!(
            r#"<html><head><title>{title}</title><meta name="description" content="{description}"></head><body>{body}</body></html>"#
        )
    }

    fn pipeline(fetcher: MockFetcher, top_k: usize) -> (Pipeline, Arc<MockFetcher>) {
        let fetcher = Arc::new(fetcher);
        let pipeline = Pipeline::new(
            fetcher.clone(),
            Arc::new(MockScorer::new()),
            PipelineConfig::new().with_top_k(top_k).with_concurrency(2),
        )
        .unwrap();
        (pipeline, fetcher)
    }

    #[test]
    fn test_ingest_drops_invalid_and_duplicates() {
        let mut failures = Vec::new();
        let sources = ingest(
            [
                " https://a.gov/x ",
                "not a url",
                "https://a.gov/x",
                "ftp://files.gov",
                "https://b.gov",
            ],
            &mut failures,
        );

        let urls: Vec<&str> = sources.iter().map(SourceUrl::as_str).collect();
        assert_eq!(urls, vec!["https://a.gov/x", "https://b.gov"]);
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|f| f.stage == Stage::Ingest));
        assert_eq!(failures[0].url, "not a url");
    }

    #[tokio::test]
    async fn test_ranked_survivors_become_records_in_rank_order() {
        let fetcher = MockFetcher::new()
            .with_page(
                "https://a.gov",
                page("A", "Parks", "construction projects"),
            )
            .with_page(
                "https://b.gov",
                page("B", "Roads", "construction infrastructure projects tenders"),
            )
            .with_page("https://c.gov", page("C", "Minutes", "agenda"));

        let (pipeline, fetcher) = pipeline(fetcher, 2);
        let result = pipeline
            .run(["https://a.gov", "https://b.gov", "https://c.gov"])
            .await;

        let urls: Vec<&str> = result.records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://b.gov", "https://a.gov"]);
        assert!(result.failures.is_empty());
        assert_eq!(result.outcome(), RunOutcome::Complete);
        // Only survivors are fetched as HTML.
        assert_eq!(fetcher.html_fetches(), 2);
    }

    #[tokio::test]
    async fn test_missing_description_fails_gate() {
        let fetcher = MockFetcher::new().with_page(
            "https://a.gov",
            "<html><head><title>Projects</title></head><body>construction</body></html>",
        );
        let (pipeline, _) = pipeline(fetcher, 10);

        let result = pipeline.run(["https://a.gov"]).await;

        assert!(result.records.is_empty());
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].stage, Stage::Standardize);
        assert!(matches!(result.failures[0].kind, ErrorKind::Precondition(_)));
        assert_eq!(result.outcome(), RunOutcome::Empty);
    }

    #[tokio::test]
    async fn test_progress_ends_in_partially_failed() {
        let fetcher = MockFetcher::new()
            .with_page("https://a.gov", page("A", "Roads", "construction"))
            .fail_html("https://a.gov", ErrorKind::HttpStatus(503));
        let (pipeline, _) = pipeline(fetcher, 10);

        let (tx, rx) = watch::channel(RunState::Idle);
        let result = pipeline
            .run_with(["https://a.gov"], RunOptions::new().with_progress(tx))
            .await;

        assert_eq!(*rx.borrow(), RunState::PartiallyFailed);
        assert_eq!(result.failures[0].stage, Stage::FetchHtml);
        assert_eq!(result.failures[0].kind, ErrorKind::HttpStatus(503));
    }

    #[tokio::test]
    async fn test_cancelled_run_records_every_url() {
        let fetcher = MockFetcher::new()
            .with_page("https://a.gov", page("A", "Roads", "construction"))
            .with_page("https://b.gov", page("B", "Roads", "construction"));
        let (pipeline, _) = pipeline(fetcher, 10);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = pipeline
            .run_with(
                ["https://a.gov", "https://b.gov"],
                RunOptions::new().with_cancel(cancel),
            )
            .await;

        assert!(result.records.is_empty());
        assert_eq!(result.failures.len(), 2);
        assert!(result
            .failures
            .iter()
            .all(|f| f.kind == ErrorKind::Cancelled && f.stage == Stage::FetchText));
    }

    #[tokio::test]
    async fn test_config_token_cap_applies_to_injected_scorer() {
        let fetcher =
            MockFetcher::new().with_text("https://a.gov", "one two three four five six seven");
        let scorer = Arc::new(MockScorer::new());
        let pipeline = Pipeline::new(
            Arc::new(fetcher),
            scorer.clone(),
            PipelineConfig::new().with_max_input_tokens(3),
        )
        .unwrap();

        pipeline.run(["https://a.gov"]).await;

        assert_eq!(scorer.inputs(), vec!["one two three"]);
    }

    #[tokio::test]
    async fn test_records_carry_url_as_supplied() {
        let padded = "  https://a.gov/projects\t";
        let fetcher = MockFetcher::new().with_page(
            "https://a.gov/projects",
            page("A", "Roads", "construction"),
        );
        let (pipeline, fetcher) = pipeline(fetcher, 10);

        let result = pipeline.run([padded]).await;

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].url, padded);
        assert_eq!(result.ranking[0].url, padded);
        // Fetches still go to the trimmed URL.
        for call in fetcher.calls() {
            let (MockFetcherCall::Text { url } | MockFetcherCall::Html { url }) = call;
            assert_eq!(url, "https://a.gov/projects");
        }
    }

    #[tokio::test]
    async fn test_fetches_never_exceed_concurrency() {
        let delay = Duration::from_millis(100);
        let urls: Vec<String> = (0..6).map(|i| format!("https://city{i}.gov")).collect();
        let fetcher = urls.iter().fold(MockFetcher::new(), |fetcher, url| {
            fetcher
                .fail_text(url.as_str(), ErrorKind::Network("unreachable".into()))
                .with_delay(url.as_str(), delay)
        });
        let (pipeline, fetcher) = pipeline(fetcher, 10);

        let started = std::time::Instant::now();
        let result = pipeline.run(&urls).await;
        let elapsed = started.elapsed();

        assert_eq!(result.failures.len(), 6);
        assert_eq!(fetcher.peak_in_flight(), 2);
        // Six fetches, two at a time: three waves.
        assert!(elapsed >= delay * 3, "finished too fast: {elapsed:?}");
        assert!(elapsed < delay * 6, "ran serially: {elapsed:?}");
    }

    #[tokio::test]
    async fn test_export_runs_off_the_async_thread() {
        struct ThreadExporter(std::sync::Mutex<Option<std::thread::ThreadId>>);

        impl Exporter for ThreadExporter {
            fn export(&self, records: &[CanonicalRecord]) -> ExportResult<ExportSummary> {
                *self.0.lock().unwrap() = Some(std::thread::current().id());
                Ok(ExportSummary {
                    path: None,
                    records: records.len(),
                    bytes: 0,
                })
            }

            fn name(&self) -> &str {
                "thread"
            }
        }

        let fetcher =
            MockFetcher::new().with_page("https://a.gov", page("A", "Roads", "construction"));
        let (pipeline, _) = pipeline(fetcher, 10);
        let exporter = Arc::new(ThreadExporter(Default::default()));

        let report = pipeline
            .run_and_export(["https://a.gov"], exporter.clone())
            .await
            .unwrap();

        assert_eq!(report.outcome, RunOutcome::Complete);
        assert_eq!(report.result.records.len(), 1);
        assert_eq!(report.export.unwrap().records, 1);
        let export_thread = exporter.0.lock().unwrap().expect("exporter was called");
        assert_ne!(export_thread, std::thread::current().id());
    }

    #[test]
    fn test_builder_rejects_zero_top_k() {
        let result = Pipeline::builder()
            .fetcher(Arc::new(MockFetcher::new()))
            .config(PipelineConfig::new().with_top_k(0))
            .build();
        assert!(matches!(result, Err(ConfigError::Zero { field: "top_k" })));
    }
}
