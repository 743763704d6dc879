// src/pipeline/orchestrator.rs
//! One generation attempt, end to end.
//!
//! The whole attempt runs detached from the caller: `generate_at` only awaits
//! it, so dropping the caller's future (disconnect, outer timeout) cannot skip
//! the attempt-log write. Inside that task the stages run in a second task so
//! a panic turns into `CONTENT_GENERATION_FAILED`. The supervising task owns
//! the attempt-log write and the terminal progress event, so both happen
//! exactly once per attempt.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::content::assemble_item;
use super::progress::{ProgressEvent, ProgressReporter, Stage};
use super::{anon_id, GenerateRequest, GenerationResult};
use crate::analyze::{build_corpus, select_topic, Selection};
use crate::assets::pick_thumbnail;
use crate::config::PipelineConfig;
use crate::error::{ErrorCode, StageError};
use crate::generator::{
    build_prompt, parse_generator_output, DynGenerator, GenerationRequest, GeneratorOutput,
};
use crate::metrics::{ensure_metrics_described, ATTEMPTS_TOTAL, DURATION_MS, FAILURES_TOTAL, SUCCESS_TOTAL};
use crate::quota::QuotaTracker;
use crate::store::{AttemptLog, ContentRepository};
use crate::types::ContentItem;

const PROGRESS_BUFFER: usize = 32;

const EMPTY_INPUT_SUGGESTIONS: &[&str] = &[
    "Fetch a fresh batch of candidate topics and retry",
    "Widen the search date range",
    "Try a different search keyword",
];

const DUPLICATE_SUGGESTIONS: &[&str] = &[
    "Search for a follow-up angle on a recent story",
    "Pick a category with fewer recent articles",
    "Try a narrower keyword to surface niche topics",
];

/// Topic chosen by the stage runner, read back by the supervisor for the log row.
#[derive(Default)]
struct AttemptState {
    topic_title: Mutex<Option<String>>,
}

impl AttemptState {
    fn set_topic(&self, title: &str) {
        if let Ok(mut g) = self.topic_title.lock() {
            *g = Some(title.to_string());
        }
    }

    fn topic(&self) -> Option<String> {
        self.topic_title.lock().ok().and_then(|g| g.clone())
    }
}

#[derive(Clone)]
pub struct GenerationPipeline {
    repo: Arc<dyn ContentRepository>,
    quota: QuotaTracker,
    generator: DynGenerator,
    config: Arc<PipelineConfig>,
}

impl GenerationPipeline {
    pub fn new(
        repo: Arc<dyn ContentRepository>,
        attempts: Arc<dyn AttemptLog>,
        generator: DynGenerator,
        config: PipelineConfig,
    ) -> Self {
        let config = config.sanitized();
        Self {
            repo,
            quota: QuotaTracker::new(attempts, config.store_timeout()),
            generator,
            config: Arc::new(config),
        }
    }

    pub async fn generate(
        &self,
        request: GenerateRequest,
        progress: Option<mpsc::Sender<ProgressEvent>>,
    ) -> GenerationResult {
        self.generate_at(request, Utc::now(), progress).await
    }

    /// Fire-and-observe: progress on the returned receiver, result on the handle.
    /// Dropping the receiver does not cancel the attempt.
    pub fn spawn(
        &self,
        request: GenerateRequest,
    ) -> (mpsc::Receiver<ProgressEvent>, JoinHandle<GenerationResult>) {
        let (tx, rx) = mpsc::channel(PROGRESS_BUFFER);
        let this = self.clone();
        let handle = tokio::spawn(async move { this.run_attempt(request, Utc::now(), Some(tx)).await });
        (rx, handle)
    }

    /// Same as `generate`, with an explicit clock. All window and recency math uses `now`.
    ///
    /// Once started, the attempt runs to completion even if this future is dropped.
    pub async fn generate_at(
        &self,
        request: GenerateRequest,
        now: DateTime<Utc>,
        progress: Option<mpsc::Sender<ProgressEvent>>,
    ) -> GenerationResult {
        let principal_id = request.principal_id.clone();
        let this = self.clone();
        let attempt = tokio::spawn(async move { this.run_attempt(request, now, progress).await });
        match attempt.await {
            Ok(result) => result,
            Err(join_err) => {
                warn!(target: "pipeline", principal = %anon_id(&principal_id), "attempt task aborted: {join_err}");
                GenerationResult::Failure(
                    StageError::from(anyhow!("internal error: attempt task aborted")).into_failure(),
                )
            }
        }
    }

    /// Stages plus bookkeeping. Always ends with exactly one log row (unless
    /// refused by quota) and one terminal progress event.
    async fn run_attempt(
        &self,
        request: GenerateRequest,
        now: DateTime<Utc>,
        progress: Option<mpsc::Sender<ProgressEvent>>,
    ) -> GenerationResult {
        ensure_metrics_described();
        counter!(ATTEMPTS_TOTAL).increment(1);
        let started = Instant::now();

        let principal_id = request.principal_id.clone();
        let reporter = ProgressReporter::new(progress);
        let state = Arc::new(AttemptState::default());

        let runner = {
            let this = self.clone();
            let reporter = reporter.clone();
            let state = Arc::clone(&state);
            tokio::spawn(async move { this.run_stages(request, now, &reporter, &state).await })
        };

        let outcome = match runner.await {
            Ok(r) => r,
            Err(join_err) => {
                let detail = if join_err.is_panic() {
                    panic_message(join_err.into_panic())
                } else {
                    "generation task was cancelled".to_string()
                };
                warn!(target: "pipeline", principal = %anon_id(&principal_id), "stage runner aborted: {detail}");
                Err(StageError::from(anyhow!("internal error: {detail}")))
            }
        };

        let topic_title = state.topic();
        let result = match outcome {
            Ok(item) => {
                self.record(&principal_id, topic_title.as_deref(), true, None, now)
                    .await;
                reporter
                    .stage(Stage::Complete, format!("Published \"{}\"", item.title()))
                    .await;
                counter!(SUCCESS_TOTAL).increment(1);
                GenerationResult::Success { content_item: item }
            }
            Err(err) => {
                let failed_stage = reporter.last_stage();
                let failure = err.into_failure();
                // A refused attempt never started, so it leaves no log row.
                if failure.code != ErrorCode::RateLimitExceeded {
                    self.record(
                        &principal_id,
                        topic_title.as_deref(),
                        false,
                        Some(&failure.message),
                        now,
                    )
                    .await;
                }
                reporter
                    .error(
                        format!("Generation failed while {}", failed_stage.as_str()),
                        failure.message.clone(),
                    )
                    .await;
                counter!(FAILURES_TOTAL, "code" => failure.code.as_str()).increment(1);
                GenerationResult::Failure(failure)
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        histogram!(DURATION_MS).record(elapsed_ms as f64);
        info!(
            target: "pipeline",
            principal = %anon_id(&principal_id),
            stage = reporter.last_stage().as_str(),
            success = result.is_success(),
            code = result.failure().map(|f| f.code.as_str()).unwrap_or("OK"),
            topic = topic_title.as_deref().unwrap_or("-"),
            elapsed_ms,
            "generation attempt finished"
        );
        result
    }

    async fn record(
        &self,
        principal_id: &str,
        topic_title: Option<&str>,
        succeeded: bool,
        error_message: Option<&str>,
        at: DateTime<Utc>,
    ) {
        if let Err(e) = self
            .quota
            .record_attempt(principal_id, topic_title, succeeded, error_message, at)
            .await
        {
            warn!(target: "pipeline", principal = %anon_id(principal_id), "attempt log write failed: {e:#}");
        }
    }

    async fn run_stages(
        &self,
        request: GenerateRequest,
        now: DateTime<Utc>,
        progress: &ProgressReporter,
        state: &AttemptState,
    ) -> Result<ContentItem, StageError> {
        let cfg = &self.config;
        let GenerateRequest {
            principal_id,
            content_api_key,
            candidates,
            target_category,
        } = request;

        // 1. quota
        progress
            .stage(Stage::CheckingQuota, "Checking daily generation quota")
            .await;
        let quota = self
            .quota
            .check_quota(&principal_id, cfg.daily_limit, now)
            .await;
        if !quota.allowed {
            return Err(StageError::RateLimitExceeded {
                limit: cfg.daily_limit,
                resets_at: quota.window_resets_at,
            });
        }
        debug!(target: "pipeline", remaining = quota.remaining, "quota ok");

        // 2. corpus; a store outage degrades to an empty corpus
        progress
            .stage(Stage::LoadingCorpus, "Loading recently published titles")
            .await;
        let rows = match tokio::time::timeout(
            cfg.store_timeout(),
            self.repo.list_recent_titles(cfg.corpus_limit),
        )
        .await
        {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => {
                warn!(target: "pipeline", "corpus load failed, continuing without dedup corpus: {e:#}");
                Vec::new()
            }
            Err(_) => {
                warn!(target: "pipeline", "corpus load timed out, continuing without dedup corpus");
                Vec::new()
            }
        };
        let existing_titles: Vec<String> = rows.into_iter().map(|r| r.title).collect();
        let corpus = build_corpus(existing_titles.iter());

        // 3. selection
        let candidate_count = candidates.len();
        progress
            .stage(
                Stage::SelectingTopic,
                format!("Scoring {candidate_count} candidate topics"),
            )
            .await;
        let best = match select_topic(candidates, &corpus, cfg.dedup_threshold, now) {
            Selection::Selected { best, rejected, .. } => {
                debug!(
                    target: "pipeline",
                    rejected = rejected.len(),
                    score = best.combined_score,
                    "topic selected"
                );
                best
            }
            Selection::NoCandidates => {
                return Err(StageError::NoTopicsFound {
                    message: "no candidate topics were supplied".to_string(),
                    suggestions: to_owned(EMPTY_INPUT_SUGGESTIONS),
                    rejected: Vec::new(),
                });
            }
            Selection::AllDuplicates { rejected } => {
                return Err(StageError::NoTopicsFound {
                    message: format!(
                        "all candidates were duplicates of recently published content ({} rejected)",
                        rejected.len()
                    ),
                    suggestions: to_owned(DUPLICATE_SUGGESTIONS),
                    rejected,
                });
            }
        };
        state.set_topic(&best.topic.title);
        let category = target_category.unwrap_or(best.suggested_category);

        // 4. generation
        progress
            .stage(
                Stage::GeneratingContent,
                format!("Writing an article on \"{}\"", best.topic.title),
            )
            .await;
        let prompt = build_prompt(&best, category, &existing_titles, cfg.prompt_avoid_titles);
        let gen_request = GenerationRequest {
            topic: best.clone(),
            category,
            avoid_titles: existing_titles,
            api_key: content_api_key,
            prompt,
        };
        let raw = match tokio::time::timeout(
            cfg.generator_timeout(),
            self.generator.generate(&gen_request),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(StageError::ContentGeneration(format!("{e:#}"))),
            Err(_) => {
                return Err(StageError::ContentGeneration(format!(
                    "{} generator timed out after {}s",
                    self.generator.name(),
                    cfg.generator_timeout_secs
                )))
            }
        };

        let output = parse_generator_output(&raw, &best.topic.title, cfg.min_fallback_chars);
        match &output {
            GeneratorOutput::Unparseable { reason } => {
                return Err(StageError::ContentGeneration(reason.clone()));
            }
            GeneratorOutput::Degraded { .. } => {
                warn!(target: "pipeline", generator = self.generator.name(), "structured output missing, using salvaged prose");
            }
            GeneratorOutput::Parsed(_) => {}
        }
        let Some(mut item) = assemble_item(output, &best, category, &principal_id, now) else {
            return Err(StageError::ContentGeneration(
                "generator output could not be assembled".to_string(),
            ));
        };

        // 5. asset
        progress
            .stage(Stage::AssigningAsset, "Choosing a thumbnail")
            .await;
        item.thumbnail_url = pick_thumbnail(category, &best.topic.title);

        // 6. persist
        progress
            .stage(Stage::Persisting, "Saving the article")
            .await;
        match tokio::time::timeout(cfg.store_timeout(), self.repo.save_content_item(item)).await {
            Ok(Ok(saved)) => Ok(saved),
            Ok(Err(e)) => Err(StageError::Save(format!("{e:#}"))),
            Err(_) => Err(StageError::Save(format!(
                "store did not respond within {}s",
                cfg.store_timeout_secs
            ))),
        }
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic in generation stage".to_string()
    }
}
