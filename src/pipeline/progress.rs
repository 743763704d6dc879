// src/pipeline/progress.rs
//! Push-style progress reporting for one generation attempt.
//!
//! Events go to a caller-supplied `mpsc::Sender`. Percent never decreases
//! within an attempt; the terminal `Error` event repeats the last percent
//! reached. A dropped receiver silences reporting but does not cancel work.
//!
//! The observer can never stall an attempt: intermediate events are
//! `try_send`, dropped when the buffer is full, and the terminal event waits
//! at most `TERMINAL_SEND_TIMEOUT` for room.

use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};

pub const TERMINAL_SEND_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CheckingQuota,
    LoadingCorpus,
    SelectingTopic,
    GeneratingContent,
    AssigningAsset,
    Persisting,
    Complete,
    Error,
}

impl Stage {
    pub fn percent(&self) -> Option<u8> {
        match self {
            Stage::CheckingQuota => Some(5),
            Stage::LoadingCorpus => Some(15),
            Stage::SelectingTopic => Some(30),
            Stage::GeneratingContent => Some(50),
            Stage::AssigningAsset => Some(75),
            Stage::Persisting => Some(90),
            Stage::Complete => Some(100),
            Stage::Error => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::CheckingQuota => "checking_quota",
            Stage::LoadingCorpus => "loading_corpus",
            Stage::SelectingTopic => "selecting_topic",
            Stage::GeneratingContent => "generating_content",
            Stage::AssigningAsset => "assigning_asset",
            Stage::Persisting => "persisting",
            Stage::Complete => "complete",
            Stage::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete | Stage::Error)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub message: String,
    pub percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Cloneable handle shared between the stage runner and its supervisor.
#[derive(Clone)]
pub struct ProgressReporter {
    tx: Option<mpsc::Sender<ProgressEvent>>,
    last_percent: Arc<AtomicU8>,
    last_stage: Arc<std::sync::Mutex<Stage>>,
}

impl ProgressReporter {
    pub fn new(tx: Option<mpsc::Sender<ProgressEvent>>) -> Self {
        Self {
            tx,
            last_percent: Arc::new(AtomicU8::new(0)),
            last_stage: Arc::new(std::sync::Mutex::new(Stage::CheckingQuota)),
        }
    }

    pub fn last_percent(&self) -> u8 {
        self.last_percent.load(Ordering::SeqCst)
    }

    /// Stage the attempt was in when it last reported.
    pub fn last_stage(&self) -> Stage {
        self.last_stage
            .lock()
            .map(|g| *g)
            .unwrap_or(Stage::CheckingQuota)
    }

    async fn send(&self, event: ProgressEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        if event.stage.is_terminal() {
            if let Err(e) = tx.send_timeout(event, TERMINAL_SEND_TIMEOUT).await {
                tracing::debug!(target: "pipeline", "terminal progress event not delivered: {e}");
            }
            return;
        }
        match tx.try_send(event) {
            Ok(()) => {}
            // Receiver gone means the caller stopped listening; keep working.
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(target: "pipeline", "progress receiver dropped");
            }
            Err(TrySendError::Full(ev)) => {
                tracing::debug!(target: "pipeline", stage = ev.stage.as_str(), "progress buffer full, event dropped");
            }
        }
    }

    pub async fn stage(&self, stage: Stage, message: impl Into<String>) {
        let pct = stage
            .percent()
            .unwrap_or(0)
            .max(self.last_percent.load(Ordering::SeqCst));
        self.last_percent.store(pct, Ordering::SeqCst);
        if let Ok(mut g) = self.last_stage.lock() {
            *g = stage;
        }
        self.send(ProgressEvent {
            stage,
            message: message.into(),
            percent: pct,
            error: None,
        })
        .await;
    }

    pub async fn error(&self, message: impl Into<String>, error: impl Into<String>) {
        self.send(ProgressEvent {
            stage: Stage::Error,
            message: message.into(),
            percent: self.last_percent(),
            error: Some(error.into()),
        })
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn percent_is_monotonic_and_error_repeats_last() {
        let (tx, mut rx) = mpsc::channel(16);
        let rep = ProgressReporter::new(Some(tx));
        rep.stage(Stage::SelectingTopic, "a").await;
        rep.stage(Stage::CheckingQuota, "b").await;
        rep.error("failed", "boom").await;
        drop(rep);

        let mut got = Vec::new();
        while let Some(ev) = rx.recv().await {
            got.push(ev);
        }
        assert_eq!(got.len(), 3);
        assert_eq!(got[0].percent, 30);
        assert_eq!(got[1].percent, 30);
        assert_eq!(got[2].stage, Stage::Error);
        assert_eq!(got[2].percent, 30);
        assert_eq!(got[2].error.as_deref(), Some("boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn undrained_receiver_never_blocks() {
        let (tx, mut rx) = mpsc::channel(1);
        let rep = ProgressReporter::new(Some(tx));
        rep.stage(Stage::CheckingQuota, "a").await;
        rep.stage(Stage::LoadingCorpus, "b").await;
        rep.error("failed", "boom").await;
        assert_eq!(rep.last_percent(), 15);

        // only the first event fit; the rest were dropped
        let first = rx.recv().await.unwrap();
        assert_eq!(first.stage, Stage::CheckingQuota);
        drop(rep);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn terminal_event_waits_for_room() {
        let (tx, mut rx) = mpsc::channel(1);
        let rep = ProgressReporter::new(Some(tx));
        rep.stage(Stage::Persisting, "saving").await;
        let reader = tokio::spawn(async move {
            let mut got = Vec::new();
            while let Some(ev) = rx.recv().await {
                got.push(ev.stage);
            }
            got
        });
        rep.stage(Stage::Complete, "done").await;
        drop(rep);
        assert_eq!(reader.await.unwrap(), vec![Stage::Persisting, Stage::Complete]);
    }

    #[tokio::test]
    async fn dropped_receiver_is_harmless() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let rep = ProgressReporter::new(Some(tx));
        rep.stage(Stage::CheckingQuota, "still fine").await;
        assert_eq!(rep.last_percent(), 5);
    }
}
