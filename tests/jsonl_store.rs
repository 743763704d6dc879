// tests/jsonl_store.rs
mod common;

use std::sync::Arc;

use chrono::Duration;
use tokio::fs;

use article_forge::generator::MockGenerator;
use article_forge::store::{AttemptLog, ContentRepository, JsonlStore};
use article_forge::types::GenerationAttemptLog;
use article_forge::{GenerateRequest, GenerationPipeline};
use common::{fixed_now, test_config, three_candidates};

#[tokio::test]
async fn pipeline_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("store");

    {
        let store = Arc::new(JsonlStore::open(&root).await.unwrap());
        let pipeline = GenerationPipeline::new(
            store.clone(),
            store.clone(),
            Arc::new(MockGenerator::sample()),
            test_config(),
        );
        let result = pipeline
            .generate_at(
                GenerateRequest::new("admin-1", three_candidates()),
                fixed_now(),
                None,
            )
            .await;
        assert!(result.is_success());
    }

    let reopened = JsonlStore::open(&root).await.unwrap();
    let titles = reopened.list_recent_titles(10).await.unwrap();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].title, "What the new contribution limits mean for you");

    let day_start = fixed_now() - Duration::hours(12);
    let n = reopened
        .count_attempts("admin-1", day_start, day_start + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(n, 1);
}

#[tokio::test]
async fn missing_files_read_as_empty_and_bad_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlStore::open(dir.path()).await.unwrap();

    assert!(store.list_recent_titles(5).await.unwrap().is_empty());

    let now = fixed_now();
    store
        .append_attempt(GenerationAttemptLog {
            principal_id: "admin-1".into(),
            timestamp: now,
            topic_title: None,
            succeeded: false,
            error_message: Some("no topics".into()),
        })
        .await
        .unwrap();

    // Corrupt the log by hand; the good row must still count.
    let path = store.root().join("attempts.jsonl");
    let mut content = fs::read_to_string(&path).await.unwrap();
    content.push_str("{not json\n\n");
    fs::write(&path, content).await.unwrap();

    let n = store
        .count_attempts("admin-1", now - Duration::hours(1), now + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(n, 1);

    // Window end is exclusive.
    let n = store
        .count_attempts("admin-1", now - Duration::hours(1), now)
        .await
        .unwrap();
    assert_eq!(n, 0);
}
