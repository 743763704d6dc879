// src/bin/generate_demo.rs
// Runs one generation attempt against in-memory stores and prints progress.
//
// Uses the configured generator when it is enabled and has an API key,
// otherwise the built-in mock article.

use std::sync::Arc;

use article_forge::config::{GeneratorConfig, PipelineConfig};
use article_forge::generator::{build_generator, DynGenerator, MockGenerator};
use article_forge::store::MemoryStore;
use article_forge::{init_tracing, CandidateTopic, GenerateRequest, GenerationPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = PipelineConfig::load_default()?;
    let gen_cfg = GeneratorConfig::load_default().unwrap_or_default();
    let generator: DynGenerator = if gen_cfg.enabled && !gen_cfg.api_key.is_empty() {
        build_generator(&gen_cfg, config.generator_timeout())?
    } else {
        Arc::new(MockGenerator::sample())
    };

    let store = Arc::new(MemoryStore::with_titles([
        "Five ways to cut your grocery budget",
        "Understanding capital gains tax on index funds",
    ]));
    let pipeline = GenerationPipeline::new(store.clone(), store.clone(), generator, config);

    let candidates = vec![
        CandidateTopic::new(
            "Ways to cut your grocery budget this month",
            "https://example.com/groceries",
        )
        .published("2025-06-10")
        .relevance(0.9),
        CandidateTopic::new(
            "IRS raises 401(k) contribution limits for next year",
            "https://example.com/401k-limits",
        )
        .body("The IRS announced higher contribution limits for 401(k) plans and IRAs.")
        .published("2025-06-14")
        .relevance(0.8),
        CandidateTopic::new(
            "Mortgage rates dip for the third straight week",
            "https://example.com/mortgage-rates",
        )
        .relevance(0.6),
    ];

    let (mut rx, handle) = pipeline.spawn(GenerateRequest::new("demo-admin", candidates));
    while let Some(ev) = rx.recv().await {
        println!("[{:>3}%] {:<20} {}", ev.percent, ev.stage.as_str(), ev.message);
    }
    let result = handle.await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    println!("attempt rows: {}", store.attempts_snapshot().len());
    Ok(())
}
