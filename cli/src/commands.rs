//! The `run` and `score` subcommands

use crate::config::AppConfig;
use crate::report::RunReport;
use anyhow::{Context, bail};
use chrono::Utc;
use copy_refinery_core::{CompositeScorer, CorpusPool, KeywordSet, RefinementReducer, ScoredText};
use copy_refinery_runtime::metrics::MetricsServer;
use copy_refinery_runtime::{
    BatchRunner, ProductJob, ProductPipeline, StaticKeywordSource, cancel_on_signal,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Files consumed and produced by `run`
#[derive(Debug, Clone)]
pub struct RunInputs {
    /// JSON array of product jobs
    pub jobs: PathBuf,
    /// JSON array of existing descriptions
    pub corpus: Option<PathBuf>,
    /// JSON object mapping product name to ranked keywords
    pub keywords: Option<PathBuf>,
}

/// Parse a jobs file
///
/// # Errors
///
/// Returns error if `json` is not an array of jobs
pub fn parse_jobs(json: &str) -> anyhow::Result<Vec<ProductJob>> {
    serde_json::from_str(json).context("jobs must be a JSON array of {\"product\": {...}, \"keywords\": [...]}")
}

/// Parse a corpus file
///
/// # Errors
///
/// Returns error if `json` is not an array of strings
pub fn parse_corpus(json: &str) -> anyhow::Result<CorpusPool> {
    let texts: Vec<String> = serde_json::from_str(json).context("corpus must be a JSON array of strings")?;
    Ok(CorpusPool::from(texts))
}

/// Parse a keyword file
///
/// # Errors
///
/// Returns error if `json` is not an object of string arrays
pub fn parse_keyword_map(json: &str) -> anyhow::Result<StaticKeywordSource> {
    let map: HashMap<String, Vec<String>> =
        serde_json::from_str(json).context("keywords must be a JSON object of product name to keyword list")?;
    Ok(map.into_iter().collect())
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Generate and refine a description for every job
///
/// # Errors
///
/// Returns error if inputs cannot be loaded or the generator, scorer or
/// batch runner cannot be built. Per-product failures end up in the report.
pub async fn run(config: &AppConfig, inputs: &RunInputs) -> anyhow::Result<RunReport> {
    let jobs = parse_jobs(&read(&inputs.jobs)?)?;
    if jobs.is_empty() {
        bail!("no products found in {}", inputs.jobs.display());
    }
    let corpus = match &inputs.corpus {
        Some(path) => parse_corpus(&read(path)?)?,
        None => CorpusPool::new(),
    };
    let keyword_source = match &inputs.keywords {
        Some(path) => parse_keyword_map(&read(path)?)?,
        None => StaticKeywordSource::new(),
    };

    if config.observability.metrics_enabled {
        MetricsServer::new(config.observability.metrics_addr).start()?;
    }

    let generator = config.llm.build()?;
    let scorer = Arc::new(CompositeScorer::new(config.scoring)?);
    let reducer = RefinementReducer::new(config.refinement, config.scoring.saturation_threshold)?;
    let pipeline = ProductPipeline::new(generator, scorer, Arc::new(keyword_source), reducer);
    let runner = BatchRunner::new(Arc::new(pipeline), config.batch)?;

    info!(
        environment = %config.environment,
        backend = %config.llm.backend,
        model = config.llm.resolved_model(),
        products = jobs.len(),
        corpus = corpus.len(),
        "starting description generation"
    );

    let signal = tokio::spawn(cancel_on_signal(runner.cancellation_flag()));
    let outcomes = runner.run(jobs, &corpus).await;
    signal.abort();

    if runner.cancellation_flag().is_cancelled() {
        warn!("run was cancelled; reporting finished products");
    }
    Ok(RunReport::from_outcomes(outcomes, Utc::now()))
}

/// Write `report` as pretty JSON to `output`, or stdout
///
/// # Errors
///
/// Returns error if the report cannot be serialized or written
pub fn write_report(report: &RunReport, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "report saved");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Score one description without generating anything
///
/// # Errors
///
/// Returns error if the corpus cannot be loaded or scoring is misconfigured
pub fn score(
    config: &AppConfig,
    text: &str,
    keywords: Vec<String>,
    corpus: Option<&Path>,
) -> anyhow::Result<ScoredText> {
    let corpus = match corpus {
        Some(path) => parse_corpus(&read(path)?)?,
        None => CorpusPool::new(),
    };
    let scorer = CompositeScorer::new(config.scoring)?;
    Ok(scorer.score_description(text, &KeywordSet::new(keywords), &corpus))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use copy_refinery_runtime::KeywordSource;
    use copy_refinery_testing::fixtures::{STRUCTURED_DESCRIPTION, wireless_mouse};

    #[test]
    fn test_parse_jobs_accepts_export_column_names() {
        let jobs = parse_jobs(
            r#"[
                {"product": {"name": "Desk Lamp", "features": ["dimmable"]}},
                {
                    "product": {
                        "Product Name": "Wireless Mouse",
                        "Product Features": "ergonomic, 2.4GHz, silent click",
                        "Target Audience": "office workers"
                    },
                    "keywords": ["wireless mouse"]
                }
            ]"#,
        )
        .unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].keywords, None);
        assert_eq!(jobs[1].product, wireless_mouse());
    }

    #[test]
    fn test_parse_jobs_rejects_nameless_product() {
        assert!(parse_jobs(r#"[{"product": {"name": "  "}}]"#).is_err());
        assert!(parse_jobs(r#"{"product": {"name": "Lamp"}}"#).is_err());
    }

    #[test]
    fn test_parse_corpus() {
        let corpus = parse_corpus(r#"["one", "two"]"#).unwrap();
        assert_eq!(corpus.len(), 2);
        assert!(parse_corpus(r#"[1, 2]"#).is_err());
    }

    #[tokio::test]
    async fn test_parse_keyword_map() {
        let source = parse_keyword_map(r#"{"Wireless Mouse": ["wireless mouse", "quiet mouse"]}"#).unwrap();
        let keywords = source.keywords_for(&wireless_mouse()).await;
        assert_eq!(keywords, KeywordSet::new(["wireless mouse", "quiet mouse"]));
    }

    #[test]
    fn test_score_uses_configured_weights() {
        let config = AppConfig::default();
        let scored = score(
            &config,
            STRUCTURED_DESCRIPTION,
            vec!["wireless mouse".to_string()],
            None,
        )
        .unwrap();
        assert!((0.0..=100.0).contains(&scored.overall_score));
        assert!((scored.metric_scores.length - 100.0).abs() < f64::EPSILON);
    }
}
