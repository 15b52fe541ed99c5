//! `copy-refinery`: generate, A/B select and refine SEO product descriptions
//!
//! ```text
//! copy-refinery run --jobs products.json --corpus corpus.json -o report.json
//! copy-refinery score --file description.txt -k "wireless mouse,ergonomic design"
//! ```
//!
//! Configuration comes from `--config` (TOML), `CONFIG_ENV`,
//! `COPY_REFINERY_*` variables and a `.env` file; see [`config`].

mod commands;
mod config;
mod report;
mod telemetry;

use clap::{Args, Parser, Subcommand};
use commands::RunInputs;
use config::{AppConfig, Overrides};
use copy_refinery_generators::Backend;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "copy-refinery",
    about = "Generate and iteratively refine SEO-scored product descriptions",
    version
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, global = true, env = "COPY_REFINERY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate and refine descriptions for a batch of products
    Run(RunArgs),
    /// Score an existing description
    Score(ScoreArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON array of `{ "product": {...}, "keywords": [...] }`
    #[arg(long)]
    jobs: PathBuf,
    /// JSON array of existing descriptions to stay distinct from
    #[arg(long)]
    corpus: Option<PathBuf>,
    /// JSON object mapping product names to ranked keywords
    #[arg(long)]
    keywords: Option<PathBuf>,
    /// Write the report here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Text backend (anthropic, ollama)
    #[arg(long)]
    backend: Option<Backend>,
    /// Model name
    #[arg(long)]
    model: Option<String>,
    /// Maximum accepted rewrites per product
    #[arg(long)]
    max_iterations: Option<u32>,
    /// Minimum score gain for a rewrite to count
    #[arg(long)]
    min_improvement: Option<f64>,
    /// Products refined at once
    #[arg(long)]
    max_concurrent: Option<usize>,
    /// Serve Prometheus metrics during the run
    #[arg(long)]
    metrics: bool,
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            backend: self.backend,
            model: self.model.clone(),
            max_iterations: self.max_iterations,
            min_improvement: self.min_improvement,
            max_concurrent: self.max_concurrent,
            metrics: self.metrics,
        }
    }

    fn inputs(&self) -> RunInputs {
        RunInputs {
            jobs: self.jobs.clone(),
            corpus: self.corpus.clone(),
            keywords: self.keywords.clone(),
        }
    }
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Description text
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    text: Option<String>,
    /// File holding the description
    #[arg(long)]
    file: Option<PathBuf>,
    /// Comma-separated keywords, best first
    #[arg(long, short, value_delimiter = ',')]
    keywords: Vec<String>,
    /// JSON array of existing descriptions
    #[arg(long)]
    corpus: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env(cli.config.as_deref())?;
    if let Command::Run(args) = &cli.command {
        config.apply_overrides(&args.overrides());
        config.validate()?;
    }

    telemetry::init(&config.observability)?;
    debug!(environment = %config.environment, "configuration loaded");

    match cli.command {
        Command::Run(args) => {
            let report = commands::run(&config, &args.inputs()).await?;
            commands::write_report(&report, args.output.as_deref())?;
            for line in report.summary_lines() {
                eprintln!("{line}");
            }
            if report.summary.succeeded == 0 {
                anyhow::bail!("no descriptions were generated successfully");
            }
        }
        Command::Score(args) => {
            let text = match (args.text, args.file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)?,
                (None, None) => anyhow::bail!("pass --text or --file"),
            };
            let scored = commands::score(&config, &text, args.keywords, args.corpus.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&scored)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "copy-refinery",
            "run",
            "--jobs",
            "products.json",
            "--backend",
            "claude",
            "--max-iterations",
            "5",
            "--metrics",
        ]);
        let Ok(Cli {
            command: Command::Run(args),
            ..
        }) = cli
        else {
            unreachable!("run arguments should parse");
        };
        let overrides = args.overrides();
        assert_eq!(overrides.backend, Some(Backend::Anthropic));
        assert_eq!(overrides.max_iterations, Some(5));
        assert!(overrides.metrics);
    }

    #[test]
    fn test_score_needs_text_or_file() {
        assert!(Cli::try_parse_from(["copy-refinery", "score"]).is_err());
        assert!(
            Cli::try_parse_from(["copy-refinery", "score", "--text", "a", "--file", "b"]).is_err()
        );
        assert!(Cli::try_parse_from(["copy-refinery", "score", "--text", "hello", "-k", "a,b"]).is_ok());
    }
}
