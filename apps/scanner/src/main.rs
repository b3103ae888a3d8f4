mod cli;
mod config;
mod enrichment;
mod errors;
mod extraction;
mod ingest;
mod llm_client;
mod matching;
mod models;
mod normalizer;
mod pipeline;
mod store;

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;
use crate::enrichment::LlmEnricher;
use crate::errors::AppError;
use crate::extraction::LanguageModel;
use crate::ingest::list_resumes;
use crate::llm_client::LlmClient;
use crate::matching::JobRequirement;
use crate::pipeline::{BatchReport, Pipeline};
use crate::store::ApplicantStore;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration comes before logging, so its errors go straight to stderr.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            let err = AppError::Config(format!("{e:#}"));
            eprintln!("{err}");
            return ExitCode::from(err.exit_code());
        }
    };

    // Structured logging on stderr; stdout carries the JSON report unless a path is set.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting ATS scanner v{}", env!("CARGO_PKG_VERSION"));

    let report_path = config.report_path.clone();
    let report = match run(cli, config).await {
        Ok(report) => report,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(e.exit_code());
        }
    };

    match report_path {
        Some(path) => match report.write_to(&path) {
            Ok(()) => {
                info!("Batch report written to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to write batch report to {}: {e}", path.display());
                ExitCode::FAILURE
            }
        },
        None => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to serialize batch report: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(cli: Cli, config: Config) -> Result<BatchReport, AppError> {
    // Missing or invalid model is fatal.
    let model = LanguageModel::load(&config.model_path)?;
    let mut pipeline = Pipeline::new(model, config.workers, Local::now().date_naive());

    match &config.job_path {
        Some(path) => pipeline = pipeline.with_job(JobRequirement::load(path)?),
        None => info!("ATS_JOB_PATH not set, scoring disabled"),
    }

    match &config.google_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.llm_endpoint.clone(), config.enrich_timeout)
                .map_err(|e| AppError::Config(format!("LLM client: {e}")))?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            pipeline = pipeline.with_enricher(Arc::new(LlmEnricher::new(llm)));
        }
        None => info!("GOOGLE_API_KEY not set, enrichment disabled"),
    }

    if let Some(url) = &config.database_url {
        pipeline = pipeline.with_store(ApplicantStore::connect(url).await?);
    }

    let paths = list_resumes(&cli.input_dir)?;
    info!("Found {} resume files in {}", paths.len(), cli.input_dir.display());
    let has_pdf = paths
        .iter()
        .any(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("pdf")));
    if has_pdf && config.report_path.is_none() {
        warn!("PDF inputs may write extractor diagnostics to stdout; set ATS_REPORT_PATH for a clean report");
    }

    pipeline.run(paths).await
}
