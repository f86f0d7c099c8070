//! Search Provisioner Main Entry Point
//!
//! Command line front end: provisions the search resources of a corpus, runs
//! and polls its indexer, tears it down, uploads documents and queries the
//! index.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use search_provisioner::loader::DocumentLoader;
use search_provisioner::orchestrator::{ProvisionReport, TeardownReport};
use search_provisioner::poller::{describe_status, JobOutcome};
use search_provisioner::query::{render_results, run_query};
use search_provisioner::{Corpus, Dependencies, OrchestratorError, ProvisionerConfig, ProvisionerError};
use search_provisioner_repository::RunOutcome;
use search_provisioner_shared::types::search_request::DEFAULT_TOP;
use search_provisioner_shared::SearchMode;
use std::env;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "search-provisioner")]
#[command(about = "Provision and query a managed search service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Corpus preset (covid-news|hotels), overrides SEARCH_CORPUS
    #[arg(long, global = true)]
    corpus: Option<Corpus>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create data source, index and indexer, run the indexer and wait for it
    Provision {
        /// Delete existing resources first
        #[arg(long)]
        reset: bool,
    },
    /// Delete indexer, index and data source
    Teardown,
    /// Run the indexer and wait for the run to finish
    Run,
    /// Show the indexer status and its latest run
    Status,
    /// Print the number of documents in the index
    Count,
    /// Search the index
    Search {
        /// Query text
        query: String,

        /// Maximum number of hits
        #[arg(long, default_value_t = DEFAULT_TOP)]
        top: usize,

        /// Comma separated fields to search, defaults to the corpus fields
        #[arg(long, value_delimiter = ',')]
        search_fields: Vec<String>,

        /// Match any or all terms
        #[arg(long)]
        mode: Option<SearchMode>,
    },
    /// Upload documents from a JSON array file
    Upload {
        /// Path to the JSON file
        file: PathBuf,
    },
}

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("search_provisioner=info,search_provisioner_repository=info")
    });

    let json_output = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .pretty(),
            )
            .init();
    }

    info!(
        service_name = "search-provisioner",
        service_version = env!("CARGO_PKG_VERSION"),
        json = json_output,
        "Tracing initialized"
    );
}

fn check_provision(report: &ProvisionReport) -> Result<(), ProvisionerError> {
    if report.is_success() {
        return Ok(());
    }
    warn!("Provisioning finished with failures");
    Err(ProvisionerError::failed("provisioning finished with failures"))
}

fn check_teardown(report: &TeardownReport) -> Result<(), ProvisionerError> {
    if report.is_clean() {
        return Ok(());
    }
    Err(ProvisionerError::failed("teardown finished with failures"))
}

fn check_run(run: &RunOutcome, job: Option<&JobOutcome>) -> Result<(), ProvisionerError> {
    match job {
        Some(job) if job.is_success() => Ok(()),
        Some(job) => Err(ProvisionerError::failed(format!("indexer job {}", job))),
        None => Err(ProvisionerError::failed(format!("indexer run {}", run))),
    }
}

async fn execute(command: Commands, deps: &Dependencies) -> Result<(), ProvisionerError> {
    let orchestrator = &deps.orchestrator;
    let corpus = &deps.corpus;

    match command {
        Commands::Provision { reset } => {
            if deps.config.connection_string.is_none() {
                return Err(ProvisionerError::config(
                    "PLAYGROUND_CONN_STR is required to create the blob data source",
                ));
            }
            let report = if reset {
                let (teardown, report) = orchestrator.reset_and_provision().await?;
                println!("{}", teardown);
                report
            } else {
                orchestrator.provision().await?
            };
            println!("{}", report);
            check_provision(&report)?;
        }
        Commands::Teardown => {
            let report = orchestrator.teardown_all().await?;
            println!("{}", report);
            check_teardown(&report)?;
        }
        Commands::Run => {
            let (run, job) = orchestrator
                .poller()
                .run_and_wait(&corpus.indexer_name)
                .await
                .map_err(OrchestratorError::from)?;
            match &job {
                Some(job) => println!("indexer job: {}", job),
                None => println!("indexer run: {}", run),
            }
            check_run(&run, job.as_ref())?;
        }
        Commands::Status => {
            let status = deps
                .service
                .indexer_status(&corpus.indexer_name)
                .await
                .map_err(OrchestratorError::from)?;
            println!("{}", describe_status(&corpus.indexer_name, &status));
        }
        Commands::Count => {
            let count = deps
                .service
                .count_documents(&corpus.index_name)
                .await
                .map_err(OrchestratorError::from)?;
            println!("{}", count);
        }
        Commands::Search {
            query,
            top,
            search_fields,
            mode,
        } => {
            let mut request = corpus.search_request(&query).with_top(top);
            if !search_fields.is_empty() {
                request = request.with_search_fields(search_fields);
            }
            if let Some(mode) = mode {
                request = request.with_mode(mode);
            }
            let response = run_query(&deps.service, corpus, &request).await?;
            println!("{}", render_results(&query, &response, &corpus.select_fields));
        }
        Commands::Upload { file } => {
            let loader = DocumentLoader::new(deps.service.clone());
            let summary = loader.load_file(&corpus.index_name, &file).await?;
            println!(
                "uploaded {} documents: {} succeeded, {} failed",
                summary.total, summary.succeeded, summary.failed
            );
            for failure in summary.results.iter().filter(|r| !r.success) {
                println!(
                    "  {}: {}",
                    failure.key,
                    failure.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }

    Ok(())
}

/// Run a command until it finishes or Ctrl+C is pressed.
///
/// For commands that wait on the indexer, the first Ctrl+C stops the poll and
/// lets the command report; a second one abandons it. Other commands are
/// abandoned at once.
async fn execute_until_interrupted(
    command: Commands,
    deps: &Dependencies,
) -> Result<(), ProvisionerError> {
    let polls_indexer = matches!(command, Commands::Provision { .. } | Commands::Run);
    let work = execute(command, deps);
    tokio::pin!(work);

    tokio::select! {
        result = &mut work => return result,
        _ = tokio::signal::ctrl_c() => {
            if !polls_indexer {
                warn!("Received Ctrl+C, abandoning command");
                return Err(ProvisionerError::failed("interrupted"));
            }
            info!("Received Ctrl+C, stopping indexer poll");
            deps.orchestrator.shutdown();
        }
    }

    tokio::select! {
        result = &mut work => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Received second Ctrl+C, abandoning command");
            Err(ProvisionerError::failed("interrupted"))
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ProvisionerError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let mut config = match ProvisionerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to read configuration");
            return Err(e);
        }
    };
    if let Some(corpus) = cli.corpus {
        config.corpus = corpus;
    }

    let deps = match Dependencies::new(config) {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match execute_until_interrupted(cli.command, &deps).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(error = %e, "Command failed");
            Err(e)
        }
    }
}
