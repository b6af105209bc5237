//! epigraf - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use epigraf::backend::OpenAiBackend;
use epigraf::budget::TokenBudget;
use epigraf::change::GitRepositoryResolver;
use epigraf::destination::{CommitMessageFile, MessageDestination};
use epigraf::generate::{Generator, Outcome};
use epigraf::notify::ConsoleNotifier;
use epigraf::prompt::PromptTemplate;
use epigraf::settings::SettingsStore;
use epigraf::workspace::{collect_pending_changes, discover_repositories, filter_to_selection};

/// Generate a Git commit message from pending changes using an LLM.
#[derive(Parser, Debug)]
#[command(name = "epigraf")]
#[command(about = "Generate a Git commit message from pending changes using an LLM")]
#[command(version)]
struct Cli {
    /// Only describe changes at or under these paths
    paths: Vec<PathBuf>,

    /// Workspace root to scan for repositories
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    /// File to write the generated message to (defaults to the first
    /// repository's .git/COMMIT_EDITMSG)
    #[arg(short = 'o', long)]
    message_file: Option<PathBuf>,

    /// Override the configured prompt token ceiling
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Override the configured model
    #[arg(long)]
    model: Option<String>,

    /// Override the configured number of candidate completions
    #[arg(long)]
    candidates: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Step 1: Settings (process-wide handle, also the usage counter store)
    let store = SettingsStore::from_default_location()
        .context("Could not locate the settings directory")?;
    let mut settings = store.load();
    if let Some(model) = cli.model {
        settings.model = model;
    }
    if let Some(max_tokens) = cli.max_tokens {
        settings.max_prompt_tokens = max_tokens;
    }
    if let Some(candidates) = cli.candidates {
        settings.candidate_count = candidates;
    }

    // Step 2: Collect the selected changes across workspace repositories
    let workspace = cli
        .workspace
        .canonicalize()
        .with_context(|| format!("Workspace '{}' not found", cli.workspace.display()))?;
    let repositories = discover_repositories(&workspace);
    let changes = collect_pending_changes(&repositories)
        .context("Failed to enumerate pending changes")?;
    let selections: Vec<PathBuf> = cli
        .paths
        .iter()
        .map(|p| p.canonicalize().unwrap_or_else(|_| workspace.join(p)))
        .collect();
    let changes = filter_to_selection(changes, &selections);

    // Step 3: Resolve the write-back destination
    let mut destination = cli
        .message_file
        .clone()
        .or_else(|| {
            repositories
                .first()
                .map(|root| root.join(".git").join("COMMIT_EDITMSG"))
        })
        .map(CommitMessageFile::new);

    // Step 4: Assemble the orchestrator and run the single invocation
    let backend = OpenAiBackend::from_settings(&settings)
        .context("Completion backend is not configured")?;
    let budget = TokenBudget::new(settings.max_prompt_tokens)
        .context("Failed to initialize the token budget")?;
    let generator = Generator::new(
        backend,
        Arc::new(GitRepositoryResolver::new()),
        budget,
        PromptTemplate::new(settings.prompt_template.clone()),
        settings.candidate_count,
    );

    let notifier = ConsoleNotifier;
    let outcome = generator
        .generate(
            changes,
            destination
                .as_mut()
                .map(|d| d as &mut dyn MessageDestination),
            &notifier,
            &store,
        )
        .await;

    match outcome {
        Outcome::Success { message } => {
            println!("{message}");
            if let Some(destination) = &destination {
                eprintln!("Wrote commit message to {}", destination.path().display());
            }
            Ok(ExitCode::SUCCESS)
        }
        // The notifier has already reported the failure.
        _ => Ok(ExitCode::FAILURE),
    }
}
