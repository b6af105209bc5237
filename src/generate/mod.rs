//! End-to-end orchestration: diff assembly, budget check, backend request,
//! write-back.

use std::sync::Arc;

use tokio::task;
use tracing::{debug, warn};

use crate::backend::CompletionBackend;
use crate::budget::{BudgetCheck, TokenBudget};
use crate::change::{Change, RepositoryResolver};
use crate::destination::MessageDestination;
use crate::diff::build_workspace_diff;
use crate::error::DiffError;
use crate::notify::{Notification, NotificationSink};
use crate::prompt::PromptTemplate;
use crate::settings::UsageStore;

/// Fixed text written into the destination when the backend fails, so the
/// commit-message field is never left blank.
pub const GENERATION_FAILED_PLACEHOLDER: &str = "Failed to generate a commit message.";

/// Fixed text reported when the backend error carries no message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// Terminal result of one invocation.
///
/// Mutually exclusive; each variant signals through exactly one outward
/// notification or the destination write-back, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success { message: String },
    EmptyDiff,
    PromptTooLarge { tokens: usize, max_tokens: usize },
    NoDestination,
    BackendFailed { message: String },
    DiffFailed { message: String },
}

/// Result of the synchronous preparation phase (steps before any backend
/// I/O).
enum PreparedPrompt {
    Empty,
    TooLarge { tokens: usize, max_tokens: usize },
    Ready { prompt: String },
}

/// Drives one commit-message generation from selected changes to a terminal
/// [`Outcome`].
pub struct Generator<B> {
    backend: B,
    resolver: Arc<dyn RepositoryResolver>,
    budget: Arc<TokenBudget>,
    template: PromptTemplate,
    candidates: u32,
}

impl<B: CompletionBackend> Generator<B> {
    pub fn new(
        backend: B,
        resolver: Arc<dyn RepositoryResolver>,
        budget: TokenBudget,
        template: PromptTemplate,
        candidates: u32,
    ) -> Self {
        Self {
            backend,
            resolver,
            budget: Arc::new(budget),
            template,
            candidates,
        }
    }

    /// Run the full flow for one invocation.
    ///
    /// Diff and prompt construction run to completion on a blocking worker
    /// before any backend I/O is attempted; the single backend request is
    /// the only suspension point, and the write-back runs afterwards on the
    /// caller's task. No retries; every failure is terminal.
    pub async fn generate(
        &self,
        changes: Vec<Change>,
        destination: Option<&mut dyn MessageDestination>,
        notifier: &dyn NotificationSink,
        usage: &dyn UsageStore,
    ) -> Outcome {
        let resolver = Arc::clone(&self.resolver);
        let budget = Arc::clone(&self.budget);
        let template = self.template.clone();
        let prepared = task::spawn_blocking(move || {
            prepare_prompt(changes, resolver.as_ref(), &template, &budget)
        })
        .await;

        let prompt = match prepared {
            Ok(Ok(PreparedPrompt::Ready { prompt })) => prompt,
            Ok(Ok(PreparedPrompt::Empty)) => {
                notifier.notify(Notification::EmptyDiff);
                return Outcome::EmptyDiff;
            }
            Ok(Ok(PreparedPrompt::TooLarge { tokens, max_tokens })) => {
                notifier.notify(Notification::PromptTooLarge { tokens, max_tokens });
                return Outcome::PromptTooLarge { tokens, max_tokens };
            }
            Ok(Err(e)) => return diff_failed(e.to_string(), notifier),
            Err(join_error) => return diff_failed(join_error.to_string(), notifier),
        };

        let Some(destination) = destination else {
            notifier.notify(Notification::NoDestination);
            return Outcome::NoDestination;
        };

        match self.backend.complete(&prompt, self.candidates).await {
            Ok(message) => {
                destination.set_text(&message);
                if let Err(e) = usage.record_hit() {
                    warn!("Failed to record usage hit: {e}");
                }
                Outcome::Success { message }
            }
            Err(e) => {
                destination.set_text(GENERATION_FAILED_PLACEHOLDER);
                let message = e
                    .user_message()
                    .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
                notifier.notify(Notification::RequestFailed {
                    message: message.clone(),
                });
                Outcome::BackendFailed { message }
            }
        }
    }
}

fn diff_failed(message: String, notifier: &dyn NotificationSink) -> Outcome {
    notifier.notify(Notification::DiffFailed {
        message: message.clone(),
    });
    Outcome::DiffFailed { message }
}

/// Steps 1–2: build the aggregated diff, render the prompt, check the
/// budget. Blocking work (git I/O plus tokenization); never touches the
/// backend or the destination.
fn prepare_prompt(
    changes: Vec<Change>,
    resolver: &dyn RepositoryResolver,
    template: &PromptTemplate,
    budget: &TokenBudget,
) -> Result<PreparedPrompt, DiffError> {
    let diff = build_workspace_diff(changes, resolver)?;
    if diff.trim().is_empty() {
        return Ok(PreparedPrompt::Empty);
    }

    let prompt = template.render(&diff);
    match budget.check(&prompt) {
        BudgetCheck::Exceeded { tokens, max_tokens } => {
            Ok(PreparedPrompt::TooLarge { tokens, max_tokens })
        }
        BudgetCheck::Within { tokens } => {
            debug!("Prompt within budget: {tokens} tokens");
            Ok(PreparedPrompt::Ready { prompt })
        }
    }
}
