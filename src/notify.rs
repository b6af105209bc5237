//! Typed user-facing notifications for terminal outcomes.

/// The closed set of failure events an invocation can surface.
///
/// Every failing invocation emits exactly one of these; successful
/// invocations signal through the destination write-back instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// No changes selected, or none resolved to a repository.
    EmptyDiff,
    /// The assembled prompt exceeds the backend's token budget.
    PromptTooLarge { tokens: usize, max_tokens: usize },
    /// No writable commit-message destination is available.
    NoDestination,
    /// Building the unified diff failed.
    DiffFailed { message: String },
    /// The backend request failed; `message` is the backend's error text
    /// or the fixed unknown-error text.
    RequestFailed { message: String },
}

/// Renders notifications to the user. Fire-and-forget; no return value.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that renders to stderr.
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::EmptyDiff => {
                eprintln!("No changes to describe: the selected changes produce an empty diff.");
            }
            Notification::PromptTooLarge { tokens, max_tokens } => {
                eprintln!(
                    "Prompt is too large for the backend: {} tokens (limit {}).",
                    tokens, max_tokens
                );
            }
            Notification::NoDestination => {
                eprintln!("No commit-message destination available to write to.");
            }
            Notification::DiffFailed { message } => {
                eprintln!("Failed to build the diff: {}", message);
            }
            Notification::RequestFailed { message } => {
                eprintln!("Commit message generation failed: {}", message);
            }
        }
    }
}
