//! Prompt construction from the configured instruction template.

/// Placeholder the diff text is substituted for.
pub const DIFF_PLACEHOLDER: &str = "{diff}";

/// Default instruction preface for the completion backend.
pub const DEFAULT_TEMPLATE: &str = "Write an insightful but concise Git commit \
message in a complete sentence in present tense for the following diff without \
prefacing it with anything:\n{diff}";

/// Instruction template with a `{diff}` placeholder.
///
/// Templates come from settings; a template without the placeholder gets the
/// diff appended on its own line so the diff is never silently dropped.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Render the full prompt for an aggregated diff.
    pub fn render(&self, diff: &str) -> String {
        if self.template.contains(DIFF_PLACEHOLDER) {
            self.template.replace(DIFF_PLACEHOLDER, diff)
        } else {
            format!("{}\n{}", self.template, diff)
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}
