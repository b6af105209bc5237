//! Token-budget enforcement against the backend's input limit.

use tiktoken_rs::{CoreBPE, cl100k_base};

use crate::error::BudgetError;

/// Default ceiling on prompt size, in tokens.
pub const DEFAULT_MAX_PROMPT_TOKENS: usize = 4000;

/// Outcome of checking a prompt against the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetCheck {
    Within { tokens: usize },
    Exceeded { tokens: usize, max_tokens: usize },
}

/// Deterministic token counter with a fixed ceiling.
///
/// Loads the cl100k_base encoding table once at construction; construction
/// is expensive, so callers build one budget per process and share it
/// (`CoreBPE` is safe for concurrent read-only use).
pub struct TokenBudget {
    max_tokens: usize,
    encoder: CoreBPE,
}

impl TokenBudget {
    pub fn new(max_tokens: usize) -> Result<Self, BudgetError> {
        let encoder = cl100k_base().map_err(BudgetError::EncodingLoad)?;
        Ok(Self {
            max_tokens,
            encoder,
        })
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Count tokens in `text` with ordinary encoding; special-token strings
    /// inside a diff are treated as plain text.
    pub fn count(&self, text: &str) -> usize {
        self.encoder.encode_ordinary(text).len()
    }

    /// Check `text` against the ceiling. Pure; no side effects.
    pub fn check(&self, text: &str) -> BudgetCheck {
        let tokens = self.count(text);
        if tokens > self.max_tokens {
            BudgetCheck::Exceeded {
                tokens,
                max_tokens: self.max_tokens,
            }
        } else {
            BudgetCheck::Within { tokens }
        }
    }
}
