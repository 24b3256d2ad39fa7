//! Commit message generation with model escalation
//!
//! When the diff does not fit in the configured model's context, the user
//! is offered a one-off switch to a model with a larger context. The switch
//! applies to a single retry and is never written back to the config.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::interact::Prompter;
use crate::openai::{CommitMessageBackend, GenerationOutcome, GenerationRequest};

pub struct GenerationSession<'a, B> {
    backend: &'a B,
    config: &'a Config,
    diff: &'a str,
}

impl<'a, B: CommitMessageBackend> GenerationSession<'a, B> {
    /// Create a session generating messages for one diff
    ///
    /// # Arguments
    ///
    /// * `backend` - Backend the completion requests are sent to
    /// * `config` - Resolved configuration; its model is the first one tried
    /// * `diff` - Staged changes, reused unchanged for every request
    pub fn new(backend: &'a B, config: &'a Config, diff: &'a str) -> Self {
        Self {
            backend,
            config,
            diff,
        }
    }

    /// Generate a commit message for the session's diff
    ///
    /// At most two requests are sent: the original one and, after a context
    /// length failure the user agreed to escalate, one retry.
    ///
    /// # Arguments
    ///
    /// * `prompter` - Asks whether to switch to a larger model
    ///
    /// # Returns
    ///
    /// * `Result<String>` - Generated commit message, trimmed
    ///
    /// # Errors
    ///
    /// * `Error::ContextLengthExceeded` - no larger model, escalation
    ///   declined, or the retry also exceeded the context
    /// * Any other backend error, unchanged
    pub async fn generate<P: Prompter>(&self, prompter: &mut P) -> Result<String> {
        let request = GenerationRequest::new(self.config, self.diff);

        match self.backend.complete(&request).await {
            GenerationOutcome::Success(message) => Ok(message),
            GenerationOutcome::OtherError(err) => Err(err),
            GenerationOutcome::ContextLengthExceeded => self.escalate(&request, prompter).await,
        }
    }

    async fn escalate<P: Prompter>(
        &self,
        request: &GenerationRequest,
        prompter: &mut P,
    ) -> Result<String> {
        let exceeded = Error::ContextLengthExceeded {
            model: request.model,
        };

        let Some(target) = request.model.escalation_target() else {
            return Err(exceeded);
        };

        let accepted = prompter.confirm(
            &format!(
                "You reached the maximum number of tokens for {}. \
                 Do you want to temporarily switch to {}?",
                request.model, target
            ),
            true,
        )?;
        if !accepted {
            return Err(exceeded);
        }

        tracing::info!(from = %request.model, to = %target, "retrying with a larger model");
        match self.backend.complete(&request.with_model(target)).await {
            GenerationOutcome::Success(message) => Ok(message),
            GenerationOutcome::ContextLengthExceeded => {
                Err(Error::ContextLengthExceeded { model: target })
            }
            GenerationOutcome::OtherError(err) => Err(err),
        }
    }
}
