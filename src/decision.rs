//! What to do with a generated commit message
//!
//! The loop shows the message and offers four actions. Regenerating asks
//! the backend again with the same configuration and diff and shows the
//! new message; every other action ends the loop.

use crate::clipboard::ClipboardWriter;
use crate::error::{Error, Result};
use crate::git::VersionControl;
use crate::interact::{ChoiceQuestion, Prompter};
use crate::openai::CommitMessageBackend;
use crate::session::GenerationSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Commit,
    CopyToClipboard,
    Regenerate,
    Exit,
}

impl Decision {
    /// Options in the order they are offered
    pub const ALL: [Decision; 4] = [
        Decision::Commit,
        Decision::CopyToClipboard,
        Decision::Regenerate,
        Decision::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Decision::Commit => "Commit changes",
            Decision::CopyToClipboard => "Copy to clipboard",
            Decision::Regenerate => "Regenerate",
            Decision::Exit => "Exit",
        }
    }
}

enum State {
    Presenting(String),
    Done(Decision),
}

pub struct DecisionLoop<'a, B, V, C> {
    session: GenerationSession<'a, B>,
    vcs: &'a mut V,
    clipboard: &'a mut C,
}

impl<'a, B, V, C> DecisionLoop<'a, B, V, C>
where
    B: CommitMessageBackend,
    V: VersionControl,
    C: ClipboardWriter,
{
    pub fn new(session: GenerationSession<'a, B>, vcs: &'a mut V, clipboard: &'a mut C) -> Self {
        Self {
            session,
            vcs,
            clipboard,
        }
    }

    /// Present `message` until the user commits, copies or exits
    ///
    /// Returns the decision that ended the loop.
    ///
    /// # Errors
    ///
    /// * The commit or clipboard write failed (`Error::SideEffect`)
    /// * A regeneration failed
    /// * The answer is not one of the offered decisions
    /// * The user aborted the question
    pub async fn drive<P: Prompter>(
        &mut self,
        message: String,
        prompter: &mut P,
    ) -> Result<Decision> {
        let mut state = State::Presenting(message);

        loop {
            state = match state {
                State::Presenting(message) => self.present(message, prompter).await?,
                State::Done(decision) => return Ok(decision),
            };
        }
    }

    async fn present<P: Prompter>(&mut self, message: String, prompter: &mut P) -> Result<State> {
        prompter.show_message(&message);

        let items = Decision::ALL
            .iter()
            .map(|decision| decision.label().to_string())
            .collect();
        let index = prompter.choose(&ChoiceQuestion::new("What do you want to do?", items))?;
        let decision = Decision::ALL
            .get(index)
            .copied()
            .ok_or(Error::InvalidChoice {
                index,
                options: Decision::ALL.len(),
            })?;
        tracing::debug!(?decision, "decision made");

        match decision {
            Decision::Commit => {
                self.vcs
                    .commit(&message)
                    .map_err(|err| Error::side_effect("commit changes", err))?;
                Ok(State::Done(decision))
            }
            Decision::CopyToClipboard => {
                self.clipboard
                    .copy(&message)
                    .map_err(|err| Error::side_effect("copy to clipboard", err))?;
                Ok(State::Done(decision))
            }
            Decision::Regenerate => {
                let message = self.session.generate(prompter).await?;
                Ok(State::Presenting(message))
            }
            Decision::Exit => Ok(State::Done(decision)),
        }
    }
}
