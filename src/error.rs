//! Error types shared by the generation flow
//!
//! Validation failures are kept in their own type so that interactive
//! prompts can show them and ask again, while everything else is wrapped
//! in [`Error`].

use thiserror::Error;

use crate::models::Model;

/// A field failed one of the local validators
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("API key cannot be empty")]
    EmptyKey,

    #[error("unknown model '{name}' - allowed models: {allowed}")]
    UnknownModel { name: String, allowed: String },

    #[error("invalid temperature - must be a number")]
    NotANumber,

    #[error("temperature {value} is out of range - must be between {min} and {max}")]
    OutOfRange { value: f32, min: f32, max: f32 },
}

/// Errors surfaced by the configuration, generation and decision steps
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The API rejected the key; the message is the one sent by the API
    #[error("{0}")]
    RemoteAuth(String),

    #[error("request to the OpenAI API failed")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response from the OpenAI API (status {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("the staged changes exceed the maximum context length of {model}")]
    ContextLengthExceeded { model: Model },

    #[error("failed to generate commit message: {0}")]
    Generation(String),

    #[error("failed to {action}: {detail}")]
    SideEffect { action: &'static str, detail: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),

    #[error("no staged changes found - stage your changes with `git add` first")]
    NoStagedChanges,

    #[error("config file not found - run `autocommit` to set it up")]
    NotConfigured,

    #[error("interactive prompt failed")]
    Interaction(#[from] dialoguer::Error),

    /// A choice question was answered with an index outside its items
    #[error("choice {index} is not one of the {options} offered options")]
    InvalidChoice { index: usize, options: usize },

    #[error("aborted by user")]
    Aborted,
}

impl Error {
    pub(crate) fn side_effect(action: &'static str, err: anyhow::Error) -> Self {
        Error::SideEffect {
            action,
            detail: format!("{err:#}"),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
