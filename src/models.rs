//! Supported OpenAI models
//!
//! The set is closed: anything outside [`Model::ALL`] is rejected by
//! [`crate::validation::validate_model`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Model offered as the default answer when asking for a model
pub const DEFAULT_MODEL: Model = Model::Gpt35Turbo16k;

/// Chat completion models accepted by autocommit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-3.5-turbo-16k")]
    Gpt35Turbo16k,
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "gpt-4-32k")]
    Gpt432k,
}

impl Model {
    /// Every allowed model, in the order they are offered to the user
    pub const ALL: [Model; 4] = [
        Model::Gpt35Turbo,
        Model::Gpt35Turbo16k,
        Model::Gpt4,
        Model::Gpt432k,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Model::Gpt35Turbo => "gpt-3.5-turbo",
            Model::Gpt35Turbo16k => "gpt-3.5-turbo-16k",
            Model::Gpt4 => "gpt-4",
            Model::Gpt432k => "gpt-4-32k",
        }
    }

    /// Context window in tokens
    pub fn context_window(self) -> u32 {
        match self {
            Model::Gpt35Turbo => 4_096,
            Model::Gpt35Turbo16k => 16_384,
            Model::Gpt4 => 8_192,
            Model::Gpt432k => 32_768,
        }
    }

    pub fn is_long_context(self) -> bool {
        matches!(self, Model::Gpt35Turbo16k | Model::Gpt432k)
    }

    /// Model to switch to after a context length failure
    ///
    /// Short-context models move to the long-context variant of the same
    /// family; `gpt-3.5-turbo-16k` moves to `gpt-4-32k`. Returns `None` for
    /// the largest model.
    ///
    /// # Example
    ///
    /// ```
    /// use autocommit::models::Model;
    ///
    /// assert_eq!(Model::Gpt4.escalation_target(), Some(Model::Gpt432k));
    /// assert_eq!(Model::Gpt432k.escalation_target(), None);
    /// ```
    pub fn escalation_target(self) -> Option<Model> {
        match self {
            Model::Gpt35Turbo => Some(Model::Gpt35Turbo16k),
            Model::Gpt35Turbo16k | Model::Gpt4 => Some(Model::Gpt432k),
            Model::Gpt432k => None,
        }
    }

    /// Short note displayed next to the model when asking for one
    pub fn note(self) -> Option<&'static str> {
        match self {
            Model::Gpt4 | Model::Gpt432k => Some("may not be available for all accounts"),
            _ => None,
        }
    }

    /// Comma separated list of allowed model names, used in error messages
    pub fn allowed_names() -> String {
        Model::ALL
            .iter()
            .map(|model| model.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or(())
    }
}
