//! Prompt construction for commit message generation
//!
//! The staged diff is sent as the user message, preceded by a fixed system
//! instruction describing the expected commit message format.

use serde::{Deserialize, Serialize};

/// Instruction sent as the system message of every completion request
pub const SYSTEM_PROMPT: &str = "\
You are an assistant that writes git commit messages.
Write a commit message for the staged changes in the diff provided by the user.
Follow the conventional commits format (feat:, fix:, docs:, refactor:, test:, chore:, ...).
The first line is a summary of at most 72 characters written in the imperative mood.
If the change needs more explanation, add a blank line followed by a short body.
Reply with the commit message only, without quotes or code fences.";

/// A chat message in the format expected by the chat completion API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Build the messages for a completion request
///
/// # Example
///
/// ```
/// use autocommit::prompt::{build_messages, SYSTEM_PROMPT};
///
/// let messages = build_messages("+added line");
/// assert_eq!(messages[0].content, SYSTEM_PROMPT);
/// assert_eq!(messages[1].content, "+added line");
/// ```
pub fn build_messages(diff: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(diff)]
}
