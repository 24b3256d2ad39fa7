//! autocommit - Commit message generator backed by OpenAI
//!
//! This library reads the staged git changes, asks an OpenAI chat model for
//! a commit message and lets the user commit it, copy it, regenerate it or
//! walk away.
//!
//! # Modules
//!
//! - [`config`] - Stored configuration (API key, model, temperature)
//! - [`validation`] - Field validators shared by prompts and `set`
//! - [`models`] - Supported models and escalation targets
//! - [`openai`] - OpenAI API client (key check, completion)
//! - [`prompt`] - Messages sent to the completion endpoint
//! - [`interact`] - Questions and the terminal prompter
//! - [`resolver`] - Completes the configuration interactively
//! - [`session`] - Generation with one-off model escalation
//! - [`decision`] - Commit / copy / regenerate / exit loop
//! - [`git`] - Git operations (diff, commit)
//! - [`clipboard`] - System clipboard access
//! - [`app`] - The default flow and `set`
//!
//! # Example
//!
//! ```no_run
//! use autocommit::app::{App, Overrides};
//! use autocommit::clipboard::SystemClipboard;
//! use autocommit::config::FileConfigStore;
//! use autocommit::git::GitRepository;
//! use autocommit::interact::TerminalPrompter;
//! use autocommit::openai::OpenAiClient;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let mut app = App {
//!     store: FileConfigStore::default_location()?,
//!     backend: OpenAiClient::new(),
//!     prompter: TerminalPrompter::new(),
//!     vcs: GitRepository::new(),
//!     clipboard: SystemClipboard,
//! };
//! let decision = app.run(&Overrides::default()).await?;
//! println!("Done: {:?}", decision);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod clipboard;
pub mod config;
pub mod decision;
pub mod error;
pub mod git;
pub mod interact;
pub mod models;
pub mod openai;
pub mod prompt;
pub mod resolver;
pub mod session;
pub mod validation;

#[cfg(test)]
mod testing;

pub use error::{Error, Result, ValidationError};
