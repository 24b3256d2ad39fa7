//! Top-level flows behind the command line
//!
//! [`App::run`] drives the default flow (resolve config, read the staged
//! diff, generate, decide) and [`App::set`] updates stored fields without
//! asking anything.

use crate::clipboard::ClipboardWriter;
use crate::config::{Config, ConfigStore};
use crate::decision::{Decision, DecisionLoop};
use crate::error::{Error, Result};
use crate::git::VersionControl;
use crate::interact::Prompter;
use crate::openai::CommitMessageBackend;
use crate::resolver::ConfigResolver;
use crate::session::GenerationSession;
use crate::validation::{validate_api_key, validate_model, validate_temperature};

/// Values given for a single run; validated but never persisted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl Overrides {
    /// Apply the overrides on top of `config`
    ///
    /// # Errors
    ///
    /// * `Error::Validation` - an override fails its validator
    pub fn apply(&self, mut config: Config) -> Result<Config> {
        if let Some(name) = &self.model {
            config.model = validate_model(name)?;
        }
        if let Some(temperature) = self.temperature {
            validate_temperature(temperature)?;
            config.temperature = temperature;
        }
        Ok(config)
    }
}

/// Fields given to `autocommit set`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

/// The collaborators a run works with
pub struct App<S, B, P, V, C> {
    pub store: S,
    pub backend: B,
    pub prompter: P,
    pub vcs: V,
    pub clipboard: C,
}

impl<S, B, P, V, C> App<S, B, P, V, C>
where
    S: ConfigStore,
    B: CommitMessageBackend,
    P: Prompter,
    V: VersionControl,
    C: ClipboardWriter,
{
    /// Generate a commit message for the staged changes and act on it
    ///
    /// # Arguments
    ///
    /// * `overrides` - Model and temperature for this run only, never stored
    ///
    /// # Returns
    ///
    /// * `Result<Decision>` - The decision that ended the run
    ///
    /// # Errors
    ///
    /// * Configuration could not be resolved
    /// * An override is invalid
    /// * Nothing is staged (`Error::NoStagedChanges`)
    /// * Generation or the chosen action failed
    pub async fn run(&mut self, overrides: &Overrides) -> Result<Decision> {
        let config =
            ConfigResolver::new(&mut self.store, &self.backend, &mut self.prompter)
                .resolve()
                .await?;
        let config = overrides.apply(config)?;

        let diff = self.vcs.staged_diff()?;
        if diff.trim().is_empty() {
            return Err(Error::NoStagedChanges);
        }

        let session = GenerationSession::new(&self.backend, &config, &diff);
        let message = session.generate(&mut self.prompter).await?;

        DecisionLoop::new(session, &mut self.vcs, &mut self.clipboard)
            .drive(message, &mut self.prompter)
            .await
    }

    /// Update stored fields
    ///
    /// Each given field is validated before it is written; the first
    /// invalid one stops the update, leaving fields written before it in
    /// place.
    ///
    /// # Errors
    ///
    /// * `Error::NotConfigured` - nothing stored yet
    /// * `Error::Validation` / `Error::RemoteAuth` - invalid field
    pub async fn set(&mut self, settings: &Settings) -> Result<()> {
        if !self.store.is_stored() {
            return Err(Error::NotConfigured);
        }

        if let Some(api_key) = &settings.api_key {
            validate_api_key(api_key)?;
            self.backend.verify_api_key(api_key).await?;
            self.store.set_api_key(api_key)?;
            tracing::info!("API key updated");
        }

        if let Some(name) = &settings.model {
            let model = validate_model(name)?;
            self.store.set_model(model)?;
            tracing::info!(%model, "model updated");
        }

        if let Some(temperature) = settings.temperature {
            validate_temperature(temperature)?;
            self.store.set_temperature(temperature)?;
            tracing::info!(temperature, "temperature updated");
        }

        Ok(())
    }
}
