//! Configuration resolution
//!
//! Produces a complete [`Config`], asking only for the fields that are
//! missing or invalid in the store. Each answer is persisted as soon as it
//! is accepted.

use crate::config::{Config, ConfigStore};
use crate::error::{Error, Result};
use crate::interact::{ChoiceQuestion, Prompter, TextQuestion};
use crate::models::{DEFAULT_MODEL, Model};
use crate::openai::CommitMessageBackend;
use crate::validation::{DEFAULT_TEMPERATURE, parse_api_key, parse_temperature};

pub struct ConfigResolver<'a, S, B, P> {
    store: &'a mut S,
    backend: &'a B,
    prompter: &'a mut P,
}

impl<'a, S, B, P> ConfigResolver<'a, S, B, P>
where
    S: ConfigStore,
    B: CommitMessageBackend,
    P: Prompter,
{
    /// # Arguments
    ///
    /// * `store` - Where accepted answers are written
    /// * `backend` - Used to check a newly entered API key
    /// * `prompter` - Asks for the missing fields
    pub fn new(store: &'a mut S, backend: &'a B, prompter: &'a mut P) -> Self {
        Self {
            store,
            backend,
            prompter,
        }
    }

    /// Return the stored configuration, completing it interactively if needed
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Configuration with every field validated
    ///
    /// # Errors
    ///
    /// * The config store cannot be read or written
    /// * The user aborts a question
    /// * The model answer is not one of the offered models
    pub async fn resolve(&mut self) -> Result<Config> {
        let stored = self.store.load()?;
        if let Some(config) = stored.to_config() {
            tracing::debug!(model = %config.model, "using stored configuration");
            return Ok(config);
        }

        let api_key = match stored.valid_api_key() {
            Some(key) => key.to_string(),
            None => self.ask_api_key().await?,
        };

        let model = match stored.valid_model() {
            Some(model) => model,
            None => self.ask_model()?,
        };

        let temperature = match stored.valid_temperature() {
            Some(temperature) => temperature,
            None => self.ask_temperature()?,
        };

        Ok(Config {
            api_key,
            model,
            temperature,
        })
    }

    async fn ask_api_key(&mut self) -> Result<String> {
        let question = TextQuestion::new("OpenAI API Key", parse_api_key)
            .help("The OpenAI API Key is used to authenticate your requests to the OpenAI API.")
            .masked();

        loop {
            let api_key = self.prompter.ask_text(&question)?;
            match self.backend.verify_api_key(&api_key).await {
                Ok(()) => {
                    self.store.set_api_key(&api_key)?;
                    tracing::info!("API key saved");
                    return Ok(api_key);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "API key rejected");
                    self.prompter.show_error(&err);
                }
            }
        }
    }

    fn ask_model(&mut self) -> Result<Model> {
        let items = Model::ALL
            .iter()
            .map(|model| match model.note() {
                Some(note) => format!("{model} ({note})"),
                None => model.to_string(),
            })
            .collect();
        let default = Model::ALL
            .iter()
            .position(|model| *model == DEFAULT_MODEL)
            .unwrap_or_default();
        let question = ChoiceQuestion::new("Model name", items).default(default);

        let index = self.prompter.choose(&question)?;
        let model = Model::ALL
            .get(index)
            .copied()
            .ok_or(Error::InvalidChoice {
                index,
                options: Model::ALL.len(),
            })?;

        self.store.set_model(model)?;
        tracing::info!(%model, "model saved");
        Ok(model)
    }

    fn ask_temperature(&mut self) -> Result<f32> {
        let question = TextQuestion::new("Temperature", parse_temperature)
            .help(
                "Temperature controls the randomness of the generated message \
                 (0.0 to 2.0, lower is more deterministic).",
            )
            .default(DEFAULT_TEMPERATURE.to_string());

        let temperature = self.prompter.ask_text(&question)?;
        self.store.set_temperature(temperature)?;
        tracing::info!(temperature, "temperature saved");
        Ok(temperature)
    }
}
