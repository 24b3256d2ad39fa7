//! Field validation for the stored configuration
//!
//! These functions are pure and are shared by the interactive questions
//! and by `autocommit set`. Whether an API key is actually accepted by
//! OpenAI is checked separately by
//! [`crate::openai::CommitMessageBackend::verify_api_key`].

use crate::error::ValidationError;
use crate::models::Model;

/// Lowest accepted sampling temperature
pub const MIN_TEMPERATURE: f32 = 0.0;

/// Highest accepted sampling temperature (the range documented by OpenAI)
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Temperature offered as the default answer
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Validate an API key locally
///
/// # Errors
///
/// * `ValidationError::EmptyKey` - key is the empty string
///
/// # Example
///
/// ```
/// use autocommit::validation::validate_api_key;
///
/// assert!(validate_api_key("sk-test").is_ok());
/// assert!(validate_api_key("").is_err());
/// ```
pub fn validate_api_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey);
    }

    Ok(())
}

/// Validate a model name and return the matching [`Model`]
///
/// # Arguments
///
/// * `name` - API name of the model, e.g. `gpt-4`
///
/// # Returns
///
/// * `Result<Model, ValidationError>` - The model with that name
///
/// # Errors
///
/// * `ValidationError::UnknownModel` - name is not one of [`Model::ALL`]
///
/// # Example
///
/// ```
/// use autocommit::{models::Model, validation::validate_model};
///
/// assert_eq!(validate_model("gpt-4").unwrap(), Model::Gpt4);
/// assert!(validate_model("davinci").is_err());
/// ```
pub fn validate_model(name: &str) -> Result<Model, ValidationError> {
    name.parse().map_err(|()| ValidationError::UnknownModel {
        name: name.to_string(),
        allowed: Model::allowed_names(),
    })
}

/// Validate a temperature against `MIN_TEMPERATURE..=MAX_TEMPERATURE`
///
/// NaN is rejected.
///
/// # Example
///
/// ```
/// use autocommit::validation::validate_temperature;
///
/// assert!(validate_temperature(0.3).is_ok());
/// assert!(validate_temperature(2.5).is_err());
/// ```
pub fn validate_temperature(value: f32) -> Result<(), ValidationError> {
    if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&value) {
        return Err(ValidationError::OutOfRange {
            value,
            min: MIN_TEMPERATURE,
            max: MAX_TEMPERATURE,
        });
    }

    Ok(())
}

/// Parse a temperature typed by the user and validate it
pub fn parse_temperature(input: &str) -> Result<f32, ValidationError> {
    let value: f32 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber)?;
    validate_temperature(value)?;
    Ok(value)
}

/// Validate an API key typed by the user, returning it on success
pub fn parse_api_key(input: &str) -> Result<String, ValidationError> {
    validate_api_key(input)?;
    Ok(input.to_string())
}
