//! Interactive questions
//!
//! Questions are plain values built with [`TextQuestion`] and
//! [`ChoiceQuestion`]; each text question carries the validator used to
//! accept an answer. [`Prompter`] asks them, and [`TerminalPrompter`] is the
//! implementation backed by `dialoguer`.

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};

use crate::error::{Result, ValidationError};

/// Turns raw text into an accepted answer, or explains why it is rejected
pub type Validator<T> = fn(&str) -> std::result::Result<T, ValidationError>;

/// A free-text question whose answer must pass `validator`
#[derive(Clone)]
pub struct TextQuestion<T> {
    pub message: String,
    pub help: Option<String>,
    pub default: Option<String>,
    pub masked: bool,
    pub validator: Validator<T>,
}

impl<T> TextQuestion<T> {
    pub fn new(message: impl Into<String>, validator: Validator<T>) -> Self {
        Self {
            message: message.into(),
            help: None,
            default: None,
            masked: false,
            validator,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Hide the answer while it is typed
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn validate(&self, input: &str) -> std::result::Result<T, ValidationError> {
        (self.validator)(input)
    }
}

/// A single-choice question; the answer is an index into `items`
#[derive(Debug, Clone)]
pub struct ChoiceQuestion {
    pub message: String,
    pub items: Vec<String>,
    pub default: usize,
}

impl ChoiceQuestion {
    pub fn new(message: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            message: message.into(),
            items,
            default: 0,
        }
    }

    pub fn default(mut self, default: usize) -> Self {
        self.default = default;
        self
    }
}

/// Asks the user questions and shows status lines
///
/// Text answers are only returned once they pass the question's validator;
/// an implementation re-asks on rejection.
pub trait Prompter {
    fn ask_text<T>(&mut self, question: &TextQuestion<T>) -> Result<T>;

    /// Returns the index of the chosen item
    fn choose(&mut self, question: &ChoiceQuestion) -> Result<usize>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Display the generated commit message
    fn show_message(&mut self, message: &str);

    /// Display a recoverable error before asking again
    fn show_error(&mut self, error: &dyn std::error::Error);
}

/// Prompter rendering questions on the terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn ask_text<T>(&mut self, question: &TextQuestion<T>) -> Result<T> {
        if let Some(help) = &question.help {
            println!("{}", style(help).dim());
        }

        loop {
            let answer = if question.masked {
                Password::with_theme(&self.theme)
                    .with_prompt(&question.message)
                    .allow_empty_password(true)
                    .interact()?
            } else {
                let mut input = Input::<String>::with_theme(&self.theme)
                    .with_prompt(&question.message)
                    .allow_empty(true);
                if let Some(default) = &question.default {
                    input = input.default(default.clone());
                }
                input.interact_text()?
            };

            match question.validate(&answer) {
                Ok(value) => return Ok(value),
                Err(err) => self.show_error(&err),
            }
        }
    }

    fn choose(&mut self, question: &ChoiceQuestion) -> Result<usize> {
        let index = Select::with_theme(&self.theme)
            .with_prompt(&question.message)
            .items(&question.items)
            .default(question.default)
            .interact()?;
        Ok(index)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }

    fn show_message(&mut self, message: &str) {
        println!("{}", style("📝 Commit message generated:").green().bold());
        println!("{message}\n");
    }

    fn show_error(&mut self, error: &dyn std::error::Error) {
        eprintln!("{} {}", style("✗").red().bold(), style(error).red());

        let mut source = error.source();
        while let Some(cause) = source {
            eprintln!("  {}", style(format!("caused by: {cause}")).dim());
            source = cause.source();
        }
    }
}
