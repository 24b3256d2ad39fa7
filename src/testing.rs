//! In-memory collaborators for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::clipboard::ClipboardWriter;
use crate::config::{ConfigStore, StoredConfig};
use crate::error::{Error, Result};
use crate::git::VersionControl;
use crate::interact::{ChoiceQuestion, Prompter, TextQuestion};
use crate::models::Model;
use crate::openai::{CommitMessageBackend, GenerationOutcome, GenerationRequest};

/// A scripted answer for [`ScriptedPrompter`]
#[derive(Debug, Clone, Copy)]
pub enum Answer {
    Text(&'static str),
    Choice(usize),
    Confirm(bool),
}

/// Prompter answering from a script; running out of answers aborts
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: usize,
    rejected: usize,
    shown: Vec<String>,
    errors: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: answers.into(),
            ..Self::default()
        }
    }

    /// Number of questions asked
    pub fn asked(&self) -> usize {
        self.asked
    }

    /// Number of text answers refused by a validator
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.clone()
    }

    fn next(&mut self) -> Result<Answer> {
        self.answers.pop_front().ok_or(Error::Aborted)
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_text<T>(&mut self, question: &TextQuestion<T>) -> Result<T> {
        self.asked += 1;
        loop {
            match self.next()? {
                Answer::Text(text) => match question.validate(text) {
                    Ok(value) => return Ok(value),
                    Err(err) => {
                        self.rejected += 1;
                        self.errors.push(err.to_string());
                    }
                },
                other => panic!("expected a text answer for '{}', got {other:?}", question.message),
            }
        }
    }

    fn choose(&mut self, question: &ChoiceQuestion) -> Result<usize> {
        self.asked += 1;
        match self.next()? {
            Answer::Choice(index) => Ok(index),
            other => panic!("expected a choice for '{}', got {other:?}", question.message),
        }
    }

    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool> {
        self.asked += 1;
        match self.next()? {
            Answer::Confirm(answer) => Ok(answer),
            other => panic!("expected a confirmation for '{message}', got {other:?}"),
        }
    }

    fn show_message(&mut self, message: &str) {
        self.shown.push(message.to_string());
    }

    fn show_error(&mut self, error: &dyn std::error::Error) {
        self.errors.push(error.to_string());
    }
}

/// Scripted completion outcome for [`FakeBackend`]
#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    Success(&'static str),
    ContextLengthExceeded,
    Failure(&'static str),
}

/// Backend replaying scripted outcomes and recording requests
#[derive(Debug, Default)]
pub struct FakeBackend {
    outcomes: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GenerationRequest>>,
    rejected_key: Option<(&'static str, &'static str)>,
    key_checks: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcomes(self, outcomes: Vec<Scripted>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            ..self
        }
    }

    /// Reject `key` during verification with `message`
    pub fn reject_key(self, key: &'static str, message: &'static str) -> Self {
        Self {
            rejected_key: Some((key, message)),
            ..self
        }
    }

    pub fn key_checks(&self) -> usize {
        self.key_checks.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommitMessageBackend for FakeBackend {
    async fn verify_api_key(&self, api_key: &str) -> Result<()> {
        self.key_checks.fetch_add(1, Ordering::SeqCst);
        match self.rejected_key {
            Some((key, message)) if key == api_key => Err(Error::RemoteAuth(message.to_string())),
            _ => Ok(()),
        }
    }

    async fn complete(&self, request: &GenerationRequest) -> GenerationOutcome {
        self.requests.lock().unwrap().push(request.clone());
        match self.outcomes.lock().unwrap().pop_front() {
            Some(Scripted::Success(message)) => GenerationOutcome::Success(message.to_string()),
            Some(Scripted::ContextLengthExceeded) => GenerationOutcome::ContextLengthExceeded,
            Some(Scripted::Failure(message)) => {
                GenerationOutcome::OtherError(Error::Generation(message.to_string()))
            }
            None => GenerationOutcome::OtherError(Error::Generation(
                "no scripted outcome left".to_string(),
            )),
        }
    }
}

/// Config store kept in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    stored: Option<StoredConfig>,
    writes: usize,
}

impl MemoryStore {
    pub fn with(stored: StoredConfig) -> Self {
        Self {
            stored: Some(stored),
            writes: 0,
        }
    }

    pub fn stored(&self) -> StoredConfig {
        self.stored.clone().unwrap_or_default()
    }

    /// Number of setter calls
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn update(&mut self, apply: impl FnOnce(&mut StoredConfig)) -> anyhow::Result<()> {
        apply(self.stored.get_or_insert_with(StoredConfig::default));
        self.writes += 1;
        Ok(())
    }
}

impl ConfigStore for MemoryStore {
    fn is_stored(&self) -> bool {
        self.stored.is_some()
    }

    fn load(&self) -> anyhow::Result<StoredConfig> {
        Ok(self.stored())
    }

    fn set_api_key(&mut self, api_key: &str) -> anyhow::Result<()> {
        self.update(|stored| stored.api_key = Some(api_key.to_string()))
    }

    fn set_model(&mut self, model: Model) -> anyhow::Result<()> {
        self.update(|stored| stored.model = Some(model.as_str().to_string()))
    }

    fn set_temperature(&mut self, temperature: f32) -> anyhow::Result<()> {
        self.update(|stored| stored.temperature = Some(temperature))
    }
}

/// Repository recording commits instead of making them
#[derive(Debug, Default)]
pub struct RecordingRepository {
    pub diff: String,
    pub commits: Vec<String>,
    fail_commit: bool,
}

impl RecordingRepository {
    pub fn new(diff: &str) -> Self {
        Self {
            diff: diff.to_string(),
            ..Self::default()
        }
    }

    pub fn failing_commit(self) -> Self {
        Self {
            fail_commit: true,
            ..self
        }
    }
}

impl VersionControl for RecordingRepository {
    fn staged_diff(&self) -> anyhow::Result<String> {
        Ok(self.diff.clone())
    }

    fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        if self.fail_commit {
            anyhow::bail!("pre-commit hook failed");
        }
        self.commits.push(message.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingClipboard {
    pub copied: Vec<String>,
    fail: bool,
}

impl RecordingClipboard {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl ClipboardWriter for RecordingClipboard {
    fn copy(&mut self, text: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("no clipboard available");
        }
        self.copied.push(text.to_string());
        Ok(())
    }
}
