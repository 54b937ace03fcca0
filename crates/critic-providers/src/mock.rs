//! Mock backend for testing the feedback flow.
//!
//! Replies are scripted per prompt pattern, so the full validate, generate
//! and check path runs without network access.

use core::time::Duration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use critic_core::{Error, IgnoreLock as _, ModelBackend, OutputSchema, Result};
use serde_json::{Value, json};
use tokio::time::sleep;

use crate::chat::parse_structured;

/// Scripted behaviour for one invocation.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this structured output.
    Output(Value),
    /// Return no output at all.
    Empty,
    /// Return raw model text, parsed the way hosted backends parse it.
    Text(String),
    /// Fail as an unreachable backend would.
    Failure(String),
    /// Wait before answering with the inner reply.
    Delayed(Duration, Box<Self>),
}

impl MockReply {
    /// A reply that satisfies the standard contract.
    #[must_use]
    pub fn conformant() -> Self {
        Self::Output(sample_output())
    }
}

/// Reply storage type
type ReplyMap = Arc<Mutex<HashMap<String, MockReply>>>;

/// Mock backend that returns pre-defined replies based on prompt patterns.
#[derive(Clone)]
pub struct MockBackend {
    /// Replies keyed by a substring of the prompt
    replies: ReplyMap,
    /// Reply used when no pattern matches
    default_reply: Arc<Mutex<MockReply>>,
    /// Prompts received, in order
    call_history: Arc<Mutex<Vec<String>>>,
    /// Schema names received, in order
    schema_history: Arc<Mutex<Vec<&'static str>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a mock that answers every prompt with a conformant result.
    #[must_use]
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(HashMap::new())),
            default_reply: Arc::new(Mutex::new(MockReply::conformant())),
            call_history: Arc::new(Mutex::new(Vec::new())),
            schema_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a reply for prompts containing `pattern`.
    #[must_use]
    pub fn with_reply(self, pattern: impl Into<String>, reply: MockReply) -> Self {
        {
            let mut replies = self.replies.lock_ignore_poison();
            replies.insert(pattern.into(), reply);
        }
        self
    }

    /// Set the reply for prompts that don't match any pattern.
    #[must_use]
    pub fn with_default_reply(self, reply: MockReply) -> Self {
        {
            let mut default = self.default_reply.lock_ignore_poison();
            *default = reply;
        }
        self
    }

    /// Clear the call history.
    pub fn clear_history(&self) {
        self.call_history.lock_ignore_poison().clear();
        self.schema_history.lock_ignore_poison().clear();
    }

    /// Prompts received so far.
    #[must_use]
    pub fn get_call_history(&self) -> Vec<String> {
        self.call_history.lock_ignore_poison().clone()
    }

    /// Names of the schemas declared so far.
    #[must_use]
    pub fn get_schema_history(&self) -> Vec<&'static str> {
        self.schema_history.lock_ignore_poison().clone()
    }

    /// Number of invocations.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_history.lock_ignore_poison().len()
    }

    /// Find the reply for `prompt`, falling back to the default.
    fn find_reply(&self, prompt: &str) -> MockReply {
        let scripted = {
            let replies = self.replies.lock_ignore_poison();
            replies
                .iter()
                .find(|(pattern, _)| prompt.contains(pattern.as_str()))
                .map(|(_, reply)| reply.clone())
        };
        scripted.unwrap_or_else(|| self.default_reply.lock_ignore_poison().clone())
    }
}

/// Builds the backend result for a scripted reply.
async fn play(reply: MockReply) -> Result<Option<Value>> {
    let mut current = reply;
    loop {
        match current {
            MockReply::Output(value) => return Ok(Some(value)),
            MockReply::Empty => return Ok(None),
            MockReply::Text(text) => return parse_structured(&text),
            MockReply::Failure(message) => return Err(Error::Provider(message)),
            MockReply::Delayed(delay, inner) => {
                sleep(delay).await;
                current = *inner;
            }
        }
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn invoke(&self, prompt: &str, schema: &OutputSchema) -> Result<Option<Value>> {
        self.call_history.lock_ignore_poison().push(prompt.to_owned());
        self.schema_history.lock_ignore_poison().push(schema.name());

        play(self.find_reply(prompt)).await
    }
}

/// A well-formed standard result with mid-range scores.
#[must_use]
pub fn sample_output() -> Value {
    json!({
        "feedback": [
            "Clear variable names make the loop easy to follow.",
            "Consider returning early when the input list is empty."
        ],
        "readability": 4,
        "optimization": 3,
        "maintainability": 4,
        "logic": 4,
        "rating": 4
    })
}
