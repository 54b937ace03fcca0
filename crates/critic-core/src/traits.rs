use async_trait::async_trait;
use serde_json::Value;

use crate::{OutputSchema, Result};

/// A large-language-model service able to answer a prompt with structured output.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Returns the unique identifier for this backend.
    fn name(&self) -> &'static str;

    /// Sends the prompt together with the declared output schema.
    ///
    /// `Ok(None)` means the backend answered but produced no output. The
    /// returned value is not trusted; the caller checks it against `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`](crate::Error::InvalidResponse) when
    /// the reply is not structured output, and any other variant when the
    /// backend could not be reached or refused the request.
    async fn invoke(&self, prompt: &str, schema: &OutputSchema) -> Result<Option<Value>>;
}
