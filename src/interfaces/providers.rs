use async_trait::async_trait;

use crate::error::Result;

/// Upstream chat-completion model. The recommendation service only needs
/// single-shot text generation; anything richer stays behind this seam.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate_text(&self, prompt: &str, system_prompt: &str) -> Result<String>;
}
