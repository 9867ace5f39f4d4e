use async_trait::async_trait;
use std::fmt;

use crate::types::GeneratedContent;
use crate::Result;

/// A generative text service.
#[async_trait]
pub trait TextModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Send a prompt and return the raw text the model answered with.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Turns a keyword into publishable article content.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, keyword: &str) -> Result<GeneratedContent>;
}
