use std::fmt;
use std::time::Duration;

pub mod extract;
pub mod generator;
pub mod models;
pub mod prompts;

pub const DEFAULT_MODEL_NAME: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct Config {
    pub provider: models::ModelProvider,
    pub api_key: Option<String>,
    pub model_name: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: models::ModelProvider::default(),
            api_key: None,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: generator::DEFAULT_MODEL_TIMEOUT,
        }
    }
}

pub mod prelude {
    pub use super::extract::{extract_first_json, extract_json, text_field, text_list};
    pub use super::generator::{read_body, ArticleGenerator, DraftArticle, Generation, RefineOutcome, Stage};
    pub use super::models::{create_model, ModelProvider};
    pub use super::Config;
    pub use bp_core::{ArticleBody, Error, GeneratedContent, Result, TextModel};
}

pub use extract::extract_json;
pub use generator::ArticleGenerator;
pub use models::create_model;
