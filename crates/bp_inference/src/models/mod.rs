use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bp_core::{Error, Result, TextModel};

use crate::Config;

pub mod dummy;
pub mod gemini;
pub mod scripted;

pub use dummy::DummyModel;
pub use gemini::GeminiModel;
pub use scripted::ScriptedModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelProvider {
    #[default]
    Gemini,
    Dummy,
}

impl FromStr for ModelProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "dummy" => Ok(Self::Dummy),
            other => Err(Error::Validation(format!(
                "Unknown model '{}'. Available models: gemini (default), dummy",
                other
            ))),
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => f.write_str("gemini"),
            Self::Dummy => f.write_str("dummy"),
        }
    }
}

pub fn create_model(config: &Config) -> Result<Arc<dyn TextModel>> {
    match config.provider {
        ModelProvider::Gemini => Ok(Arc::new(GeminiModel::new(config)?)),
        ModelProvider::Dummy => Ok(Arc::new(DummyModel::new())),
    }
}
