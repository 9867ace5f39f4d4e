//! Two-stage article generation with a fallback ladder.
//!
//! 1. Draft: keyword research plus a full article. An answer that cannot be
//!    parsed is replaced by a placeholder draft built from the keyword.
//! 2. Refine: a copy-edit of the draft. Any failure keeps the draft as is.
//! 3. Hard fallback: when the draft call itself fails (no credential,
//!    transport error, timeout) a fixed article is built from the keyword.
//!
//! [`ArticleGenerator::generate`] therefore always returns a usable article.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use bp_core::{ArticleBody, ContentGenerator, Error, GeneratedContent, Result, TextModel};

use crate::extract::{extract_json, text_field, text_list};
use crate::prompts;

pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(60);

/// Fields the draft prompt asks the model to fill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftArticle {
    pub primary_keyword: String,
    pub trending_keywords: Vec<String>,
    pub long_tail_keywords: Vec<String>,
    pub question_keywords: Vec<String>,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub clean_text: String,
}

impl DraftArticle {
    pub fn placeholder(keyword: &str) -> Self {
        Self {
            title: format!("{} – Draft Guide", keyword),
            excerpt: format!("Draft excerpt about {}.", keyword),
            content: format!(
                "<h1>{} – Draft Guide</h1><p>Draft content for {}.</p>",
                keyword, keyword
            ),
            clean_text: format!("Draft clean text for {}.", keyword),
            ..Default::default()
        }
    }

    /// Reads a draft from the model's JSON object, field by field.
    pub fn from_value(value: &Value) -> Self {
        Self {
            primary_keyword: text_field(value, "primaryKeyword"),
            trending_keywords: text_list(value, "trendingKeywords"),
            long_tail_keywords: text_list(value, "longTailKeywords"),
            question_keywords: text_list(value, "questionKeywords"),
            title: text_field(value, "title"),
            excerpt: text_field(value, "excerpt"),
            content: text_field(value, "content"),
            clean_text: text_field(value, "cleanText"),
        }
    }

    pub fn hard_fallback(keyword: &str) -> Self {
        Self {
            title: format!("{} – Complete Guide", keyword),
            excerpt: format!("Short overview of {}.", keyword),
            content: format!(
                "<h1>{} – Complete Guide</h1><p>This fallback explains {} and why it's important.</p>",
                keyword, keyword
            ),
            clean_text: format!("{} is an important topic. This is fallback clean text.", keyword),
            ..Default::default()
        }
    }

    pub fn body(&self) -> ArticleBody {
        ArticleBody {
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone(),
            clean_text: self.clean_text.clone(),
        }
    }
}

/// Reads the four article fields of a refine answer.
pub fn read_body(value: &Value) -> ArticleBody {
    ArticleBody {
        title: text_field(value, "title"),
        excerpt: text_field(value, "excerpt"),
        content: text_field(value, "content"),
        clean_text: text_field(value, "cleanText"),
    }
}

/// Where a stage's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage<T> {
    /// Parsed from the model's answer.
    Parsed(T),
    /// The model answered but the answer was unusable.
    Placeholder(T),
    /// The model could not be reached at all.
    HardFallback(T),
}

impl<T> Stage<T> {
    pub fn value(&self) -> &T {
        match self {
            Stage::Parsed(v) | Stage::Placeholder(v) | Stage::HardFallback(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Stage::Parsed(v) | Stage::Placeholder(v) | Stage::HardFallback(v) => v,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Stage::Parsed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Parsed(_) => "parsed",
            Stage::Placeholder(_) => "placeholder",
            Stage::HardFallback(_) => "hard_fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineOutcome {
    Refined(ArticleBody),
    /// The refine call failed or returned nothing usable; the draft stands.
    KeptDraft { reason: String },
    /// No refine call was made.
    Skipped,
}

/// Full trace of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub keyword: String,
    pub draft: Stage<DraftArticle>,
    pub refine: RefineOutcome,
}

impl Generation {
    fn hard_fallback(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            draft: Stage::HardFallback(DraftArticle::hard_fallback(keyword)),
            refine: RefineOutcome::Skipped,
        }
    }

    /// The article to publish.
    pub fn article(&self) -> ArticleBody {
        match &self.refine {
            RefineOutcome::Refined(body) => body.clone(),
            RefineOutcome::KeptDraft { .. } | RefineOutcome::Skipped => self.draft.value().body(),
        }
    }

    pub fn into_content(self) -> GeneratedContent {
        let body = self.article();
        let primary_keyword = match self.draft {
            Stage::Parsed(draft) if !draft.primary_keyword.trim().is_empty() => {
                Some(draft.primary_keyword)
            }
            _ => None,
        };
        GeneratedContent { body, primary_keyword }
    }
}

pub struct ArticleGenerator {
    model: Arc<dyn TextModel>,
    timeout: Duration,
}

impl std::fmt::Debug for ArticleGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleGenerator")
            .field("model", &self.model.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ArticleGenerator {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self {
            model,
            timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[tracing::instrument(skip(self), fields(model = self.model.name()))]
    pub async fn generate(&self, keyword: &str) -> Generation {
        let draft = match self.draft(keyword).await {
            Ok(draft) => draft,
            Err(e) => {
                warn!("⚠️ Draft call failed, using hard fallback article: {}", e);
                return Generation::hard_fallback(keyword);
            }
        };
        let refine = self.refine(draft.value()).await;
        let generation = Generation {
            keyword: keyword.to_string(),
            draft,
            refine,
        };
        info!(
            draft = generation.draft.label(),
            refined = matches!(generation.refine, RefineOutcome::Refined(_)),
            "✨ Article generated"
        );
        generation
    }

    async fn draft(&self, keyword: &str) -> Result<Stage<DraftArticle>> {
        let answer = self.call(&prompts::draft_prompt(keyword)).await?;
        let draft = extract_json(&answer).map(|value| DraftArticle::from_value(&value));
        match draft.filter(|draft| draft.body().is_usable()) {
            Some(draft) => Ok(Stage::Parsed(draft)),
            None => {
                warn!("Draft JSON parse failed, using placeholder draft");
                Ok(Stage::Placeholder(DraftArticle::placeholder(keyword)))
            }
        }
    }

    async fn refine(&self, draft: &DraftArticle) -> RefineOutcome {
        let prompt = match prompts::refine_prompt(draft) {
            Ok(prompt) => prompt,
            Err(e) => return kept_draft(format!("could not embed draft: {}", e)),
        };
        match self.call(&prompt).await {
            Ok(answer) => {
                let body = extract_json(&answer).map(|value| read_body(&value));
                match body.filter(ArticleBody::is_usable) {
                    Some(body) => RefineOutcome::Refined(body),
                    None => kept_draft("refine JSON parse failed".to_string()),
                }
            }
            Err(e) => kept_draft(format!("refine call failed: {}", e)),
        }
    }

    async fn call(&self, prompt: &str) -> Result<String> {
        tokio::time::timeout(self.timeout, self.model.complete(prompt))
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
    }
}

fn kept_draft(reason: String) -> RefineOutcome {
    warn!("Keeping draft as final article: {}", reason);
    RefineOutcome::KeptDraft { reason }
}

#[async_trait]
impl ContentGenerator for ArticleGenerator {
    async fn generate(&self, keyword: &str) -> Result<GeneratedContent> {
        Ok(ArticleGenerator::generate(self, keyword).await.into_content())
    }
}
