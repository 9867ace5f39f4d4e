use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::{Error, Result};

/// Lifecycle status of a generated article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    Scheduled,
    Published,
    PublishedToTarget,
}

impl ArticleStatus {
    pub const ALL: [ArticleStatus; 4] = [
        ArticleStatus::Draft,
        ArticleStatus::Scheduled,
        ArticleStatus::Published,
        ArticleStatus::PublishedToTarget,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Scheduled => "scheduled",
            ArticleStatus::Published => "published",
            ArticleStatus::PublishedToTarget => "published_to_target",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ArticleStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::Validation(format!("Unknown article status: {}", s)))
    }
}

/// The editorial payload of an article: what the generation engine produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleBody {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub clean_text: String,
}

impl ArticleBody {
    /// A body is usable when both the title and the content carry text.
    pub fn is_usable(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }
}

/// Output of a content generator for one keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedContent {
    pub body: ArticleBody,
    pub primary_keyword: Option<String>,
}

impl GeneratedContent {
    /// Keywords to persist: the originating keyword first, then the primary
    /// keyword picked by the model when it is a different term.
    pub fn keywords_for(&self, keyword: &str) -> Vec<String> {
        let mut keywords = vec![keyword.to_string()];
        if let Some(primary) = self.primary_keyword.as_deref().map(str::trim) {
            if !primary.is_empty() && !keywords.iter().any(|k| k.eq_ignore_ascii_case(primary)) {
                keywords.push(primary.to_string());
            }
        }
        keywords
    }
}

/// One keyword/asset pair submitted for generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub keyword: String,
    #[serde(alias = "imageUrl")]
    pub asset_uri: String,
}

impl GenerationRequest {
    pub fn new(keyword: impl Into<String>, asset_uri: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            asset_uri: asset_uri.into(),
        }
    }

    /// Checks the pair and returns a trimmed copy of it.
    pub fn validated(&self) -> Result<Self> {
        let keyword = self.keyword.trim();
        if keyword.is_empty() {
            return Err(Error::Validation("All keywords are required".to_string()));
        }
        let asset_uri = self.asset_uri.trim();
        if asset_uri.is_empty() {
            return Err(Error::Validation(format!(
                "Image URL is required for keyword: {}",
                keyword
            )));
        }
        Url::parse(asset_uri).map_err(|e| {
            Error::InvalidUrl(format!("{} (keyword: {}): {}", asset_uri, keyword, e))
        })?;
        Ok(Self::new(keyword, asset_uri))
    }
}

/// A persisted article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub clean_text: Option<String>,
    pub keywords: Vec<String>,
    pub asset_uri: String,
    pub status: ArticleStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Builds the stored form of a new article.
    pub fn from_new(id: String, new: NewArticle, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            content: new.content,
            excerpt: new.excerpt,
            clean_text: new.clean_text,
            keywords: new.keywords,
            asset_uri: new.asset_uri,
            status: new.status,
            published_at: None,
            created_at,
        }
    }

    pub fn apply(&mut self, update: ArticleUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(excerpt) = update.excerpt {
            self.excerpt = excerpt;
        }
        if let Some(keywords) = update.keywords {
            self.keywords = keywords;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(published_at) = update.published_at {
            self.published_at = published_at;
        }
    }
}

/// Fields supplied when creating an article. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub clean_text: Option<String>,
    pub keywords: Vec<String>,
    pub asset_uri: String,
    pub status: ArticleStatus,
}

/// Whole-field replacement for an existing article. `None` leaves a field untouched;
/// `published_at: Some(None)` clears the timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub status: Option<ArticleStatus>,
    pub published_at: Option<Option<DateTime<Utc>>>,
}

impl ArticleUpdate {
    pub fn publish(status: ArticleStatus, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(status),
            published_at: Some(Some(at)),
            ..Default::default()
        }
    }
}

/// A manual edit coming from an operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleEdit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl ArticleEdit {
    pub fn into_update(self) -> Result<ArticleUpdate> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::Validation("Title cannot be empty".to_string()));
            }
        }
        Ok(ArticleUpdate {
            title: self.title.map(|t| t.trim().to_string()),
            content: self.content,
            excerpt: self.excerpt.map(|e| e.trim().to_string()),
            keywords: self.keywords,
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    PublishedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl ArticleSort {
    pub fn oldest_first() -> Self {
        Self { field: SortField::CreatedAt, order: SortOrder::Asc }
    }

    pub fn newest_first() -> Self {
        Self { field: SortField::CreatedAt, order: SortOrder::Desc }
    }

    pub fn latest_published() -> Self {
        Self { field: SortField::PublishedAt, order: SortOrder::Desc }
    }
}

impl Default for ArticleSort {
    fn default() -> Self {
        Self::newest_first()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub statuses: Option<Vec<ArticleStatus>>,
    pub limit: Option<usize>,
}

impl ArticleFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_statuses(statuses: &[ArticleStatus]) -> Self {
        Self {
            statuses: Some(statuses.to_vec()),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, article: &Article) -> bool {
        self.statuses
            .as_ref()
            .map_or(true, |statuses| statuses.contains(&article.status))
    }
}

pub const DEFAULT_PUBLISHING_FREQUENCY_MINUTES: u32 = 60;
pub const MAX_KEYWORDS: usize = 10;

/// Minimum spacing between two publications, consumed by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishingPolicy {
    pub minimum_interval_minutes: u32,
}

impl PublishingPolicy {
    pub fn new(minimum_interval_minutes: u32) -> Result<Self> {
        if minimum_interval_minutes < 1 {
            return Err(Error::Validation(
                "Publishing frequency must be at least 1 minute".to_string(),
            ));
        }
        Ok(Self { minimum_interval_minutes })
    }
}

impl Default for PublishingPolicy {
    fn default() -> Self {
        Self {
            minimum_interval_minutes: DEFAULT_PUBLISHING_FREQUENCY_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub publishing_frequency: u32,
    pub keywords: Vec<String>,
    pub target_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            publishing_frequency: DEFAULT_PUBLISHING_FREQUENCY_MINUTES,
            keywords: [
                "Artificial Intelligence",
                "Machine Learning",
                "Web Development",
                "Data Science",
                "Cloud Computing",
                "Cybersecurity",
                "Blockchain Technology",
                "Internet of Things",
                "Digital Marketing",
                "Mobile Applications",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            target_url: None,
        }
    }
}

impl Settings {
    pub fn policy(&self) -> Result<PublishingPolicy> {
        PublishingPolicy::new(self.publishing_frequency)
    }

    pub fn validate(&self) -> Result<()> {
        self.policy()?;
        if self.keywords.len() > MAX_KEYWORDS {
            return Err(Error::Validation(format!(
                "A maximum of {} keywords is allowed",
                MAX_KEYWORDS
            )));
        }
        if let Some(target) = &self.target_url {
            Url::parse(target).map_err(|e| Error::InvalidUrl(format!("{}: {}", target, e)))?;
        }
        Ok(())
    }
}

/// Partial settings update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub publishing_frequency: Option<u32>,
    pub keywords: Option<Vec<String>>,
    pub target_url: Option<String>,
}

/// Body sent to an external publish destination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPayload {
    #[serde(flatten)]
    pub article: Article,
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in ArticleStatus::ALL {
            assert_eq!(status.as_str().parse::<ArticleStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ArticleStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&ArticleStatus::PublishedToTarget).unwrap(),
            "\"published_to_target\""
        );
    }

    #[test]
    fn test_generation_request_validation() {
        let ok = GenerationRequest::new("  rust async ", " https://img.example.com/a.png ")
            .validated()
            .unwrap();
        assert_eq!(ok.keyword, "rust async");
        assert_eq!(ok.asset_uri, "https://img.example.com/a.png");

        assert!(matches!(
            GenerationRequest::new("   ", "https://img.example.com/a.png").validated(),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            GenerationRequest::new("rust", "").validated(),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            GenerationRequest::new("rust", "images/a.png").validated(),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_generation_request_accepts_image_url_alias() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"keyword":"rust","imageUrl":"https://a.io/x.png"}"#).unwrap();
        assert_eq!(request.asset_uri, "https://a.io/x.png");
    }

    #[test]
    fn test_keywords_for_deduplicates_primary() {
        let body = ArticleBody {
            title: "t".into(),
            excerpt: String::new(),
            content: "c".into(),
            clean_text: String::new(),
        };
        let same = GeneratedContent { body: body.clone(), primary_keyword: Some("Rust".into()) };
        assert_eq!(same.keywords_for("rust"), vec!["rust".to_string()]);

        let other = GeneratedContent { body, primary_keyword: Some("rust for beginners".into()) };
        assert_eq!(other.keywords_for("rust"), vec!["rust".to_string(), "rust for beginners".to_string()]);
    }

    #[test]
    fn test_settings_validation() {
        assert!(Settings::default().validate().is_ok());

        let mut settings = Settings::default();
        settings.publishing_frequency = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.keywords.push("one too many".into());
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.target_url = Some("not a url".into());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_edit_rejects_empty_title() {
        let edit = ArticleEdit { title: Some("  ".into()), ..Default::default() };
        assert!(edit.into_update().is_err());

        let edit = ArticleEdit { content: Some("<p>new</p>".into()), ..Default::default() };
        let update = edit.into_update().unwrap();
        assert_eq!(update.content.as_deref(), Some("<p>new</p>"));
        assert!(update.status.is_none());
        assert!(update.published_at.is_none());
    }
}
