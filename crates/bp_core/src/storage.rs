use async_trait::async_trait;

use crate::types::{Article, ArticleFilter, ArticleSort, ArticleUpdate, NewArticle, Settings};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Articles matching `filter`, ordered by `sort`. Articles with no
    /// `published_at` sort after every dated one when sorting on it.
    async fn find(&self, filter: &ArticleFilter, sort: ArticleSort) -> Result<Vec<Article>>;

    async fn get(&self, id: &str) -> Result<Option<Article>>;

    /// Store a new article, assigning its id and creation time.
    async fn create(&self, article: NewArticle) -> Result<Article>;

    /// Returns `None` when no article has that id.
    async fn update_by_id(&self, id: &str, update: ArticleUpdate) -> Result<Option<Article>>;

    /// Returns `false` when no article has that id.
    async fn delete_by_id(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait SettingsStorage: Send + Sync {
    /// The stored settings, if any were ever saved.
    async fn load_settings(&self) -> Result<Option<Settings>>;

    async fn save_settings(&self, settings: &Settings) -> Result<()>;
}
