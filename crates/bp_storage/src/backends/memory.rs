use async_trait::async_trait;
use bp_core::{
    Article, ArticleFilter, ArticleSort, ArticleStorage, ArticleUpdate, Clock, NewArticle, Result,
    Settings, SettingsStorage, SortField, SortOrder, SystemClock,
};
use std::cmp::Ordering;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::StorageBackend;

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    settings: Option<Settings>,
}

impl MemoryStore {
    pub fn find(&self, filter: &ArticleFilter, sort: ArticleSort) -> Vec<Article> {
        let mut articles: Vec<Article> = self
            .articles
            .iter()
            .filter(|article| filter.matches(article))
            .cloned()
            .collect();
        // Stable sort keeps insertion order among equal timestamps.
        articles.sort_by(|a, b| compare(a, b, sort));
        if let Some(limit) = filter.limit {
            articles.truncate(limit);
        }
        articles
    }

    pub fn update(&mut self, id: &str, update: ArticleUpdate) -> Option<Article> {
        let article = self.articles.iter_mut().find(|a| a.id == id)?;
        article.apply(update);
        Some(article.clone())
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.articles.len();
        self.articles.retain(|a| a.id != id);
        self.articles.len() != before
    }
}

fn compare(a: &Article, b: &Article, sort: ArticleSort) -> Ordering {
    let directed = |ordering: Ordering| match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };
    match sort.field {
        SortField::CreatedAt => directed(a.created_at.cmp(&b.created_at)),
        SortField::PublishedAt => match (a.published_at, b.published_at) {
            (Some(x), Some(y)) => directed(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creation times are taken from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::default())),
            clock,
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn connect(_url: Option<&str>) -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn find(&self, filter: &ArticleFilter, sort: ArticleSort) -> Result<Vec<Article>> {
        Ok(self.store.read().await.find(filter, sort))
    }

    async fn get(&self, id: &str) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        let article = Article::from_new(Uuid::new_v4().to_string(), article, self.clock.now());
        self.store.write().await.articles.push(article.clone());
        Ok(article)
    }

    async fn update_by_id(&self, id: &str, update: ArticleUpdate) -> Result<Option<Article>> {
        Ok(self.store.write().await.update(id, update))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        Ok(self.store.write().await.delete(id))
    }
}

#[async_trait]
impl SettingsStorage for MemoryStorage {
    async fn load_settings(&self) -> Result<Option<Settings>> {
        Ok(self.store.read().await.settings.clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.store.write().await.settings = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::{ArticleStatus, ManualClock};
    use chrono::{Duration, Utc};

    fn new_article(title: &str, status: ArticleStatus) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            content: format!("<p>{}</p>", title),
            excerpt: String::new(),
            clean_text: None,
            keywords: vec![title.to_lowercase()],
            asset_uri: "https://img.example.com/a.png".to_string(),
            status,
        }
    }

    #[tokio::test]
    async fn test_memory_storage_crud() {
        let storage = MemoryStorage::new();
        let created = storage.create(new_article("Alpha", ArticleStatus::Scheduled)).await.unwrap();
        assert!(!created.id.is_empty());
        assert!(created.published_at.is_none());

        let fetched = storage.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let updated = storage
            .update_by_id(&created.id, ArticleUpdate { title: Some("Beta".into()), ..Default::default() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Beta");
        assert_eq!(updated.status, ArticleStatus::Scheduled);

        assert!(storage.update_by_id("missing", ArticleUpdate::default()).await.unwrap().is_none());
        assert!(storage.delete_by_id(&created.id).await.unwrap());
        assert!(!storage.delete_by_id(&created.id).await.unwrap());
        assert!(storage.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_filters_and_sorts() {
        let start = Utc::now();
        let clock = Arc::new(ManualClock::new(start));
        let storage = MemoryStorage::with_clock(clock.clone());

        let first = storage.create(new_article("First", ArticleStatus::Scheduled)).await.unwrap();
        clock.advance(Duration::minutes(1));
        let second = storage.create(new_article("Second", ArticleStatus::Draft)).await.unwrap();
        clock.advance(Duration::minutes(1));
        let third = storage.create(new_article("Third", ArticleStatus::Scheduled)).await.unwrap();

        let queued = storage
            .find(&ArticleFilter::with_statuses(&[ArticleStatus::Scheduled]), ArticleSort::oldest_first())
            .await
            .unwrap();
        assert_eq!(queued.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), vec![first.id.as_str(), third.id.as_str()]);

        let newest = storage.find(&ArticleFilter::all().limit(1), ArticleSort::newest_first()).await.unwrap();
        assert_eq!(newest[0].id, third.id);

        storage
            .update_by_id(&second.id, ArticleUpdate::publish(ArticleStatus::Published, start))
            .await
            .unwrap();
        storage
            .update_by_id(&first.id, ArticleUpdate::publish(ArticleStatus::Published, start + Duration::minutes(5)))
            .await
            .unwrap();
        let by_publication = storage.find(&ArticleFilter::all(), ArticleSort::latest_published()).await.unwrap();
        assert_eq!(by_publication[0].id, first.id);
        assert_eq!(by_publication[1].id, second.id);
        assert!(by_publication[2].published_at.is_none());
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.load_settings().await.unwrap().is_none());

        let mut settings = Settings::default();
        settings.publishing_frequency = 15;
        storage.save_settings(&settings).await.unwrap();
        assert_eq!(storage.load_settings().await.unwrap(), Some(settings));
    }
}
