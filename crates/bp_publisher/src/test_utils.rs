use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use bp_core::{
    Article, ArticleBody, ArticleFilter, ArticleSort, ArticleStatus, ArticleStorage, ArticleUpdate,
    ContentGenerator, Error, GeneratedContent, NewArticle, PublishTarget, Result, TargetPayload,
};
use bp_storage::MemoryStorage;

/// Generator that fails for selected keywords and counts every call.
#[derive(Default)]
pub struct StubGenerator {
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn failing_on(keywords: &[&str]) -> Self {
        Self {
            failing: keywords.iter().map(|k| k.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn generate(&self, keyword: &str) -> Result<GeneratedContent> {
        self.calls.lock().unwrap().push(keyword.to_string());
        if self.failing.iter().any(|k| k == keyword) {
            return Err(Error::Inference(format!("simulated outage for {}", keyword)));
        }
        Ok(GeneratedContent {
            body: ArticleBody {
                title: format!("All about {}", keyword),
                excerpt: format!("Short take on {}", keyword),
                content: format!("<h1>All about {}</h1>", keyword),
                clean_text: format!("All about {}", keyword),
            },
            primary_keyword: None,
        })
    }
}

/// Memory storage whose `create` fails for titles containing a marker, and
/// whose reads can be switched off entirely.
pub struct FlakyStorage {
    inner: MemoryStorage,
    failing_title: Option<String>,
    reads_fail: AtomicBool,
    failed_reads: AtomicUsize,
}

impl FlakyStorage {
    pub fn failing_create_on(marker: &str) -> Self {
        Self {
            inner: MemoryStorage::new(),
            failing_title: Some(marker.to_string()),
            reads_fail: Default::default(),
            failed_reads: Default::default(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            inner: MemoryStorage::new(),
            failing_title: None,
            reads_fail: AtomicBool::new(true),
            failed_reads: Default::default(),
        }
    }

    pub fn failed_reads(&self) -> usize {
        self.failed_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleStorage for FlakyStorage {
    async fn find(&self, filter: &ArticleFilter, sort: ArticleSort) -> Result<Vec<Article>> {
        if self.reads_fail.load(Ordering::SeqCst) {
            self.failed_reads.fetch_add(1, Ordering::SeqCst);
            return Err(Error::Storage("store unavailable".to_string()));
        }
        self.inner.find(filter, sort).await
    }

    async fn get(&self, id: &str) -> Result<Option<Article>> {
        self.inner.get(id).await
    }

    async fn create(&self, article: NewArticle) -> Result<Article> {
        if let Some(marker) = &self.failing_title {
            if article.title.contains(marker.as_str()) {
                return Err(Error::Storage("disk full".to_string()));
            }
        }
        self.inner.create(article).await
    }

    async fn update_by_id(&self, id: &str, update: ArticleUpdate) -> Result<Option<Article>> {
        self.inner.update_by_id(id, update).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        self.inner.delete_by_id(id).await
    }
}

/// Publish target recording deliveries; fails every call when `fail` is set.
#[derive(Default)]
pub struct RecordingTarget {
    pub fail: bool,
    deliveries: Mutex<Vec<(String, String, ArticleStatus)>>,
    attempts: AtomicUsize,
}

impl RecordingTarget {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn deliveries(&self) -> Vec<(String, String, ArticleStatus)> {
        self.deliveries.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublishTarget for RecordingTarget {
    async fn publish(&self, destination: &str, payload: &TargetPayload) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Publish(format!("{} answered 500 Internal Server Error", destination)));
        }
        self.deliveries.lock().unwrap().push((
            destination.to_string(),
            payload.article.id.clone(),
            payload.article.status,
        ));
        Ok(())
    }
}

pub fn new_article(title: &str, status: ArticleStatus) -> NewArticle {
    NewArticle {
        title: title.to_string(),
        content: format!("<h1>{}</h1>", title),
        excerpt: String::new(),
        clean_text: None,
        keywords: vec![title.to_lowercase()],
        asset_uri: format!("https://img.example.com/{}.png", title.to_lowercase()),
        status,
    }
}
