use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use bp_core::lifecycle::PUBLISHED;
use bp_core::{
    Article, ArticleEdit, ArticleFilter, ArticleSort, ArticleStatus, ArticleStorage, ArticleUpdate,
    Clock, Error, PublishTarget, Result, TargetPayload,
};

use crate::settings::SettingsService;

/// Identifies this system in payloads sent to external destinations.
pub const SOURCE_MARKER: &str = "blog-pipeline";

/// Manual actions on stored articles. Every status change goes through the
/// article state machine.
#[derive(Clone)]
pub struct PublishingService {
    storage: Arc<dyn ArticleStorage>,
    settings: SettingsService,
    target: Arc<dyn PublishTarget>,
    clock: Arc<dyn Clock>,
}

impl PublishingService {
    pub fn new(
        storage: Arc<dyn ArticleStorage>,
        settings: SettingsService,
        target: Arc<dyn PublishTarget>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            settings,
            target,
            clock,
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Article>> {
        self.storage
            .find(&ArticleFilter::all(), ArticleSort::newest_first())
            .await
    }

    pub async fn list_published(&self) -> Result<Vec<Article>> {
        self.storage
            .find(&ArticleFilter::with_statuses(PUBLISHED), ArticleSort::latest_published())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Article> {
        self.storage.get(id).await?.ok_or_else(|| not_found(id))
    }

    /// Edits the text fields only; status and timestamps stay as they are.
    pub async fn update(&self, id: &str, edit: ArticleEdit) -> Result<Article> {
        let update = edit.into_update()?;
        self.storage
            .update_by_id(id, update)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.storage.delete_by_id(id).await? {
            return Err(not_found(id));
        }
        info!(article_id = id, "🗑️ Article deleted");
        Ok(())
    }

    /// Put a held draft into the publication queue.
    pub async fn schedule(&self, id: &str) -> Result<Article> {
        let article = self.get(id).await?;
        let status = article.status.transition(ArticleStatus::Scheduled)?;
        let update = ArticleUpdate {
            status: Some(status),
            ..Default::default()
        };
        self.storage
            .update_by_id(id, update)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Publish immediately, bypassing the scheduler's gate.
    pub async fn publish_now(&self, id: &str) -> Result<Article> {
        let article = self.get(id).await?;
        let status = article.status.transition(ArticleStatus::Published)?;
        let published = self
            .storage
            .update_by_id(id, ArticleUpdate::publish(status, self.clock.now()))
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(article_id = id, "📢 Published: {}", published.title);
        Ok(published)
    }

    /// Hand the article to an external site. `destination` falls back to the
    /// configured target URL. On failure the article is left untouched.
    pub async fn publish_to_target(&self, id: &str, destination: Option<&str>) -> Result<Article> {
        let article = self.get(id).await?;
        let status = article.status.transition(ArticleStatus::PublishedToTarget)?;

        let destination = match destination.map(str::trim).filter(|d| !d.is_empty()) {
            Some(destination) => destination.to_string(),
            None => self.settings.get().await?.target_url.ok_or_else(|| {
                Error::Validation("No publish destination given and no target URL configured".to_string())
            })?,
        };
        Url::parse(&destination).map_err(|e| Error::InvalidUrl(format!("{}: {}", destination, e)))?;

        let payload = TargetPayload {
            article,
            source: SOURCE_MARKER.to_string(),
        };
        if let Err(e) = self.target.publish(&destination, &payload).await {
            warn!(article_id = id, destination = %destination, "External publish failed: {}", e);
            return Err(e);
        }

        let published = self
            .storage
            .update_by_id(id, ArticleUpdate::publish(status, self.clock.now()))
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(article_id = id, destination = %destination, "🚀 Published to target: {}", published.title);
        Ok(published)
    }
}

fn not_found(id: &str) -> Error {
    Error::NotFound(format!("Article {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{new_article, RecordingTarget};
    use bp_core::{ManualClock, SettingsPatch};
    use bp_storage::MemoryStorage;
    use chrono::{Duration, Utc};

    struct Fixture {
        storage: Arc<MemoryStorage>,
        target: Arc<RecordingTarget>,
        clock: Arc<ManualClock>,
        service: PublishingService,
    }

    fn fixture_with(target: RecordingTarget) -> Fixture {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let storage = Arc::new(MemoryStorage::with_clock(clock.clone()));
        let target = Arc::new(target);
        let service = PublishingService::new(
            storage.clone(),
            SettingsService::new(storage.clone()),
            target.clone(),
            clock.clone(),
        );
        Fixture { storage, target, clock, service }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingTarget::default())
    }

    #[tokio::test]
    async fn test_publish_now_sets_timestamp() {
        let f = fixture();
        let article = f.storage.create(new_article("Fresh", ArticleStatus::Scheduled)).await.unwrap();
        f.clock.advance(Duration::minutes(3));

        let published = f.service.publish_now(&article.id).await.unwrap();
        assert_eq!(published.status, ArticleStatus::Published);
        assert_eq!(published.published_at, Some(f.clock.now()));

        f.clock.advance(Duration::minutes(3));
        let again = f.service.publish_now(&article.id).await.unwrap();
        assert_eq!(again.published_at, Some(f.clock.now()));
    }

    #[tokio::test]
    async fn test_invalid_transitions_are_rejected() {
        let f = fixture();
        let article = f.storage.create(new_article("Out", ArticleStatus::PublishedToTarget)).await.unwrap();

        assert!(matches!(
            f.service.publish_now(&article.id).await,
            Err(Error::InvalidTransition { from: ArticleStatus::PublishedToTarget, to: ArticleStatus::Published })
        ));
        assert!(matches!(f.service.schedule(&article.id).await, Err(Error::InvalidTransition { .. })));
        assert_eq!(f.service.get(&article.id).await.unwrap().status, ArticleStatus::PublishedToTarget);
    }

    #[tokio::test]
    async fn test_schedule_moves_draft_into_queue() {
        let f = fixture();
        let draft = f.storage.create(new_article("Held", ArticleStatus::Draft)).await.unwrap();

        let scheduled = f.service.schedule(&draft.id).await.unwrap();
        assert_eq!(scheduled.status, ArticleStatus::Scheduled);
        assert!(scheduled.published_at.is_none());
    }

    #[tokio::test]
    async fn test_edit_keeps_status_and_timestamps() {
        let f = fixture();
        let article = f.storage.create(new_article("Original", ArticleStatus::Scheduled)).await.unwrap();

        let edited = f
            .service
            .update(&article.id, ArticleEdit { title: Some("Edited".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(edited.title, "Edited");
        assert_eq!(edited.content, article.content);
        assert_eq!(edited.status, ArticleStatus::Scheduled);
        assert_eq!(edited.created_at, article.created_at);

        let blank = ArticleEdit { title: Some("  ".into()), ..Default::default() };
        assert!(matches!(f.service.update(&article.id, blank).await, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_articles() {
        let f = fixture();
        assert!(matches!(f.service.get("nope").await, Err(Error::NotFound(_))));
        assert!(matches!(f.service.delete("nope").await, Err(Error::NotFound(_))));
        assert!(matches!(f.service.publish_now("nope").await, Err(Error::NotFound(_))));
        assert!(matches!(
            f.service.update("nope", ArticleEdit { title: Some("x".into()), ..Default::default() }).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listings() {
        let f = fixture();
        let first = f.storage.create(new_article("First", ArticleStatus::Scheduled)).await.unwrap();
        f.clock.advance(Duration::minutes(1));
        let second = f.storage.create(new_article("Second", ArticleStatus::Scheduled)).await.unwrap();
        f.clock.advance(Duration::minutes(1));
        f.storage.create(new_article("Third", ArticleStatus::Draft)).await.unwrap();

        let all: Vec<_> = f.service.list_all().await.unwrap().into_iter().map(|a| a.title).collect();
        assert_eq!(all, vec!["Third", "Second", "First"]);

        f.service.publish_now(&second.id).await.unwrap();
        f.clock.advance(Duration::minutes(1));
        f.service.publish_to_target(&first.id, Some("https://target.example.com/api")).await.unwrap();

        let published: Vec<_> = f.service.list_published().await.unwrap().into_iter().map(|a| a.title).collect();
        assert_eq!(published, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn test_publish_to_target_uses_configured_destination() {
        let f = fixture();
        let article = f.storage.create(new_article("Outbound", ArticleStatus::Published)).await.unwrap();

        assert!(matches!(f.service.publish_to_target(&article.id, None).await, Err(Error::Validation(_))));

        SettingsService::new(f.storage.clone())
            .update(SettingsPatch {
                target_url: Some("https://target.example.com/api/publish".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let sent = f.service.publish_to_target(&article.id, None).await.unwrap();
        assert_eq!(sent.status, ArticleStatus::PublishedToTarget);
        assert_eq!(sent.published_at, Some(f.clock.now()));
        assert_eq!(
            f.target.deliveries(),
            vec![(
                "https://target.example.com/api/publish".to_string(),
                article.id.clone(),
                ArticleStatus::Published
            )]
        );
    }

    #[tokio::test]
    async fn test_failed_delivery_leaves_article_unchanged() {
        let f = fixture_with(RecordingTarget::failing());
        let article = f.storage.create(new_article("Stuck", ArticleStatus::Scheduled)).await.unwrap();

        let err = f
            .service
            .publish_to_target(&article.id, Some("https://target.example.com/api"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Publish(_)));
        assert_eq!(f.target.attempts(), 1);
        assert_eq!(f.service.get(&article.id).await.unwrap(), article);
    }

    #[tokio::test]
    async fn test_bad_destination_is_rejected_before_delivery() {
        let f = fixture();
        let article = f.storage.create(new_article("Nowhere", ArticleStatus::Published)).await.unwrap();

        let err = f.service.publish_to_target(&article.id, Some("not a url")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
        assert_eq!(f.target.attempts(), 0);
    }
}
