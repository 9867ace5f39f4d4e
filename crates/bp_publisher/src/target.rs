use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use bp_core::{Error, PublishTarget, Result, TargetPayload};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers articles to a third-party site with a JSON `POST`.
#[derive(Debug, Clone)]
pub struct HttpPublishTarget {
    client: Client,
}

impl HttpPublishTarget {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PublishTarget for HttpPublishTarget {
    async fn publish(&self, destination: &str, payload: &TargetPayload) -> Result<()> {
        debug!(destination, article_id = %payload.article.id, "Posting article");
        let response = self
            .client
            .post(destination)
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::Publish(format!("{} unreachable: {}", destination, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Publish(format!("{} answered {}: {}", destination, status, body.trim())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::{Article, ArticleStatus};
    use chrono::Utc;

    #[tokio::test]
    async fn test_unreachable_destination_is_a_publish_error() {
        let target = HttpPublishTarget::with_timeout(Duration::from_secs(2)).unwrap();
        let payload = TargetPayload {
            article: Article {
                id: "a1".into(),
                title: "Title".into(),
                content: "<p>Body</p>".into(),
                excerpt: String::new(),
                clean_text: None,
                keywords: vec![],
                asset_uri: "https://img.example.com/a.png".into(),
                status: ArticleStatus::Published,
                published_at: None,
                created_at: Utc::now(),
            },
            source: "test".into(),
        };

        let err = target.publish("http://127.0.0.1:9/publish", &payload).await.unwrap_err();
        assert!(matches!(err, Error::Publish(_)));
    }
}
