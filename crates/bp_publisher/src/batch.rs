use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use bp_core::lifecycle::INITIAL_STATUS;
use bp_core::{
    Article, ArticleStorage, ContentGenerator, Error, GenerationRequest, NewArticle, Result,
};

/// Pause between two generations, to stay under the model's rate limit.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(2);

/// Validate a whole batch up front. Returns the trimmed requests.
pub fn validate_batch(requests: &[GenerationRequest]) -> Result<Vec<GenerationRequest>> {
    if requests.is_empty() {
        return Err(Error::Validation(
            "Keywords with image URLs are required".to_string(),
        ));
    }
    requests.iter().map(GenerationRequest::validated).collect()
}

/// Generates and stores one article per keyword/asset pair, one pair at a time.
pub struct BatchGenerator {
    generator: Arc<dyn ContentGenerator>,
    storage: Arc<dyn ArticleStorage>,
    request_delay: Duration,
}

impl BatchGenerator {
    pub fn new(generator: Arc<dyn ContentGenerator>, storage: Arc<dyn ArticleStorage>) -> Self {
        Self {
            generator,
            storage,
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }

    pub fn with_request_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }

    /// Runs the batch in input order. A failing pair is logged and skipped;
    /// the call only fails when the input is invalid or nothing was created.
    #[tracing::instrument(skip_all, fields(requests = requests.len()))]
    pub async fn generate_batch(&self, requests: &[GenerationRequest]) -> Result<Vec<Article>> {
        let requests = validate_batch(requests)?;
        let total = requests.len();
        let mut created = Vec::with_capacity(total);

        for (i, request) in requests.iter().enumerate() {
            info!(keyword = %request.keyword, "📝 Generating article {}/{}", i + 1, total);
            match self.generate_one(request).await {
                Ok(article) => {
                    info!(keyword = %request.keyword, article_id = %article.id, "✅ Article queued: {}", article.title);
                    created.push(article);
                    if i + 1 < total && !self.request_delay.is_zero() {
                        tokio::time::sleep(self.request_delay).await;
                    }
                }
                Err(e) => {
                    error!(keyword = %request.keyword, "❌ Skipping keyword: {}", e);
                }
            }
        }

        if created.is_empty() {
            return Err(Error::BatchFailed { attempted: total });
        }
        info!("✨ {} of {} articles generated", created.len(), total);
        Ok(created)
    }

    async fn generate_one(&self, request: &GenerationRequest) -> Result<Article> {
        let content = self.generator.generate(&request.keyword).await?;
        if !content.body.is_usable() {
            return Err(Error::Inference(format!(
                "Generated article for '{}' has no title or content",
                request.keyword
            )));
        }
        let keywords = content.keywords_for(&request.keyword);
        let body = content.body;
        let clean_text = Some(body.clean_text).filter(|text| !text.trim().is_empty());

        self.storage
            .create(NewArticle {
                title: body.title,
                content: body.content,
                excerpt: body.excerpt,
                clean_text,
                keywords,
                asset_uri: request.asset_uri.clone(),
                status: INITIAL_STATUS,
            })
            .await
    }
}
