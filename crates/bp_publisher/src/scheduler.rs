use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use bp_core::lifecycle::{AWAITING_PUBLICATION, PUBLISHED};
use bp_core::{
    Article, ArticleFilter, ArticleSort, ArticleStatus, ArticleStorage, ArticleUpdate, Clock, Error,
    PublishingPolicy, Result,
};

use crate::settings::SettingsService;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(60);

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    EmptyQueue,
    /// The last publication is too recent.
    Gated {
        elapsed_minutes: f64,
        required_minutes: u32,
    },
    Promoted(Article),
}

/// Promotes at most one queued article per tick, and only once the minimum
/// interval since the last publication has passed.
///
/// Holds no state between ticks: every decision is re-derived from the store.
/// Running two schedulers against one store voids the spacing guarantee.
pub struct PublicationScheduler {
    storage: Arc<dyn ArticleStorage>,
    settings: SettingsService,
    clock: Arc<dyn Clock>,
    period: Duration,
}

impl PublicationScheduler {
    pub fn new(storage: Arc<dyn ArticleStorage>, settings: SettingsService, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            settings,
            clock,
            period: DEFAULT_TICK_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    #[tracing::instrument(skip(self))]
    pub async fn tick(&self) -> Result<TickOutcome> {
        let policy = self.settings.policy().await?;
        self.tick_with_policy(policy).await
    }

    pub async fn tick_with_policy(&self, policy: PublishingPolicy) -> Result<TickOutcome> {
        let head = self
            .storage
            .find(
                &ArticleFilter::with_statuses(AWAITING_PUBLICATION).limit(1),
                ArticleSort::oldest_first(),
            )
            .await?
            .into_iter()
            .next();
        let Some(head) = head else {
            debug!("Publication queue is empty");
            return Ok(TickOutcome::EmptyQueue);
        };

        let now = self.clock.now();
        let last_published_at = self
            .storage
            .find(
                &ArticleFilter::with_statuses(PUBLISHED).limit(1),
                ArticleSort::latest_published(),
            )
            .await?
            .into_iter()
            .find_map(|article| article.published_at);

        if let Some(last) = last_published_at {
            let elapsed_minutes = (now - last).num_milliseconds() as f64 / 60_000.0;
            let required_minutes = policy.minimum_interval_minutes;
            // A publication stamped in the future also keeps the gate closed.
            if elapsed_minutes < f64::from(required_minutes) {
                debug!(elapsed_minutes, required_minutes, "⏳ Too early to publish");
                return Ok(TickOutcome::Gated {
                    elapsed_minutes,
                    required_minutes,
                });
            }
        }

        let status = head.status.transition(ArticleStatus::Published)?;
        let promoted = self
            .storage
            .update_by_id(&head.id, ArticleUpdate::publish(status, now))
            .await?
            .ok_or_else(|| Error::NotFound(format!("Article {} vanished before publication", head.id)))?;

        info!(article_id = %promoted.id, "📢 Auto-published: {}", promoted.title);
        Ok(TickOutcome::Promoted(promoted))
    }

    /// Tick every period until `shutdown` resolves. A failed tick is logged and
    /// the next one runs as usual.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!("⏰ Scheduler started, ticking every {:?}", self.period);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Scheduler shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        error!("❌ Scheduler tick failed: {}", e);
                    }
                }
            }
        }
    }

    /// Run in the background for the rest of the process.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run_until(std::future::pending()).await })
    }
}
