//! Allowed status transitions for a generated article.
//!
//! ```text
//! draft ──► scheduled ──► published ──► published_to_target
//!   │           │             ▲
//!   └───────────┴─────────────┘ (and directly to published_to_target)
//! ```
//!
//! Nothing ever moves back to `draft` or `scheduled`. A published article may
//! be published again, which refreshes its `published_at`.

use crate::types::ArticleStatus;
use crate::{Error, Result};

/// Statuses the scheduler draws its queue from.
pub const AWAITING_PUBLICATION: &[ArticleStatus] = &[ArticleStatus::Scheduled];

/// Statuses that count as a publication for the minimum-interval gate.
pub const PUBLISHED: &[ArticleStatus] = &[ArticleStatus::Published, ArticleStatus::PublishedToTarget];

/// Status every freshly generated article starts in.
pub const INITIAL_STATUS: ArticleStatus = ArticleStatus::Scheduled;

impl ArticleStatus {
    pub fn is_awaiting_publication(&self) -> bool {
        AWAITING_PUBLICATION.contains(self)
    }

    pub fn is_published(&self) -> bool {
        PUBLISHED.contains(self)
    }

    pub fn can_transition_to(&self, next: ArticleStatus) -> bool {
        use ArticleStatus::*;
        matches!(
            (self, next),
            (Draft, Scheduled)
                | (Draft | Scheduled | Published, Published)
                | (Draft | Scheduled | Published | PublishedToTarget, PublishedToTarget)
        )
    }

    /// Returns `next` when the move is legal.
    pub fn transition(self, next: ArticleStatus) -> Result<ArticleStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(Error::InvalidTransition { from: self, to: next })
        }
    }
}
