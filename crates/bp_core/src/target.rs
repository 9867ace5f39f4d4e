use async_trait::async_trait;

use crate::types::TargetPayload;
use crate::Result;

/// A third-party destination articles can be pushed to.
#[async_trait]
pub trait PublishTarget: Send + Sync {
    /// Deliver `payload` to `destination`. Any non-success answer is an error.
    async fn publish(&self, destination: &str, payload: &TargetPayload) -> Result<()>;
}
