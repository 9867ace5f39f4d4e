pub mod batch;
pub mod logging;
pub mod scheduler;
pub mod service;
pub mod settings;
pub mod target;

#[cfg(test)]
mod test_utils;

pub use batch::{validate_batch, BatchGenerator, DEFAULT_REQUEST_DELAY};
pub use logging::init_logging;
pub use scheduler::{PublicationScheduler, TickOutcome, DEFAULT_TICK_PERIOD};
pub use service::{PublishingService, SOURCE_MARKER};
pub use settings::SettingsService;
pub use target::HttpPublishTarget;

pub mod prelude {
    pub use super::{BatchGenerator, PublicationScheduler, PublishingService, SettingsService, TickOutcome};
    pub use bp_core::{Article, ArticleStatus, Error, GenerationRequest, Result};
}
