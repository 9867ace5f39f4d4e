use bp_publisher::{BatchGenerator, PublishingService, SettingsService};

pub struct AppState {
    pub batch: BatchGenerator,
    pub publishing: PublishingService,
    pub settings: SettingsService,
}
