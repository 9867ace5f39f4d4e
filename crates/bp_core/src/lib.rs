pub mod clock;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod storage;
pub mod target;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use models::{ContentGenerator, TextModel};
pub use storage::{ArticleStorage, SettingsStorage};
pub use target::PublishTarget;
pub use types::{
    Article, ArticleBody, ArticleEdit, ArticleFilter, ArticleSort, ArticleStatus, ArticleUpdate,
    GeneratedContent, GenerationRequest, NewArticle, PublishingPolicy, Settings, SettingsPatch,
    SortField, SortOrder, TargetPayload,
};
