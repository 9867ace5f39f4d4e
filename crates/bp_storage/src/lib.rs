use async_trait::async_trait;
use bp_core::{ArticleStorage, Error, Result, SettingsStorage};
use std::sync::Arc;

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: ArticleStorage + SettingsStorage + Sized + 'static {
    fn get_error_message() -> &'static str;

    /// Open the backend. `url` is backend specific; `None` means the default location.
    async fn connect(url: Option<&str>) -> Result<Self>;
}

/// The two store handles the rest of the system works with, backed by one backend.
#[derive(Clone)]
pub struct Stores {
    pub articles: Arc<dyn ArticleStorage>,
    pub settings: Arc<dyn SettingsStorage>,
}

impl Stores {
    pub fn from_backend<T: StorageBackend>(backend: T) -> Self {
        let backend = Arc::new(backend);
        Self {
            articles: backend.clone(),
            settings: backend,
        }
    }
}

async fn open<T: StorageBackend>(url: Option<&str>) -> Result<Stores> {
    let backend = T::connect(url).await.map_err(|e| {
        tracing::error!("{}: {}", T::get_error_message(), e);
        e
    })?;
    Ok(Stores::from_backend(backend))
}

/// Build the stores for a backend name (`memory` or `sqlite`).
pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Stores> {
    match kind {
        "memory" => open::<MemoryStorage>(url).await,
        #[cfg(feature = "sqlite")]
        "sqlite" => open::<SQLiteStorage>(url).await,
        other => Err(Error::Storage(format!(
            "Unsupported storage backend '{}' (enabled: {})",
            other,
            available_backends().join(", ")
        ))),
    }
}

pub fn available_backends() -> Vec<&'static str> {
    let mut backends = vec!["memory"];
    if cfg!(feature = "sqlite") {
        backends.push("sqlite");
    }
    backends
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend, Stores};
}
