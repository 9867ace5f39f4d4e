use std::sync::Arc;

use bp_core::{Error, PublishingPolicy, Result, Settings, SettingsPatch, SettingsStorage};

/// Reads and edits the operator settings. Every call goes to the store, so a
/// change is picked up by the next operation that asks for it.
#[derive(Clone)]
pub struct SettingsService {
    storage: Arc<dyn SettingsStorage>,
}

impl SettingsService {
    pub fn new(storage: Arc<dyn SettingsStorage>) -> Self {
        Self { storage }
    }

    /// Stored settings, or the defaults when none were saved yet.
    pub async fn get(&self) -> Result<Settings> {
        Ok(self.storage.load_settings().await?.unwrap_or_default())
    }

    pub async fn policy(&self) -> Result<PublishingPolicy> {
        match self.storage.load_settings().await? {
            Some(settings) => settings.policy(),
            None => Ok(PublishingPolicy::default()),
        }
    }

    pub async fn update(&self, patch: SettingsPatch) -> Result<Settings> {
        let mut settings = self.get().await?;
        if let Some(frequency) = patch.publishing_frequency {
            settings.publishing_frequency = frequency;
        }
        if let Some(keywords) = patch.keywords {
            settings.keywords = clean_keywords(keywords);
        }
        if let Some(target_url) = patch.target_url {
            let target_url = target_url.trim();
            settings.target_url = (!target_url.is_empty()).then(|| target_url.to_string());
        }
        self.save(settings).await
    }

    pub async fn update_keywords(&self, keywords: Vec<String>) -> Result<Vec<String>> {
        let mut settings = self.get().await?;
        settings.keywords = clean_keywords(keywords);
        Ok(self.save(settings).await?.keywords)
    }

    pub async fn delete_keyword(&self, index: usize) -> Result<Vec<String>> {
        let mut settings = self.get().await?;
        if settings.keywords.is_empty() {
            return Err(Error::Validation("No keywords available".to_string()));
        }
        if index >= settings.keywords.len() {
            return Err(Error::Validation("Invalid keyword index".to_string()));
        }
        let removed = settings.keywords.remove(index);
        tracing::info!("🗑️ Removed keyword '{}'", removed);
        Ok(self.save(settings).await?.keywords)
    }

    async fn save(&self, settings: Settings) -> Result<Settings> {
        settings.validate()?;
        self.storage.save_settings(&settings).await?;
        Ok(settings)
    }
}

fn clean_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

impl std::fmt::Debug for SettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsService").finish_non_exhaustive()
    }
}
