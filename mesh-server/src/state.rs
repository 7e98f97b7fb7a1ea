//! Application state for mesh-server

use shared::models::PricePolicy;
use shared::seed::CatalogSeed;
use shared::util::IdGenerator;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::config::{Config, DEFAULT_DECRYPT_BASE_URL, STORAGE_KEY_VAR};
use crate::db::{MemoryRecordStore, PgRecordStore, RecordStore};
use crate::storage::{LighthouseClient, StorageClient};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Where the storage node API key comes from
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Read the named env var on every request
    Env(&'static str),
    Fixed(Option<String>),
}

impl CredentialSource {
    pub fn current(&self) -> Option<String> {
        match self {
            Self::Env(name) => std::env::var(name).ok().filter(|k| !k.trim().is_empty()),
            Self::Fixed(key) => key.clone(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub storage: Arc<dyn StorageClient>,
    pub credential: CredentialSource,
    /// Catalogue served when the store has no listings
    pub seed: Arc<CatalogSeed>,
    pub ids: Arc<IdGenerator>,
    pub price_policy: PricePolicy,
    pub decrypt_base_url: String,
}

impl AppState {
    /// Assemble state from already-built collaborators, with the launch
    /// catalogue and default URLs.
    pub fn from_parts(
        store: Arc<dyn RecordStore>,
        storage: Arc<dyn StorageClient>,
        credential: CredentialSource,
    ) -> Self {
        Self {
            store,
            storage,
            credential,
            seed: Arc::new(CatalogSeed::launch()),
            ids: Arc::new(IdGenerator::new()),
            price_policy: PricePolicy::default(),
            decrypt_base_url: DEFAULT_DECRYPT_BASE_URL.into(),
        }
    }

    pub fn with_seed(mut self, seed: CatalogSeed) -> Self {
        self.seed = Arc::new(seed);
        self
    }

    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn RecordStore> = match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .connect(url)
                    .await?;
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Connected to PostgreSQL, migrations applied");
                Arc::new(PgRecordStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory record store");
                Arc::new(MemoryRecordStore::new())
            }
        };

        let storage = Arc::new(LighthouseClient::new(
            &config.lighthouse_node_url,
            &config.lighthouse_gateway_url,
        )?);

        let seed = match &config.seed_catalog_path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path).await?;
                let seed = CatalogSeed::from_json(&raw)?;
                tracing::info!(path = %path.display(), listings = seed.listings.len(), "Loaded seed catalogue");
                seed
            }
            None => CatalogSeed::launch(),
        };

        if CredentialSource::Env(STORAGE_KEY_VAR).current().is_none() {
            tracing::warn!("{STORAGE_KEY_VAR} not set, uploads will fail until it is");
        }

        let mut state = Self::from_parts(store, storage, CredentialSource::Env(STORAGE_KEY_VAR))
            .with_seed(seed);
        state.decrypt_base_url = config.decrypt_base_url.trim_end_matches('/').to_string();
        Ok(state)
    }

    /// Link at which a stored dataset can be decrypted
    pub fn decrypt_url(&self, content_id: &str) -> String {
        format!("{}/{content_id}", self.decrypt_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_fixed_credential() {
        assert_eq!(CredentialSource::Fixed(None).current(), None);
        assert_eq!(
            CredentialSource::Fixed(Some("key".into())).current().as_deref(),
            Some("key")
        );
    }

    #[test]
    fn test_decrypt_url() {
        let state = AppState::from_parts(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryStorage::new()),
            CredentialSource::Fixed(None),
        );
        assert_eq!(
            state.decrypt_url("QmAbc"),
            "https://decrypt.mesh3.network/evm/QmAbc"
        );
    }
}
