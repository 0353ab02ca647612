use std::sync::Arc;

use tokio::sync::MutexGuard;

use crate::accounts::repo::{AccountStore, Accounts};
use crate::config::AppConfig;
use crate::prompts::repo::{PromptStore, Prompts};
use crate::residents::repo::{StatusStore, Statuses};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: AccountStore,
    pub statuses: StatusStore,
    pub prompts: PromptStore,
}

/// All three store guards, taken in the order accounts, statuses, prompts.
/// Operations spanning stores go through here so the order never inverts.
pub struct Registry<'a> {
    pub accounts: MutexGuard<'a, Accounts>,
    pub statuses: MutexGuard<'a, Statuses>,
    pub prompts: MutexGuard<'a, Prompts>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        if config.bootstrap_token.is_none() {
            tracing::warn!("BOOTSTRAP_TOKEN not set; admin bootstrap is disabled");
        }
        Ok(Self::new(config))
    }

    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            accounts: AccountStore::default(),
            statuses: StatusStore::default(),
            prompts: PromptStore::default(),
        }
    }

    pub async fn registry(&self) -> Registry<'_> {
        let accounts = self.accounts.lock().await;
        let statuses = self.statuses.lock().await;
        let prompts = self.prompts.lock().await;
        Registry {
            accounts,
            statuses,
            prompts,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::JwtConfig;

        Self::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            bootstrap_token: Some("let-me-in".into()),
        })
    }
}
