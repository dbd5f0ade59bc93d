//! API credential resolution

mod aws_cli;

pub use aws_cli::{AwsCliSecretStore, SecretStoreKind};

use expense_ocr_domain::{ExtractError, SecretStore};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::OnceCell;

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves the bearer key once per process: environment variable first, then the secret store
pub struct ApiKeyResolver {
    env_var: String,
    env_lookup: EnvLookup,
    store: Option<Box<dyn SecretStore>>,
    resolved: OnceCell<SecretString>,
}

impl ApiKeyResolver {
    pub fn new(env_var: impl Into<String>, store: Option<Box<dyn SecretStore>>) -> Self {
        Self {
            env_var: env_var.into(),
            env_lookup: Box::new(|name| std::env::var(name).ok()),
            store,
            resolved: OnceCell::new(),
        }
    }

    /// Resolver with an already known key
    pub fn fixed(key: SecretString) -> Self {
        Self {
            env_var: String::new(),
            env_lookup: Box::new(|_| None),
            store: None,
            resolved: OnceCell::new_with(Some(key)),
        }
    }

    /// Replace the process environment as the source of `env_var`
    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env_lookup = Box::new(lookup);
        self
    }

    /// Where the key will come from, for diagnostics
    pub fn source(&self) -> String {
        if self.env_value().is_some() {
            return format!("env {}", self.env_var);
        }
        match &self.store {
            Some(store) => store.describe(),
            None => "none".to_string(),
        }
    }

    pub async fn resolve(&self) -> Result<&SecretString, ExtractError> {
        self.resolved.get_or_try_init(|| self.lookup()).await
    }

    async fn lookup(&self) -> Result<SecretString, ExtractError> {
        if let Some(key) = self.env_value() {
            tracing::debug!(env_var = %self.env_var, "Using API key from environment");
            return Ok(key);
        }

        let Some(store) = &self.store else {
            return Err(ExtractError::Credential(format!(
                "{} is not set and no secret store is configured",
                self.env_var
            )));
        };

        tracing::info!(store = %store.describe(), "Fetching API key from secret store");
        let key = store
            .fetch()
            .await
            .map_err(|e| ExtractError::Credential(e.to_string()))?;

        if key.expose_secret().trim().is_empty() {
            return Err(ExtractError::Credential(format!(
                "{} returned an empty secret",
                store.describe()
            )));
        }

        Ok(key)
    }

    fn env_value(&self) -> Option<SecretString> {
        if self.env_var.trim().is_empty() {
            return None;
        }
        match (self.env_lookup)(&self.env_var) {
            Some(value) if !value.trim().is_empty() => Some(SecretString::new(value.into())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use expense_ocr_domain::SecretError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        value: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SecretStore for CountingStore {
        async fn fetch(&self) -> Result<SecretString, SecretError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SecretString::new(self.value.into()))
        }

        fn describe(&self) -> String {
            "counting store".to_string()
        }
    }

    struct FailingStore;

    #[async_trait]
    impl SecretStore for FailingStore {
        async fn fetch(&self) -> Result<SecretString, SecretError> {
            Err(SecretError::NotFound("MISTRAL_API_KEY".to_string()))
        }

        fn describe(&self) -> String {
            "failing store".to_string()
        }
    }

    #[tokio::test]
    async fn test_env_var_takes_precedence() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = ApiKeyResolver::new(
            "MISTRAL_API_KEY",
            Some(Box::new(CountingStore {
                value: "from-store",
                calls: calls.clone(),
            })),
        )
        .with_env_lookup(|name| (name == "MISTRAL_API_KEY").then(|| "from-env".to_string()));

        let key = resolver.resolve().await.unwrap();

        assert_eq!(key.expose_secret(), "from-env");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolver.source(), "env MISTRAL_API_KEY");
    }

    #[tokio::test]
    async fn test_blank_env_value_falls_back_to_store() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = ApiKeyResolver::new(
            "MISTRAL_API_KEY",
            Some(Box::new(CountingStore {
                value: "from-store",
                calls: calls.clone(),
            })),
        )
        .with_env_lookup(|_| Some("   ".to_string()));

        assert_eq!(resolver.resolve().await.unwrap().expose_secret(), "from-store");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_fallback_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = ApiKeyResolver::new(
            "EXPENSE_OCR_TEST_KEY_UNSET",
            Some(Box::new(CountingStore {
                value: "from-store",
                calls: calls.clone(),
            })),
        );

        assert_eq!(resolver.resolve().await.unwrap().expose_secret(), "from-store");
        assert_eq!(resolver.resolve().await.unwrap().expose_secret(), "from-store");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.source(), "counting store");
    }

    #[tokio::test]
    async fn test_missing_everywhere_is_credential_error() {
        let resolver = ApiKeyResolver::new("EXPENSE_OCR_TEST_KEY_MISSING", None);

        let err = resolver.resolve().await.unwrap_err();

        assert!(matches!(err, ExtractError::Credential(_)));
        assert!(err.to_string().contains("EXPENSE_OCR_TEST_KEY_MISSING"));
    }

    #[tokio::test]
    async fn test_store_failure_is_credential_error() {
        let resolver =
            ApiKeyResolver::new("EXPENSE_OCR_TEST_KEY_FAILING", Some(Box::new(FailingStore)));

        let err = resolver.resolve().await.unwrap_err();

        assert!(matches!(err, ExtractError::Credential(_)));
    }
}
