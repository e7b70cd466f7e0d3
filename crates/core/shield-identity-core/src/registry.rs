use crate::error::{IdentityError, IdentityResult};
use crate::IdentityProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Configured providers keyed by their id.
///
/// Lets the host dispatch on a route segment such as `/oauth/{provider}`
/// without knowing the concrete provider types.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any previous one with the same id.
    pub fn register(&mut self, provider: Arc<dyn IdentityProvider>) {
        let provider_id = provider.provider_id().to_string();
        debug!(provider = %provider_id, "Registered identity provider");
        self.providers.insert(provider_id, provider);
    }

    pub fn get(&self, provider_id: &str) -> IdentityResult<Arc<dyn IdentityProvider>> {
        self.providers
            .get(provider_id)
            .cloned()
            .ok_or_else(|| IdentityError::ProviderNotFound(provider_id.to_string()))
    }

    /// Registered ids in sorted order.
    pub fn provider_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NormalizedIdentity;
    use async_trait::async_trait;

    struct StaticProvider(&'static str);

    #[async_trait]
    impl IdentityProvider for StaticProvider {
        fn provider_id(&self) -> &str {
            self.0
        }

        fn build_authorization_link(&self, state: &str) -> String {
            format!("https://{}.example.com/authorize?state={}", self.0, state)
        }

        async fn complete_login(
            &self,
            _callback_params: &HashMap<String, String>,
        ) -> IdentityResult<NormalizedIdentity> {
            Ok(NormalizedIdentity {
                provider_id: self.0.to_string(),
                login_handle: "octocat".to_string(),
                email: "octocat@example.com".to_string(),
                display_name: "The Octocat".to_string(),
                avatar_url: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_id() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(StaticProvider("github")));
        registry.register(Arc::new(StaticProvider("google")));

        assert_eq!(registry.provider_ids(), vec!["github", "google"]);

        let provider = registry.get("google").unwrap();
        assert!(provider
            .build_authorization_link("xyz")
            .starts_with("https://google.example.com"));

        let identity = provider.complete_login(&HashMap::new()).await.unwrap();
        assert_eq!(identity.provider_id, "google");
    }

    #[test]
    fn test_unknown_provider() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());

        match registry.get("gitlab") {
            Err(IdentityError::ProviderNotFound(id)) => assert_eq!(id, "gitlab"),
            _ => panic!("Expected ProviderNotFound"),
        }
    }
}
