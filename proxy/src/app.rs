use std::sync::Arc;

use emote_resolver::EmoteResolver;

use crate::config::AppConfig;

/// Application shared state accessible from axum handlers.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    config: AppConfig,
    resolver: EmoteResolver,
}

impl SharedState {
    pub fn new(config: AppConfig, resolver: EmoteResolver) -> Self {
        Self {
            inner: Arc::new(SharedStateInner { config, resolver }),
        }
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn resolver(&self) -> &EmoteResolver {
        &self.inner.resolver
    }
}
