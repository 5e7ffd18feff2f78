use std::sync::Arc;

use relay_config::OpenAiConfig;
use relay_core::ShutdownManager;

use crate::agent::AgentClient;
use crate::error::ModelMapError;
use crate::translate::{ModelMapper, RequestTranslator};

/// Shared state for `/v1/*` handlers
#[derive(Clone)]
pub struct OpenAiState {
    inner: Arc<Inner>,
}

struct Inner {
    models: Arc<ModelMapper>,
    translator: RequestTranslator,
    agent: Arc<dyn AgentClient>,
    shutdown: ShutdownManager,
}

impl OpenAiState {
    /// Build state from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the model mapping is not one-to-one
    pub fn new(
        config: &OpenAiConfig,
        agent: Arc<dyn AgentClient>,
        shutdown: ShutdownManager,
    ) -> Result<Self, ModelMapError> {
        let models = Arc::new(ModelMapper::new(config.models.clone())?);
        let translator = RequestTranslator::new(Arc::clone(&models), config.default_permission_mode);

        Ok(Self {
            inner: Arc::new(Inner {
                models,
                translator,
                agent,
                shutdown,
            }),
        })
    }

    pub fn models(&self) -> &ModelMapper {
        &self.inner.models
    }

    pub fn translator(&self) -> &RequestTranslator {
        &self.inner.translator
    }

    pub fn agent(&self) -> &dyn AgentClient {
        self.inner.agent.as_ref()
    }

    pub fn shutdown(&self) -> &ShutdownManager {
        &self.inner.shutdown
    }
}
