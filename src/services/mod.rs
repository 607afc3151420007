//! Services module
//!
//! This module contains the external collaborators and wires them together

pub mod qna;

pub use qna::{QnaMakerService, QueryOptions, QueryResult};

use tracing::info;
use crate::config::settings::Settings;
use crate::state::{DialogStack, StateStorage};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct ServiceFactory {
    pub qna_service: QnaMakerService,
    pub state_storage: StateStorage,
    pub dialogs: DialogStack,
}

impl ServiceFactory {
    /// Create a new ServiceFactory, connecting to Redis when configured
    pub async fn new(settings: &Settings) -> Result<Self> {
        let state_storage = match &settings.redis {
            Some(redis) => StateStorage::redis(redis.clone(), settings.state.ttl_seconds).await?,
            None => StateStorage::in_memory(settings.state.ttl_seconds),
        };
        info!(backend = state_storage.backend_name(), "State storage ready");

        Self::with_storage(settings, state_storage)
    }

    /// Create a ServiceFactory around an existing storage
    pub fn with_storage(settings: &Settings, state_storage: StateStorage) -> Result<Self> {
        Ok(Self {
            qna_service: QnaMakerService::new(&settings.qna)?,
            state_storage,
            dialogs: DialogStack::new(settings.state.ttl_seconds),
        })
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let storage_healthy = self.state_storage.test_connection().await.is_ok();

        ServiceHealthStatus {
            storage_healthy,
            storage_backend: self.state_storage.backend_name(),
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub storage_healthy: bool,
    pub storage_backend: &'static str,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.storage_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.storage_healthy {
            issues.push(format!("{} state storage unreachable", self.storage_backend));
        }

        issues
    }
}
