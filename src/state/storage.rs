//! State storage implementation
//!
//! This module handles persistence of conversation state between turns, either
//! in Redis or in process memory, including serialization and expiration.

use std::collections::HashMap;
use std::sync::Arc;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use tracing::{debug, warn, error};
use crate::utils::errors::Result;
use crate::config::RedisConfig;
use super::context::ConversationContext;

#[derive(Clone)]
enum Backend {
    Redis {
        connection_manager: redis::aio::ConnectionManager,
        config: RedisConfig,
    },
    Memory(Arc<RwLock<HashMap<i64, ConversationContext>>>),
}

/// Conversation state storage
#[derive(Clone)]
pub struct StateStorage {
    backend: Backend,
    /// TTL used when a context carries no expiry
    default_ttl_seconds: u64,
}

impl StateStorage {
    /// Create a Redis-backed state storage instance
    pub async fn redis(config: RedisConfig, default_ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let connection_manager = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            backend: Backend::Redis {
                connection_manager,
                config,
            },
            default_ttl_seconds,
        })
    }

    /// Create an in-process state storage instance
    pub fn in_memory(default_ttl_seconds: u64) -> Self {
        Self {
            backend: Backend::Memory(Arc::new(RwLock::new(HashMap::new()))),
            default_ttl_seconds,
        }
    }

    /// Save conversation context
    pub async fn save_context(&self, context: &ConversationContext) -> Result<()> {
        debug!(chat_id = context.chat_id, stack = ?context.summary().stack, "Saving context");

        match &self.backend {
            Backend::Memory(map) => {
                map.write().await.insert(context.chat_id, context.clone());
                Ok(())
            }
            Backend::Redis { connection_manager, config } => {
                let key = context_key(config, context.chat_id);
                let serialized = match serde_json::to_string(context) {
                    Ok(data) => data,
                    Err(e) => {
                        error!(chat_id = context.chat_id, error = %e, "Failed to serialize context");
                        return Err(e.into());
                    }
                };

                let ttl_seconds = if let Some(expires_at) = context.expires_at {
                    let duration = expires_at - chrono::Utc::now();
                    std::cmp::max(duration.num_seconds(), 60) as u64 // Minimum 60 seconds
                } else {
                    self.default_ttl_seconds
                };

                let mut conn = connection_manager.clone();
                match conn.set_ex::<_, _, ()>(&key, serialized, ttl_seconds).await {
                    Ok(_) => {
                        debug!(chat_id = context.chat_id, ttl_seconds = ttl_seconds, "Context saved to Redis");
                        Ok(())
                    }
                    Err(e) => {
                        error!(chat_id = context.chat_id, error = %e, "Failed to save context to Redis");
                        Err(e.into())
                    }
                }
            }
        }
    }

    /// Load conversation context; expired contexts are removed and load as `None`
    pub async fn load_context(&self, chat_id: i64) -> Result<Option<ConversationContext>> {
        let context = match &self.backend {
            Backend::Memory(map) => map.read().await.get(&chat_id).cloned(),
            Backend::Redis { connection_manager, config } => {
                let key = context_key(config, chat_id);
                let mut conn = connection_manager.clone();
                let serialized: Option<String> = conn.get(&key).await?;

                match serialized {
                    Some(data) => match serde_json::from_str::<ConversationContext>(&data) {
                        Ok(ctx) => Some(ctx),
                        Err(e) => {
                            // Stale layout from an older release; start over.
                            warn!(chat_id = chat_id, error = %e, "Dropping undecodable context");
                            self.delete_context(chat_id).await?;
                            None
                        }
                    },
                    None => None,
                }
            }
        };

        match context {
            Some(ctx) if ctx.is_expired() => {
                warn!(chat_id = chat_id, expires_at = ?ctx.expires_at, "Context has expired, removing");
                self.delete_context(chat_id).await?;
                Ok(None)
            }
            other => {
                debug!(chat_id = chat_id, found = other.is_some(), "Context loaded");
                Ok(other)
            }
        }
    }

    /// Delete conversation context
    pub async fn delete_context(&self, chat_id: i64) -> Result<()> {
        match &self.backend {
            Backend::Memory(map) => {
                map.write().await.remove(&chat_id);
            }
            Backend::Redis { connection_manager, config } => {
                let mut conn = connection_manager.clone();
                let deleted: u32 = conn.del(context_key(config, chat_id)).await?;
                debug!(chat_id = chat_id, deleted = deleted, "Deleted context");
            }
        }
        Ok(())
    }

    /// Check if context exists for a chat
    pub async fn context_exists(&self, chat_id: i64) -> Result<bool> {
        match &self.backend {
            Backend::Memory(map) => Ok(map.read().await.contains_key(&chat_id)),
            Backend::Redis { connection_manager, config } => {
                let mut conn = connection_manager.clone();
                let exists: bool = conn.exists(context_key(config, chat_id)).await?;
                Ok(exists)
            }
        }
    }

    /// Test the backing connection
    pub async fn test_connection(&self) -> Result<()> {
        if let Backend::Redis { connection_manager, .. } = &self.backend {
            let mut conn = connection_manager.clone();
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        }
        Ok(())
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Redis { .. } => "redis",
            Backend::Memory(_) => "memory",
        }
    }
}

/// Get the Redis key for a chat's context
fn context_key(config: &RedisConfig, chat_id: i64) -> String {
    format!("{}context:{}", config.prefix, chat_id)
}

impl std::fmt::Debug for StateStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("StateStorage");
        s.field("backend", &self.backend_name());
        if let Backend::Redis { config, .. } = &self.backend {
            s.field("config", config);
        }
        s.field("default_ttl_seconds", &self.default_ttl_seconds)
            .finish_non_exhaustive()
    }
}
