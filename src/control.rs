//! Out-of-band control commands from the controlled page
//!
//! Commands arrive as JSON messages over a reply channel; every command
//! is acknowledged. The channel has no algorithmic content of its own:
//! it dispatches into the store and the lifecycle coordinator.

use crate::config::OfflineConfig;
use crate::error::{OfflineError, Result};
use crate::lifecycle::LifecycleCoordinator;
use crate::store::GenerationStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Control command from the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Force the transition out of the waiting state
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
    /// Query the current version stamp
    #[serde(rename = "GET_VERSION")]
    GetVersion,
    /// Delete all generations unconditionally
    #[serde(rename = "CLEAR_CACHE")]
    ClearCache,
}

/// Reply sent back over the channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlReply {
    Version { version: String },
    Ack { success: bool },
}

/// Handles control commands against the store and lifecycle coordinator
pub struct ControlChannel {
    config: Arc<OfflineConfig>,
    store: GenerationStore,
    lifecycle: Arc<LifecycleCoordinator>,
}

impl ControlChannel {
    /// Create a new ControlChannel
    pub fn new(
        config: Arc<OfflineConfig>,
        store: GenerationStore,
        lifecycle: Arc<LifecycleCoordinator>,
    ) -> Self {
        ControlChannel {
            config,
            store,
            lifecycle,
        }
    }

    /// Dispatch one control command
    pub async fn handle(&self, message: ControlMessage) -> Result<ControlReply> {
        match message {
            ControlMessage::SkipWaiting => {
                info!("Control: skip waiting");
                self.lifecycle.skip_waiting();
                Ok(ControlReply::Ack { success: true })
            }
            ControlMessage::GetVersion => Ok(ControlReply::Version {
                version: self.config.static_cache_name.clone(),
            }),
            ControlMessage::ClearCache => {
                let count = self.store.delete_all().await?;
                info!("Control: cleared {} generations", count);
                Ok(ControlReply::Ack { success: true })
            }
        }
    }

    /// Parse a JSON command, dispatch it, and serialize the reply
    pub async fn handle_json(&self, raw: &str) -> Result<String> {
        let message: ControlMessage = serde_json::from_str(raw)
            .map_err(|e| OfflineError::ParseError(format!("invalid control message: {}", e)))?;
        let reply = self.handle(message).await?;
        serde_json::to_string(&reply)
            .map_err(|e| OfflineError::InternalError(format!("cannot serialize reply: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::NetworkClient;

    fn channel_with_store() -> (ControlChannel, GenerationStore) {
        let config = Arc::new(OfflineConfig::default());
        let store = GenerationStore::new();
        let lifecycle = Arc::new(LifecycleCoordinator::new(
            Arc::clone(&config),
            store.clone(),
            NetworkClient::new(),
        ));
        let channel = ControlChannel::new(config, store.clone(), lifecycle);
        (channel, store)
    }

    #[test]
    fn test_message_wire_format() {
        let msg: ControlMessage = serde_json::from_str(r#"{"type": "SKIP_WAITING"}"#).unwrap();
        assert_eq!(msg, ControlMessage::SkipWaiting);

        let msg: ControlMessage = serde_json::from_str(r#"{"type": "GET_VERSION"}"#).unwrap();
        assert_eq!(msg, ControlMessage::GetVersion);

        let msg: ControlMessage = serde_json::from_str(r#"{"type": "CLEAR_CACHE"}"#).unwrap();
        assert_eq!(msg, ControlMessage::ClearCache);

        assert!(serde_json::from_str::<ControlMessage>(r#"{"type": "REBOOT"}"#).is_err());
    }

    #[tokio::test]
    async fn test_get_version_replies_static_generation_name() {
        let (channel, _) = channel_with_store();
        let reply = channel.handle(ControlMessage::GetVersion).await.unwrap();
        assert_eq!(
            reply,
            ControlReply::Version {
                version: "storefront-static-v1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_clear_cache_deletes_everything() {
        let (channel, store) = channel_with_store();
        store.open_generation("storefront-static-v1").await.unwrap();
        store.open_generation("storefront-dynamic-v1").await.unwrap();

        let reply = channel.handle(ControlMessage::ClearCache).await.unwrap();
        assert_eq!(reply, ControlReply::Ack { success: true });
        assert!(store.list_generation_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handle_json_round_trip() {
        let (channel, _) = channel_with_store();

        let reply = channel
            .handle_json(r#"{"type": "GET_VERSION"}"#)
            .await
            .unwrap();
        assert_eq!(reply, r#"{"version":"storefront-static-v1"}"#);

        let reply = channel
            .handle_json(r#"{"type": "CLEAR_CACHE"}"#)
            .await
            .unwrap();
        assert_eq!(reply, r#"{"success":true}"#);
    }

    #[tokio::test]
    async fn test_handle_json_rejects_garbage() {
        let (channel, _) = channel_with_store();
        let result = channel.handle_json("not json").await;
        assert!(matches!(result, Err(OfflineError::ParseError(_))));
    }
}
