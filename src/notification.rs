//! Push notification payload plumbing
//!
//! Thin mapping from the push payload to the display options the host
//! renders. Icon, badge, vibration, and actions are fixed.

use serde::{Deserialize, Serialize};

/// Payload carried by an incoming push message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
}

/// One notification action button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Display options handed to the host's notification renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDisplay {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub actions: Vec<NotificationAction>,
}

impl NotificationDisplay {
    /// Build display options from a push payload
    pub fn from_payload(payload: NotificationPayload) -> Self {
        NotificationDisplay {
            title: payload.title,
            body: payload.body,
            icon: "/img/icons/icon-192.png".to_string(),
            badge: "/img/icons/badge-72.png".to_string(),
            vibrate: vec![100, 50, 100],
            actions: vec![
                NotificationAction {
                    action: "explore".to_string(),
                    title: "Ver ofertas".to_string(),
                },
                NotificationAction {
                    action: "close".to_string(),
                    title: "Cerrar".to_string(),
                },
            ],
        }
    }
}
