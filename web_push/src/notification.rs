//! Notification payloads and the request envelope for one push message.
//!
//! [`Notification`] mirrors the options dictionary a service worker passes
//! to `ServiceWorkerRegistration.showNotification`. Optional fields are
//! omitted from the serialized form so the encrypted payload stays small;
//! push services commonly cap it at 4 KiB.

use crate::Subscription;
use serde::{Deserialize, Serialize};

/// A web notification as the receiving service worker displays it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renotify: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_interaction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrate: Option<Vec<u32>>,
}

impl Notification {
    /// Creates a notification with the given title and no further options.
    pub fn new<T: Into<String>>(title: T) -> Self {
        Self {
            title: title.into(),
            actions: Vec::new(),
            badge: None,
            body: None,
            data: None,
            dir: None,
            icon: None,
            image: None,
            lang: None,
            renotify: None,
            require_interaction: None,
            silent: None,
            tag: None,
            timestamp: None,
            vibrate: None,
        }
    }
}

/// An action button attached to a notification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Text direction of the displayed notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Auto,
    Ltr,
    Rtl,
}

/// What actually gets serialized and encrypted for the receiver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub notification: Notification,
}

/// Delivery urgency hint, sent as the `Urgency` request header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    VeryLow,
    Low,
    Normal,
    High,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::VeryLow => "very-low",
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
        }
    }
}

/// Everything needed to deliver one push message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WebPushRequest {
    pub subscription: Subscription,
    pub body: MessageBody,
    /// Seconds the push service should retain the message, `TTL` header
    #[serde(default)]
    pub ttl: u64,
    /// Replacement topic, `Topic` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
}
