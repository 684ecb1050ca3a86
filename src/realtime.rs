//! In-process fan-out for connected WebSocket clients.
//!
//! Channels are keyed by a lowercased identity string (user id or email) that
//! the client announces after connecting. The registry lives in process memory
//! and is rebuilt from client re-joins after a restart. Joins are not
//! authenticated; binding channel identity to a verified credential is a
//! hardening task tracked for the auth layer.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum RealtimeEvent {
    /// Full notification document, pushed to the recipient's channel.
    Notification(Value),
    /// Cart badge refresh hint for the owning user.
    CartUpdated { message: String },
    /// Site-wide coupon announcement, delivered to every connected client.
    Coupon { code: String, discount: i64 },
}

#[derive(Clone)]
pub struct Realtime {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<RealtimeEvent>>>>,
    everyone: broadcast::Sender<RealtimeEvent>,
}

impl Default for Realtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Realtime {
    pub fn new() -> Self {
        let (everyone, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            everyone,
        }
    }

    /// Subscribe to a named channel, creating it on first join.
    pub async fn join(&self, target: &str) -> broadcast::Receiver<RealtimeEvent> {
        let key = target.trim().to_lowercase();
        let mut channels = self.channels.write().await;
        channels
            .entry(key)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Stream every client receives regardless of joined channels.
    pub fn subscribe_everyone(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.everyone.subscribe()
    }

    /// Push an event to one channel. Losing the event because nobody is
    /// connected is fine; delivery here is best-effort by contract.
    pub async fn emit_to(&self, target: &str, event: RealtimeEvent) {
        let key = target.trim().to_lowercase();
        let dead = {
            let channels = self.channels.read().await;
            match channels.get(&key) {
                Some(sender) => sender.send(event).is_err(),
                None => {
                    tracing::debug!(channel = %key, "no live channel, event dropped");
                    return;
                }
            }
        };
        if dead {
            // Last subscriber is gone; drop the channel until someone rejoins.
            self.channels.write().await.remove(&key);
        }
    }

    /// Fire-and-forget push to every connected client.
    pub fn broadcast(&self, event: RealtimeEvent) {
        let _ = self.everyone.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_is_case_insensitive() {
        let realtime = Realtime::new();
        let mut rx = realtime.join("Buyer@Example.COM").await;
        realtime
            .emit_to(
                "buyer@example.com",
                RealtimeEvent::CartUpdated {
                    message: "Item added to cart".into(),
                },
            )
            .await;
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, RealtimeEvent::CartUpdated { .. }));
    }

    #[tokio::test]
    async fn emit_to_missing_channel_is_a_noop() {
        let realtime = Realtime::new();
        realtime
            .emit_to(
                "nobody@example.com",
                RealtimeEvent::CartUpdated {
                    message: "ignored".into(),
                },
            )
            .await;
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connection() {
        let realtime = Realtime::new();
        let mut a = realtime.subscribe_everyone();
        let mut b = realtime.subscribe_everyone();
        realtime.broadcast(RealtimeEvent::Coupon {
            code: "SAVE10".into(),
            discount: 10,
        });
        assert!(matches!(a.recv().await.unwrap(), RealtimeEvent::Coupon { .. }));
        assert!(matches!(b.recv().await.unwrap(), RealtimeEvent::Coupon { .. }));
    }

    #[tokio::test]
    async fn dead_channel_is_pruned_after_emit() {
        let realtime = Realtime::new();
        let rx = realtime.join("gone@example.com").await;
        drop(rx);
        realtime
            .emit_to(
                "gone@example.com",
                RealtimeEvent::CartUpdated {
                    message: "dropped".into(),
                },
            )
            .await;
        assert!(
            !realtime
                .channels
                .read()
                .await
                .contains_key("gone@example.com")
        );
    }

    #[test]
    fn events_serialize_with_event_and_data_fields() {
        let event = RealtimeEvent::CartUpdated {
            message: "Item added to cart".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "cart-updated");
        assert_eq!(json["data"]["message"], "Item added to cart");
    }
}
