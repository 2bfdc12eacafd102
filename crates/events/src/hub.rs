//! Per-session publish/subscribe hub.
//!
//! [`SyncHub`] is the fan-out fabric between the stage engine and its
//! subscribers (display screens, voter phones). It is designed to be
//! shared via `Arc<SyncHub>` across the application.
//!
//! Delivery is at-least-once of the latest state: subscribers with closed
//! channels are skipped silently and cleaned up on their next publish.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, RwLock};

use stage_core::types::DbId;

use crate::update::StageUpdate;

/// Channel sender half for pushing updates to one subscriber.
type UpdateSender = mpsc::UnboundedSender<StageUpdate>;

/// Handle returned by [`SyncHub::subscribe`]; passing it back to
/// [`SyncHub::unsubscribe`] tears the subscription down. Dropping the
/// receiver has the same effect lazily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionToken {
    session_id: DbId,
    subscriber_id: u64,
}

/// Fan-out hub for all live sessions.
///
/// Thread-safe via interior `RwLock`; one registry of subscribers per
/// session id.
pub struct SyncHub {
    sessions: RwLock<HashMap<DbId, HashMap<u64, UpdateSender>>>,
    next_subscriber_id: AtomicU64,
}

impl SyncHub {
    /// Create a new, empty hub.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Subscribe to all updates for `session_id`.
    ///
    /// Returns the receiver half of the update channel together with the
    /// token that identifies this subscription.
    pub async fn subscribe(
        &self,
        session_id: DbId,
    ) -> (SubscriptionToken, mpsc::UnboundedReceiver<StageUpdate>) {
        let subscriber_id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        self.sessions
            .write()
            .await
            .entry(session_id)
            .or_default()
            .insert(subscriber_id, tx);

        let token = SubscriptionToken {
            session_id,
            subscriber_id,
        };
        (token, rx)
    }

    /// Tear down a subscription. Idempotent: repeated calls with the same
    /// token are no-ops.
    pub async fn unsubscribe(&self, token: &SubscriptionToken) {
        let mut sessions = self.sessions.write().await;
        if let Some(subscribers) = sessions.get_mut(&token.session_id) {
            subscribers.remove(&token.subscriber_id);
            if subscribers.is_empty() {
                sessions.remove(&token.session_id);
            }
        }
    }

    /// Push the latest state to every subscriber of `session_id`.
    ///
    /// Subscribers whose channels are closed are dropped from the
    /// registry here rather than erroring the publish.
    pub async fn publish(&self, session_id: DbId, update: StageUpdate) {
        let mut sessions = self.sessions.write().await;
        let Some(subscribers) = sessions.get_mut(&session_id) else {
            return;
        };
        subscribers.retain(|_, tx| tx.send(update.clone()).is_ok());
        if subscribers.is_empty() {
            sessions.remove(&session_id);
        }
    }

    /// Number of live subscribers for a session.
    pub async fn subscriber_count(&self, session_id: DbId) -> usize {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .map_or(0, HashMap::len)
    }

    /// Drop every subscription, closing all update channels.
    ///
    /// Used during graceful shutdown so WebSocket forward tasks observe
    /// end-of-stream and exit.
    pub async fn shutdown_all(&self) {
        let mut sessions = self.sessions.write().await;
        let count: usize = sessions.values().map(HashMap::len).sum();
        sessions.clear();
        tracing::info!(count, "Closed all stage subscriptions");
    }
}

impl Default for SyncHub {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
