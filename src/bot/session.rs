//! Per-user conversation state tracking.
//!
//! The bot asks the user for input ("enter the text to encrypt") and has to
//! remember, per user, how to interpret the next free-text message. That
//! flag lives in an explicit keyed map with atomic per-key transitions
//! rather than in the framework's dialogue storage, so the transition rules
//! are visible and testable in one place.

use moka::future::Cache;
use std::time::Duration;
use teloxide::types::UserId;

/// How long an armed state survives without the follow-up message.
///
/// An expired entry reads as [`ConversationState::Idle`], which is exactly
/// what a fresh session looks like, so expiry never changes observable
/// semantics; it only stops the map from growing without bound.
const SESSION_TTL_SECS: u64 = 3600;

/// Upper bound on concurrently tracked users.
const MAX_TRACKED_SESSIONS: u64 = 100_000;

/// What the next free-text message from a user means.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConversationState {
    /// No pending request; idle messages go through encoded-text detection.
    #[default]
    Idle,
    /// The user pressed Encrypt; the next message is plaintext to encode.
    AwaitingEncodeInput,
    /// The user pressed Decrypt; the next message is a candidate to decode.
    AwaitingDecodeInput,
}

/// Keyed state map with atomic per-user transitions.
///
/// Absent keys read as [`ConversationState::Idle`]; `Idle` is never stored.
/// Telegram delivers one update at a time per user, so the only concurrency
/// the map has to survive is updates from *different* users, which the
/// underlying cache handles without external locking.
#[derive(Clone)]
pub struct SessionTracker {
    states: Cache<UserId, ConversationState>,
}

impl SessionTracker {
    /// Creates a tracker with the default capacity and TTL bounds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Cache::builder()
                .max_capacity(MAX_TRACKED_SESSIONS)
                .time_to_live(Duration::from_secs(SESSION_TTL_SECS))
                .build(),
        }
    }

    /// Arms `state` for `user`, replacing whatever was pending.
    ///
    /// Arming `Idle` clears the entry instead of storing it.
    pub async fn set(&self, user: UserId, state: ConversationState) {
        if state == ConversationState::Idle {
            self.states.invalidate(&user).await;
        } else {
            self.states.insert(user, state).await;
        }
    }

    /// Consumes the pending state for `user`, resetting it to `Idle`.
    ///
    /// The remove is atomic per key: two racing takes see the armed state
    /// at most once.
    pub async fn take(&self, user: UserId) -> ConversationState {
        self.states.remove(&user).await.unwrap_or_default()
    }

    /// Reads the pending state for `user` without consuming it.
    pub async fn current(&self, user: UserId) -> ConversationState {
        self.states.get(&user).await.unwrap_or_default()
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);

    #[tokio::test]
    async fn fresh_user_is_idle() {
        let tracker = SessionTracker::new();
        assert_eq!(tracker.current(ALICE).await, ConversationState::Idle);
        assert_eq!(tracker.take(ALICE).await, ConversationState::Idle);
    }

    #[tokio::test]
    async fn take_consumes_armed_state() {
        let tracker = SessionTracker::new();
        tracker.set(ALICE, ConversationState::AwaitingEncodeInput).await;

        assert_eq!(
            tracker.take(ALICE).await,
            ConversationState::AwaitingEncodeInput
        );
        // Consumed: the next read is Idle again.
        assert_eq!(tracker.current(ALICE).await, ConversationState::Idle);
    }

    #[tokio::test]
    async fn arming_replaces_previous_state() {
        let tracker = SessionTracker::new();
        tracker.set(ALICE, ConversationState::AwaitingEncodeInput).await;
        tracker.set(ALICE, ConversationState::AwaitingDecodeInput).await;

        assert_eq!(
            tracker.take(ALICE).await,
            ConversationState::AwaitingDecodeInput
        );
    }

    #[tokio::test]
    async fn arming_idle_clears_the_entry() {
        let tracker = SessionTracker::new();
        tracker.set(ALICE, ConversationState::AwaitingDecodeInput).await;
        tracker.set(ALICE, ConversationState::Idle).await;

        assert_eq!(tracker.take(ALICE).await, ConversationState::Idle);
    }

    #[tokio::test]
    async fn users_are_tracked_independently() {
        let tracker = SessionTracker::new();
        tracker.set(ALICE, ConversationState::AwaitingEncodeInput).await;

        assert_eq!(tracker.current(BOB).await, ConversationState::Idle);
        assert_eq!(
            tracker.take(ALICE).await,
            ConversationState::AwaitingEncodeInput
        );
    }
}
