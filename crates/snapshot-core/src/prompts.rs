use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use snapshot_types::UserId;
use snapshot_types::events::ReactionEvent;
use snapshot_types::models::Mood;
use tokio::sync::oneshot;
use tracing::debug;

/// How a mood prompt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    Selected(Mood),
    TimedOut,
    /// A newer prompt for the same user took over before this one resolved.
    Superseded,
}

/// Outstanding mood prompts, at most one per user.
///
/// A prompt resolves only on a reaction from the same user, on the prompt's
/// own message, with one of the mood emoji. Anything else leaves it pending.
/// The map lock is never held across an await.
#[derive(Clone, Default)]
pub struct MoodPrompts {
    inner: Arc<PromptsInner>,
}

#[derive(Default)]
struct PromptsInner {
    /// user_id -> pending prompt
    pending: Mutex<HashMap<UserId, Pending>>,
    next_ticket: AtomicU64,
}

struct Pending {
    ticket: u64,
    message_id: u64,
    tx: oneshot::Sender<Mood>,
}

/// Unregisters a prompt when its waiter goes away, however it ends
/// (resolved, timed out, or cancelled by a dropped request).
struct PendingGuard<'a> {
    prompts: &'a MoodPrompts,
    user_id: UserId,
    ticket: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = self.prompts.lock();
        if pending.get(&self.user_id).is_some_and(|p| p.ticket == self.ticket) {
            pending.remove(&self.user_id);
        }
    }
}

impl MoodPrompts {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, Pending>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wait up to `timeout` for the user to pick a mood on `message_id`.
    pub async fn await_mood(
        &self,
        user_id: UserId,
        message_id: u64,
        timeout: Duration,
    ) -> PromptOutcome {
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();

        // Replacing drops the old sender, which wakes the old waiter as superseded
        self.lock().insert(user_id, Pending { ticket, message_id, tx });
        let _guard = PendingGuard { prompts: self, user_id, ticket };

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(mood)) => PromptOutcome::Selected(mood),
            Ok(Err(_)) => PromptOutcome::Superseded,
            Err(_) => {
                debug!(user_id, message_id, "Mood prompt timed out");
                PromptOutcome::TimedOut
            }
        }
    }

    /// Route a reaction to a waiting prompt. Returns true if it resolved one.
    pub fn resolve(&self, reaction: &ReactionEvent) -> bool {
        let Some(mood) = Mood::from_emoji(&reaction.emoji) else {
            return false;
        };

        let mut pending = self.lock();
        let matches = pending
            .get(&reaction.user_id)
            .is_some_and(|p| p.message_id == reaction.message_id);
        if !matches {
            return false;
        }

        match pending.remove(&reaction.user_id) {
            Some(p) => p.tx.send(mood).is_ok(),
            None => false,
        }
    }

    pub fn is_pending(&self, user_id: UserId) -> bool {
        self.lock().contains_key(&user_id)
    }
}
