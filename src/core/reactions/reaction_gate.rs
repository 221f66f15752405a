// Reaction filtering for interactive prompts.
//
// The Discord layer feeds reactions through `ReactionGate::allows` while
// waiting on a prompt message. Only the prompt, only the listed users, only
// the listed emoji.

use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ReactionGate {
    message_id: u64,
    authorized_users: HashSet<u64>,
    valid_emojis: Vec<String>,
}

impl ReactionGate {
    pub fn new(
        message_id: u64,
        authorized_users: impl IntoIterator<Item = u64>,
        valid_emojis: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            message_id,
            authorized_users: authorized_users.into_iter().collect(),
            valid_emojis: valid_emojis.into_iter().collect(),
        }
    }

    /// Whether a reaction `emoji` from `user_id` on `message_id` should be
    /// accepted.
    pub fn allows(&self, message_id: u64, user_id: u64, emoji: &str) -> bool {
        if message_id != self.message_id {
            tracing::debug!(
                "[Reaction check] Wrong message (expecting {}, got {})",
                self.message_id,
                message_id
            );
            return false;
        }

        if !self.authorized_users.contains(&user_id) {
            tracing::debug!("[Reaction check] Unauthorized user: {}", user_id);
            return false;
        }

        if !self.valid_emojis.iter().any(|valid| valid == emoji) {
            tracing::debug!("[Reaction check] Invalid emoji: {}", emoji);
            return false;
        }

        tracing::debug!("[Reaction check] Check passed!");
        true
    }

    /// Consumes the gate into a closure for collector filters.
    pub fn into_predicate(self) -> impl Fn(u64, u64, &str) -> bool + Send + Sync + 'static {
        move |message_id, user_id, emoji| self.allows(message_id, user_id, emoji)
    }
}
