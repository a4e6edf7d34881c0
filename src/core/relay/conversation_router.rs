// Conversation router - maps DM relay targets back to the operator who
// started the conversation.
//
// The table lives in memory only and is shared across event handlers,
// so it is a DashMap rather than a HashMap behind a lock.

use super::relay_models::{RelayConfig, RelayEntry, RelayNotification};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Mutex;

pub struct ConversationRouter {
    // Target user ID -> who to forward their replies to
    entries: DashMap<u64, RelayEntry>,
    // Serializes registrations so the capacity check and insert are one step
    register_lock: Mutex<()>,
    config: RelayConfig,
}

impl ConversationRouter {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            entries: DashMap::new(),
            register_lock: Mutex::new(()),
            config,
        }
    }

    /// Route future replies from `target_id` to `requester_id`.
    /// A newer registration for the same target replaces the old one.
    pub fn register(&self, requester_id: u64, target_id: u64) {
        self.register_at(requester_id, target_id, Utc::now());
    }

    /// Who should receive replies from `target_id`, if anyone.
    pub fn resolve(&self, target_id: u64) -> Option<u64> {
        self.resolve_at(target_id, Utc::now())
    }

    pub fn is_tracked(&self, user_id: u64) -> bool {
        self.resolve(user_id).is_some()
    }

    /// Build the notification for a reply from a tracked target.
    /// Returns `None` when the sender is not a relay target.
    pub fn route_reply(
        &self,
        target_id: u64,
        replier_name: &str,
        content: &str,
        attachment_urls: &[String],
    ) -> Option<RelayNotification> {
        let requester_id = self.resolve(target_id)?;
        Some(RelayNotification::for_reply(
            requester_id,
            replier_name,
            content,
            attachment_urls,
        ))
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        self.prune_expired_at(Utc::now())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn register_at(&self, requester_id: u64, target_id: u64, now: DateTime<Utc>) {
        // Lookups and pruning only shrink the table, so they skip the lock
        let _guard = self
            .register_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if !self.entries.contains_key(&target_id) && self.entries.len() >= self.config.max_entries
        {
            self.evict_oldest();
        }

        self.entries.insert(
            target_id,
            RelayEntry {
                requester_id,
                registered_at: now,
            },
        );
    }

    fn resolve_at(&self, target_id: u64, now: DateTime<Utc>) -> Option<u64> {
        let entry = self.entries.get(&target_id)?;
        if self.is_expired(&entry, now) {
            // Release the read guard before removing, DashMap would deadlock otherwise
            drop(entry);
            self.entries
                .remove_if(&target_id, |_, e| self.is_expired(e, now));
            return None;
        }
        Some(entry.requester_id)
    }

    fn prune_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !self.is_expired(entry, now));
        before.saturating_sub(self.entries.len())
    }

    fn is_expired(&self, entry: &RelayEntry, now: DateTime<Utc>) -> bool {
        now - entry.registered_at >= self.config.entry_ttl
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.registered_at)
            .map(|entry| *entry.key());

        if let Some(target_id) = oldest {
            tracing::debug!(target_id, "Relay table full, evicting oldest entry");
            self.entries.remove(&target_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn router() -> ConversationRouter {
        ConversationRouter::new(RelayConfig::default())
    }

    #[test]
    fn test_register_then_resolve() {
        let router = router();
        router.register(42, 7);

        assert_eq!(router.resolve(7), Some(42));
        assert!(router.is_tracked(7));
        // The requester is not itself a target
        assert!(!router.is_tracked(42));
    }

    #[test]
    fn test_unknown_target_is_untracked() {
        let router = router();

        assert_eq!(router.resolve(99), None);
        assert!(!router.is_tracked(99));
    }

    #[test]
    fn test_last_writer_wins() {
        let router = router();
        router.register(1, 10);
        router.register(2, 10);

        assert_eq!(router.resolve(10), Some(2));
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_one_requester_many_targets() {
        let router = router();
        router.register(42, 7);
        router.register(42, 8);

        assert_eq!(router.resolve(7), Some(42));
        assert_eq!(router.resolve(8), Some(42));
    }

    #[test]
    fn test_route_reply_addresses_requester() {
        let router = router();
        router.register(42, 7);

        let notification = router
            .route_reply(7, "alice", "sure, see you then", &[])
            .expect("user 7 is tracked");

        assert_eq!(notification.requester_id, 42);
        assert_eq!(notification.lines, vec!["alice replied: sure, see you then"]);
    }

    #[test]
    fn test_route_reply_with_attachments() {
        let router = router();
        router.register(42, 7);

        let urls = vec![
            "https://cdn.example/a.png".to_string(),
            "https://cdn.example/b.png".to_string(),
        ];
        let notification = router.route_reply(7, "alice", "", &urls).unwrap();

        assert_eq!(
            notification.lines,
            vec!["alice sent an attachment: \nhttps://cdn.example/a.png\nhttps://cdn.example/b.png"]
        );
    }

    #[test]
    fn test_route_reply_from_untracked_user() {
        let router = router();

        assert!(router.route_reply(7, "alice", "hello?", &[]).is_none());
    }

    #[test]
    fn test_expired_entries_resolve_to_none() {
        let router = router();
        let start = Utc::now();
        router.register_at(42, 7, start);

        let just_before = start + Duration::days(7) - Duration::seconds(1);
        assert_eq!(router.resolve_at(7, just_before), Some(42));

        let after = start + Duration::days(7);
        assert_eq!(router.resolve_at(7, after), None);
        // The lookup also removed it
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn test_reregistering_refreshes_ttl() {
        let router = router();
        let start = Utc::now();
        router.register_at(42, 7, start);
        router.register_at(43, 7, start + Duration::days(6));

        assert_eq!(router.resolve_at(7, start + Duration::days(8)), Some(43));
    }

    #[test]
    fn test_prune_expired() {
        let router = router();
        let start = Utc::now();
        router.register_at(1, 10, start);
        router.register_at(2, 20, start + Duration::days(5));

        let removed = router.prune_expired_at(start + Duration::days(8));

        assert_eq!(removed, 1);
        assert_eq!(router.resolve_at(20, start + Duration::days(8)), Some(2));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let router = ConversationRouter::new(RelayConfig {
            max_entries: 2,
            ..Default::default()
        });
        let start = Utc::now();
        router.register_at(1, 10, start);
        router.register_at(2, 20, start + Duration::seconds(1));
        router.register_at(3, 30, start + Duration::seconds(2));

        assert_eq!(router.len(), 2);
        assert_eq!(router.resolve(10), None);
        assert_eq!(router.resolve(20), Some(2));
        assert_eq!(router.resolve(30), Some(3));
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let router = ConversationRouter::new(RelayConfig {
            max_entries: 2,
            ..Default::default()
        });
        router.register(1, 10);
        router.register(2, 20);
        router.register(3, 20);

        assert_eq!(router.resolve(10), Some(1));
        assert_eq!(router.resolve(20), Some(3));
    }

    #[tokio::test]
    async fn test_concurrent_registrations() {
        use std::sync::Arc;

        let router = Arc::new(router());
        let mut handles = Vec::new();
        for requester in 0..32u64 {
            let router = Arc::clone(&router);
            handles.push(tokio::spawn(async move {
                router.register(requester, requester % 4);
                router.resolve(requester % 4)
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }

        assert_eq!(router.len(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_respect_capacity() {
        use std::sync::Arc;

        let router = Arc::new(ConversationRouter::new(RelayConfig {
            max_entries: 4,
            ..Default::default()
        }));
        let mut handles = Vec::new();
        for target in 0..64u64 {
            let router = Arc::clone(&router);
            handles.push(tokio::spawn(async move {
                router.register(1, target);
                router.len()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap() <= 4);
        }

        assert_eq!(router.len(), 4);
    }
}
