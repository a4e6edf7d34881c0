// Relay domain models - who asked the bot to DM whom.

use chrono::{DateTime, Duration, Utc};

/// One active relay: replies from the target go back to the requester.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayEntry {
    pub requester_id: u64,
    pub registered_at: DateTime<Utc>,
}

/// Limits that keep the relay table from growing forever.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// How long a relay stays active after the DM was sent
    pub entry_ttl: Duration,
    /// Maximum number of tracked targets
    pub max_entries: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            entry_ttl: Duration::days(7),
            max_entries: 10_000,
        }
    }
}

/// Formatted lines to forward to a requester.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayNotification {
    pub requester_id: u64,
    pub lines: Vec<String>,
}

impl RelayNotification {
    /// Build the lines for a reply. Text and attachments are forwarded as
    /// separate messages; an empty reply produces no lines.
    pub fn for_reply(
        requester_id: u64,
        replier_name: &str,
        content: &str,
        attachment_urls: &[String],
    ) -> Self {
        let mut lines = Vec::new();

        if !content.is_empty() {
            lines.push(format!("{} replied: {}", replier_name, content));
        }
        if !attachment_urls.is_empty() {
            lines.push(format!(
                "{} sent an attachment: \n{}",
                replier_name,
                attachment_urls.join("\n")
            ));
        }

        Self {
            requester_id,
            lines,
        }
    }
}
