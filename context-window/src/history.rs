//! Past help turns for one definition unit.

use hint_protocol::{Message, Role};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of past turns replayed to the model.
pub const HISTORY_WINDOW: usize = 3;

/// One completed help exchange. Entries are appended, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Code the student had when asking.
    pub code: String,
    /// Hint the model returned.
    pub help: String,
    /// Correlation id issued by the backend; empty for rebuilt entries.
    #[serde(default)]
    pub request_id: String,
}

impl HistoryEntry {
    pub fn new(
        code: impl Into<String>,
        help: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            help: help.into(),
            request_id: request_id.into(),
        }
    }
}

/// The most recent `window` entries, oldest first.
pub fn recent(history: &[HistoryEntry], window: usize) -> &[HistoryEntry] {
    &history[history.len().saturating_sub(window)..]
}

/// Replay of recent turns followed by the live code:
/// `user(code), assistant(help), ..., user(live_code)`.
pub fn prior_messages(history: &[HistoryEntry], window: usize, live_code: &str) -> Vec<Message> {
    let recent = recent(history, window);
    let mut out = Vec::with_capacity(recent.len() * 2 + 1);
    for entry in recent {
        out.push(Message::user(entry.code.clone()));
        out.push(Message::assistant(entry.help.clone()));
    }
    out.push(Message::user(live_code));
    out
}

/// Inverse of [`prior_messages`]: split client-built messages into past
/// turns and the trailing live code.
///
/// Consecutive `user, assistant` pairs become entries; a final lone `user`
/// message is the live code. Anything else is dropped with a warning.
pub fn split_prior_messages(messages: &[Message]) -> (Vec<HistoryEntry>, Option<String>) {
    let mut entries = Vec::new();
    let mut live = None;
    let mut i = 0;
    while i < messages.len() {
        let cur = &messages[i];
        match (cur.role, messages.get(i + 1).map(|m| m.role)) {
            (Role::User, Some(Role::Assistant)) => {
                entries.push(HistoryEntry::new(
                    cur.content.clone(),
                    messages[i + 1].content.clone(),
                    "",
                ));
                i += 2;
            }
            (Role::User, None) => {
                live = Some(cur.content.clone());
                i += 1;
            }
            (role, _) => {
                warn!(index = i, ?role, "ignoring out-of-sequence prior message");
                i += 1;
            }
        }
    }
    (entries, live)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<HistoryEntry> {
        (0..n)
            .map(|i| HistoryEntry::new(format!("code{i}"), format!("help{i}"), format!("id{i}")))
            .collect()
    }

    #[test]
    fn only_last_three_are_replayed_oldest_first() {
        let msgs = prior_messages(&entries(5), HISTORY_WINDOW, "live");
        let contents: Vec<_> = msgs.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            ["code2", "help2", "code3", "help3", "code4", "help4", "live"]
        );
        assert_eq!(msgs[1].role, Role::Assistant);
        assert_eq!(msgs[6].role, Role::User);
    }

    #[test]
    fn split_round_trips_pairs_and_live_code() {
        let msgs = prior_messages(&entries(2), HISTORY_WINDOW, "now");
        let (hist, live) = split_prior_messages(&msgs);
        assert_eq!(hist.len(), 2);
        assert_eq!(hist[1].help, "help1");
        assert!(hist[1].request_id.is_empty());
        assert_eq!(live.as_deref(), Some("now"));
    }

    #[test]
    fn split_skips_stray_messages() {
        let msgs = vec![
            Message::assistant("orphan"),
            Message::user("a"),
            Message::assistant("b"),
        ];
        let (hist, live) = split_prior_messages(&msgs);
        assert_eq!(hist, vec![HistoryEntry::new("a", "b", "")]);
        assert!(live.is_none());
    }
}
