//! Row types returned by the store.
//! Distinct from snapshot-types so the DB layer stays independent of the wire format.

/// A counter row (word or emoji) with its count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRow {
    pub key: String,
    pub count: u64,
}

/// Raw reduction of one user's day, before presentation defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySummary {
    pub total_messages: u64,
    pub top_words: Vec<String>,
    pub top_emoji: Option<String>,
    pub mood: Option<String>,
    pub note: Option<String>,
}

/// Everything one inbound message contributes to the store, written as a unit.
#[derive(Debug, Clone)]
pub struct MessageActivity<'a> {
    pub user_id: u64,
    pub username: Option<&'a str>,
    pub server_id: u64,
    pub channel_id: u64,
    pub words: &'a [String],
    pub emojis: &'a [String],
}
