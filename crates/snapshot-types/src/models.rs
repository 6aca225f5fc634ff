use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Card theme. Persists per user across days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Pastel,
    Dark,
    Neon,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Pastel, Theme::Dark, Theme::Neon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Pastel => "pastel",
            Theme::Dark => "dark",
            Theme::Neon => "neon",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Theme::ALL.iter().map(|t| t.as_str()).collect();
        write!(f, "invalid theme '{}', choose from: {}", self.0, names.join(", "))
    }
}

impl std::error::Error for UnknownTheme {}

impl FromStr for Theme {
    type Err = UnknownTheme;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pastel" => Ok(Theme::Pastel),
            "dark" => Ok(Theme::Dark),
            "neon" => Ok(Theme::Neon),
            _ => Err(UnknownTheme(s.to_string())),
        }
    }
}

/// The fixed set of moods a user can log for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Positive,
    Neutral,
    Sad,
    Angry,
    Tired,
}

impl Mood {
    /// Prompt order.
    pub const ALL: [Mood; 5] = [Mood::Positive, Mood::Neutral, Mood::Sad, Mood::Angry, Mood::Tired];

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Positive => "😃",
            Mood::Neutral => "😐",
            Mood::Sad => "😢",
            Mood::Angry => "😠",
            Mood::Tired => "😴",
        }
    }

    pub fn from_emoji(emoji: &str) -> Option<Mood> {
        Mood::ALL.into_iter().find(|m| m.emoji() == emoji)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Mood::Positive => "Positive",
            Mood::Neutral => "Neutral",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
            Mood::Tired => "Tired",
        }
    }
}

/// Description for a stored mood value. Anything that isn't one of the
/// known mood emoji (including no mood at all) is "Unknown".
pub fn describe_mood(stored: Option<&str>) -> &'static str {
    match stored.and_then(Mood::from_emoji) {
        Some(mood) => mood.description(),
        None => "Unknown",
    }
}

/// Fixed-shape per-user, per-day reduction handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotData {
    pub username: String,
    pub display_date: String,
    pub theme: Theme,
    pub messages_sent: u64,
    pub top_words: Vec<String>,
    pub top_emoji: String,
    pub mood: String,
    pub mood_description: String,
    pub note: String,
}
