use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CEFR proficiency level a dictionary entry is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::A1, Level::A2, Level::B1, Level::B2];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
        }
    }
}

impl FromStr for Level {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "A1" => Ok(Level::A1),
            "A2" => Ok(Level::A2),
            "B1" => Ok(Level::B1),
            "B2" => Ok(Level::B2),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable vocabulary entry. The exact `greek` string is the identity key
/// everywhere; there is no numeric id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub greek: String,
    pub english: String,
    #[serde(default, rename = "pos", skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
}

impl WordRecord {
    pub fn new(greek: impl Into<String>, english: impl Into<String>) -> Self {
        Self {
            greek: greek.into(),
            english: english.into(),
            part_of_speech: None,
            level: None,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("dictionary read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("dictionary parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The static dictionary corpus: an ordered, immutable collection loaded once
/// at startup.
#[derive(Debug)]
pub struct Lexicon {
    entries: Vec<WordRecord>,
}

impl Lexicon {
    pub fn from_entries(entries: Vec<WordRecord>) -> Self {
        Self { entries }
    }

    /// Loads the corpus from a JSON array file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<WordRecord> = serde_json::from_str(&raw)?;
        Ok(Self::from_entries(entries))
    }

    /// Loads from `path`, falling back to the built-in seed corpus if the file
    /// is missing or malformed.
    pub fn load_or_seed(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(lexicon) => {
                tracing::info!(
                    path = %path.as_ref().display(),
                    entries = lexicon.len(),
                    "dictionary loaded"
                );
                lexicon
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.as_ref().display(),
                    error = %err,
                    "dictionary unavailable, using seed corpus"
                );
                Self::seed()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[WordRecord] {
        &self.entries
    }

    /// Exact-key lookup by the greek string.
    pub fn lookup(&self, greek: &str) -> Option<&WordRecord> {
        self.entries.iter().find(|entry| entry.greek == greek)
    }

    pub fn at_level(&self, level: Level) -> impl Iterator<Item = &WordRecord> {
        self.entries
            .iter()
            .filter(move |entry| entry.level == Some(level))
    }

    /// Substring search over both sides of an entry. The greek side matches the
    /// exact written form (case- and diacritic-sensitive); the english side is
    /// case-insensitive.
    pub fn search(&self, query: &str, level: Option<Level>) -> Vec<&WordRecord> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let query_lower = query.to_lowercase();

        self.entries
            .iter()
            .filter(|entry| level.is_none() || entry.level == level)
            .filter(|entry| {
                entry.greek.contains(query) || entry.english.to_lowercase().contains(&query_lower)
            })
            .collect()
    }

    /// Built-in corpus used when no dictionary file is configured. Covers all
    /// four levels so daily practice and search remain usable out of the box.
    pub fn seed() -> Self {
        let entry = |greek: &str, english: &str, pos: &str, level: Level| WordRecord {
            greek: greek.to_string(),
            english: english.to_string(),
            part_of_speech: Some(pos.to_string()),
            level: Some(level),
        };

        Self::from_entries(vec![
            entry("γεια", "hello", "interjection", Level::A1),
            entry("ναι", "yes", "adverb", Level::A1),
            entry("όχι", "no", "adverb", Level::A1),
            entry("νερό", "water", "noun", Level::A1),
            entry("ψωμί", "bread", "noun", Level::A1),
            entry("σπίτι", "house", "noun", Level::A1),
            entry("μέρα", "day", "noun", Level::A1),
            entry("νύχτα", "night", "noun", Level::A1),
            entry("καλός", "good", "adjective", Level::A1),
            entry("μεγάλος", "big", "adjective", Level::A1),
            entry("μικρός", "small", "adjective", Level::A1),
            entry("τρώω", "to eat", "verb", Level::A1),
            entry("πίνω", "to drink", "verb", Level::A1),
            entry("ευχαριστώ", "thank you", "interjection", Level::A1),
            entry("δουλειά", "work", "noun", Level::A2),
            entry("ταξίδι", "trip", "noun", Level::A2),
            entry("αγοράζω", "to buy", "verb", Level::A2),
            entry("ακριβός", "expensive", "adjective", Level::A2),
            entry("φτηνός", "cheap", "adjective", Level::A2),
            entry("καιρός", "weather", "noun", Level::A2),
            entry("γειτονιά", "neighborhood", "noun", Level::B1),
            entry("προτείνω", "to suggest", "verb", Level::B1),
            entry("συνήθεια", "habit", "noun", Level::B1),
            entry("απόφαση", "decision", "noun", Level::B1),
            entry("εμπειρία", "experience", "noun", Level::B1),
            entry("περιβάλλον", "environment", "noun", Level::B1),
            entry("ενδεχομένως", "possibly", "adverb", Level::B2),
            entry("επιχείρηση", "enterprise", "noun", Level::B2),
            entry("αντιμετωπίζω", "to confront", "verb", Level::B2),
            entry("προϋπόθεση", "precondition", "noun", Level::B2),
        ])
    }
}
