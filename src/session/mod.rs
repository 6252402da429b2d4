//! Practice session machine: a shuffled pass over a list's unlearned words
//! with a wraparound cursor, a per-card phase gate, and multiple-choice
//! distractors drawn from the surrounding list and the lexicon.
//!
//! The shuffle survives restarts through a versioned snapshot. A stored
//! snapshot is reused only when it still describes the same set of available
//! words; any divergence discards it and reshuffles.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::lexicon::{Lexicon, WordRecord};
use crate::services::lists::{List, ListError, ListService};

pub const SNAPSHOT_VERSION: u32 = 1;
pub const DISTRACTOR_COUNT: usize = 2;
pub const MAX_LEARNING_POINTS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PracticeMode {
    GreekToEnglish,
    EnglishToGreek,
    MultipleChoice,
}

impl PracticeMode {
    /// Both flashcard directions share the prompt/reveal cycle; multiple
    /// choice answers instead of revealing.
    pub fn is_flashcards(self) -> bool {
        matches!(
            self,
            PracticeMode::GreekToEnglish | PracticeMode::EnglishToGreek
        )
    }
}

/// Where the current card stands. Marking a word learned is only allowed once
/// the user has actually seen the answer.
#[derive(Debug, Clone, PartialEq)]
pub enum CardPhase {
    Prompt,
    Revealed,
    Answered { selected: String, correct: bool },
}

impl CardPhase {
    fn answer_seen(&self) -> bool {
        !matches!(self, CardPhase::Prompt)
    }
}

/// Persistable shuffle state. `version` gates deserialization across format
/// changes; an unknown version is treated as no snapshot at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub version: u32,
    pub list_id: String,
    pub available_keys: Vec<String>,
    pub word_order: Vec<String>,
    pub current_index: usize,
}

impl SessionSnapshot {
    /// A snapshot is only good for reuse when it was taken over exactly the
    /// same set of available words, order aside.
    fn matches(&self, list_id: &str, available: &[String]) -> bool {
        if self.version != SNAPSHOT_VERSION || self.list_id != list_id {
            return false;
        }
        let stored: HashSet<&str> = self.available_keys.iter().map(String::as_str).collect();
        let current: HashSet<&str> = available.iter().map(String::as_str).collect();
        stored == current
    }
}

pub trait SnapshotStore: Send + Sync {
    fn load(&self, user_id: &str, list_id: &str) -> Option<SessionSnapshot>;
    fn save(&self, user_id: &str, snapshot: SessionSnapshot);
    fn clear(&self, user_id: &str, list_id: &str);
}

/// Process-local snapshot store. Sessions are ephemeral; losing these on
/// restart only costs a reshuffle.
#[derive(Default)]
pub struct MemorySnapshots {
    inner: parking_lot::Mutex<HashMap<(String, String), SessionSnapshot>>,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshots {
    fn load(&self, user_id: &str, list_id: &str) -> Option<SessionSnapshot> {
        self.inner
            .lock()
            .get(&(user_id.to_string(), list_id.to_string()))
            .cloned()
    }

    fn save(&self, user_id: &str, snapshot: SessionSnapshot) {
        self.inner
            .lock()
            .insert((user_id.to_string(), snapshot.list_id.clone()), snapshot);
    }

    fn clear(&self, user_id: &str, list_id: &str) {
        self.inner
            .lock()
            .remove(&(user_id.to_string(), list_id.to_string()));
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionActionError {
    #[error("action not allowed in the current card phase")]
    NotAllowed,
    #[error("session state diverged from the list; restart the session")]
    ResyncRequired,
    #[error(transparent)]
    Backend(#[from] ListError),
}

/// Builds the option set for a multiple-choice card: the correct answer plus
/// distractors, preferring words from the same list and topping up from the
/// lexicon. Options are deduplicated by English text so two cards can never
/// read the same.
pub fn choice_options<R: Rng + ?Sized>(
    correct: &WordRecord,
    list: &List,
    lexicon: &Lexicon,
    rng: &mut R,
) -> Vec<WordRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(correct.english.clone());
    let mut distractors: Vec<WordRecord> = Vec::new();

    let mut same_list: Vec<&WordRecord> = list
        .words
        .iter()
        .filter(|word| word.greek != correct.greek)
        .collect();
    same_list.shuffle(rng);
    for word in same_list {
        if distractors.len() == DISTRACTOR_COUNT {
            break;
        }
        if seen.insert(word.english.clone()) {
            distractors.push(word.clone());
        }
    }

    if distractors.len() < DISTRACTOR_COUNT {
        let mut from_lexicon: Vec<&WordRecord> = lexicon
            .entries()
            .iter()
            .filter(|word| word.greek != correct.greek)
            .collect();
        from_lexicon.shuffle(rng);
        for word in from_lexicon {
            if distractors.len() == DISTRACTOR_COUNT {
                break;
            }
            if seen.insert(word.english.clone()) {
                distractors.push(word.clone());
            }
        }
    }

    let mut options = distractors;
    options.push(correct.clone());
    options.shuffle(rng);
    options
}

pub struct Session {
    user_id: String,
    list: List,
    mode: PracticeMode,
    order: Vec<String>,
    cursor: usize,
    phase: CardPhase,
    options: Vec<WordRecord>,
    points: HashMap<String, u8>,
    complete: bool,
    lexicon: Arc<Lexicon>,
}

impl Session {
    /// Opens a session over the list's unlearned words. A matching snapshot
    /// restores the previous shuffle and position; otherwise a fresh shuffle
    /// is drawn and snapshotted.
    pub fn start<R: Rng + ?Sized>(
        user_id: &str,
        list: List,
        mode: PracticeMode,
        snapshots: &dyn SnapshotStore,
        lexicon: Arc<Lexicon>,
        rng: &mut R,
    ) -> Self {
        let available: Vec<String> = list
            .available_words()
            .into_iter()
            .map(|word| word.greek.clone())
            .collect();

        let mut session = Session {
            user_id: user_id.to_string(),
            list,
            mode,
            order: Vec::new(),
            cursor: 0,
            phase: CardPhase::Prompt,
            options: Vec::new(),
            points: HashMap::new(),
            complete: available.is_empty(),
            lexicon,
        };
        if session.complete {
            snapshots.clear(user_id, &session.list.id);
            return session;
        }

        match snapshots.load(user_id, &session.list.id) {
            Some(snapshot)
                if snapshot.matches(&session.list.id, &available)
                    && !snapshot.word_order.is_empty() =>
            {
                session.cursor = snapshot.current_index % snapshot.word_order.len();
                session.order = snapshot.word_order;
            }
            _ => {
                let mut order = available;
                order.shuffle(rng);
                session.order = order;
                session.save_snapshot(snapshots);
            }
        }
        session.refresh_options(rng);
        session
    }

    fn save_snapshot(&self, snapshots: &dyn SnapshotStore) {
        snapshots.save(
            &self.user_id,
            SessionSnapshot {
                version: SNAPSHOT_VERSION,
                list_id: self.list.id.clone(),
                available_keys: self.order.clone(),
                word_order: self.order.clone(),
                current_index: self.cursor,
            },
        );
    }

    fn refresh_options<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.options = match (self.mode, self.current_card()) {
            (PracticeMode::MultipleChoice, Some(word)) => {
                let word = word.clone();
                choice_options(&word, &self.list, &self.lexicon, rng)
            }
            _ => Vec::new(),
        };
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn mode(&self) -> PracticeMode {
        self.mode
    }

    pub fn phase(&self) -> &CardPhase {
        &self.phase
    }

    pub fn options(&self) -> &[WordRecord] {
        &self.options
    }

    pub fn remaining(&self) -> usize {
        self.order.len()
    }

    pub fn current_card(&self) -> Option<&WordRecord> {
        if self.complete {
            return None;
        }
        let key = self.order.get(self.cursor)?;
        self.list.words.iter().find(|word| &word.greek == key)
    }

    /// The side of the current card shown before the reveal. Multiple choice
    /// always prompts with the Greek word.
    pub fn prompt_text(&self) -> Option<&str> {
        let word = self.current_card()?;
        Some(match self.mode {
            PracticeMode::EnglishToGreek => word.english.as_str(),
            _ => word.greek.as_str(),
        })
    }

    /// The hidden side of the current card, the one the user is producing.
    pub fn answer_text(&self) -> Option<&str> {
        let word = self.current_card()?;
        Some(match self.mode {
            PracticeMode::EnglishToGreek => word.greek.as_str(),
            _ => word.english.as_str(),
        })
    }

    pub fn learning_points(&self, greek: &str) -> u8 {
        self.points.get(greek).copied().unwrap_or(0)
    }

    /// One point per completed reveal or correct answer. Reaching the cap
    /// never marks the word learned by itself; that stays an explicit action.
    fn award_point(&mut self) {
        let Some(greek) = self.order.get(self.cursor).cloned() else {
            return;
        };
        let entry = self.points.entry(greek).or_insert(0);
        *entry = (*entry + 1).min(MAX_LEARNING_POINTS);
    }

    pub fn reveal(&mut self) -> Result<(), SessionActionError> {
        if self.complete || !self.mode.is_flashcards() || self.phase != CardPhase::Prompt {
            return Err(SessionActionError::NotAllowed);
        }
        self.phase = CardPhase::Revealed;
        self.award_point();
        Ok(())
    }

    /// Answers the current multiple-choice card by English text.
    pub fn answer(&mut self, selected: &str) -> Result<bool, SessionActionError> {
        if self.complete
            || self.mode != PracticeMode::MultipleChoice
            || self.phase != CardPhase::Prompt
        {
            return Err(SessionActionError::NotAllowed);
        }
        let correct = self
            .current_card()
            .map(|word| word.english == selected)
            .unwrap_or(false);
        self.phase = CardPhase::Answered {
            selected: selected.to_string(),
            correct,
        };
        if correct {
            self.award_point();
        }
        Ok(correct)
    }

    /// Moves to the next available card, wrapping past the end of the order.
    pub fn advance<R: Rng + ?Sized>(&mut self, snapshots: &dyn SnapshotStore, rng: &mut R) {
        if self.complete {
            return;
        }
        self.cursor = (self.cursor + 1) % self.order.len();
        self.phase = CardPhase::Prompt;
        self.save_snapshot(snapshots);
        self.refresh_options(rng);
    }

    /// Explicit user-requested reshuffle: always draws a fresh permutation
    /// and resets the cursor, replacing the stored snapshot.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, snapshots: &dyn SnapshotStore, rng: &mut R) {
        if self.complete {
            return;
        }
        self.order.shuffle(rng);
        self.cursor = 0;
        self.phase = CardPhase::Prompt;
        self.save_snapshot(snapshots);
        self.refresh_options(rng);
    }

    /// Marks the current word learned in the backing list. Gated on the user
    /// having seen the answer. On success the word leaves the rotation; an
    /// empty rotation completes the session.
    pub async fn mark_current_learned<R: Rng + ?Sized>(
        &mut self,
        lists: &ListService,
        snapshots: &dyn SnapshotStore,
        rng: &mut R,
    ) -> Result<(), SessionActionError> {
        if self.complete || !self.phase.answer_seen() {
            return Err(SessionActionError::NotAllowed);
        }
        let greek = match self.order.get(self.cursor) {
            Some(key) => key.clone(),
            None => return Err(SessionActionError::ResyncRequired),
        };

        let updated = match lists.mark_learned(&self.user_id, &self.list.id, &greek).await {
            Ok(list) => list,
            Err(ListError::NotFound(_)) => return Err(SessionActionError::ResyncRequired),
            Err(err) => return Err(SessionActionError::Backend(err)),
        };
        self.list = updated;

        self.order.retain(|key| *key != greek);
        if self.order.is_empty() {
            self.complete = true;
            self.options.clear();
            snapshots.clear(&self.user_id, &self.list.id);
            return Ok(());
        }
        if self.cursor >= self.order.len() {
            self.cursor = 0;
        }
        self.phase = CardPhase::Prompt;
        self.save_snapshot(snapshots);
        self.refresh_options(rng);
        Ok(())
    }
}
