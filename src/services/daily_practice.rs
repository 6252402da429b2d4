//! The daily practice generator: up to ten lexicon words at the user's chosen
//! level, sampled once per calendar day and regenerated on a level change.
//! Words already in the user's learned list never appear.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::lexicon::{Level, Lexicon, WordRecord};
use crate::services::lists::{List, ListError, ListService};
use crate::services::progress::today_key;
use crate::store::{DataKind, JsonStore, StoreError};

pub const DAILY_PRACTICE_SIZE: usize = 10;
pub const DAILY_PRACTICE_LIST_ID: &str = "daily-practice";

const TOPICS: [&str; 5] = [
    "Everyday Words",
    "Getting Around",
    "People and Places",
    "Food and Home",
    "Mixed Review",
];

/// Display label rotating with the calendar day.
fn topic_for(date: &str) -> &'static str {
    let sum: usize = date.bytes().map(usize::from).sum();
    TOPICS[sum % TOPICS.len()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPractice {
    pub level: Level,
    pub topic: String,
    pub generated_on: String,
    pub words: Vec<WordRecord>,
}

impl DailyPractice {
    /// Presents the day's selection as a read-only list so the session machine
    /// can run over it like any other list.
    pub fn as_practice_list(&self) -> List {
        List {
            id: DAILY_PRACTICE_LIST_ID.to_string(),
            name: format!("Today's {} Practice", self.level),
            words: self.words.clone(),
            learned_words: Vec::new(),
            created_at: self.generated_on.clone(),
            is_default: false,
            is_topic: true,
        }
    }
}

/// What the client should do next: pick a level, or practice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PracticeStatus {
    NeedsSetup,
    Ready { practice: DailyPractice },
}

#[derive(Debug, thiserror::Error)]
pub enum PracticeError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Lists(#[from] ListError),
}

fn sample_words(lexicon: &Lexicon, level: Level, learned: &[String]) -> Vec<WordRecord> {
    let pool: Vec<&WordRecord> = lexicon
        .at_level(level)
        .filter(|word| !learned.iter().any(|key| *key == word.greek))
        .collect();
    let mut rng = rand::rng();
    pool.choose_multiple(&mut rng, DAILY_PRACTICE_SIZE)
        .map(|word| (*word).clone())
        .collect()
}

#[derive(Clone)]
pub struct PracticeService {
    store: Arc<JsonStore>,
    lists: ListService,
    lexicon: Arc<Lexicon>,
}

impl PracticeService {
    pub fn new(store: Arc<JsonStore>, lists: ListService, lexicon: Arc<Lexicon>) -> Self {
        Self {
            store,
            lists,
            lexicon,
        }
    }

    /// Today's practice, regenerated in place when the stored one is stale.
    /// `NeedsSetup` until the user has ever chosen a level.
    pub async fn get(&self, user_id: &str) -> Result<PracticeStatus, PracticeError> {
        let learned = self.lists.learned_keys(user_id).await?;
        let today = today_key();
        let lexicon = Arc::clone(&self.lexicon);
        self.store
            .update(
                DataKind::DailyPractice,
                user_id,
                move |record: &mut Option<DailyPractice>| {
                    let Some(practice) = record.as_mut() else {
                        return Ok(PracticeStatus::NeedsSetup);
                    };
                    if practice.generated_on != today {
                        practice.words = sample_words(&lexicon, practice.level, &learned);
                        practice.topic = topic_for(&today).to_string();
                        practice.generated_on = today;
                    }
                    Ok(PracticeStatus::Ready {
                        practice: practice.clone(),
                    })
                },
            )
            .await
    }

    /// First-time setup and level changes both land here: pick the level and
    /// sample a fresh selection, replacing whatever was stored.
    pub async fn set_level(
        &self,
        user_id: &str,
        level: Level,
    ) -> Result<DailyPractice, PracticeError> {
        let learned = self.lists.learned_keys(user_id).await?;
        let today = today_key();
        let lexicon = Arc::clone(&self.lexicon);
        self.store
            .update(
                DataKind::DailyPractice,
                user_id,
                move |record: &mut Option<DailyPractice>| {
                    let practice = DailyPractice {
                        level,
                        topic: topic_for(&today).to_string(),
                        words: sample_words(&lexicon, level, &learned),
                        generated_on: today,
                    };
                    *record = Some(practice.clone());
                    Ok(practice)
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_excludes_learned_and_caps_at_ten() {
        let lexicon = Lexicon::seed();
        let a1: Vec<String> = lexicon
            .at_level(Level::A1)
            .map(|word| word.greek.clone())
            .collect();
        assert!(a1.len() > DAILY_PRACTICE_SIZE);

        let learned = vec![a1[0].clone(), a1[1].clone()];
        let words = sample_words(&lexicon, Level::A1, &learned);

        assert!(words.len() <= DAILY_PRACTICE_SIZE);
        for word in &words {
            assert_eq!(word.level, Some(Level::A1));
            assert!(!learned.contains(&word.greek));
        }
    }

    #[test]
    fn sample_returns_fewer_when_the_pool_is_small() {
        let lexicon = Lexicon::seed();
        let pool_size = lexicon.at_level(Level::B2).count();
        assert!(pool_size < DAILY_PRACTICE_SIZE);
        let words = sample_words(&lexicon, Level::B2, &[]);
        assert_eq!(words.len(), pool_size);
    }

    #[test]
    fn practice_list_shape() {
        let practice = DailyPractice {
            level: Level::A2,
            topic: topic_for("2025-03-01").to_string(),
            generated_on: "2025-03-01".to_string(),
            words: vec![WordRecord::new("νερό", "water").with_level(Level::A2)],
        };
        let list = practice.as_practice_list();
        assert_eq!(list.id, DAILY_PRACTICE_LIST_ID);
        assert_eq!(list.name, "Today's A2 Practice");
        assert!(list.learned_words.is_empty());
    }

    #[test]
    fn topic_is_stable_for_a_given_day() {
        assert_eq!(topic_for("2025-03-01"), topic_for("2025-03-01"));
        assert!(TOPICS.contains(&topic_for("2025-07-19")));
    }
}
