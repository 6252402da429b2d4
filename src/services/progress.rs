//! Per-user study progress: memorized-word keys, total exercise counter, and
//! a per-day counter that rolls over at the first read of a new calendar day.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::store::{DataKind, JsonStore, StoreError};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub exercises_today: u64,
    pub exercises_date: Option<String>,
    pub memorized_words: Vec<String>,
}

/// Calendar-day key in UTC. Locale-independent by construction.
pub fn today_key() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Zeroes the daily counter if the stored date is not today. Returns true when
/// a rollover happened and the record needs persisting.
fn roll_over(progress: &mut UserProgress, today: &str) -> bool {
    match progress.exercises_date.as_deref() {
        Some(date) if date == today => false,
        Some(_) => {
            progress.exercises_today = 0;
            progress.exercises_date = Some(today.to_string());
            true
        }
        None => false,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct ProgressService {
    store: Arc<JsonStore>,
}

impl ProgressService {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }

    async fn with_progress<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut UserProgress) -> T,
    ) -> Result<T, ProgressError> {
        self.store
            .update(
                DataKind::Progress,
                user_id,
                |record: &mut Option<UserProgress>| {
                    let progress = record.get_or_insert_with(UserProgress::default);
                    Ok(f(progress))
                },
            )
            .await
    }

    /// Current progress with the day counter rolled over. The rollover is
    /// applied at read time and persisted, so a stale record self-corrects on
    /// the first request of a new day.
    pub async fn get_progress(&self, user_id: &str) -> Result<UserProgress, ProgressError> {
        let today = today_key();
        self.with_progress(user_id, move |progress| {
            roll_over(progress, &today);
            progress.clone()
        })
        .await
    }

    pub async fn record_exercise(&self, user_id: &str) -> Result<UserProgress, ProgressError> {
        let today = today_key();
        self.with_progress(user_id, move |progress| {
            roll_over(progress, &today);
            progress.exercises_today += 1;
            progress.exercises_date = Some(today);
            progress.clone()
        })
        .await
    }

    pub async fn memorized_words(&self, user_id: &str) -> Result<Vec<String>, ProgressError> {
        self.with_progress(user_id, |progress| progress.memorized_words.clone())
            .await
    }

    pub async fn set_memorized(
        &self,
        user_id: &str,
        greek: &str,
        memorized: bool,
    ) -> Result<Vec<String>, ProgressError> {
        let greek = greek.to_string();
        self.with_progress(user_id, move |progress| {
            if memorized {
                if !progress.memorized_words.contains(&greek) {
                    progress.memorized_words.push(greek);
                }
            } else {
                progress.memorized_words.retain(|key| *key != greek);
            }
            progress.memorized_words.clone()
        })
        .await
    }
}
