//! The list store: per-user named word lists and the membership invariant
//! engine behind them.
//!
//! Two default lists exist for every user, self-healed on every touch:
//! `unstudied` ("Unstudied Words") and `learned` ("Learned Words"). A word in
//! `unstudied` is guaranteed absent from every custom list; adding a word to a
//! custom list purges it from `unstudied`, and adding a word to `unstudied`
//! while it lives in a custom list degrades to a purge. Marking a word learned
//! cascades a copy into the `learned` list; unmarking deliberately does not
//! cascade back out.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::lexicon::WordRecord;
use crate::store::{DataKind, JsonStore, StoreError};

pub const UNSTUDIED_LIST_ID: &str = "unstudied";
pub const LEARNED_LIST_ID: &str = "learned";
pub const UNSTUDIED_LIST_NAME: &str = "Unstudied Words";
pub const LEARNED_LIST_NAME: &str = "Learned Words";

pub const MAX_CUSTOM_LISTS: usize = 50;
pub const MAX_LIST_NAME_LEN: usize = 50;

/// Which role a list plays, derived from its sentinel id. The wire keeps the
/// sentinel strings; the logic never compares them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unstudied,
    Learned,
    Custom,
}

impl ListKind {
    pub fn of(list_id: &str) -> Self {
        match list_id {
            UNSTUDIED_LIST_ID => ListKind::Unstudied,
            LEARNED_LIST_ID => ListKind::Learned,
            _ => ListKind::Custom,
        }
    }

    pub fn is_default(self) -> bool {
        !matches!(self, ListKind::Custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub name: String,
    pub words: Vec<WordRecord>,
    pub learned_words: Vec<String>,
    pub created_at: String,
    pub is_default: bool,
    #[serde(default)]
    pub is_topic: bool,
}

impl List {
    pub fn kind(&self) -> ListKind {
        ListKind::of(&self.id)
    }

    pub fn contains(&self, greek: &str) -> bool {
        self.words.iter().any(|word| word.greek == greek)
    }

    pub fn is_learned(&self, greek: &str) -> bool {
        self.learned_words.iter().any(|key| key == greek)
    }

    /// Words still to practice: members not yet marked learned in this list.
    pub fn available_words(&self) -> Vec<&WordRecord> {
        self.words
            .iter()
            .filter(|word| !self.is_learned(&word.greek))
            .collect()
    }

    fn push_word(&mut self, word: WordRecord) -> bool {
        if self.contains(&word.greek) {
            return false;
        }
        self.words.push(word);
        true
    }

    fn drop_word(&mut self, greek: &str) {
        self.words.retain(|word| word.greek != greek);
        self.learned_words.retain(|key| key != greek);
    }

    fn put_learned_mark(&mut self, greek: &str) {
        if !self.is_learned(greek) {
            self.learned_words.push(greek.to_string());
        }
    }

    fn clear_learned_mark(&mut self, greek: &str) {
        self.learned_words.retain(|key| key != greek);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Pure engine over one user's list collection. No I/O here; the service wraps
// these in the store's per-user read-modify-write.
// ---------------------------------------------------------------------------

fn default_list(id: &str, name: &str) -> List {
    List {
        id: id.to_string(),
        name: name.to_string(),
        words: Vec::new(),
        learned_words: Vec::new(),
        created_at: now_iso(),
        is_default: true,
        is_topic: false,
    }
}

/// Creates the two default lists if missing. Runs on every touch of the
/// collection so records written by older versions heal themselves.
pub fn ensure_default_lists(lists: &mut Vec<List>) -> bool {
    let mut healed = false;
    for (id, name) in [
        (UNSTUDIED_LIST_ID, UNSTUDIED_LIST_NAME),
        (LEARNED_LIST_ID, LEARNED_LIST_NAME),
    ] {
        if !lists.iter().any(|list| list.id == id) {
            lists.push(default_list(id, name));
            healed = true;
        }
    }
    healed
}

fn find_list<'a>(lists: &'a mut [List], list_id: &str) -> Result<&'a mut List, ListError> {
    lists
        .iter_mut()
        .find(|list| list.id == list_id)
        .ok_or_else(|| ListError::NotFound("list not found".to_string()))
}

fn validate_name(name: &str) -> Result<String, ListError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ListError::Validation("list name is required".to_string()));
    }
    if name.chars().count() > MAX_LIST_NAME_LEN {
        return Err(ListError::Validation(format!(
            "list name cannot exceed {MAX_LIST_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_word(word: &WordRecord) -> Result<WordRecord, ListError> {
    let greek = word.greek.trim();
    let english = word.english.trim();
    if greek.is_empty() || english.is_empty() {
        return Err(ListError::Validation(
            "word requires both greek and english text".to_string(),
        ));
    }
    Ok(WordRecord {
        greek: greek.to_string(),
        english: english.to_string(),
        part_of_speech: word.part_of_speech.clone(),
        level: word.level,
    })
}

pub fn create_list(lists: &mut Vec<List>, name: &str) -> Result<List, ListError> {
    ensure_default_lists(lists);
    let name = validate_name(name)?;

    let custom_count = lists.iter().filter(|list| !list.is_default).count();
    if custom_count >= MAX_CUSTOM_LISTS {
        return Err(ListError::Validation(format!(
            "maximum {MAX_CUSTOM_LISTS} custom lists per user"
        )));
    }
    if lists.iter().any(|list| list.name == name) {
        return Err(ListError::Conflict(
            "list with this name already exists".to_string(),
        ));
    }

    let list = List {
        id: uuid::Uuid::new_v4().to_string(),
        name,
        words: Vec::new(),
        learned_words: Vec::new(),
        created_at: now_iso(),
        is_default: false,
        is_topic: false,
    };
    lists.push(list.clone());
    Ok(list)
}

pub fn rename_list(lists: &mut Vec<List>, list_id: &str, name: &str) -> Result<List, ListError> {
    ensure_default_lists(lists);
    let name = validate_name(name)?;

    let exists = lists.iter().any(|list| list.id == list_id);
    if !exists {
        return Err(ListError::NotFound("list not found".to_string()));
    }
    if ListKind::of(list_id).is_default() {
        return Err(ListError::Conflict(
            "cannot rename default list".to_string(),
        ));
    }
    if lists
        .iter()
        .any(|list| list.id != list_id && list.name == name)
    {
        return Err(ListError::Conflict(
            "list with this name already exists".to_string(),
        ));
    }

    let list = find_list(lists, list_id)?;
    list.name = name;
    Ok(list.clone())
}

pub fn delete_list(lists: &mut Vec<List>, list_id: &str) -> Result<(), ListError> {
    ensure_default_lists(lists);
    if !lists.iter().any(|list| list.id == list_id) {
        return Err(ListError::NotFound("list not found".to_string()));
    }
    if ListKind::of(list_id).is_default() {
        return Err(ListError::Conflict(
            "cannot delete default list".to_string(),
        ));
    }
    lists.retain(|list| list.id != list_id);
    Ok(())
}

/// Adds a word to a list and re-establishes the unstudied/custom disjointness
/// invariant. The two purge branches are deliberately distinct: the "is the
/// word in some custom list" check must never observe the list being written.
pub fn add_word(lists: &mut Vec<List>, list_id: &str, word: &WordRecord) -> Result<List, ListError> {
    ensure_default_lists(lists);
    let word = validate_word(word)?;
    let greek = word.greek.clone();

    match ListKind::of(list_id) {
        ListKind::Unstudied => {
            let target = find_list(lists, list_id)?;
            target.push_word(word);

            let in_custom = lists
                .iter()
                .any(|list| list.kind() == ListKind::Custom && list.contains(&greek));
            if in_custom {
                // The add degrades to a purge: the word already belongs to a
                // custom list, so it must not sit in unstudied.
                let unstudied = find_list(lists, UNSTUDIED_LIST_ID)?;
                unstudied.drop_word(&greek);
            }
        }
        ListKind::Learned => {
            let target = find_list(lists, list_id)?;
            target.push_word(word);
        }
        ListKind::Custom => {
            let target = find_list(lists, list_id)?;
            target.push_word(word);

            let unstudied = find_list(lists, UNSTUDIED_LIST_ID)?;
            unstudied.drop_word(&greek);
        }
    }

    Ok(find_list(lists, list_id)?.clone())
}

/// Removes a word from a list. Removing from the `learned` default list also
/// clears the word's learned marker everywhere, which is the one global
/// "unlearn" operation the system offers.
pub fn remove_word(lists: &mut Vec<List>, list_id: &str, greek: &str) -> Result<List, ListError> {
    ensure_default_lists(lists);
    let kind = ListKind::of(list_id);

    {
        let target = find_list(lists, list_id)?;
        target.drop_word(greek);
    }

    if kind == ListKind::Learned {
        for list in lists.iter_mut() {
            list.clear_learned_mark(greek);
        }
    }

    Ok(find_list(lists, list_id)?.clone())
}

/// Marks a word learned in a list: per-list marker, copy into the `learned`
/// default list, purge from `unstudied`.
pub fn mark_learned(lists: &mut Vec<List>, list_id: &str, greek: &str) -> Result<List, ListError> {
    ensure_default_lists(lists);

    let record = {
        let target = find_list(lists, list_id)?;
        let record = target
            .words
            .iter()
            .find(|word| word.greek == greek)
            .cloned()
            .ok_or_else(|| ListError::NotFound("word not found in list".to_string()))?;
        target.put_learned_mark(greek);
        record
    };

    let learned = find_list(lists, LEARNED_LIST_ID)?;
    learned.push_word(record);
    learned.put_learned_mark(greek);

    let unstudied = find_list(lists, UNSTUDIED_LIST_ID)?;
    unstudied.drop_word(greek);

    Ok(find_list(lists, list_id)?.clone())
}

/// Clears the learned marker in one list only. Does not touch the `learned`
/// default list or any other list; a full unlearn goes through removing the
/// word from `learned` instead.
pub fn unmark_learned(lists: &mut Vec<List>, list_id: &str, greek: &str) -> Result<List, ListError> {
    ensure_default_lists(lists);
    let target = find_list(lists, list_id)?;
    target.clear_learned_mark(greek);
    Ok(target.clone())
}

// ---------------------------------------------------------------------------
// Store-backed service
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ListService {
    store: Arc<JsonStore>,
}

impl ListService {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }

    async fn with_lists<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut Vec<List>) -> Result<T, ListError>,
    ) -> Result<T, ListError> {
        self.store
            .update(DataKind::WordLists, user_id, |record: &mut Option<Vec<List>>| {
                let lists = record.get_or_insert_with(Vec::new);
                ensure_default_lists(lists);
                f(lists)
            })
            .await
    }

    pub async fn get_lists(&self, user_id: &str) -> Result<Vec<List>, ListError> {
        self.with_lists(user_id, |lists| Ok(lists.clone())).await
    }

    pub async fn create_list(&self, user_id: &str, name: &str) -> Result<List, ListError> {
        self.with_lists(user_id, |lists| create_list(lists, name))
            .await
    }

    pub async fn rename_list(
        &self,
        user_id: &str,
        list_id: &str,
        name: &str,
    ) -> Result<List, ListError> {
        self.with_lists(user_id, |lists| rename_list(lists, list_id, name))
            .await
    }

    pub async fn delete_list(&self, user_id: &str, list_id: &str) -> Result<(), ListError> {
        self.with_lists(user_id, |lists| delete_list(lists, list_id))
            .await
    }

    pub async fn add_word(
        &self,
        user_id: &str,
        list_id: &str,
        word: &WordRecord,
    ) -> Result<List, ListError> {
        self.with_lists(user_id, |lists| add_word(lists, list_id, word))
            .await
    }

    pub async fn remove_word(
        &self,
        user_id: &str,
        list_id: &str,
        greek: &str,
    ) -> Result<List, ListError> {
        self.with_lists(user_id, |lists| remove_word(lists, list_id, greek))
            .await
    }

    pub async fn mark_learned(
        &self,
        user_id: &str,
        list_id: &str,
        greek: &str,
    ) -> Result<List, ListError> {
        self.with_lists(user_id, |lists| mark_learned(lists, list_id, greek))
            .await
    }

    pub async fn unmark_learned(
        &self,
        user_id: &str,
        list_id: &str,
        greek: &str,
    ) -> Result<List, ListError> {
        self.with_lists(user_id, |lists| unmark_learned(lists, list_id, greek))
            .await
    }

    /// Greek keys currently in the user's `learned` default list. Used by the
    /// daily practice generator to exclude mastered words.
    pub async fn learned_keys(&self, user_id: &str) -> Result<Vec<String>, ListError> {
        self.with_lists(user_id, |lists| {
            Ok(lists
                .iter()
                .find(|list| list.kind() == ListKind::Learned)
                .map(|list| list.words.iter().map(|word| word.greek.clone()).collect())
                .unwrap_or_default())
        })
        .await
    }
}
