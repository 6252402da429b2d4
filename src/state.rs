use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::lexicon::Lexicon;
use crate::services::daily_practice::PracticeService;
use crate::services::lists::ListService;
use crate::services::progress::ProgressService;
use crate::store::JsonStore;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    store: Arc<JsonStore>,
    lexicon: Arc<Lexicon>,
}

impl AppState {
    pub fn new(store: Arc<JsonStore>, lexicon: Arc<Lexicon>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            store,
            lexicon,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn lexicon(&self) -> Arc<Lexicon> {
        Arc::clone(&self.lexicon)
    }

    pub fn lists(&self) -> ListService {
        ListService::new(Arc::clone(&self.store))
    }

    pub fn progress(&self) -> ProgressService {
        ProgressService::new(Arc::clone(&self.store))
    }

    pub fn practice(&self) -> PracticeService {
        PracticeService::new(Arc::clone(&self.store), self.lists(), self.lexicon())
    }
}
