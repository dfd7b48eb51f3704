use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::JsonFile;
use crate::core::paths::files;
use crate::error::CursorError;
use crate::model::QuestId;

/// Quest cursor: when the feed was last checked and which quests it held.
///
/// The id history is never truncated, so a quest that drops off the listing
/// and comes back later is not announced twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredQuestCursor", into = "StoredQuestCursor")]
pub struct QuestCursor {
    pub last_checked: Option<DateTime<Utc>>,
    known_quests: Vec<QuestId>,
    index: HashSet<QuestId>,
}

/// On-disk shape: `{ "last_checked": ..., "known_quests": [...] }`
#[derive(Serialize, Deserialize)]
struct StoredQuestCursor {
    last_checked: Option<DateTime<Utc>>,
    #[serde(default)]
    known_quests: Vec<QuestId>,
}

impl From<StoredQuestCursor> for QuestCursor {
    fn from(stored: StoredQuestCursor) -> Self {
        let mut cursor = QuestCursor { last_checked: stored.last_checked, ..Self::default() };
        for id in stored.known_quests {
            cursor.record(id);
        }
        cursor
    }
}

impl From<QuestCursor> for StoredQuestCursor {
    fn from(cursor: QuestCursor) -> Self {
        StoredQuestCursor { last_checked: cursor.last_checked, known_quests: cursor.known_quests }
    }
}

impl QuestCursor {
    /// Known ids, first seen first.
    pub fn known_quests(&self) -> &[QuestId] { &self.known_quests }

    pub fn is_known(&self, id: &QuestId) -> bool {
        self.index.contains(id)
    }

    pub fn record(&mut self, id: QuestId) -> bool {
        if !self.index.insert(id.clone()) {
            return false;
        }
        self.known_quests.push(id);
        true
    }

    /// Advance `last_checked` to `now`; an earlier `now` leaves it alone.
    pub fn mark_checked(&mut self, now: DateTime<Utc>) {
        if self.last_checked.map_or(true, |prev| now > prev) {
            self.last_checked = Some(now);
        }
    }
}

/// Quest cursor persisted as `{ "last_checked": ..., "known_quests": [...] }`.
#[derive(Debug, Clone)]
pub struct QuestCursorStore {
    file: JsonFile,
}

impl QuestCursorStore {
    pub fn new(data_dir: &Path) -> Self {
        Self { file: JsonFile::new(data_dir.join(files::QUEST_CACHE)) }
    }

    pub fn path(&self) -> &Path { self.file.path() }

    pub fn load(&self) -> QuestCursor {
        self.file.load_or_init()
    }

    pub fn peek(&self) -> Option<QuestCursor> {
        self.file.peek()
    }

    /// Both fields are written together as one document.
    pub fn save(&self, cursor: &QuestCursor) -> Result<(), CursorError> {
        self.file.store(cursor)
    }
}
