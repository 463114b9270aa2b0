//! Quest catalog and the per-account quest board.
//!
//! The board is the quest-tracking collaborator that upholds the
//! applier's at-most-once precondition: it remembers which quest ids were
//! already completed and only emits a `CompleteQuest` event the first
//! time.

use std::collections::HashSet;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ACTIVE_QUESTS;
use crate::event::{QuestRewards, RewardEvent};

/// A discrete completable task yielding a one-time XP/coin reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDef {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub coins: u64,
}

impl QuestDef {
    /// The reward payload applied when this quest completes.
    #[must_use]
    pub const fn rewards(&self) -> QuestRewards {
        QuestRewards {
            xp: self.xp,
            coins: self.coins,
        }
    }
}

/// Complete set of quests available to hand out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestCatalog {
    pub quests: Vec<QuestDef>,
}

impl QuestCatalog {
    /// Parse a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the catalog shape.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The built-in starter catalog used when no server catalog is
    /// available.
    #[must_use]
    pub fn builtin() -> Self {
        let quests = [
            ("q1", "Complete 30 minutes of cardio", 200, 20),
            ("q2", "Do 3 sets of push-ups", 150, 15),
            ("q3", "Stretch for 10 minutes", 100, 10),
        ]
        .into_iter()
        .map(|(id, title, xp, coins)| QuestDef {
            id: id.to_string(),
            title: title.to_string(),
            xp,
            coins,
        })
        .collect();
        Self { quests }
    }

    /// Find a quest by ID.
    #[must_use]
    pub fn find(&self, quest_id: &str) -> Option<&QuestDef> {
        self.quests.iter().find(|quest| quest.id == quest_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}

/// Per-account view of which quests are active and which were already
/// completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestBoard {
    active: Vec<String>,
    completed: HashSet<String>,
    target_active: usize,
}

impl Default for QuestBoard {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVE_QUESTS)
    }
}

impl QuestBoard {
    /// Create an empty board that keeps up to `target_active` quests
    /// active at once.
    #[must_use]
    pub fn new(target_active: usize) -> Self {
        Self {
            active: Vec::new(),
            completed: HashSet::new(),
            target_active,
        }
    }

    /// Quest ids currently offered to the account.
    #[must_use]
    pub fn active(&self) -> &[String] {
        &self.active
    }

    /// How many quests the board still wants to top up to reach its
    /// target. The dashboard displays this alongside the active list.
    #[must_use]
    pub fn needed(&self) -> usize {
        self.target_active.saturating_sub(self.active.len())
    }

    /// Whether a quest id was already completed on this board.
    #[must_use]
    pub fn is_completed(&self, quest_id: &str) -> bool {
        self.completed.contains(quest_id)
    }

    /// Fill the active list from the catalog, skipping quests already
    /// active or completed. Returns how many quests were added.
    pub fn top_up(&mut self, catalog: &QuestCatalog) -> usize {
        let mut added = 0;
        for quest in &catalog.quests {
            if self.needed() == 0 {
                break;
            }
            if self.completed.contains(&quest.id) || self.active.contains(&quest.id) {
                continue;
            }
            self.active.push(quest.id.clone());
            added += 1;
        }
        added
    }

    /// Mark a quest completed and emit its reward event, at most once per
    /// quest id.
    ///
    /// Returns `None` for an unknown quest id or one already completed
    /// (e.g. a retried network request); in either case nothing changes.
    pub fn complete(&mut self, catalog: &QuestCatalog, quest_id: &str) -> Option<RewardEvent> {
        let Some(quest) = catalog.find(quest_id) else {
            warn!("ignoring completion of unknown quest {quest_id}");
            return None;
        };
        if !self.completed.insert(quest.id.clone()) {
            warn!("ignoring duplicate completion of quest {quest_id}");
            return None;
        }
        self.active.retain(|id| id != quest_id);
        Some(RewardEvent::CompleteQuest {
            quest_id: quest.id.clone(),
            rewards: quest.rewards(),
        })
    }
}
