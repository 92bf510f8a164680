//! Outgoing notifications and the observer list that fans them out.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::badges::BadgeTier;
use crate::domain::StudyMode;
use crate::session::Rating;

/// Notification emitted by a component after a state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    QuestStarted {
        quest_id: String,
    },
    ObjectiveCompleted {
        quest_id: String,
        objective_id: String,
    },
    QuestCompleted {
        quest_id: String,
    },
    QuestUnlocked {
        quest_id: String,
    },
    RewardGranted {
        quest_id: String,
        experience_points: u32,
        badges: Vec<String>,
    },
    BadgeEarned {
        name: String,
        tier: BadgeTier,
    },
    CertificateEarned {
        name: String,
    },
    LevelUp {
        level: u32,
    },
    SessionStarted {
        mode: StudyMode,
        question_count: usize,
    },
    SessionCompleted {
        mode: StudyMode,
        accuracy: f64,
        rating: Rating,
    },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GameEvent)>;

/// Ordered observer list. Listeners live until explicitly unsubscribed.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, event: &GameEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
