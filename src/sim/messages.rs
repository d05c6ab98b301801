//! Timestamped message log shown on the HUD

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Oldest entries are dropped past this many
pub const MESSAGE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    /// Tick at which the message was posted
    pub step: u64,
}

/// A message as presented to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FadedMessage {
    pub text: String,
    /// 1 when fresh, approaching 0 as the message ages out
    pub fade: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Messages {
    entries: VecDeque<Message>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a message; a repeat of the newest entry replaces it
    pub fn add(&mut self, text: impl Into<String>, step: u64) {
        let text = text.into();
        if self.entries.back().is_some_and(|last| last.text == text) {
            self.entries.pop_back();
        }
        self.entries.push_back(Message { text, step });
        while self.entries.len() > MESSAGE_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Messages younger than `lifetime` ticks, oldest first
    pub fn recent(&self, now: u64, lifetime: u64) -> Vec<FadedMessage> {
        if lifetime == 0 {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter_map(|message| {
                let age = now.saturating_sub(message.step);
                (age < lifetime).then(|| FadedMessage {
                    text: message.text.clone(),
                    fade: 1.0 - age as f64 / lifetime as f64,
                })
            })
            .collect()
    }

    /// Drop messages that can no longer be shown
    pub fn prune(&mut self, now: u64, lifetime: u64) {
        self.entries
            .retain(|message| now.saturating_sub(message.step) < lifetime);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
