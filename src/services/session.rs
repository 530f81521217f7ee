use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub const PAGE_SIZE_STATE: &str = "pageSize";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// Per-request view of the logged-in administrator: who they are, the
/// one-shot messages queued for the next page, and sticky UI state.
#[derive(Debug)]
pub struct AdminSession {
    user_id: i32,
    flashes: Mutex<Vec<FlashMessage>>,
    state: Mutex<HashMap<String, Value>>,
}

impl AdminSession {
    pub fn new(user_id: i32) -> Self {
        Self {
            user_id,
            flashes: Mutex::new(Vec::new()),
            state: Mutex::new(HashMap::new()),
        }
    }

    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    pub fn set_flash(&self, level: FlashLevel, message: impl Into<String>) {
        self.flashes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FlashMessage {
                level,
                message: message.into(),
            });
    }

    pub fn has_flash(&self, level: FlashLevel) -> bool {
        self.flashes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|flash| flash.level == level)
    }

    /// Drain queued messages; each is shown once.
    pub fn take_flashes(&self) -> Vec<FlashMessage> {
        std::mem::take(&mut *self.flashes.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn set_state(&self, key: impl Into<String>, value: Value) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value);
    }

    pub fn state(&self, key: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Page size chosen by the user in list views, if any
    pub fn page_size(&self) -> Option<u64> {
        self.state(PAGE_SIZE_STATE)
            .and_then(|value| value.as_u64())
            .filter(|size| *size > 0)
    }
}
