use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::errors::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareState {
    NoShare,
    Generating,
    Active,
    Deleting,
}

impl ShareState {
    pub fn is_transient(&self) -> bool {
        matches!(self, ShareState::Generating | ShareState::Deleting)
    }
}

/// Per-user transient share states
///
/// `NoShare` and `Active` are not stored here; they follow from whether the
/// user has an active row.
#[derive(Clone, Default)]
pub struct ShareLifecycle {
    transient: Arc<Mutex<HashMap<Uuid, ShareState>>>,
}

impl ShareLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_generating(&self, user_id: Uuid) -> Result<TransitionGuard, ApiError> {
        self.enter(user_id, ShareState::Generating)
    }

    pub fn begin_deleting(&self, user_id: Uuid) -> Result<TransitionGuard, ApiError> {
        self.enter(user_id, ShareState::Deleting)
    }

    /// Current state, with `has_active_share` supplying the persistent part
    pub fn state(&self, user_id: Uuid, has_active_share: bool) -> ShareState {
        let transient = self
            .transient
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .copied();

        match transient {
            Some(state) => state,
            None if has_active_share => ShareState::Active,
            None => ShareState::NoShare,
        }
    }

    fn enter(&self, user_id: Uuid, state: ShareState) -> Result<TransitionGuard, ApiError> {
        let mut transient = self.transient.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(current) = transient.get(&user_id) {
            return Err(ApiError::Conflict(match current {
                ShareState::Deleting => "Your shared map is being deleted".to_string(),
                _ => "A shared map is already being generated".to_string(),
            }));
        }

        transient.insert(user_id, state);
        log::debug!("User {} entered {:?}", user_id, state);

        Ok(TransitionGuard {
            transient: Arc::clone(&self.transient),
            user_id,
        })
    }
}

/// Leaves the transient state when dropped, whatever the outcome
pub struct TransitionGuard {
    transient: Arc<Mutex<HashMap<Uuid, ShareState>>>,
    user_id: Uuid,
}

impl Drop for TransitionGuard {
    fn drop(&mut self) {
        self.transient
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.user_id);
    }
}
