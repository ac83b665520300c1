use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Department, Priority};

/// Status every request carries until a nurse picks it up. Later transitions
/// belong to the record store, not to this layer.
pub const PENDING_STATUS: &str = "PENDING";

/// Per-turn context supplied by the caller. The core keeps no state between
/// turns; anything that must survive a turn (the pending request) rides here
/// and comes back on the next call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_requests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_request: Option<PendingRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
}

/// An assistance request awaiting explicit patient confirmation. Lives for
/// exactly one turn: created by the dispatcher, carried by the caller,
/// promoted or discarded on the next reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
    pub priority: Priority,
    pub description: String,
    pub department: Department,
    pub room: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
    pub status: String,
}

impl PendingRequest {
    pub fn new(
        priority: Priority,
        description: &str,
        department: Department,
        room: &str,
        patient: Option<&str>,
    ) -> Self {
        Self {
            priority,
            description: description.to_string(),
            department,
            room: room.to_string(),
            patient: patient.map(|p| p.to_string()),
            status: PENDING_STATUS.to_string(),
        }
    }
}

/// Record shape at the persistence boundary. Values are already normalized:
/// uppercased priority, display-form department.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistanceRequestRecord {
    pub priority: String,
    pub description: String,
    pub department: String,
    pub room: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl AssistanceRequestRecord {
    pub fn new(
        priority: Priority,
        description: &str,
        department: Department,
        room: &str,
        patient: Option<&str>,
    ) -> Self {
        Self {
            priority: priority.storage_value().to_string(),
            description: description.to_string(),
            department: department.as_str().to_string(),
            room: room.to_string(),
            patient: patient.map(|p| p.to_string()),
            status: PENDING_STATUS.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Promote a confirmed pending request to its stored form.
    pub fn from_pending(pending: &PendingRequest) -> Self {
        Self::new(
            pending.priority,
            &pending.description,
            pending.department,
            &pending.room,
            pending.patient.as_deref(),
        )
    }
}

/// The dispatcher's output: a user-facing message, plus the pending payload
/// when confirmation is still required.
#[derive(Debug, Clone)]
pub struct FunctionCallResult {
    pub text: String,
    pub pending_request: Option<PendingRequest>,
}

/// One completed conversation turn, as handed back to the transport layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_request: Option<PendingRequest>,
}

impl TurnReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pending_request: None,
        }
    }
}
