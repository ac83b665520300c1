//! The static tool catalog sent to the model on every non-streamed call,
//! plus the closed enumerations its schemas are built from.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Priority of an assistance request as spoken in conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Uppercased form used at the storage boundary, regardless of the
    /// casing used in conversation.
    pub fn storage_value(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }
}

/// Severity of symptoms for an appointment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Urgency of a nurse-assistance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Routine,
    Urgent,
    Emergency,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Routine => "routine",
            Urgency::Urgent => "urgent",
            Urgency::Emergency => "emergency",
        }
    }
}

/// Hospital department responsible for handling an assistance request.
/// Closed set; a value outside it is a model contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    Emergency,
    #[serde(rename = "Intensive Care")]
    IntensiveCare,
    Pediatrics,
    Maternity,
    Oncology,
    Cardiology,
    Neurology,
    Orthopedics,
    Psychiatry,
    Rehabilitation,
    Geriatrics,
    Surgery,
    Outpatient,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Emergency => "Emergency",
            Department::IntensiveCare => "Intensive Care",
            Department::Pediatrics => "Pediatrics",
            Department::Maternity => "Maternity",
            Department::Oncology => "Oncology",
            Department::Cardiology => "Cardiology",
            Department::Neurology => "Neurology",
            Department::Orthopedics => "Orthopedics",
            Department::Psychiatry => "Psychiatry",
            Department::Rehabilitation => "Rehabilitation",
            Department::Geriatrics => "Geriatrics",
            Department::Surgery => "Surgery",
            Department::Outpatient => "Outpatient",
        }
    }
}

/// Display names of every department, in schema order.
pub const DEPARTMENTS: [&str; 13] = [
    "Emergency",
    "Intensive Care",
    "Pediatrics",
    "Maternity",
    "Oncology",
    "Cardiology",
    "Neurology",
    "Orthopedics",
    "Psychiatry",
    "Rehabilitation",
    "Geriatrics",
    "Surgery",
    "Outpatient",
];

static TOOL_DEFINITIONS: Lazy<Vec<Value>> = Lazy::new(|| {
    vec![
        json!({
            "type": "function",
            "function": {
                "name": "schedule_appointment",
                "description": "Schedule a medical appointment",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "symptoms": {
                            "type": "string",
                            "description": "Patient symptoms"
                        },
                        "severity": {
                            "type": "string",
                            "description": "Severity",
                            "enum": ["low", "medium", "high"]
                        },
                        "preferredDate": {
                            "type": "string",
                            "description": "Preferred date"
                        }
                    },
                    "required": ["symptoms", "severity"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "request_nurse_assistance",
                "description": "Request nurse help",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "urgency": {
                            "type": "string",
                            "description": "Urgency level",
                            "enum": ["routine", "urgent", "emergency"]
                        },
                        "reason": {
                            "type": "string",
                            "description": "Reason for help"
                        }
                    },
                    "required": ["urgency", "reason"]
                }
            }
        }),
        json!({
            "type": "function",
            "function": {
                "name": "create_assistance_request",
                "description": "Create a nursing assistance request after confirming with the patient",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "priority": {
                            "type": "string",
                            "enum": ["low", "medium", "high"],
                            "description": "Priority level of the request"
                        },
                        "description": {
                            "type": "string",
                            "description": "Detailed description of the assistance needed"
                        },
                        "department": {
                            "type": "string",
                            "enum": DEPARTMENTS,
                            "description": "Department responsible for handling the request"
                        },
                        "requiresConfirmation": {
                            "type": "boolean",
                            "description": "Whether to ask for patient confirmation before creating the request"
                        }
                    },
                    "required": ["priority", "description", "department", "requiresConfirmation"]
                }
            }
        }),
    ]
});

/// The immutable catalog, built once and sent verbatim on every model call.
pub fn tool_definitions() -> &'static [Value] {
    &TOOL_DEFINITIONS
}
