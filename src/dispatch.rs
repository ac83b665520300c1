//! Executes the domain action behind a model tool call. Arguments are
//! validated against the declared schemas before anything runs; a call that
//! fails validation or names an undeclared function fails closed.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::catalog::{Department, Priority, Severity, Urgency};
use crate::error::AssistantError;
use crate::prompt;
use crate::traits::{RequestStore, ToolCall};
use crate::types::{
    AssistanceRequestRecord, ConversationContext, FunctionCallResult, PendingRequest,
};

/// The closed set of functions the model may call. Adding a tool to the
/// catalog means adding a variant here, and the match below stops compiling
/// until it is handled.
#[derive(Debug, Clone, Copy)]
pub enum KnownTool {
    ScheduleAppointment,
    RequestNurseAssistance,
    CreateAssistanceRequest,
}

impl KnownTool {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "schedule_appointment" => Some(KnownTool::ScheduleAppointment),
            "request_nurse_assistance" => Some(KnownTool::RequestNurseAssistance),
            "create_assistance_request" => Some(KnownTool::CreateAssistanceRequest),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleAppointmentArgs {
    symptoms: String,
    severity: Severity,
    /// Accepted from the model but not echoed in the acknowledgment;
    /// scheduling itself is handled by the appointments service.
    #[serde(rename = "preferredDate")]
    #[allow(dead_code)]
    preferred_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NurseAssistanceArgs {
    urgency: Urgency,
    reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAssistanceArgs {
    priority: Priority,
    description: String,
    department: Department,
    requires_confirmation: bool,
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: &Value) -> Result<T, AssistantError> {
    serde_json::from_value(arguments.clone()).map_err(|err| AssistantError::ValidationGap {
        tool: tool.to_string(),
        message: err.to_string(),
    })
}

/// Run the action behind `call`, returning the user-facing message and, for
/// a confirmation-gated request, the pending payload the caller must carry
/// into the next turn.
pub async fn dispatch(
    call: &ToolCall,
    context: &ConversationContext,
    store: &dyn RequestStore,
) -> Result<FunctionCallResult, AssistantError> {
    let tool = KnownTool::from_name(&call.name).ok_or_else(|| AssistantError::UnknownTool {
        name: call.name.clone(),
    })?;

    match tool {
        KnownTool::ScheduleAppointment => {
            let args: ScheduleAppointmentArgs = parse_args(&call.name, &call.arguments)?;
            info!(severity = args.severity.as_str(), "Acknowledging appointment request");
            Ok(FunctionCallResult {
                text: format!(
                    "✓ Appointment scheduled: {} ({} severity)",
                    args.symptoms,
                    args.severity.as_str()
                ),
                pending_request: None,
            })
        }

        KnownTool::RequestNurseAssistance => {
            let args: NurseAssistanceArgs = parse_args(&call.name, &call.arguments)?;
            info!(urgency = args.urgency.as_str(), "Acknowledging nurse request");
            Ok(FunctionCallResult {
                text: format!(
                    "⚡ Nurse requested: {} ({})",
                    args.reason,
                    args.urgency.as_str()
                ),
                pending_request: None,
            })
        }

        KnownTool::CreateAssistanceRequest => {
            let args: CreateAssistanceArgs = parse_args(&call.name, &call.arguments)?;
            let room = context.room.as_deref().unwrap_or("Unknown");
            let pending = PendingRequest::new(
                args.priority,
                &args.description,
                args.department,
                room,
                context.patient_id.as_deref(),
            );

            if args.requires_confirmation {
                // Nothing is persisted yet; the pending payload rides back
                // through the caller until the patient answers.
                let text = prompt::confirmation_prompt(&pending);
                return Ok(FunctionCallResult {
                    text,
                    pending_request: Some(pending),
                });
            }

            let record = AssistanceRequestRecord::from_pending(&pending);
            match store.create_assistance_request(&record).await {
                Ok(()) => Ok(FunctionCallResult {
                    text: prompt::created_summary(&pending),
                    pending_request: None,
                }),
                Err(err) => {
                    error!(error = %err, "Failed to persist assistance request");
                    Ok(FunctionCallResult {
                        text: prompt::REQUEST_APOLOGY.to_string(),
                        pending_request: None,
                    })
                }
            }
        }
    }
}
